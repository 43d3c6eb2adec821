//! The cycle-driving engine: owns every pipeline structure (fetch state,
//! map table, free list, tag allocator, ROB, checkpoint stack, reservation
//! stations, physical register file) and sequences them each tick per the
//! mandated single-threaded evaluation order: commit, execute, writeback,
//! recovery, dispatch/rename/decode, fetch.
//!
//! Instruction and data memory are *not* owned here: they are the core's
//! external collaborators, owned by [`crate::sim::Simulator`] and passed in
//! by reference each tick.

use crate::core::dmem::DataMemory;
use crate::core::imem::InstructionMemory;
use crate::core::prf::PhysicalRegisterFile;
use crate::pipeline::checkpoint::{Checkpoint, CheckpointStack};
use crate::pipeline::decode::{self, FuType};
use crate::pipeline::fetch::Fetch;
use crate::pipeline::free_list::FreeList;
use crate::pipeline::functional_units::{self, WbPacket};
use crate::pipeline::rat::Rat;
use crate::pipeline::rename::RenamePacket;
use crate::pipeline::reservation_station::ReservationStation;
use crate::pipeline::rob::Rob;
use crate::pipeline::tag_allocator::TagAllocator;

/// Per-cycle events the tick loop folds into [`crate::stats::Stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// An instruction retired from the ROB head this cycle.
    pub committed: bool,
    /// The BRU detected a mispredict and recovery fired this cycle.
    pub mispredict: bool,
    /// Dispatch was attempted and blocked for lack of a free physical register.
    pub stall_no_free_preg: bool,
    /// Dispatch was attempted and blocked for lack of a ROB tag.
    pub stall_no_rob_tag: bool,
    /// Dispatch was attempted and blocked for lack of a reservation station slot.
    pub stall_no_rs_slot: bool,
}

/// The out-of-order pipeline engine.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    fetch: Fetch,
    rat: Rat,
    free_list: FreeList,
    tag_alloc: TagAllocator,
    rob: Rob,
    checkpoints: CheckpointStack,
    rs_alu: ReservationStation,
    rs_bru: ReservationStation,
    rs_lsu: ReservationStation,
    prf: PhysicalRegisterFile,
}

impl Engine {
    /// Reads the two architecturally reported registers (`a0`, `a1`)
    /// through the current RAT and PRF.
    #[must_use]
    pub fn reported_registers(&self) -> (u32, u32) {
        functional_units::read_reported_registers(&self.rat, &self.prf)
    }

    /// Current occupancy of the ROB, exposed for stats and invariant checks.
    #[must_use]
    pub fn rob_len(&self) -> usize {
        self.rob.len()
    }

    /// Registered fetch PC, for trace output.
    #[must_use]
    pub fn pc(&self) -> u32 {
        self.fetch.pc()
    }

    /// Advances the pipeline by one cycle.
    pub fn tick(&mut self, imem: &InstructionMemory, dmem: &mut DataMemory) -> TickEvents {
        let mut events = TickEvents::default();

        events.committed = self.commit();

        let beats = self.execute(dmem);
        self.writeback(&beats);

        let flush_pc = self.recover(&beats);
        events.mispredict = flush_pc.is_some();

        let ready = if flush_pc.is_none() {
            self.dispatch_rename_decode(&mut events)
        } else {
            false
        };

        self.fetch.tick(imem, ready, flush_pc);

        events
    }

    /// Stage 1: retire the ROB head if it is done.
    fn commit(&mut self) -> bool {
        let tag = self.rob.head_tag();
        let Some(entry) = self.rob.commit_head() else {
            return false;
        };
        if entry.rd_used && entry.old_prd != 0 {
            self.free_list.release(entry.old_prd);
        }
        if entry.is_branch_or_jump {
            self.checkpoints.release(tag);
        }
        true
    }

    /// Stage 2: issue up to one ready entry per reservation station and
    /// execute it. Fixed ALU, BRU, LSU priority, matching the writeback
    /// bus's specified beat ordering. The LSU writes data memory directly at
    /// execute time with no rollback path, so it only issues its front
    /// (oldest) entry once that entry *is* the ROB head: a load/store never
    /// executes on a path that could still be squashed.
    fn execute(&mut self, dmem: &mut DataMemory) -> [Option<WbPacket>; 3] {
        let alu = self
            .rs_alu
            .issue_any_ready()
            .map(|entry| FuType::Alu.execute(&entry, &self.prf, &mut *dmem, 0));
        let bru = self.rs_bru.issue_any_ready().map(|entry| {
            let predicted_next_pc = entry.decode.pc.wrapping_add(4);
            FuType::Bru.execute(&entry, &self.prf, &mut *dmem, predicted_next_pc)
        });
        let lsu = self
            .rs_lsu
            .issue_front_if_ready_at_head(self.rob.head_tag())
            .map(|entry| FuType::Lsu.execute(&entry, &self.prf, &mut *dmem, 0));
        [alu, bru, lsu]
    }

    /// Stage 3: apply PRF writes, mark ROB entries done, and broadcast
    /// wakeup to every reservation station (a waiting entry may depend on
    /// a producer executing on any functional unit).
    fn writeback(&mut self, beats: &[Option<WbPacket>; 3]) {
        for wb in beats.iter().flatten() {
            if wb.rd_used && wb.prd != 0 {
                self.prf.write(wb.prd, wb.data);
            }
            self.rob.mark_done(wb.rob_tag);
            self.rs_alu.wakeup(wb.prd);
            self.rs_bru.wakeup(wb.prd);
            self.rs_lsu.wakeup(wb.prd);
        }
    }

    /// Stage 4: if a writeback beat raised a mispredict, restore
    /// architectural rename state from its checkpoint, truncate the ROB,
    /// clear every reservation station, and return the PC fetch must flush
    /// to. At most one BRU beat exists per cycle, so at most one recovery.
    fn recover(&mut self, beats: &[Option<WbPacket>; 3]) -> Option<u32> {
        let mispredict = beats.iter().flatten().find(|wb| wb.mispredict)?;
        let checkpoint = *self
            .checkpoints
            .get(mispredict.rob_tag)
            .expect("a mispredicting branch/jump always owns a live checkpoint");
        self.restore_from(checkpoint);
        self.checkpoints.release(mispredict.rob_tag);
        Some(mispredict.flush_pc)
    }

    fn restore_from(&mut self, checkpoint: Checkpoint) {
        self.rat.restore(checkpoint.rat);
        self.free_list.restore(checkpoint.free_list);
        self.prf.restore_valid(checkpoint.prf_valid);
        self.rob.truncate(checkpoint.rob_tail_after);
        self.rs_alu.clear();
        self.rs_bru.clear();
        self.rs_lsu.clear();
        self.tag_alloc.restore(checkpoint.next_tag_after);
    }

    /// Stage 5: decode the instruction fetch latched last cycle, then
    /// attempt rename and dispatch. Returns whether fetch should consume
    /// its current output and advance the PC.
    fn dispatch_rename_decode(&mut self, events: &mut TickEvents) -> bool {
        let Some((pc, instr)) = self.fetch.output() else {
            return false;
        };
        let pkt = decode::decode(pc, instr);
        if !pkt.valid {
            // Unrecognized opcode: no rename allocation side effects, but
            // fetch still advances past it.
            return true;
        }

        let need_alloc = pkt.rd_used && pkt.rd != 0;
        if need_alloc && !self.free_list.has_free() {
            events.stall_no_free_preg = true;
            return false;
        }
        let Some(tag) = self.tag_alloc.peek(|t| self.rob.is_live(t)) else {
            events.stall_no_rob_tag = true;
            return false;
        };
        let fu_type = pkt.fu_type;
        if self.rs_for(fu_type).is_full() {
            events.stall_no_rs_slot = true;
            return false;
        }

        let prs1 = if pkt.rs1_used {
            self.rat.lookup_src(pkt.rs1)
        } else {
            0
        };
        let prs2 = if pkt.rs2_used {
            self.rat.lookup_src(pkt.rs2)
        } else {
            0
        };
        let (old_prd, prd) = if need_alloc {
            let old_prd = self.rat.lookup_old(pkt.rd);
            let prd = self
                .free_list
                .alloc()
                .expect("has_free was checked immediately above");
            (old_prd, prd)
        } else {
            (0, 0)
        };

        self.tag_alloc.confirm(tag);
        let is_branch_or_jump = pkt.is_branch || pkt.is_jump;
        self.rob
            .allocate(tag, pkt.rd_used, old_prd, prd, is_branch_or_jump);
        self.tag_alloc.release_reservation(tag);

        if need_alloc {
            self.rat.update(pkt.rd, prd);
            self.prf.clear_valid(prd);
        }

        let entry = RenamePacket {
            prs1_ready: self.prf.is_valid(prs1),
            prs2_ready: self.prf.is_valid(prs2),
            decode: pkt,
            prs1,
            prs2,
            prd,
            old_prd,
            rob_tag: tag,
        };
        self.rs_for(fu_type).push(entry);

        if is_branch_or_jump {
            self.checkpoints.take(
                tag,
                Checkpoint {
                    rat: self.rat.snapshot(),
                    free_list: self.free_list.snapshot(),
                    prf_valid: self.prf.valid_snapshot(),
                    rob_tail_after: self.rob.next_tail(),
                    next_tag_after: self.tag_alloc.snapshot(),
                },
            );
        }

        true
    }

    fn rs_for(&mut self, fu_type: FuType) -> &mut ReservationStation {
        match fu_type {
            FuType::Alu => &mut self.rs_alu,
            FuType::Bru => &mut self.rs_bru,
            FuType::Lsu => &mut self.rs_lsu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::{N_PREG, ROB_DEPTH};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn encode_r(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
        (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
    }

    fn sub(rd: u32, rs1: u32, rs2: u32) -> u32 {
        encode_r(0x20, rs2, rs1, 0x0, rd, 0x33)
    }

    fn encode_i(imm: i32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
        (((imm as u32) & 0xFFF) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
    }

    fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
        encode_i(imm, rs1, 0x0, rd, 0x13)
    }

    fn jal_self() -> u32 {
        // JAL x0, 0: an infinite loop-in-place, used to park the final state
        // for end-of-simulation inspection in tests that don't care about
        // termination.
        0x6F
    }

    fn run_program(instrs: &[u32], cycles: u32) -> Engine {
        let mut imem = InstructionMemory::default();
        imem.load(instrs);
        let mut dmem = DataMemory::default();
        let mut engine = Engine::default();
        for _ in 0..cycles {
            let _ = engine.tick(&imem, &mut dmem);
        }
        engine
    }

    #[test]
    fn dependent_chain_resolves_through_the_prf() {
        // addi x10, x0, 7 ; addi x11, x10, 3 ; jal x0, self
        let program = [addi(10, 0, 7), addi(11, 10, 3), jal_self()];
        let engine = run_program(&program, 60);
        let (a0, a1) = engine.reported_registers();
        assert_eq!(a0, 7);
        assert_eq!(a1, 10);
    }

    #[test]
    fn write_after_write_keeps_the_younger_mapping() {
        // addi x10, x0, 1 ; addi x10, x0, 2 ; jal x0, self
        let program = [addi(10, 0, 1), addi(10, 0, 2), jal_self()];
        let engine = run_program(&program, 60);
        let (a0, _) = engine.reported_registers();
        assert_eq!(a0, 2);
    }

    #[test]
    fn taken_branch_recovers_to_the_true_target() {
        // addi x10, x0, 0 ; addi x5, x0, 1 ; beq x5, x5, +8 ; addi x10, x0, 99 ; addi x10, x0, 1 ; jal x0, self
        let beq_taken = {
            // BEQ x5, x5, 8: taken, skipping exactly one instruction.
            let imm: u32 = 8;
            let b11 = (imm >> 11) & 1;
            let b4_1 = (imm >> 1) & 0xF;
            let b10_5 = (imm >> 5) & 0x3F;
            let b12 = (imm >> 12) & 1;
            (b12 << 31) | (b10_5 << 25) | (5 << 20) | (5 << 15) | (0x0 << 12) | (b4_1 << 8) | (b11 << 7) | 0x63
        };
        let program = [
            addi(10, 0, 0),
            addi(5, 0, 1),
            beq_taken,
            addi(10, 0, 99),
            addi(10, 0, 1),
            jal_self(),
        ];
        let engine = run_program(&program, 80);
        let (a0, _) = engine.reported_registers();
        assert_eq!(a0, 1, "the skipped addi (99) must never commit");
    }

    #[test]
    fn unrecognized_opcode_advances_fetch_without_allocating_rename_state() {
        let program = [0b1111111, addi(10, 0, 5), jal_self()];
        let engine = run_program(&program, 40);
        let (a0, _) = engine.reported_registers();
        assert_eq!(a0, 5, "fetch must skip the bad opcode and still reach the addi");
    }

    #[test]
    fn scenario_2_subtraction_commits_through_the_alu() {
        // addi x10,x0,5 ; addi x11,x0,3 ; sub x10,x10,x11 ; loop
        let program = [addi(10, 0, 5), addi(11, 0, 3), sub(10, 10, 11), jal_self()];
        let engine = run_program(&program, 80);
        let (a0, a1) = engine.reported_registers();
        assert_eq!(a0, 2);
        assert_eq!(a1, 3);
    }

    fn assert_register_zero_invariant(engine: &Engine) {
        assert_eq!(engine.rat.lookup_src(0), 0);
        assert_eq!(engine.prf.read(0), 0);
        assert!(engine.prf.is_valid(0));
    }

    fn assert_register_partition_invariant(engine: &Engine) {
        let mut owner_count = [0u8; N_PREG];
        for &preg in &engine.rat.snapshot() {
            owner_count[preg as usize] += 1;
        }
        engine.rob.for_each_valid(|_, entry| {
            if entry.rd_used {
                owner_count[entry.old_prd as usize] += 1;
                owner_count[entry.prd as usize] += 1;
            }
        });
        let free = engine.free_list.snapshot();
        for (preg, count) in owner_count.iter_mut().enumerate() {
            if free & (1u128 << preg) != 0 {
                *count += 1;
            }
        }
        for (preg, count) in owner_count.iter().enumerate() {
            assert_eq!(*count, 1, "preg {preg} belongs to {count} groups, want exactly 1");
        }
    }

    fn assert_rob_bounds_invariant(engine: &Engine) {
        assert!(engine.rob.len() <= ROB_DEPTH);
    }

    fn assert_invalid_pregs_have_one_inflight_producer(engine: &Engine) {
        let valid = engine.prf.valid_snapshot();
        for preg in 1..N_PREG {
            if valid[preg] {
                continue;
            }
            let mut producers = 0;
            engine.rob.for_each_valid(|_, entry| {
                if entry.rd_used && entry.prd == preg as u8 && !entry.done {
                    producers += 1;
                }
            });
            assert_eq!(
                producers, 1,
                "preg {preg} is not ready but has {producers} in-flight producers"
            );
        }
    }

    fn assert_checkpoint_branch_correspondence(engine: &Engine) {
        let mut branch_tags = HashSet::new();
        engine.rob.for_each_valid(|tag, entry| {
            if entry.is_branch_or_jump {
                branch_tags.insert(tag);
            }
        });
        for tag in 0..ROB_DEPTH as u8 {
            assert_eq!(
                engine.checkpoints.exists(tag),
                branch_tags.contains(&tag),
                "tag {tag}: checkpoint existence must match live branch/jump status"
            );
        }
    }

    /// Encodes `addi rd, rs1, imm` restricted to a small register window and
    /// bounded immediate, so proptest-generated programs stress rename/ROB/
    /// free-list bookkeeping with plenty of WAW/RAW hazards among few
    /// architectural registers without ever producing an invalid opcode.
    fn addi_strategy() -> impl Strategy<Value = u32> {
        (0u32..6, 0u32..6, -64i32..64).prop_map(|(rd, rs1, imm)| addi(rd, rs1, imm))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_every_cycle_for_random_alu_programs(
            instrs in proptest::collection::vec(addi_strategy(), 1..24),
        ) {
            let mut program: Vec<u32> = instrs;
            program.push(jal_self());
            let mut imem = InstructionMemory::default();
            imem.load(&program);
            let mut dmem = DataMemory::default();
            let mut engine = Engine::default();
            for _ in 0..(program.len() as u32 * 6 + 40) {
                let _ = engine.tick(&imem, &mut dmem);
                assert_register_zero_invariant(&engine);
                assert_register_partition_invariant(&engine);
                assert_rob_bounds_invariant(&engine);
                assert_invalid_pregs_have_one_inflight_producer(&engine);
                assert_checkpoint_branch_correspondence(&engine);
            }
        }
    }
}
