//! Functional units: ALU, BRU, and LSU execution logic.
//!
//! The three units are modeled as a tagged sum over [`FuType`] rather than
//! as separate structs behind a trait object: each variant's `execute`
//! produces a [`WbPacket`], the one capability the writeback bus needs.

use crate::common::constants::{REG_A0, REG_A1};
use crate::core::dmem::DataMemory;
use crate::core::prf::PhysicalRegisterFile;
use crate::pipeline::decode::{AluOp, BranchOp, FuType, LsSize};
use crate::pipeline::rename::RenamePacket;

/// One writeback bus beat produced by a functional unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct WbPacket {
    /// Whether this beat carries a real result (always true for an issued
    /// entry; kept as a field so an empty beat can be represented uniformly).
    pub valid: bool,
    /// ROB tag of the producing instruction.
    pub rob_tag: u8,
    /// Destination physical register, or 0 if `rd_used` is false.
    pub prd: u8,
    /// Result value.
    pub data: u32,
    /// Whether `prd` should be written (mirrors the decode packet's flag).
    pub rd_used: bool,
    /// Set by the BRU when the resolved control flow differs from the
    /// predicted next PC.
    pub mispredict: bool,
    /// The true next-PC to flush fetch to, valid only when `mispredict`.
    pub flush_pc: u32,
}

impl FuType {
    /// Executes `entry`, reading operands from `prf` and touching `dmem`
    /// for loads/stores. `predicted_next_pc` is the BRU's static prediction
    /// (`pc + 4`, sequential), used to detect mispredicts.
    #[must_use]
    pub fn execute(
        self,
        entry: &RenamePacket,
        prf: &PhysicalRegisterFile,
        dmem: &mut DataMemory,
        predicted_next_pc: u32,
    ) -> WbPacket {
        match self {
            Self::Alu => alu_execute(entry, prf),
            Self::Bru => bru_execute(entry, prf, predicted_next_pc),
            Self::Lsu => lsu_execute(entry, prf, dmem),
        }
    }
}

fn operand2(entry: &RenamePacket, prf: &PhysicalRegisterFile) -> u32 {
    if entry.decode.imm_used {
        entry.decode.imm as u32
    } else {
        prf.read(entry.prs2)
    }
}

fn alu_execute(entry: &RenamePacket, prf: &PhysicalRegisterFile) -> WbPacket {
    let d = &entry.decode;
    let src1 = prf.read(entry.prs1);
    let src2 = operand2(entry, prf);
    let shamt = src2 & 0x1F;
    let data = match d.alu_op {
        AluOp::Add => src1.wrapping_add(src2),
        AluOp::Sub => src1.wrapping_sub(src2),
        AluOp::And => src1 & src2,
        AluOp::Or => src1 | src2,
        AluOp::Xor => src1 ^ src2,
        AluOp::Slt => u32::from((src1 as i32) < (src2 as i32)),
        AluOp::Sltu | AluOp::Sltiu => u32::from(src1 < src2),
        AluOp::Sll => src1 << shamt,
        AluOp::Srl => src1 >> shamt,
        AluOp::Sra => ((src1 as i32) >> shamt) as u32,
        AluOp::Lui => src2,
    };
    WbPacket {
        valid: true,
        rob_tag: entry.rob_tag,
        prd: entry.prd,
        data,
        rd_used: d.rd_used,
        mispredict: false,
        flush_pc: 0,
    }
}

fn branch_taken(op: BranchOp, a: u32, b: u32) -> bool {
    match op {
        BranchOp::Beq => a == b,
        BranchOp::Bne => a != b,
        BranchOp::Blt => (a as i32) < (b as i32),
        BranchOp::Bge => (a as i32) >= (b as i32),
        BranchOp::Bltu => a < b,
        BranchOp::Bgeu => a >= b,
    }
}

fn bru_execute(entry: &RenamePacket, prf: &PhysicalRegisterFile, predicted_next_pc: u32) -> WbPacket {
    let d = &entry.decode;
    let src1 = prf.read(entry.prs1);
    let pc = d.pc;

    let (actual_next_pc, data) = if d.is_branch {
        let src2 = prf.read(entry.prs2);
        let taken = branch_taken(d.branch_op, src1, src2);
        let target = pc.wrapping_add(d.imm as u32);
        (if taken { target } else { pc.wrapping_add(4) }, 0)
    } else {
        // JAL / JALR: always taken.
        let target = if d.rs1_used {
            src1.wrapping_add(d.imm as u32) & !1u32
        } else {
            pc.wrapping_add(d.imm as u32)
        };
        (target, pc.wrapping_add(4))
    };

    let mispredict = actual_next_pc != predicted_next_pc;
    WbPacket {
        valid: true,
        rob_tag: entry.rob_tag,
        prd: entry.prd,
        data,
        rd_used: d.rd_used,
        mispredict,
        flush_pc: actual_next_pc,
    }
}

fn sign_extend_load(raw: u32, size: LsSize, unsigned: bool) -> u32 {
    if unsigned {
        return raw;
    }
    match size {
        LsSize::Byte => (raw as i8) as i32 as u32,
        LsSize::Half => (raw as i16) as i32 as u32,
        LsSize::Word => raw,
    }
}

fn lsu_execute(entry: &RenamePacket, prf: &PhysicalRegisterFile, dmem: &mut DataMemory) -> WbPacket {
    let d = &entry.decode;
    let addr = prf.read(entry.prs1).wrapping_add(d.imm as u32);

    let data = if d.is_load {
        let raw = dmem.read(addr, d.ls_size);
        sign_extend_load(raw, d.ls_size, d.unsigned_load)
    } else {
        let store_data = prf.read(entry.prs2);
        dmem.write(addr, store_data, d.ls_size);
        0
    };

    WbPacket {
        valid: true,
        rob_tag: entry.rob_tag,
        prd: entry.prd,
        data,
        rd_used: d.rd_used,
        mispredict: false,
        flush_pc: 0,
    }
}

/// Reads the simulator's two reported architectural registers (`a0`, `a1`)
/// through the current RAT/PRF, used by the final report.
#[must_use]
pub fn read_reported_registers(
    rat: &crate::pipeline::rat::Rat,
    prf: &PhysicalRegisterFile,
) -> (u32, u32) {
    let a0 = prf.read(rat.lookup_src(REG_A0 as u8));
    let a1 = prf.read(rat.lookup_src(REG_A1 as u8));
    (a0, a1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decode::DecodePacket;

    fn packet(decode: DecodePacket, prs1: u8, prs2: u8) -> RenamePacket {
        RenamePacket {
            decode,
            prs1,
            prs2,
            ..RenamePacket::default()
        }
    }

    #[test]
    fn alu_add_wraps_to_32_bits() {
        let mut prf = PhysicalRegisterFile::default();
        prf.write(1, u32::MAX);
        let d = DecodePacket {
            alu_op: AluOp::Add,
            imm_used: true,
            imm: 1,
            ..DecodePacket::default()
        };
        let wb = alu_execute(&packet(d, 1, 0), &prf);
        assert_eq!(wb.data, 0);
    }

    #[test]
    fn sra_is_arithmetic() {
        let mut prf = PhysicalRegisterFile::default();
        prf.write(1, 0x8000_0000);
        let d = DecodePacket {
            alu_op: AluOp::Sra,
            imm_used: true,
            imm: 4,
            ..DecodePacket::default()
        };
        let wb = alu_execute(&packet(d, 1, 0), &prf);
        assert_eq!(wb.data, 0xF800_0000);
    }

    #[test]
    fn taken_branch_mispredicts_against_sequential_prediction() {
        let mut prf = PhysicalRegisterFile::default();
        prf.write(1, 5);
        prf.write(2, 5);
        let d = DecodePacket {
            is_branch: true,
            branch_op: BranchOp::Beq,
            pc: 100,
            imm: 16,
            rs1_used: true,
            rs2_used: true,
            ..DecodePacket::default()
        };
        let wb = bru_execute(&packet(d, 1, 2), &prf, 104);
        assert!(wb.mispredict);
        assert_eq!(wb.flush_pc, 116);
    }

    #[test]
    fn not_taken_branch_matches_sequential_prediction() {
        let mut prf = PhysicalRegisterFile::default();
        prf.write(1, 5);
        prf.write(2, 6);
        let d = DecodePacket {
            is_branch: true,
            branch_op: BranchOp::Beq,
            pc: 100,
            imm: 16,
            rs1_used: true,
            rs2_used: true,
            ..DecodePacket::default()
        };
        let wb = bru_execute(&packet(d, 1, 2), &prf, 104);
        assert!(!wb.mispredict);
    }

    #[test]
    fn jalr_clears_low_bit_of_target() {
        let mut prf = PhysicalRegisterFile::default();
        prf.write(1, 0x1003);
        let d = DecodePacket {
            is_jump: true,
            pc: 100,
            imm: 0,
            rs1_used: true,
            ..DecodePacket::default()
        };
        let wb = bru_execute(&packet(d, 1, 0), &prf, 104);
        assert_eq!(wb.flush_pc, 0x1002);
        assert_eq!(wb.data, 104);
    }

    #[test]
    fn store_then_load_round_trips_with_sign_extension() {
        let mut prf = PhysicalRegisterFile::default();
        let mut dmem = DataMemory::default();
        prf.write(1, 0x100);
        prf.write(2, 0xFFFF_FFF0);
        let store = DecodePacket {
            is_store: true,
            ls_size: LsSize::Byte,
            rs1_used: true,
            rs2_used: true,
            ..DecodePacket::default()
        };
        let _ = lsu_execute(&packet(store, 1, 2), &prf, &mut dmem);

        let load = DecodePacket {
            is_load: true,
            ls_size: LsSize::Byte,
            rs1_used: true,
            ..DecodePacket::default()
        };
        let wb = lsu_execute(&packet(load, 1, 0), &prf, &mut dmem);
        assert_eq!(wb.data, 0xFFFF_FFF0);
    }
}
