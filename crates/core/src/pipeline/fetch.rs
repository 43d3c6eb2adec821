//! Fetch: PC management and the instruction-memory request/response state
//! machine.

use crate::core::imem::InstructionMemory;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum FetchState {
    #[default]
    Idle,
    Req,
    Have,
}

/// Registered fetch state: program counter, instruction-memory request
/// state machine, and the latched instruction once it arrives.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fetch {
    state: FetchState,
    pc: u32,
    instr: u32,
}

impl Fetch {
    /// This cycle's registered output: `Some((pc, instr))` only while in
    /// the `HAVE` state.
    #[must_use]
    pub fn output(&self) -> Option<(u32, u32)> {
        (self.state == FetchState::Have).then_some((self.pc, self.instr))
    }

    /// The raw registered PC, regardless of state. Used by trace output,
    /// which reports "where fetch currently is" even while a request is
    /// outstanding.
    #[must_use]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Advances the state machine by one cycle.
    ///
    /// `ready` is asserted by dispatch when it consumed this cycle's output
    /// (causing the PC to advance). `flush_pc`, when set, unconditionally
    /// overrides the PC and resets to `IDLE`, taking priority over normal
    /// advancement.
    pub fn tick(&mut self, imem: &InstructionMemory, ready: bool, flush_pc: Option<u32>) {
        if let Some(target) = flush_pc {
            self.pc = target;
            self.state = FetchState::Idle;
            return;
        }
        match self.state {
            FetchState::Idle => self.state = FetchState::Req,
            FetchState::Req => {
                let (rvalid, rdata) = imem.tick(true, self.pc);
                if rvalid {
                    self.instr = rdata;
                    self.state = FetchState::Have;
                }
            }
            FetchState::Have => {
                if ready {
                    self.pc = self.pc.wrapping_add(4);
                    self.state = FetchState::Req;
                }
            }
        }
    }
}
