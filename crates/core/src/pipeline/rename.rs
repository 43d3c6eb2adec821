//! Rename: looks up operand sources, allocates a destination, and produces
//! a [`RenamePacket`] ready for dispatch.

use crate::pipeline::decode::DecodePacket;

/// A decode packet augmented with physical register assignments.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenamePacket {
    /// The decode packet this rename is built from.
    pub decode: DecodePacket,
    /// Physical register backing `decode.rs1`.
    pub prs1: u8,
    /// Physical register backing `decode.rs2`.
    pub prs2: u8,
    /// Newly allocated physical destination register, or 0 if `rd` is unused.
    pub prd: u8,
    /// Whether `prs1`'s value is ready (from the PRF, including this
    /// cycle's writeback bus).
    pub prs1_ready: bool,
    /// Whether `prs2`'s value is ready.
    pub prs2_ready: bool,
    /// Physical register `prd` displaces in the RAT; released to the free
    /// list when this instruction commits.
    pub old_prd: u8,
    /// ROB tag allocated to this instruction.
    pub rob_tag: u8,
}
