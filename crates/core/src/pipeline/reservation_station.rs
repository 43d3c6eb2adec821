//! Reservation stations: per-functional-unit queues of waiting instructions.

use crate::common::constants::RS_DEPTH;
use crate::pipeline::rename::RenamePacket;

/// Computes whether a waiting entry's operands are both ready, honoring
/// which operands the underlying decode packet actually uses.
fn issue_ready(entry: &RenamePacket) -> bool {
    let d = &entry.decode;
    (!d.rs1_used || entry.prs1_ready) && (!d.rs2_used || entry.prs2_ready)
}

/// An insertion-ordered queue of up to [`RS_DEPTH`] waiting instructions.
///
/// Insertion order doubles as age order: the oldest entry is always at the
/// front, so "oldest-in-queue" issue selection is a front-to-back scan, and
/// the LSU's "oldest entry only" restriction is simply "front entry only".
#[derive(Clone, Debug, Default)]
pub struct ReservationStation {
    entries: Vec<RenamePacket>,
}

impl ReservationStation {
    /// Whether this queue has no free slot for a new entry.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= RS_DEPTH
    }

    /// Pushes a freshly dispatched instruction onto the back of the queue.
    ///
    /// Panics if the queue is full; callers must check [`Self::is_full`]
    /// before dispatch.
    pub fn push(&mut self, entry: RenamePacket) {
        assert!(!self.is_full(), "dispatch into a full reservation station");
        self.entries.push(entry);
    }

    /// Updates operand-ready bits for every waiting entry whose `prs1` or
    /// `prs2` matches the broadcast `prd` from a writeback bus beat.
    /// `prd == 0` never wakes anything: register 0 is always ready and no
    /// entry should be waiting on it in the first place.
    pub fn wakeup(&mut self, prd: u8) {
        if prd == 0 {
            return;
        }
        for entry in &mut self.entries {
            if entry.prs1 == prd {
                entry.prs1_ready = true;
            }
            if entry.prs2 == prd {
                entry.prs2_ready = true;
            }
        }
    }

    /// Selects and removes the oldest ready entry, scanning the whole
    /// queue front-to-back. Used by the ALU and BRU reservation stations.
    pub fn issue_any_ready(&mut self) -> Option<RenamePacket> {
        let idx = self.entries.iter().position(issue_ready)?;
        Some(self.entries.remove(idx))
    }

    /// Selects and removes the front entry only if it is both ready and
    /// equal to `rob_head_tag`. Used by the LSU reservation station: a
    /// load/store writes (or reads) memory directly at execute time with no
    /// rollback on a later mispredict, so it must not issue until it is the
    /// oldest in-flight instruction of any kind, not merely the oldest
    /// waiting load/store.
    pub fn issue_front_if_ready_at_head(&mut self, rob_head_tag: u8) -> Option<RenamePacket> {
        let ready_at_head = self
            .entries
            .first()
            .is_some_and(|entry| issue_ready(entry) && entry.rob_tag == rob_head_tag);
        if ready_at_head {
            Some(self.entries.remove(0))
        } else {
            None
        }
    }

    /// Removes every entry, used by recovery (the specified "clear all RS
    /// slots" policy, see design notes).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current occupancy, for stats/testing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invokes `f` on every waiting entry. Used by invariant checks.
    pub fn for_each(&self, mut f: impl FnMut(&RenamePacket)) {
        for entry in &self.entries {
            f(entry);
        }
    }
}
