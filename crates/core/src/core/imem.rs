//! Instruction memory: a word-indexed ROM with a one-cycle request/response
//! contract, matching the fetch stage's `REQ` → `HAVE` state machine.

use crate::common::constants::{IMEM_WORDS, NOP_INSTR};

/// Word-addressed instruction ROM.
///
/// Reads are combinational within a cycle (`tick` returns a response in the
/// same call it receives a request); the one-cycle latency observed by fetch
/// comes from fetch only consuming the response on the *next* tick, per the
/// pipeline's registered-output discipline.
#[derive(Clone, Debug)]
pub struct InstructionMemory {
    words: Vec<u32>,
}

impl Default for InstructionMemory {
    fn default() -> Self {
        Self {
            words: vec![NOP_INSTR; IMEM_WORDS],
        }
    }
}

impl InstructionMemory {
    /// Capacity of this memory, in words.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Loads `words` starting at word address 0, filling the remainder with
    /// [`NOP_INSTR`]. Panics if `words` exceeds capacity; callers are
    /// expected to have validated this against [`ImageError::TooLarge`]
    /// before reaching this point.
    ///
    /// [`ImageError::TooLarge`]: crate::common::error::ImageError::TooLarge
    pub fn load(&mut self, words: &[u32]) {
        assert!(
            words.len() <= self.words.len(),
            "image of {} words exceeds instruction memory capacity of {}",
            words.len(),
            self.words.len()
        );
        self.words.fill(NOP_INSTR);
        self.words[..words.len()].copy_from_slice(words);
    }

    /// Services one request. When `en` is asserted, returns `(rvalid=true,
    /// rdata)` for the word at `addr / 4`. Out-of-range addresses read as
    /// [`NOP_INSTR`].
    #[must_use]
    pub fn tick(&self, en: bool, addr: u32) -> (bool, u32) {
        if !en {
            return (false, 0);
        }
        let idx = (addr / 4) as usize;
        let rdata = self.words.get(idx).copied().unwrap_or(NOP_INSTR);
        (true, rdata)
    }
}
