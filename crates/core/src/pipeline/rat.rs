//! Map table (register alias table): architectural-to-physical register mapping.

use crate::common::constants::N_AREG;

/// The architectural-to-physical register map.
///
/// `rat[0]` always reads as physical register 0; writes to architectural
/// register 0 are no-ops.
#[derive(Clone, Copy, Debug)]
pub struct Rat {
    map: [u8; N_AREG],
}

impl Default for Rat {
    fn default() -> Self {
        let mut map = [0u8; N_AREG];
        for (areg, preg) in map.iter_mut().enumerate() {
            *preg = areg as u8;
        }
        Self { map }
    }
}

impl Rat {
    /// Returns the physical register currently mapped to `areg`.
    #[must_use]
    pub fn lookup_src(&self, areg: u8) -> u8 {
        self.map[areg as usize]
    }

    /// Returns the mapping that a write to `areg` would displace. Identical
    /// to [`Self::lookup_src`] at the instant of rename; kept as a separate
    /// name to mirror the two distinct roles a renamer reads them in.
    #[must_use]
    pub fn lookup_old(&self, areg: u8) -> u8 {
        self.lookup_src(areg)
    }

    /// Installs a new mapping for `areg`. A no-op for `areg == 0`.
    pub fn update(&mut self, areg: u8, preg: u8) {
        if areg != 0 {
            self.map[areg as usize] = preg;
        }
    }

    /// Snapshot of the full map, taken by the checkpoint stack.
    #[must_use]
    pub fn snapshot(&self) -> [u8; N_AREG] {
        self.map
    }

    /// Restores the map from a prior snapshot.
    pub fn restore(&mut self, snapshot: [u8; N_AREG]) {
        self.map = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mapping_at_reset() {
        let rat = Rat::default();
        for areg in 0..N_AREG as u8 {
            assert_eq!(rat.lookup_src(areg), areg);
        }
    }

    #[test]
    fn update_zero_is_a_no_op() {
        let mut rat = Rat::default();
        rat.update(0, 99);
        assert_eq!(rat.lookup_src(0), 0);
    }

    #[test]
    fn update_then_lookup_old_returns_prior_mapping() {
        let mut rat = Rat::default();
        let old = rat.lookup_old(5);
        rat.update(5, 40);
        assert_eq!(old, 5);
        assert_eq!(rat.lookup_src(5), 40);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut rat = Rat::default();
        let snap = rat.snapshot();
        rat.update(3, 50);
        rat.restore(snap);
        assert_eq!(rat.lookup_src(3), 3);
    }
}
