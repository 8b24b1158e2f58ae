// Cheap membership fingerprint over the selected entity set
use bevy::prelude::*;

/// Opaque value summarising selection membership. Independent of ordering.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SelectionFingerprint {
    count: u32,
    sum: u64,
    xor: u64,
}

impl SelectionFingerprint {
    pub fn of(entities: impl IntoIterator<Item = Entity>) -> Self {
        entities.into_iter().fold(Self::default(), |acc, entity| {
            let mixed = mix64(entity.to_bits());
            Self {
                count: acc.count.wrapping_add(1),
                sum: acc.sum.wrapping_add(mixed),
                xor: acc.xor ^ mixed.rotate_left(31),
            }
        })
    }
}

// splitmix64 finaliser, spreads sequential entity bits across the word
#[inline]
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Remembers the last observed fingerprint and reports membership changes
#[derive(Default, Debug)]
pub struct SelectionChangeDetector {
    last: Option<SelectionFingerprint>,
}

impl SelectionChangeDetector {
    /// Returns true on the first observation or when membership differs from last tick
    pub fn observe(&mut self, entities: impl IntoIterator<Item = Entity>) -> bool {
        let fingerprint = SelectionFingerprint::of(entities);
        let changed = self.last != Some(fingerprint);
        self.last = Some(fingerprint);
        changed
    }

    /// Forget the cached fingerprint so the next observation reports a change
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<SelectionFingerprint> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<Entity> {
        raw.iter().map(|&i| Entity::from_raw(i)).collect()
    }

    #[test]
    fn test_fingerprint_ignores_order() {
        assert_eq!(
            SelectionFingerprint::of(ids(&[1, 2, 3])),
            SelectionFingerprint::of(ids(&[3, 1, 2]))
        );
    }

    #[test]
    fn test_fingerprint_detects_membership() {
        let base = SelectionFingerprint::of(ids(&[1, 2, 3]));
        assert_ne!(base, SelectionFingerprint::of(ids(&[1, 2])));
        assert_ne!(base, SelectionFingerprint::of(ids(&[1, 2, 4])));
        assert_ne!(SelectionFingerprint::of(ids(&[])), SelectionFingerprint::of(ids(&[0])));
    }

    #[test]
    fn test_first_observation_is_a_change() {
        let mut detector = SelectionChangeDetector::default();
        assert!(detector.observe(ids(&[])));
        assert!(!detector.observe(ids(&[])));
    }

    #[test]
    fn test_reordering_is_not_a_change() {
        let mut detector = SelectionChangeDetector::default();
        detector.observe(ids(&[5, 6]));
        assert!(!detector.observe(ids(&[6, 5])));
        assert!(detector.observe(ids(&[6])));
    }

    #[test]
    fn test_invalidate_forces_change() {
        let mut detector = SelectionChangeDetector::default();
        detector.observe(ids(&[1]));
        detector.invalidate();
        assert!(detector.last().is_none());
        assert!(detector.observe(ids(&[1])));
    }
}
