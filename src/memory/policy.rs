use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{frame::FrameStore, FrameIndex};
use crate::config::PolicyKind;

/// Chooses which occupied frame to reclaim when memory is full.
///
/// Cursor state belongs to the instance, so independent simulations never share it.
/// Callers must only ask for a victim once every frame is occupied.
#[derive(Debug)]
pub enum ReplacementPolicy {
    /// Round robin over frame indices, blind to accesses
    Fifo { cursor: FrameIndex },
    /// Oldest `last_access`, lowest index on ties
    Lru,
    Random(StdRng),
    /// Second chance: skip and clear referenced frames until an unreferenced one turns up
    Clock { hand: FrameIndex },
}

impl ReplacementPolicy {
    pub fn new(kind: PolicyKind, seed: Option<u64>) -> Self {
        match kind {
            PolicyKind::Fifo => ReplacementPolicy::Fifo { cursor: 0 },
            PolicyKind::Lru => ReplacementPolicy::Lru,
            PolicyKind::Random => {
                let rng = match seed {
                    Some(s) => StdRng::seed_from_u64(s),
                    None => StdRng::from_entropy(),
                };
                ReplacementPolicy::Random(rng)
            }
            PolicyKind::Clock => ReplacementPolicy::Clock { hand: 0 },
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            ReplacementPolicy::Fifo { .. } => PolicyKind::Fifo,
            ReplacementPolicy::Lru => PolicyKind::Lru,
            ReplacementPolicy::Random(_) => PolicyKind::Random,
            ReplacementPolicy::Clock { .. } => PolicyKind::Clock,
        }
    }

    pub fn select_victim(&mut self, frames: &mut FrameStore) -> FrameIndex {
        debug_assert!(!frames.is_empty() && frames.is_full());
        let count = frames.len();

        match self {
            ReplacementPolicy::Fifo { cursor } => {
                let victim = *cursor;
                *cursor = (*cursor + 1) % count;
                victim
            }
            ReplacementPolicy::Lru => {
                // min_by_key keeps the first minimum, so ties go to the lowest index
                frames
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, frame)| frame.last_access)
                    .map(|(idx, _)| idx)
                    .unwrap_or(0)
            }
            ReplacementPolicy::Random(rng) => rng.gen_range(0..count),
            ReplacementPolicy::Clock { hand } => loop {
                let victim = *hand;
                *hand = (*hand + 1) % count;
                if !frames.get(victim).referenced {
                    break victim;
                }
                frames.clear_reference(victim);
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// A full store where frame i holds page i, loaded at time i + 1
    fn full_store(count: usize) -> FrameStore {
        let mut store = FrameStore::new(count);
        for i in 0..count {
            store.load(i, i as u32, i as u64 + 1, false);
        }
        store
    }

    #[test]
    fn fifo_cycles_regardless_of_use() {
        let mut store = full_store(3);
        let mut policy = ReplacementPolicy::new(PolicyKind::Fifo, None);
        store.touch(0, 10, false);
        let victims: Vec<_> = (0..5).map(|_| policy.select_victim(&mut store)).collect();
        assert_eq!(victims, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn lru_picks_oldest() {
        let mut store = full_store(3);
        let mut policy = ReplacementPolicy::new(PolicyKind::Lru, None);
        assert_eq!(policy.select_victim(&mut store), 0);

        store.touch(0, 10, false);
        assert_eq!(policy.select_victim(&mut store), 1);
        store.touch(1, 11, false);
        assert_eq!(policy.select_victim(&mut store), 2);
    }

    #[test]
    fn lru_tie_goes_to_lowest_index() {
        let mut store = FrameStore::new(3);
        for i in 0..3 {
            store.load(i, i as u32, 7, false);
        }
        let mut policy = ReplacementPolicy::new(PolicyKind::Lru, None);
        assert_eq!(policy.select_victim(&mut store), 0);
    }

    #[test]
    fn clock_gives_second_chances() {
        let mut store = full_store(3);
        let mut policy = ReplacementPolicy::new(PolicyKind::Clock, None);

        // everything referenced: one sweep clears all bits, then frame 0 goes
        assert_eq!(policy.select_victim(&mut store), 0);
        assert!(store.iter().all(|f| !f.referenced));

        // frame 1 gets used again and survives the next pass
        store.touch(1, 10, false);
        assert_eq!(policy.select_victim(&mut store), 2);
        assert!(!store.get(1).referenced);
        assert_eq!(policy.select_victim(&mut store), 0);
        assert_eq!(policy.select_victim(&mut store), 1);
    }

    #[test]
    fn random_stays_in_range_and_is_reproducible() {
        let mut store = full_store(5);
        let mut a = ReplacementPolicy::new(PolicyKind::Random, Some(42));
        let mut b = ReplacementPolicy::new(PolicyKind::Random, Some(42));
        for _ in 0..100 {
            let victim = a.select_victim(&mut store);
            assert!(victim < 5);
            assert_eq!(victim, b.select_victim(&mut store));
        }
        assert_eq!(a.kind(), PolicyKind::Random);
    }
}
