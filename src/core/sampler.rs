//! Display-set sampling.
//!
//! Owns the policy for which subset of the source collection is on screen:
//! shuffle the full list, take up to `capacity`, pad the remainder with
//! synthesized filler. The output always has exactly `capacity` cards and is
//! rebuilt wholesale on every call; nothing is mutated in place.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::card::{CardModel, PALETTE};

/// Default number of cards in a display set.
pub const DISPLAY_CAPACITY: usize = 30;

/// Samples bounded display sets from the source collection.
///
/// The random source is owned so tests can seed it; filler ids are handed
/// out from a strictly decreasing counter, fresh on every call, since
/// filler carries no identity across resamples.
pub struct DisplaySampler {
    rng: StdRng,
    next_filler_id: i64,
}

impl DisplaySampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            next_filler_id: -1,
        }
    }

    /// Deterministic sampler for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_filler_id: -1,
        }
    }

    /// Build a fresh display set of exactly `capacity` cards.
    ///
    /// Every permutation of the source is equally likely. Real cards keep
    /// their content but are re-colored by display position; filler pads the
    /// tail with indices continuing where the real cards stopped.
    /// `capacity == 0` yields an empty set (degenerate input, tolerated).
    pub fn sample(&mut self, source: &[CardModel], capacity: usize) -> Vec<CardModel> {
        if capacity == 0 {
            return Vec::new();
        }

        let mut shuffled: Vec<CardModel> = source.to_vec();
        shuffled.shuffle(&mut self.rng);

        let taken = shuffled.len().min(capacity);
        let mut out: Vec<CardModel> = Vec::with_capacity(capacity);
        for (pos, mut card) in shuffled.into_iter().take(taken).enumerate() {
            card.palette_index = pos % PALETTE.len();
            out.push(card);
        }
        for index in taken..capacity {
            out.push(CardModel::filler(index, self.alloc_filler_id()));
        }
        out
    }

    fn alloc_filler_id(&mut self) -> i64 {
        let id = self.next_filler_id;
        self.next_filler_id -= 1;
        id
    }
}

impl Default for DisplaySampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::{DiaryEntry, ImageSource};
    use std::collections::HashSet;

    fn source(n: usize) -> Vec<CardModel> {
        (0..n)
            .map(|i| {
                CardModel::from_entry(&DiaryEntry {
                    id: i as i64 + 1,
                    title: format!("Entry {i}"),
                    date: "2025-01-01".to_string(),
                    location_name: None,
                    content: String::new(),
                    weather: None,
                    image_urls: Some(vec![format!("{i}.jpg")]),
                    images: None,
                })
            })
            .collect()
    }

    #[test]
    fn test_empty_source_is_all_filler() {
        let mut sampler = DisplaySampler::with_seed(1);
        let set = sampler.sample(&[], 30);
        assert_eq!(set.len(), 30);
        assert!(set.iter().all(|c| c.is_placeholder && c.id < 0));
        let ids: HashSet<i64> = set.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 30);
        // Filler indices continue 0..capacity
        assert_eq!(set[0].image, ImageSource::Synthesized(0));
        assert_eq!(set[29].image, ImageSource::Synthesized(29));
    }

    #[test]
    fn test_short_source_pads_to_capacity() {
        let mut sampler = DisplaySampler::with_seed(2);
        let set = sampler.sample(&source(3), 30);
        assert_eq!(set.len(), 30);
        assert_eq!(set.iter().filter(|c| !c.is_placeholder).count(), 3);
        assert_eq!(set.iter().filter(|c| c.is_placeholder).count(), 27);
        // Filler indices pick up after the real cards.
        assert_eq!(set[3].image, ImageSource::Synthesized(3));
    }

    #[test]
    fn test_oversized_source_downsamples_without_repeats() {
        let src = source(50);
        let src_ids: HashSet<i64> = src.iter().map(|c| c.id).collect();
        let mut sampler = DisplaySampler::with_seed(3);
        let set = sampler.sample(&src, 30);
        assert_eq!(set.len(), 30);
        assert!(set.iter().all(|c| !c.is_placeholder));
        let ids: HashSet<i64> = set.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 30);
        assert!(ids.iter().all(|id| src_ids.contains(id)));
    }

    #[test]
    fn test_consecutive_samples_differ() {
        let src = source(50);
        let mut sampler = DisplaySampler::with_seed(4);
        let first: Vec<i64> = sampler.sample(&src, 30).iter().map(|c| c.id).collect();
        let differed = (0..20).any(|_| {
            let ids: Vec<i64> = sampler.sample(&src, 30).iter().map(|c| c.id).collect();
            ids != first
        });
        assert!(differed, "20 consecutive resamples never changed the subset");
    }

    #[test]
    fn test_palette_follows_position() {
        let mut sampler = DisplaySampler::with_seed(5);
        let set = sampler.sample(&source(40), 30);
        for (pos, card) in set.iter().enumerate() {
            assert_eq!(card.palette_index, pos % PALETTE.len());
        }
    }

    #[test]
    fn test_filler_ids_fresh_across_calls() {
        let mut sampler = DisplaySampler::with_seed(6);
        let a: Vec<i64> = sampler.sample(&[], 5).iter().map(|c| c.id).collect();
        let b: Vec<i64> = sampler.sample(&[], 5).iter().map(|c| c.id).collect();
        let overlap: HashSet<i64> = a.iter().filter(|id| b.contains(id)).cloned().collect();
        assert!(overlap.is_empty(), "filler ids reused across resamples: {overlap:?}");
        // Strictly decreasing allocation.
        let a_min = *a.iter().min().unwrap();
        assert!(b.iter().all(|id| *id < a_min));
    }

    #[test]
    fn test_zero_capacity_is_empty() {
        let mut sampler = DisplaySampler::with_seed(7);
        assert!(sampler.sample(&source(10), 0).is_empty());
    }
}
