//! Seeds for the external generator, taken from the wall clock.
//!
//! The generator's own default seed comes from `time(NULL)`, so two runs
//! started within the same second would produce identical samples.  We hand
//! it the current time in nanoseconds instead, and additionally never hand
//! out the same seed twice, even on a clock too coarse to tell two calls
//! apart.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of distinct seeds.
#[derive(Debug, Default)]
pub struct SeedClock {
    last: Option<u64>,
}

impl SeedClock {
    /// Create a seed clock.
    pub fn new() -> SeedClock {
        SeedClock { last: None }
    }

    /// The next seed: the current time in nanoseconds since the epoch,
    /// bumped if need be so that it exceeds every seed we have handed out.
    pub fn next_seed(&mut self) -> u64 {
        self.seed_at(now_nanos())
    }

    fn seed_at(&mut self, now: u64) -> u64 {
        let seed = match self.last {
            Some(last) if now <= last => last.wrapping_add(1),
            _ => now,
        };
        self.last = Some(seed);
        seed
    }
}

/// Nanoseconds since the unix epoch.  A clock set before 1970 gives zero,
/// which the bumping in `SeedClock` copes with.
pub fn now_nanos() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        // This fits in a u64 until the year 2554.
        Ok(d) => d.as_secs().wrapping_mul(1_000_000_000) + d.subsec_nanos() as u64,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_seeds_are_distinct() {
        let mut clock = SeedClock::new();
        let seeds: Vec<u64> = (0..1000).map(|_| clock.next_seed()).collect();
        for w in seeds.windows(2) {
            assert!(w[1] > w[0], "{} then {}", w[0], w[1]);
        }
    }

    #[test]
    fn frozen_clock_still_gives_distinct_seeds() {
        let mut clock = SeedClock::new();
        assert_eq!(clock.seed_at(1_000), 1_000);
        assert_eq!(clock.seed_at(1_000), 1_001);
        assert_eq!(clock.seed_at(999), 1_002);
        assert_eq!(clock.seed_at(5_000), 5_000);
    }

    #[test]
    fn seeds_have_nanosecond_resolution() {
        let mut clock = SeedClock::new();
        let a = clock.next_seed();
        let b = clock.next_seed();
        assert_ne!(a, b);
        assert!(a > 1_500_000_000 * 1_000_000_000, "seed {} is not in nanoseconds", a);
    }
}
