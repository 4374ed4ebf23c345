//! Expiry policy for cached aggregates.

use std::time::Duration;

use rand::Rng;

/// Base lifetime plus up to `jitter` extra, drawn per write so entries
/// written together do not expire together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    base: Duration,
    jitter: Duration,
}

impl CacheTtl {
    /// Lifetime of `base` extended by up to `jitter` per write.
    pub const fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// Fixed lifetime without jitter.
    pub const fn fixed(base: Duration) -> Self {
        Self::new(base, Duration::ZERO)
    }

    /// Shortest lifetime of any write.
    pub const fn base(&self) -> Duration {
        self.base
    }

    /// Largest extension added to [`Self::base`].
    pub const fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Lifetime for one write, in `base..=base + jitter` whole seconds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let extra = self.jitter.as_secs();
        if extra == 0 {
            return self.base;
        }
        self.base + Duration::from_secs(rng.gen_range(0..=extra))
    }
}

impl Default for CacheTtl {
    /// One hour with up to a minute of jitter.
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rstest::rstest;

    #[rstest]
    fn fixed_ttl_never_varies() {
        let ttl = CacheTtl::fixed(Duration::from_secs(60));
        let mut rng = SmallRng::seed_from_u64(7);
        assert!((0..32).all(|_| ttl.sample(&mut rng) == Duration::from_secs(60)));
    }

    #[rstest]
    fn default_is_an_hour_plus_a_minute_of_jitter() {
        let ttl = CacheTtl::default();
        assert_eq!(ttl.base(), Duration::from_secs(3600));
        assert_eq!(ttl.jitter(), Duration::from_secs(60));
    }

    #[rstest]
    fn jittered_ttl_stays_in_bounds() {
        let ttl = CacheTtl::new(Duration::from_secs(60), Duration::from_secs(10));
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..256 {
            let sample = ttl.sample(&mut rng);
            assert!(sample >= Duration::from_secs(60));
            assert!(sample <= Duration::from_secs(70));
        }
    }
}
