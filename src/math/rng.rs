//! Injectable random sources for procedural generation.
//!
//! Generation never touches a global RNG. Callers thread a [`RandomSource`]
//! through every recursive call, so a seeded [`SimpleRng`] reproduces a tree
//! exactly and a [`SequenceRng`] pins every draw in tests.

/// Uniform `[0, 1)` random source.
pub trait RandomSource {
    /// Next value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Integer in `0..variance` (always 0 when `variance` is 0).
    fn random_int(&mut self, variance: u32) -> u32 {
        if variance == 0 {
            // Still consume a draw so the sequence layout does not depend on the value
            self.next_f32();
            return 0;
        }
        let v = (self.next_f32() * variance as f32).floor() as u32;
        v.min(variance - 1)
    }

    /// `(next - 0.5) * spread`, i.e. uniform in `[-spread/2, spread/2)`.
    fn centered(&mut self, spread: f32) -> f32 {
        (self.next_f32() - 0.5) * spread
    }

    /// Uniform angle in `[0, 2π)`.
    fn angle(&mut self) -> f32 {
        self.next_f32() * std::f32::consts::TAU
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}

/// Simple deterministic RNG using hash function
#[derive(Clone, Debug)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.wrapping_add(1) }
    }

    /// Restart the stream from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Advance state and return next u32
    pub fn next_u32(&mut self) -> u32 {
        // PCG-like state update
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        // Output function
        let mut h = (self.state >> 32) as u32;
        h = h.wrapping_mul(0x45d9f3b);
        h ^= h >> 16;
        h = h.wrapping_mul(0x45d9f3b);
        h ^= h >> 16;
        h
    }
}

impl RandomSource for SimpleRng {
    fn next_f32(&mut self) -> f32 {
        // 24 mantissa bits keep the result strictly below 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Replays a fixed list of values, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct SequenceRng {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRng {
    /// Panics on an empty list; there is nothing sensible to replay.
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let values = values.into();
        assert!(!values.is_empty(), "SequenceRng needs at least one value");
        Self { values, cursor: 0 }
    }

    /// Source that returns the same value forever.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Total number of draws served so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRng {
    fn next_f32(&mut self) -> f32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_rng_is_deterministic() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_simple_rng_seeds_differ() {
        let mut a = SimpleRng::new(1);
        let mut b = SimpleRng::new(2);
        let same = (0..16).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 16);
    }

    #[test]
    fn test_next_f32_in_unit_range() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_reseed_restarts_stream() {
        let mut rng = SimpleRng::new(9);
        let first: Vec<u32> = (0..4).map(|_| rng.next_u32()).collect();
        rng.reseed(9);
        let again: Vec<u32> = (0..4).map(|_| rng.next_u32()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_random_int_zero_variance() {
        let mut rng = SequenceRng::constant(0.99);
        assert_eq!(rng.random_int(0), 0);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn test_random_int_is_half_open() {
        let mut rng = SequenceRng::new(vec![0.0, 0.49, 0.5, 0.999_999]);
        assert_eq!(rng.random_int(2), 0);
        assert_eq!(rng.random_int(2), 0);
        assert_eq!(rng.random_int(2), 1);
        assert_eq!(rng.random_int(2), 1);
    }

    #[test]
    fn test_centered_and_angle() {
        let mut rng = SequenceRng::new(vec![0.5, 0.0, 0.25]);
        assert_eq!(rng.centered(4.0), 0.0);
        assert_eq!(rng.centered(4.0), -2.0);
        assert!((rng.angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_sequence_wraps() {
        let mut rng = SequenceRng::new(vec![0.1, 0.2]);
        assert_eq!(rng.next_f32(), 0.1);
        assert_eq!(rng.next_f32(), 0.2);
        assert_eq!(rng.next_f32(), 0.1);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn draw<R: RandomSource>(mut source: R) -> f32 {
            source.next_f32()
        }
        let mut rng = SequenceRng::constant(0.3);
        assert_eq!(draw(&mut rng), 0.3);
        assert_eq!(draw(&mut rng), 0.3);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    #[should_panic]
    fn test_sequence_rejects_empty() {
        let _ = SequenceRng::new(Vec::new());
    }
}
