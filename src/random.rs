use ::rand as external_rand;
use external_rand::Rng;

/// Source of uniform random numbers threaded through the forest.
pub trait RandomSource {
    /// Uniform draw from `[min, max)`. An empty range yields `min`.
    fn uniform(&mut self, min: f32, max: f32) -> f32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.gen_range(min..max)
    }
}

/// Always answers the middle of the requested range.
#[cfg(test)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Midpoint;

#[cfg(test)]
impl RandomSource for Midpoint {
    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        (min + max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use external_rand::rngs::StdRng;
    use external_rand::SeedableRng;

    #[test]
    fn rng_draws_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = rng.uniform(5.0, 10.0);
            assert!((5.0..10.0).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn empty_range_returns_min() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(rng.uniform(3.0, 3.0), 3.0);
        assert_eq!(rng.uniform(4.0, 2.0), 4.0);
    }

    #[test]
    fn midpoint_is_centered() {
        let mut mid = Midpoint;
        assert_eq!(mid.uniform(-1.0, 1.0), 0.0);
        assert_eq!(mid.uniform(5.0, 10.0), 7.5);
    }
}
