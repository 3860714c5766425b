use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub struct SimpleSamplers;
impl SimpleSamplers {
    pub fn uniform_samples(bounds: &Vec<(f64, f64)>, seed: Option<u64>) -> Vec<f64> {
        return match seed {
            None => {
                let mut rng = rand::thread_rng();
                Self::uniform_samples_with_rng(bounds, &mut rng)
            }
            Some(seed) => {
                let mut rng = ChaCha20Rng::seed_from_u64(seed);
                Self::uniform_samples_with_rng(bounds, &mut rng)
            }
        }
    }
    pub fn uniform_samples_with_rng<R: Rng>(bounds: &Vec<(f64, f64)>, rng: &mut R) -> Vec<f64> {
        let mut out_vec = vec![];
        for b in bounds {
            if b.0 == b.1 {
                out_vec.push(b.0);
            } else {
                out_vec.push(rng.gen_range(b.0..b.1));
            }
        }
        out_vec
    }
    /// A reproducible random number generator for the given seed.
    pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
        return ChaCha20Rng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_samples_are_reproducible_and_bounded() {
        let bounds = vec![(-1.0, 1.0), (0.5, 0.5), (2.0, 3.0)];
        let a = SimpleSamplers::uniform_samples(&bounds, Some(7));
        let b = SimpleSamplers::uniform_samples(&bounds, Some(7));
        assert_eq!(a, b);
        assert_eq!(a[1], 0.5);
        assert!(a[0] >= -1.0 && a[0] < 1.0);
        assert!(a[2] >= 2.0 && a[2] < 3.0);
    }
}
