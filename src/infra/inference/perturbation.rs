use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::app::ports::{Nudge, PerturbationSource};

fn pick<R: Rng>(rng: &mut R) -> Nudge {
    Nudge::ALL[rng.gen_range(0..Nudge::ALL.len())]
}

/// Fresh draws from the thread-local generator
#[derive(Debug, Default, Clone)]
pub struct ThreadRngPerturbation;

impl PerturbationSource for ThreadRngPerturbation {
    fn draw(&self) -> Nudge {
        pick(&mut rand::thread_rng())
    }
}

/// Reproducible draws from a seeded generator
#[derive(Debug)]
pub struct SeededPerturbation {
    rng: Mutex<StdRng>,
}

impl SeededPerturbation {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl PerturbationSource for SeededPerturbation {
    fn draw(&self) -> Nudge {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pick(&mut *rng)
    }
}
