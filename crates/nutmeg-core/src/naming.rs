//! Generated names for plots without a recognizable analysis kind

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Length of a generated fallback name
pub const FALLBACK_NAME_LEN: usize = 5;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Source of analysis-kind names for plots that carry none
pub trait FallbackNamer: Send + Sync {
    fn next_fallback_name(&self) -> String;
}

fn sample_letters<R: Rng + ?Sized>(rng: &mut R) -> String {
    LETTERS
        .choose_multiple(rng, FALLBACK_NAME_LEN)
        .map(|&c| c as char)
        .collect()
}

/// Five distinct ASCII letters from the thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNamer;

impl FallbackNamer for RandomNamer {
    fn next_fallback_name(&self) -> String {
        sample_letters(&mut rand::thread_rng())
    }
}

/// Reproducible namer for tests and deterministic pipelines
pub struct SeededNamer {
    inner: Mutex<StdRng>,
}

impl SeededNamer {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl FallbackNamer for SeededNamer {
    fn next_fallback_name(&self) -> String {
        // a poisoned lock still holds a usable generator
        let mut rng = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        sample_letters(&mut *rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_names_are_alphabetic() {
        let namer = RandomNamer;
        for _ in 0..20 {
            let name = namer.next_fallback_name();
            assert_eq!(name.len(), FALLBACK_NAME_LEN);
            assert!(name.chars().all(|c| c.is_ascii_alphabetic()), "{name}");
            let distinct: HashSet<char> = name.chars().collect();
            assert_eq!(distinct.len(), FALLBACK_NAME_LEN);
        }
    }

    #[test]
    fn test_random_names_vary() {
        let namer = RandomNamer;
        let names: HashSet<String> = (0..10).map(|_| namer.next_fallback_name()).collect();
        assert!(names.len() > 1);
    }

    #[test]
    fn test_seeded_namer_is_reproducible() {
        let a = SeededNamer::new(42);
        let b = SeededNamer::new(42);
        let first: Vec<String> = (0..3).map(|_| a.next_fallback_name()).collect();
        let second: Vec<String> = (0..3).map(|_| b.next_fallback_name()).collect();
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }
}
