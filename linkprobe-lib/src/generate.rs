//! Random subdomain generation.
//!
//! Subdomains are lowercase ASCII letters with a length drawn uniformly from
//! `MIN_SUBDOMAIN_LEN..=MAX_SUBDOMAIN_LEN`. `generate_subdomain` uses the
//! thread-local RNG, so concurrent callers never contend on a shared source.
//!
//! ```
//! use linkprobe_lib::generate::{generate_subdomain, MAX_SUBDOMAIN_LEN, MIN_SUBDOMAIN_LEN};
//!
//! let name = generate_subdomain();
//! assert!((MIN_SUBDOMAIN_LEN..=MAX_SUBDOMAIN_LEN).contains(&name.len()));
//! assert!(name.bytes().all(|b| b.is_ascii_lowercase()));
//! ```

use rand::Rng;

/// Shortest subdomain produced.
pub const MIN_SUBDOMAIN_LEN: usize = 5;

/// Longest subdomain produced.
pub const MAX_SUBDOMAIN_LEN: usize = 10;

/// Generate one random subdomain using the thread-local RNG.
pub fn generate_subdomain() -> String {
    generate_with(&mut rand::thread_rng())
}

/// Generate one random subdomain from the given RNG.
///
/// Each letter is drawn independently, so a seeded RNG yields a
/// reproducible sequence.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(MIN_SUBDOMAIN_LEN..=MAX_SUBDOMAIN_LEN);
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Generate `count` subdomains.
pub fn generate_batch(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| generate_with(&mut rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn is_valid(name: &str) -> bool {
        (MIN_SUBDOMAIN_LEN..=MAX_SUBDOMAIN_LEN).contains(&name.len())
            && name.chars().all(|c| c.is_ascii_lowercase())
    }

    #[test]
    fn test_generated_names_are_valid() {
        for _ in 0..2_000 {
            let name = generate_subdomain();
            assert!(is_valid(&name), "invalid subdomain: {:?}", name);
        }
    }

    #[test]
    fn test_every_length_is_reachable() {
        let mut rng = StdRng::seed_from_u64(7);
        let lengths: HashSet<usize> = (0..2_000).map(|_| generate_with(&mut rng).len()).collect();
        let expected: HashSet<usize> = (MIN_SUBDOMAIN_LEN..=MAX_SUBDOMAIN_LEN).collect();
        assert_eq!(lengths, expected);
    }

    #[test]
    fn test_alphabet_is_covered() {
        let mut rng = StdRng::seed_from_u64(11);
        let letters: HashSet<char> = (0..2_000)
            .flat_map(|_| generate_with(&mut rng).chars().collect::<Vec<_>>())
            .collect();
        assert_eq!(letters.len(), 26);
        assert!(letters.contains(&'a'));
        assert!(letters.contains(&'z'));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(generate_with(&mut first), generate_with(&mut second));
        }
    }

    #[test]
    fn test_generate_batch() {
        let batch = generate_batch(25);
        assert_eq!(batch.len(), 25);
        assert!(batch.iter().all(|name| is_valid(name)));
        assert!(generate_batch(0).is_empty());
    }

    #[test]
    fn test_concurrent_generation() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| generate_batch(200)))
            .collect();

        for handle in handles {
            let batch = handle.join().unwrap();
            assert!(batch.iter().all(|name| is_valid(name)));
        }
    }
}
