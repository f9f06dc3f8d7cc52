//! Payment reference generation.
//!
//! References are human-visible order identifiers, not secrets: the
//! generator uses the thread-local RNG and makes no security claims.

use rand::Rng;

/// Prefix the harness puts in front of generated payment references.
pub const PAYMENT_REFERENCE_PREFIX: &str = "REF-";

/// Length of the random part of a payment reference.
pub const PAYMENT_REFERENCE_LENGTH: usize = 6;

/// Characters a reference is drawn from.
pub const REFERENCE_CHARSET: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generates `length` characters drawn uniformly from [`REFERENCE_CHARSET`].
pub fn generate(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..REFERENCE_CHARSET.len());
            REFERENCE_CHARSET[idx] as char
        })
        .collect()
}

/// Generates a payment reference such as `REF-a8Xk2Q`.
pub fn payment_reference() -> String {
    format!(
        "{}{}",
        PAYMENT_REFERENCE_PREFIX,
        generate(PAYMENT_REFERENCE_LENGTH)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_length_and_charset() {
        for length in [0, 1, 6, 32] {
            let reference = generate(length);
            assert_eq!(reference.len(), length);
            assert!(reference.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_payment_reference_format() {
        let reference = payment_reference();
        assert!(reference.starts_with("REF-"));
        assert_eq!(reference.len(), 4 + PAYMENT_REFERENCE_LENGTH);
        assert!(reference[4..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_uniqueness() {
        let references: Vec<String> = (0..1000).map(|_| generate(6)).collect();

        // 62^6 possible values; collisions in 1000 draws are vanishingly rare.
        let unique_count = references.iter().collect::<HashSet<_>>().len();
        assert!(unique_count > 990);
    }

    #[test]
    fn test_every_character_is_reachable() {
        let mut seen: HashMap<char, usize> = HashMap::new();
        for c in generate(20_000).chars() {
            *seen.entry(c).or_default() += 1;
        }

        // 20000 draws over 62 symbols: each is expected ~322 times.
        assert_eq!(seen.len(), 62);
        assert!(seen.values().all(|&count| count > 150));
    }
}
