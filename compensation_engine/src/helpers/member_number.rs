//! Member number generation.

use rand::Rng;

/// Fixed prefix of every member number.
pub const MEMBER_NUMBER_PREFIX: &str = "90";

/// Number of random digits following the prefix.
pub const MEMBER_NUMBER_SUFFIX_DIGITS: u32 = 7;

/// Generates a candidate member number: the fixed 2-digit prefix followed by 7 random digits.
/// Uniqueness is the caller's concern; candidates are regenerated on collision.
pub fn random_member_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: u32 = rng.gen_range(0..10u32.pow(MEMBER_NUMBER_SUFFIX_DIGITS));
    format!("{MEMBER_NUMBER_PREFIX}{suffix:07}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn member_numbers_are_nine_digits_with_prefix() {
        for _ in 0..100 {
            let number = random_member_number();
            assert_eq!(number.len(), 9);
            assert!(number.starts_with(MEMBER_NUMBER_PREFIX));
            assert!(number.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
