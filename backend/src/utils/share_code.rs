use rand::Rng;

use super::validators::SHARE_CODE_LENGTH;

/// Uppercase letters and digits without 0/O, 1/I/L
pub const SHARE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub fn generate_share_code() -> String {
    let mut rng = rand::thread_rng();
    (0..SHARE_CODE_LENGTH)
        .map(|_| SHARE_CODE_ALPHABET[rng.gen_range(0..SHARE_CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validators::is_valid_share_code;

    #[test]
    fn test_alphabet_has_no_ambiguous_glyphs() {
        assert_eq!(SHARE_CODE_ALPHABET.len(), 31);
        for ambiguous in b"0O1IL" {
            assert!(!SHARE_CODE_ALPHABET.contains(ambiguous));
        }
    }

    #[test]
    fn test_generated_codes_validate() {
        for _ in 0..200 {
            let code = generate_share_code();
            assert!(is_valid_share_code(&code), "generated invalid code {}", code);
        }
    }
}
