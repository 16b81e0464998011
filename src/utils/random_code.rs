use rand::Rng;
use rand::distr::Alphanumeric;

/// Random alphanumeric string.
pub fn generate_random_code(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Password that satisfies the account password policy.
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    let upper = char::from(rng.random_range(b'A'..=b'Z'));
    let lower = char::from(rng.random_range(b'a'..=b'z'));
    let digit = char::from(rng.random_range(b'0'..=b'9'));
    format!("{upper}{lower}{digit}{}", generate_random_code(13))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_random_code_length() {
        let code = generate_random_code(12);
        assert_eq!(code.len(), 12);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_passwords_pass_policy() {
        for _ in 0..20 {
            assert!(validate_password(&generate_password()).is_valid);
        }
    }
}
