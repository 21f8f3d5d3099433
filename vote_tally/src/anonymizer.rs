use crate::config::*;

/// The longest code that can be cut out of a hex encoded SHA-256 digest.
pub const MAX_CODE_LENGTH: usize = 64;

/// Canonical form of an email address: no surrounding whitespace, lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn check_code_length(code_len: usize) -> Result<(), TallyError> {
    if code_len == 0 || code_len > MAX_CODE_LENGTH {
        return Err(TallyError::InvalidCodeLength(code_len));
    }
    Ok(())
}

/// Computes the voter code of an email.
///
/// The code is the prefix of length `code_len` of the hex encoded SHA-256 digest of
/// the salt followed by the normalized email. It only depends on the salt and on the
/// normalized email, so the same vote name always hands out the same codes.
///
/// ```
/// use vote_tally::anonymizer::compute_code;
///
/// let code = compute_code("fav-color", " Anna@Example.org ", 12)?;
/// assert_eq!(code, compute_code("fav-color", "anna@example.org", 12)?);
/// assert_eq!(code.as_str().len(), 12);
/// # Ok::<(), vote_tally::TallyError>(())
/// ```
pub fn compute_code(salt: &str, email: &str, code_len: usize) -> Result<VoterCode, TallyError> {
    check_code_length(code_len)?;
    let salted = format!("{}{}", salt, normalize_email(email));
    let hex = sha256::digest(salted);
    Ok(VoterCode(hex[..code_len].to_string()))
}

/// A well-formed code has the expected length and only contains hex digits.
pub fn is_well_formed(code: &VoterCode, code_len: usize) -> bool {
    code.0.len() == code_len && code.0.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_code() {
        let c1 = compute_code("salt", "bob@example.org", 12).unwrap();
        let c2 = compute_code("salt", "  BOB@example.ORG\n", 12).unwrap();
        assert_eq!(c1, c2);
        assert!(is_well_formed(&c1, 12));
    }

    #[test]
    fn salt_changes_code() {
        let c1 = compute_code("vote-1", "bob@example.org", 12).unwrap();
        let c2 = compute_code("vote-2", "bob@example.org", 12).unwrap();
        assert_ne!(c1, c2);
    }

    #[test]
    fn code_is_digest_prefix() {
        let full = compute_code("s", "a@b.c", 64).unwrap();
        let short = compute_code("s", "a@b.c", 8).unwrap();
        assert!(full.as_str().starts_with(short.as_str()));
        assert_eq!(full.as_str(), sha256::digest("sa@b.c".to_string()));
    }

    #[test]
    fn rejects_bad_lengths() {
        assert_eq!(
            compute_code("s", "a@b.c", 0),
            Err(TallyError::InvalidCodeLength(0))
        );
        assert_eq!(
            compute_code("s", "a@b.c", 65),
            Err(TallyError::InvalidCodeLength(65))
        );
    }

    #[test]
    fn well_formed_codes() {
        assert!(!is_well_formed(&VoterCode("".to_string()), 12));
        assert!(!is_well_formed(&VoterCode("zzzzzzzzzzzz".to_string()), 12));
        assert!(is_well_formed(&VoterCode("0123456789ab".to_string()), 12));
    }
}
