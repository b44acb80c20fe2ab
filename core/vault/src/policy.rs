//! Master password policy.
//!
//! Enforced upstream of the crypto layers: key derivation itself accepts any
//! string.

use vaultpass_common::{Error, Result};

/// Minimum master password length.
pub const MIN_MASTER_PASSWORD_LEN: usize = 6;

/// Maximum master password length.
pub const MAX_MASTER_PASSWORD_LEN: usize = 100;

/// Validate a master password against the length policy.
///
/// # Errors
/// - Returns error if the password is shorter than
///   [`MIN_MASTER_PASSWORD_LEN`] or longer than [`MAX_MASTER_PASSWORD_LEN`]
pub fn validate_master_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < MIN_MASTER_PASSWORD_LEN {
        return Err(Error::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_MASTER_PASSWORD_LEN
        )));
    }
    if len > MAX_MASTER_PASSWORD_LEN {
        return Err(Error::InvalidInput(format!(
            "Password cannot exceed {} characters",
            MAX_MASTER_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        assert!(validate_master_password("short").is_err());
        assert!(validate_master_password("longer").is_ok());
        assert!(validate_master_password(&"x".repeat(100)).is_ok());
        assert!(validate_master_password(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_length_is_counted_in_characters() {
        // Six two-byte characters pass even though the byte length is twelve.
        assert!(validate_master_password("éééééé").is_ok());
    }
}
