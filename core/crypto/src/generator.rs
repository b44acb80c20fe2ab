//! Random password generation and strength scoring.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use vaultpass_common::{Error, Result};

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Characters that are easy to confuse at a glance.
const SIMILAR: &str = "0O1lI";

/// Options controlling password generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    pub exclude_similar: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
            exclude_similar: true,
        }
    }
}

impl PasswordOptions {
    fn charset(&self) -> Vec<char> {
        let mut charset = String::new();
        if self.uppercase {
            charset.push_str(UPPERCASE);
        }
        if self.lowercase {
            charset.push_str(LOWERCASE);
        }
        if self.numbers {
            charset.push_str(NUMBERS);
        }
        if self.symbols {
            charset.push_str(SYMBOLS);
        }

        if self.exclude_similar {
            charset.retain(|c| !SIMILAR.contains(c));
        }

        charset.chars().collect()
    }
}

/// Pick a uniform index below `bound` using rejection sampling.
fn random_index(rng: &mut dyn RngCore, bound: usize) -> usize {
    let bound = bound as u32;
    let zone = u32::MAX - (u32::MAX % bound);
    loop {
        let mut buf = [0u8; 4];
        rng.fill_bytes(&mut buf);
        let value = u32::from_le_bytes(buf);
        if value < zone {
            return (value % bound) as usize;
        }
    }
}

/// Generate a random password from the selected character classes.
///
/// # Errors
/// - Returns error if no character class is selected or length is zero
pub fn generate_password(options: &PasswordOptions) -> Result<String> {
    if options.length == 0 {
        return Err(Error::InvalidInput(
            "Password length must be at least 1".to_string(),
        ));
    }

    let charset = options.charset();
    if charset.is_empty() {
        return Err(Error::InvalidInput(
            "At least one character type must be selected".to_string(),
        ));
    }

    let mut rng = rand::thread_rng();
    let mut password = String::with_capacity(options.length);
    for _ in 0..options.length {
        password.push(charset[random_index(&mut rng, charset.len())]);
    }

    Ok(password)
}

/// Score a password's strength on a 0-100 scale.
pub fn password_strength(password: &str) -> u8 {
    let mut score: u32 = 0;
    let len = password.chars().count();

    if len >= 8 {
        score += 25;
    }
    if len >= 12 {
        score += 15;
    }
    if len >= 16 {
        score += 10;
    }

    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 15;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 15;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 10;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 10;
    }

    if len >= 20 {
        score += 10;
    }

    score.min(100) as u8
}

/// Human-readable strength bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthLabel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLabel {
    /// Bucket a 0-100 strength score.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => Self::Weak,
            30..=59 => Self::Fair,
            60..=79 => Self::Good,
            _ => Self::Strong,
        }
    }
}
