//! Share code generation

use rand::distr::Alphanumeric;
use rand::Rng;

/// Shortest code accepted.
pub const MIN_CODE_LENGTH: usize = 6;

/// `[A-Za-z0-9]`
pub const CODE_ALPHABET_SIZE: usize = 62;

/// Produces short, URL-safe, case-sensitive codes.
///
/// Implementations do not check uniqueness against stored records; the
/// ingestor does that before using a code.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform random codes over the alphanumeric alphabet.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Result<Self, String> {
        if length < MIN_CODE_LENGTH {
            return Err(format!(
                "Code length must be at least {} (got {})",
                MIN_CODE_LENGTH, length
            ));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Whether `code` could have been produced by a generator.
///
/// Used to reject garbage before it reaches the record store.
pub fn is_well_formed(code: &str) -> bool {
    !code.is_empty() && code.len() <= 64 && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
