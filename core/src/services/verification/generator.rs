//! Code generation strategies

use rand::{rngs::OsRng, Rng};

use crate::domain::entities::verification_entry::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};
use crate::errors::{DomainError, DomainResult};

use super::traits::CodeGenerator;

/// Uniformly random decimal digits drawn from the OS CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericCodeGenerator;

impl NumericCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for NumericCodeGenerator {
    fn generate_code(&self, length: usize) -> DomainResult<String> {
        check_length(length)?;

        let mut rng = OsRng;
        let code = (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Ok(code)
    }

    fn strategy_name(&self) -> &'static str {
        "numeric"
    }
}

/// Placeholder for a lateral (non-random) strategy
///
/// Always fails so that a misconfigured channel is noticed immediately
/// instead of handing out weak codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LateralCodeGenerator;

impl CodeGenerator for LateralCodeGenerator {
    fn generate_code(&self, _length: usize) -> DomainResult<String> {
        Err(DomainError::UnsupportedGenerator {
            strategy: self.strategy_name().to_string(),
        })
    }

    fn strategy_name(&self) -> &'static str {
        "lateral"
    }
}

fn check_length(length: usize) -> DomainResult<()> {
    if (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
        Ok(())
    } else {
        Err(DomainError::InvalidCodeLength {
            length,
            min: MIN_CODE_LENGTH,
            max: MAX_CODE_LENGTH,
        })
    }
}
