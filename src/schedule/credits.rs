use crate::error::AppError;

/// Credit bounds for a plan. The minimum is always derived from the maximum
/// as `floor(max * 2 / 3)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreditRange {
    max: Option<u32>,
    min: Option<u32>,
}

impl CreditRange {
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    pub fn min(&self) -> Option<u32> {
        self.min
    }

    pub fn set_max(&mut self, max: Option<u32>) {
        self.max = max;
        self.min = max.map(|m| m * 2 / 3);
    }

    /// Parses raw field input. Blank input clears both bounds; anything that
    /// is not a non-negative integer is rejected and leaves the range as is.
    pub fn set_max_input(&mut self, raw: &str) -> Result<(), AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.set_max(None);
            return Ok(());
        }
        let max = trimmed.parse::<u32>().map_err(|_| {
            AppError::Validation(format!(
                "Maximum credits must be a non-negative integer, got '{}'",
                trimmed
            ))
        })?;
        self.set_max(Some(max));
        Ok(())
    }
}
