// Token lifetime strings
//
// Lifetimes are configured as short duration strings: "900" or "900s",
// "15m", "12h", "7d". A bare integer is seconds.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TtlError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration {0:?}: expected <number>[s|m|h|d]")]
    Invalid(String),
    #[error("duration {0:?} must be greater than zero")]
    Zero(String),
}

/// Parse a lifetime string such as "15m" or "7d"
pub fn parse_ttl(input: &str) -> Result<Duration, TtlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TtlError::Empty);
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| TtlError::Invalid(input.to_string()))?;

    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return Err(TtlError::Invalid(input.to_string())),
    };

    if value == 0 {
        return Err(TtlError::Zero(input.to_string()));
    }

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| TtlError::Invalid(input.to_string()))
}
