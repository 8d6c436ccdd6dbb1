// Input validation for account APIs
//
// Hard limits, not configurable. Failures are collected per field so the
// client can show every problem at once.

use regex::Regex;
use std::sync::OnceLock;
use taskvilla_domain::FieldError;

use crate::error::ApiError;

// =============================================================================
// Input Size Limits
// =============================================================================

/// RFC 5321 path limit
pub const MAX_EMAIL_BYTES: usize = 254;

pub const MAX_NAME_CHARS: usize = 100;

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Argon2 accepts more, but hashing cost grows with input size
pub const MAX_PASSWORD_BYTES: usize = 128;

// =============================================================================
// Validation Functions
// =============================================================================

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// Canonical form used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_BYTES && email_regex().is_some_and(|re| re.is_match(email))
}

/// Accumulates field errors for one request body
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, path: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(path, message));
        }
        self
    }

    pub fn email(&mut self, path: &str, value: &str) -> &mut Self {
        self.check(is_valid_email(value), path, "Invalid email address")
    }

    pub fn password(&mut self, path: &str, value: &str) -> &mut Self {
        if value.chars().count() < MIN_PASSWORD_CHARS {
            return self.check(false, path, "Password must be at least 8 characters");
        }
        self.check(
            value.len() <= MAX_PASSWORD_BYTES,
            path,
            "Password must be at most 128 bytes",
        )
    }

    pub fn name(&mut self, path: &str, value: &str) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return self.check(false, path, "Name is required");
        }
        self.check(
            trimmed.chars().count() <= MAX_NAME_CHARS,
            path,
            "Name must be at most 100 characters",
        )
    }

    pub fn required(&mut self, path: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), path, "Required")
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}
