//! # Validation Module
//!
//! Input validation rules for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront pages                                             │
//! │  └── Immediate user feedback (required fields)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handlers (Rust)                                         │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (kind, slug)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator trims its input and reports the first problem it finds.

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_PRICE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_TITLE_LEN: usize = 200;
const MAX_SLUG_LEN: usize = 120;
const MAX_NAME_LEN: usize = 120;
const MAX_EMAIL_LEN: usize = 254;
const MAX_SEARCH_LEN: usize = 100;
const MAX_SESSION_ID_LEN: usize = 128;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a catalog title.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    required_with_max("title", title, MAX_TITLE_LEN)
}

/// Validates a catalog slug.
///
/// ## Rules
/// - Must not be empty
/// - Lowercase ASCII letters, digits and single hyphens only
/// - Cannot start or end with a hyphen
///
/// ## Example
/// ```rust
/// use dentica_core::validation::validate_slug;
///
/// assert!(validate_slug("neet-mds-2026").is_ok());
/// assert!(validate_slug("NEET MDS").is_err());
/// assert!(validate_slug("-draft").is_err());
/// ```
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    let slug = slug.trim();
    required_with_max("slug", slug, MAX_SLUG_LEN)?;

    let well_formed = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--");

    if !well_formed {
        return Err(ValidationError::invalid_format(
            "slug",
            "must contain only lowercase letters, digits and single hyphens",
        ));
    }

    Ok(())
}

/// Validates a listing price.
///
/// ## Rules
/// - Must be non-negative; zero is allowed (free notes, sample videos)
/// - At most [`MAX_PRICE`] paise
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.paise() > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE,
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// ## Rules
/// - Can be empty (returns all results)
/// - Maximum 100 characters
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "q".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Contact Validators
// =============================================================================

/// Validates the customer's name on the checkout form.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_with_max("name", name, MAX_NAME_LEN)
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - One `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
///
/// ## Example
/// ```rust
/// use dentica_core::validation::validate_email;
///
/// assert!(validate_email("dr.rao@clinic.in").is_ok());
/// assert!(validate_email("dr.rao@clinic").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    required_with_max("email", email, MAX_EMAIL_LEN)?;

    let invalid = || ValidationError::invalid_format("email", "must look like name@example.com");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    match domain.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < domain.len() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - 7 to 15 digits; spaces, `+`, `-`, `(`, `)` are allowed separators
///
/// ## Example
/// ```rust
/// use dentica_core::validation::validate_phone;
///
/// assert!(validate_phone("+91 98765-43210").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::required("phone"));
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err(ValidationError::invalid_format(
            "phone",
            "must contain only digits and + - ( ) separators",
        ));
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(ValidationError::OutOfRange {
            field: "phone digits".to_string(),
            min: MIN_PHONE_DIGITS as i64,
            max: MAX_PHONE_DIGITS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Session Validators
// =============================================================================

/// Validates a client-supplied session id (cart storage key).
///
/// ## Rules
/// - 1 to 128 characters of `[A-Za-z0-9_-]`
pub fn validate_session_id(session_id: &str) -> ValidationResult<()> {
    if session_id.is_empty() {
        return Err(ValidationError::required("session id"));
    }

    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "session id".to_string(),
            max: MAX_SESSION_ID_LEN,
        });
    }

    if !session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "session id",
            "must contain only letters, digits, hyphens and underscores",
        ));
    }

    Ok(())
}

fn required_with_max(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Prosthodontics Crash Course").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("endo-basics").is_ok());
        assert!(validate_slug("mds2026").is_ok());

        assert!(validate_slug("").is_err());
        assert!(validate_slug("Endo").is_err());
        assert!(validate_slug("endo basics").is_err());
        assert!(validate_slug("endo--basics").is_err());
        assert!(validate_slug("endo-").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_rupees(499)).is_ok());
        assert!(validate_price(Money::from_paise(-100)).is_err());

        assert!(validate_price(Money::from_paise(MAX_PRICE)).is_ok());
        assert_eq!(
            validate_price(Money::from_paise(MAX_PRICE + 1)).unwrap_err(),
            ValidationError::OutOfRange {
                field: "price".to_string(),
                min: 0,
                max: MAX_PRICE,
            }
        );
        assert!(validate_price(Money::from_paise(i64::MAX / 2 + 1)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("student@dentica.in").is_ok());
        assert!(validate_email("  a.b+c@mail.co.uk ").is_ok());

        assert_eq!(validate_email("").unwrap_err(), ValidationError::required("email"));
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@dentica.in").is_err());
        assert!(validate_email("a@b@c.in").is_err());
        assert!(validate_email("a@dentica").is_err());
        assert!(validate_email("a@dentica.").is_err());
        assert!(validate_email("a b@dentica.in").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("+91 (987) 654-3210").is_ok());

        assert_eq!(validate_phone(" ").unwrap_err(), ValidationError::required("phone"));
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98765x43210").is_err());
        assert!(validate_phone(&"9".repeat(16)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  implant ").unwrap(), "implant");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_session_id() {
        assert!(validate_session_id("3f2c9a_tab-1").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("has space").is_err());
        assert!(validate_session_id(&"s".repeat(129)).is_err());
    }
}
