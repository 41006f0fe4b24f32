//! Input validation for student identity fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid passport format.
    InvalidPassport(String),
    /// Invalid national id format.
    InvalidNationalId(String),
    /// Invalid phone number format.
    InvalidPhone(String),
    /// Value shorter than the required minimum.
    TooShort { field: String, min: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPassport(msg) => write!(f, "Invalid passport: {}", msg),
            ValidationError::InvalidNationalId(msg) => write!(f, "Invalid national id: {}", msg),
            ValidationError::InvalidPhone(msg) => write!(f, "Invalid phone: {}", msg),
            ValidationError::TooShort { field, min, actual } => {
                write!(f, "{} is too short ({} chars, min {})", field, actual, min)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Minimum length for the external student id.
pub const MIN_STUDENT_ID_LENGTH: usize = 3;

/// Minimum length for name parts (first/last name, patronymic).
pub const MIN_NAME_LENGTH: usize = 2;

/// Required digit count for the national id.
pub const NATIONAL_ID_LENGTH: usize = 14;

/// Validate an external student id (length >= 3 after trimming).
pub fn validate_student_id(student_id: &str) -> Result<(), ValidationError> {
    let student_id = student_id.trim();

    if student_id.is_empty() {
        return Err(ValidationError::Empty("student id".to_string()));
    }

    if student_id.chars().count() < MIN_STUDENT_ID_LENGTH {
        return Err(ValidationError::TooShort {
            field: "student id".to_string(),
            min: MIN_STUDENT_ID_LENGTH,
            actual: student_id.chars().count(),
        });
    }

    Ok(())
}

/// Validate a name part (first name, last name or patronymic).
pub fn validate_name(field: &str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    if value.chars().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_NAME_LENGTH,
            actual: value.chars().count(),
        });
    }

    Ok(())
}

/// Normalize a passport value: uppercase with all whitespace removed.
pub fn normalize_passport(passport: &str) -> String {
    passport
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Validate a passport and split it into (series, number).
///
/// The accepted shape is exactly two letters followed by seven digits
/// (e.g. "AB1234567"). Input is normalized first, so "ab 1234567" passes.
pub fn parse_passport(passport: &str) -> Result<(String, String), ValidationError> {
    let normalized = normalize_passport(passport);

    if normalized.is_empty() {
        return Err(ValidationError::Empty("passport".to_string()));
    }

    if !normalized.is_ascii() || normalized.len() != 9 {
        return Err(ValidationError::InvalidPassport(
            "expected 2 letters followed by 7 digits (e.g. AB1234567)".to_string(),
        ));
    }

    let (series, number) = normalized.split_at(2);

    if !series.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidPassport(
            "series must be 2 letters".to_string(),
        ));
    }

    if !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPassport(
            "number must be 7 digits".to_string(),
        ));
    }

    Ok((series.to_string(), number.to_string()))
}

/// Validate a national identification number (exactly 14 digits).
pub fn validate_national_id(national_id: &str) -> Result<(), ValidationError> {
    let national_id = national_id.trim();

    if national_id.is_empty() {
        return Err(ValidationError::Empty("national id".to_string()));
    }

    if national_id.len() != NATIONAL_ID_LENGTH
        || !national_id.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidNationalId(
            "must be exactly 14 digits".to_string(),
        ));
    }

    Ok(())
}

/// Normalize a phone number to the `+998XXXXXXXXX` form.
///
/// Strips spaces, dashes and parentheses; accepts bare 9-digit local input
/// and `998`-prefixed input. Already-normalized input passes through.
pub fn normalize_phone(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if cleaned.starts_with('+') {
        return cleaned;
    }
    if cleaned.starts_with("998") {
        return format!("+{}", cleaned);
    }
    format!("+998{}", cleaned)
}

/// Validate an already-normalized phone number (`+998` + 9 digits).
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Err(ValidationError::Empty("phone".to_string()));
    }

    let Some(rest) = phone.strip_prefix("+998") else {
        return Err(ValidationError::InvalidPhone(
            "must start with +998".to_string(),
        ));
    };

    if rest.len() != 9 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone(
            "expected 9 digits after +998".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_student_id() {
        assert!(validate_student_id("STD1001").is_ok());
        assert!(validate_student_id("abc").is_ok());
        assert!(validate_student_id(" ab ").is_err());
        assert!(matches!(
            validate_student_id(""),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_student_id("ab"),
            Err(ValidationError::TooShort { .. })
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("first name", "Ali").is_ok());
        assert!(validate_name("patronymic", "Vali ogli").is_ok());
        assert!(matches!(
            validate_name("first name", "A"),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(matches!(
            validate_name("last name", "  "),
            Err(ValidationError::Empty(_))
        ));
    }

    #[test]
    fn test_parse_passport_valid() {
        assert_eq!(
            parse_passport("AB1234567").unwrap(),
            ("AB".to_string(), "1234567".to_string())
        );
        // Case-insensitive, whitespace stripped.
        assert_eq!(
            parse_passport("aa1234567").unwrap(),
            ("AA".to_string(), "1234567".to_string())
        );
        assert_eq!(
            parse_passport("ab 1234567").unwrap(),
            ("AB".to_string(), "1234567".to_string())
        );
    }

    #[test]
    fn test_parse_passport_invalid() {
        // Single-letter series.
        assert!(matches!(
            parse_passport("A1234567"),
            Err(ValidationError::InvalidPassport(_))
        ));
        // Too many digits.
        assert!(parse_passport("AB12345678").is_err());
        // Digits in series position.
        assert!(parse_passport("121234567").is_err());
        // Letters in number position.
        assert!(parse_passport("ABCDEFGHI").is_err());
        // Non-ASCII input.
        assert!(parse_passport("aÉ234567").is_err());
        assert!(matches!(
            parse_passport("  "),
            Err(ValidationError::Empty(_))
        ));
    }

    #[test]
    fn test_validate_national_id() {
        assert!(validate_national_id("12345678901234").is_ok());
        assert!(validate_national_id("1234567890123").is_err());
        assert!(validate_national_id("123456789012345").is_err());
        assert!(validate_national_id("1234567890123a").is_err());
        assert!(matches!(
            validate_national_id(""),
            Err(ValidationError::Empty(_))
        ));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("901234567"), "+998901234567");
        assert_eq!(normalize_phone("998901234567"), "+998901234567");
        assert_eq!(normalize_phone("+998901234567"), "+998901234567");
        assert_eq!(normalize_phone("+998 90 123-45-67"), "+998901234567");
        assert_eq!(normalize_phone("(90) 123 45 67"), "+998901234567");
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+998901234567").is_ok());
        assert!(validate_phone(&normalize_phone("901234567")).is_ok());
        assert!(validate_phone(&normalize_phone("998901234567")).is_ok());
        // Wrong country code.
        assert!(validate_phone("+7998901234567").is_err());
        // Too short / too long.
        assert!(validate_phone("+99890123456").is_err());
        assert!(validate_phone("+9989012345678").is_err());
        // Non-digit payload.
        assert!(validate_phone("+99890123456a").is_err());
        assert!(matches!(
            validate_phone(""),
            Err(ValidationError::Empty(_))
        ));
    }
}
