// Validation utilities for string fields.

/// Trim and validate string fields
pub fn trim_and_validate_field(field: &str, required: bool) -> Result<String, String> {
    let trimmed = field.trim().to_string();
    if trimmed.is_empty() {
        if required {
            Err("Field cannot be empty".to_string())
        } else {
            Ok(trimmed)
        }
    } else {
        Ok(trimmed)
    }
}

/// Trim an optional string field, collapsing empty values to `None`
pub fn trim_optional_field(field: Option<&String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Password strength check: min 8 chars with uppercase, lowercase, digit and
/// special character
pub fn validate_password_strength(password: &str) -> Result<(), validator::ValidationError> {
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if password.len() < 8 {
        return Err(validator::ValidationError::new("password_too_short"));
    }

    if !has_uppercase || !has_lowercase || !has_digit || !has_special {
        return Err(validator::ValidationError::new("password_complexity"));
    }

    Ok(())
}

/// Username check: 3-30 chars, lowercase alphanumeric plus `.` and `_`
pub fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if username.len() < 3 || username.len() > 30 {
        return Err(validator::ValidationError::new("username_length"));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_')
    {
        return Err(validator::ValidationError::new("username_charset"));
    }
    Ok(())
}

/// Derive a default username from the email local-part, normalised to the
/// allowed charset. Used when registration or OAuth login does not supply one.
pub fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let mut username: String = local
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    while username.len() < 3 {
        username.push('_');
    }
    username.truncate(30);
    username
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_validate_field() {
        assert_eq!(trim_and_validate_field("  hello  ", true).unwrap(), "hello");
        assert!(trim_and_validate_field("   ", true).is_err());
        assert_eq!(trim_and_validate_field("   ", false).unwrap(), "");
    }

    #[test]
    fn test_trim_optional_field() {
        assert_eq!(
            trim_optional_field(Some(&"  bio  ".to_string())),
            Some("bio".to_string())
        );
        assert_eq!(trim_optional_field(Some(&"   ".to_string())), None);
        assert_eq!(trim_optional_field(None), None);
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("Aa1!aaaa").is_ok());
        assert!(validate_password_strength("short1!").is_err());
        assert!(validate_password_strength("alllowercase1!").is_err());
        assert!(validate_password_strength("ALLUPPERCASE1!").is_err());
        assert!(validate_password_strength("NoDigits!!").is_err());
        assert!(validate_password_strength("NoSpecial11").is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("ferris_01").is_ok());
        assert!(validate_username("a.b").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("Has-Caps").is_err());
    }

    #[test]
    fn test_username_from_email() {
        assert_eq!(username_from_email("Ferris.Crab@example.com"), "ferris.crab");
        assert_eq!(username_from_email("a@x.com"), "a__");
        assert_eq!(username_from_email("weird+tag@x.com"), "weird_tag");
    }
}
