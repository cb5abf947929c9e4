use crate::error::{AppError, Result};

/// 可为空的邮箱：空串表示清除，否则必须是合法邮箱
pub fn validate_optional_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Ok(());
    }

    if !validator::validate_email(email) {
        return Err(AppError::field("email", "Enter a valid email address."));
    }

    Ok(())
}

/// 出生年份必须落在配置的闭区间内
pub fn validate_birth_year(year: i32, min: i32, max: i32) -> Result<()> {
    if year < min || year > max {
        return Err(AppError::field(
            "birth_year",
            &format!("Birth year must be between {} and {}.", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("reader@example.com").is_ok());
        assert!(validate_optional_email("not-an-email").is_err());
    }

    #[test]
    fn test_birth_year_bounds() {
        assert!(validate_birth_year(1900, 1900, 2025).is_ok());
        assert!(validate_birth_year(2025, 1900, 2025).is_ok());
        assert!(validate_birth_year(1899, 1900, 2025).is_err());
        assert!(validate_birth_year(2026, 1900, 2025).is_err());
    }
}
