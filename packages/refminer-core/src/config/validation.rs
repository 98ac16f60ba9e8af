//! Validation trait shared by every stage config

use super::error::ConfigResult;

/// Trait for validatable configurations
pub trait Validatable {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Range check for ratios in `0.0..=1.0`
pub(crate) fn check_ratio(field: &str, value: f64, hint: &str) -> ConfigResult<()> {
    if !(0.0..=1.0).contains(&value) || value.is_nan() {
        return Err(super::ConfigError::range_with_hint(
            field, value, 0.0, 1.0, hint,
        ));
    }
    Ok(())
}

/// Range check for counts in `min..=max`
pub(crate) fn check_count(
    field: &str,
    value: usize,
    min: usize,
    max: usize,
    hint: &str,
) -> ConfigResult<()> {
    if value < min || value > max {
        return Err(super::ConfigError::range_with_hint(
            field, value, min, max, hint,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_ratio_bounds() {
        assert!(check_ratio("x", 0.0, "").is_ok());
        assert!(check_ratio("x", 1.0, "").is_ok());
        assert!(check_ratio("x", 1.01, "").is_err());
        assert!(check_ratio("x", f64::NAN, "").is_err());
    }

    #[test]
    fn test_check_count_bounds() {
        assert!(check_count("n", 5, 1, 10, "").is_ok());
        assert!(check_count("n", 0, 1, 10, "").is_err());
        assert!(check_count("n", 11, 1, 10, "").is_err());
    }
}
