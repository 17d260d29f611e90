use crate::domain::model::Settings;
use crate::domain::rules::{MAX_INTERVAL_MS, MAX_STRENGTH, MIN_WORLD_WIDTH};
use crate::utils::error::{BattleError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BattleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BattleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(BattleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BattleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_probability(field_name: &str, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(BattleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Probability cannot be NaN".to_string(),
        });
    }
    validate_range(field_name, value, 0.0, 1.0)
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BattleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 同一場比賽不能重複選同一個參賽者
pub fn validate_unique_names(field_name: &str, names: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        validate_non_empty_string(field_name, name)?;
        if !seen.insert(name.to_lowercase()) {
            return Err(BattleError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.clone(),
                reason: "Competitor listed more than once".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| BattleError::MissingConfigError {
        field: field_name.to_string(),
    })
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_positive_number("world.width", self.world_width, MIN_WORLD_WIDTH)?;
        validate_probability("world.initial_plant_probability", self.initial_plant_probability)?;
        validate_probability("world.plant_growth_probability", self.plant_growth_probability)?;

        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        validate_range("simulation.interval_ms", interval_ms, 0, MAX_INTERVAL_MS)?;
        validate_range("simulation.start_strength", self.start_strength, 1, MAX_STRENGTH)?;
        validate_positive_number(
            "simulation.creatures_per_competitor",
            self.creatures_per_competitor,
            1,
        )?;
        if let Some(max_turns) = self.max_turns {
            validate_range("simulation.max_turns", max_turns, 1, u64::MAX)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("world.width", 5, 3).is_ok());
        assert!(validate_positive_number("world.width", 2, 3).is_err());
    }

    #[test]
    fn test_validate_probability() {
        assert!(validate_probability("world.initial_plant_probability", 0.12).is_ok());
        assert!(validate_probability("world.initial_plant_probability", 0.0).is_ok());
        assert!(validate_probability("world.initial_plant_probability", 1.5).is_err());
        assert!(validate_probability("world.initial_plant_probability", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_unique_names() {
        let names = vec!["Hunter".to_string(), "SuperPlant".to_string()];
        assert!(validate_unique_names("competitors", &names).is_ok());

        let duplicated = vec!["Hunter".to_string(), "hunter".to_string()];
        assert!(validate_unique_names("competitors", &duplicated).is_err());

        let blank = vec!["  ".to_string()];
        assert!(validate_unique_names("competitors", &blank).is_err());
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_settings_rejects_tiny_world_and_slow_interval() {
        let tiny = Settings {
            world_width: 2,
            ..Settings::default()
        };
        assert!(matches!(
            tiny.validate(),
            Err(BattleError::InvalidConfigValueError { field, .. }) if field == "world.width"
        ));

        let slow = Settings {
            interval: std::time::Duration::from_millis(1500),
            ..Settings::default()
        };
        assert!(slow.validate().is_err());

        let overfed = Settings {
            start_strength: MAX_STRENGTH + 1,
            ..Settings::default()
        };
        assert!(overfed.validate().is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(42);
        assert_eq!(*validate_required_field("seed", &present).unwrap(), 42);

        let missing: Option<u64> = None;
        assert!(matches!(
            validate_required_field("seed", &missing),
            Err(BattleError::MissingConfigError { .. })
        ));
    }
}
