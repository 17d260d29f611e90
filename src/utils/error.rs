use thiserror::Error;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown competitor: {name}")]
    UnknownCompetitor { name: String },

    #[error("Simulation error: {message}")]
    SimulationError { message: String },

    #[error("Submission policy violated: {count} violation(s)")]
    PolicyViolation { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Simulation,
    Policy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BattleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BattleError::IoError(_) => ErrorCategory::Io,
            BattleError::SerializationError(_) | BattleError::CsvError(_) => ErrorCategory::Data,
            BattleError::ConfigError { .. }
            | BattleError::ConfigValidationError { .. }
            | BattleError::InvalidConfigValueError { .. }
            | BattleError::MissingConfigError { .. }
            | BattleError::UnknownCompetitor { .. } => ErrorCategory::Configuration,
            BattleError::SimulationError { .. } => ErrorCategory::Simulation,
            BattleError::PolicyViolation { .. } => ErrorCategory::Policy,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Policy => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Simulation => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BattleError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            BattleError::SerializationError(_) | BattleError::CsvError(_) => {
                "Check free disk space and retry the battle".to_string()
            }
            BattleError::ConfigError { .. } | BattleError::ConfigValidationError { .. } => {
                "Make sure the configuration file exists and is valid TOML".to_string()
            }
            BattleError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and try again", field)
            }
            BattleError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration or pass it on the command line", field)
            }
            BattleError::UnknownCompetitor { .. } => {
                "Run `bug-battle list` to see the registered competitors".to_string()
            }
            BattleError::SimulationError { .. } => {
                "Restart the battle; report the seed if the problem repeats".to_string()
            }
            BattleError::PolicyViolation { .. } => {
                "Keep changes inside the competitors directory and avoid f_/F_ names".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BattleError::IoError(e) => format!("Could not read or write a file: {}", e),
            BattleError::UnknownCompetitor { name } => {
                format!("There is no competitor called '{}'", name)
            }
            BattleError::PolicyViolation { count } => {
                format!("The submission breaks the competition rules ({} problem(s))", count)
            }
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for BattleError {
    fn from(e: toml::de::Error) -> Self {
        BattleError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = BattleError::MissingConfigError {
            field: "world.width".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("world.width"));
    }

    #[test]
    fn test_unknown_competitor_message() {
        let err = BattleError::UnknownCompetitor {
            name: "Godzilla".to_string(),
        };
        assert!(err.user_friendly_message().contains("Godzilla"));
        assert!(err.recovery_suggestion().contains("list"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BattleError = io.into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
