use crate::core::ConfigProvider;
use crate::domain::model::Settings;
use crate::utils::error::{BattleError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// `battle.toml` 的內容；沒寫的欄位使用預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleConfig {
    #[serde(default)]
    pub battle: BattleInfo,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub competitors: CompetitorsConfig,
    pub output: Option<OutputConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleInfo {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: Option<usize>,
    pub initial_plant_probability: Option<f64>,
    pub plant_growth_probability: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub interval_ms: Option<u64>,
    pub start_strength: Option<i64>,
    pub creatures_per_competitor: Option<usize>,
    pub max_turns: Option<u64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorsConfig {
    #[serde(default)]
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub enabled: Option<bool>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub every_turns: Option<u64>,
}

impl BattleConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BattleError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 載入並驗證配置檔
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::from_file(path)?;
        config.validate_config()?;
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// 替換環境變數 (例如 ${BATTLE_SEED})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.settings().validate()?;

        validation::validate_unique_names("competitors.selected", &self.competitors.selected)?;

        if let Some(output) = &self.output {
            if output.enabled.unwrap_or(true) {
                let path = validation::validate_required_field("output.path", &output.path)?;
                validation::validate_path("output.path", path)?;
            }
        }

        if let Some(monitoring) = &self.monitoring {
            if let Some(every) = monitoring.every_turns {
                validation::validate_range("monitoring.every_turns", every, 1, u64::MAX)?;
            }
        }

        Ok(())
    }

    /// 比賽名稱，未設定時用預設值
    pub fn name(&self) -> &str {
        self.battle.name.as_deref().unwrap_or("Bug Battle")
    }

    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            world_width: self.world.width.unwrap_or(defaults.world_width),
            interval: self
                .simulation
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            initial_plant_probability: self
                .world
                .initial_plant_probability
                .unwrap_or(defaults.initial_plant_probability),
            plant_growth_probability: self
                .world
                .plant_growth_probability
                .unwrap_or(defaults.plant_growth_probability),
            start_strength: self
                .simulation
                .start_strength
                .unwrap_or(defaults.start_strength),
            creatures_per_competitor: self
                .simulation
                .creatures_per_competitor
                .unwrap_or(defaults.creatures_per_competitor),
            max_turns: self.simulation.max_turns,
            seed: self.simulation.seed,
        }
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output
            .as_ref()
            .filter(|output| output.enabled.unwrap_or(true))
            .and_then(|output| output.path.as_deref())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// 每隔幾回合記錄一次戰況
    pub fn report_every(&self) -> Option<u64> {
        self.monitoring.as_ref().and_then(|m| m.every_turns)
    }
}

impl ConfigProvider for BattleConfig {
    fn settings(&self) -> Settings {
        BattleConfig::settings(self)
    }

    fn competitor_names(&self) -> &[String] {
        &self.competitors.selected
    }

    fn output_path(&self) -> Option<&str> {
        BattleConfig::output_path(self)
    }
}

impl Validate for BattleConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_battle_config() {
        let toml_content = r#"
[battle]
name = "Lab 6 finals"
description = "Everyone against everyone"

[world]
width = 40
initial_plant_probability = 0.2

[simulation]
interval_ms = 50
max_turns = 2000
seed = 99

[competitors]
selected = ["Hunter", "BugKilla"]

[output]
path = "./battle-output"

[monitoring]
enabled = true
every_turns = 100
"#;

        let config = BattleConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.name(), "Lab 6 finals");
        let settings = config.settings();
        assert_eq!(settings.world_width, 40);
        assert_eq!(settings.initial_plant_probability, 0.2);
        assert_eq!(settings.plant_growth_probability, 0.01);
        assert_eq!(settings.interval, Duration::from_millis(50));
        assert_eq!(settings.max_turns, Some(2000));
        assert_eq!(settings.seed, Some(99));
        assert_eq!(config.competitor_names(), ["Hunter", "BugKilla"]);
        assert_eq!(config.output_path(), Some("./battle-output"));
        assert!(config.monitoring_enabled());
        assert_eq!(config.report_every(), Some(100));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BattleConfig::from_toml_str("").unwrap();
        assert_eq!(config.settings(), Settings::default());
        assert_eq!(config.name(), "Bug Battle");
        assert!(config.output_path().is_none());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BUG_BATTLE_TEST_SEED", "1234");

        let toml_content = r#"
[simulation]
seed = ${BUG_BATTLE_TEST_SEED}
"#;

        let config = BattleConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.settings().seed, Some(1234));

        std::env::remove_var("BUG_BATTLE_TEST_SEED");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let toml_content = r#"
[output]
path = "${BUG_BATTLE_TEST_UNSET_DIR}/out"
"#;
        let config = BattleConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), Some("${BUG_BATTLE_TEST_UNSET_DIR}/out"));
    }

    #[test]
    fn test_config_validation() {
        let too_small = BattleConfig::from_toml_str("[world]\nwidth = 2\n").unwrap();
        assert!(too_small.validate().is_err());

        let duplicated =
            BattleConfig::from_toml_str("[competitors]\nselected = [\"Hunter\", \"HUNTER\"]\n")
                .unwrap();
        assert!(duplicated.validate().is_err());

        let no_path = BattleConfig::from_toml_str("[output]\nenabled = true\n").unwrap();
        assert!(matches!(
            no_path.validate(),
            Err(BattleError::MissingConfigError { field }) if field == "output.path"
        ));

        let disabled = BattleConfig::from_toml_str("[output]\nenabled = false\n").unwrap();
        assert!(disabled.validate().is_ok());
        assert!(disabled.output_path().is_none());
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = BattleConfig::from_toml_str("[world\nwidth = ").unwrap_err();
        assert!(matches!(
            err,
            BattleError::ConfigValidationError { ref field, .. } if field == "toml_parsing"
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[battle]\nname = \"file-test\"\n[world]\nwidth = 12\n")
            .unwrap();

        let config = BattleConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.name(), "file-test");
        assert_eq!(config.settings().world_width, 12);
    }

    #[test]
    fn test_load_rejects_invalid_output_and_monitoring() {
        let mut no_path = NamedTempFile::new().unwrap();
        no_path
            .write_all(b"[output]\nenabled = true\n[monitoring]\nenabled = true\nevery_turns = 5\n")
            .unwrap();
        assert!(matches!(
            BattleConfig::load(no_path.path()),
            Err(BattleError::MissingConfigError { field }) if field == "output.path"
        ));

        let mut zero_every = NamedTempFile::new().unwrap();
        zero_every
            .write_all(b"[monitoring]\nenabled = true\nevery_turns = 0\n")
            .unwrap();
        assert!(BattleConfig::load(zero_every.path()).is_err());

        let mut valid = NamedTempFile::new().unwrap();
        valid.write_all(b"[world]\nwidth = 12\n").unwrap();
        assert_eq!(BattleConfig::load(valid.path()).unwrap().settings().world_width, 12);
    }
}
