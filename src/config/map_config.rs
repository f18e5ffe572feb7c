use crate::core::filter::FilterPipeline;
use crate::core::polygon::ShardPolicy;
use crate::core::viewport::{DrillIn, FitOptions, ViewportSize};
use crate::domain::model::{CameraState, LngLat, UnitStatus};
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{
    validate_hex_color, validate_lng_lat, validate_non_empty_string, validate_positive_number,
    validate_range, validate_zoom, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub viewport: ViewportConfig,
    pub drill_in: DrillInConfig,
    pub markers: MarkerConfig,
    pub selection: SelectionConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width_px: f64,
    pub height_px: f64,
    pub padding_px: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub sidebar_width_px: f64,
    pub initial_center: [f64; 2],
    pub initial_zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width_px: 1280.0,
            height_px: 800.0,
            padding_px: 60.0,
            min_zoom: 0.0,
            max_zoom: 17.0,
            sidebar_width_px: 400.0,
            // Köln
            initial_center: [6.9583, 50.9413],
            initial_zoom: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillInConfig {
    pub zoom: f64,
    pub pitch: f64,
}

impl Default for DrillInConfig {
    fn default() -> Self {
        Self {
            zoom: 18.0,
            pitch: 45.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub neutral_color: String,
    pub potential_statuses: Vec<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            neutral_color: "#9ca3af".to_string(),
            potential_statuses: vec![
                "offen".to_string(),
                "potenzial".to_string(),
                "termin".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub shard_threshold: usize,
    pub max_shards: Option<usize>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            shard_threshold: 20_000,
            max_shards: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl MapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MAP_MAX_ZOOM})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MapError::ConfigError {
            message: format!("Invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let viewport = &self.viewport;
        validate_range("viewport.width_px", viewport.width_px, 1.0, 16_384.0)?;
        validate_range("viewport.height_px", viewport.height_px, 1.0, 16_384.0)?;
        validate_range("viewport.padding_px", viewport.padding_px, 0.0, 1_000.0)?;
        validate_zoom("viewport.min_zoom", viewport.min_zoom)?;
        validate_zoom("viewport.max_zoom", viewport.max_zoom)?;
        validate_zoom("viewport.initial_zoom", viewport.initial_zoom)?;
        validate_range("viewport.sidebar_width_px", viewport.sidebar_width_px, 0.0, viewport.width_px)?;
        validate_lng_lat("viewport.initial_center", self.initial_camera().center)?;
        if viewport.min_zoom > viewport.max_zoom {
            return Err(MapError::ConfigValidationError {
                field: "viewport.min_zoom".to_string(),
                message: format!(
                    "min_zoom {} is larger than max_zoom {}",
                    viewport.min_zoom, viewport.max_zoom
                ),
            });
        }

        validate_zoom("drill_in.zoom", self.drill_in.zoom)?;
        validate_range("drill_in.pitch", self.drill_in.pitch, 0.0, 85.0)?;

        validate_hex_color("markers.neutral_color", &self.markers.neutral_color)?;
        if self.markers.potential_statuses.is_empty() {
            return Err(MapError::ConfigValidationError {
                field: "markers.potential_statuses".to_string(),
                message: "At least one status must count as potential".to_string(),
            });
        }
        for status in &self.markers.potential_statuses {
            validate_non_empty_string("markers.potential_statuses", status)?;
            if status.parse::<UnitStatus>().is_ok_and(|parsed| parsed.is_custom()) {
                tracing::warn!(
                    "⚠️ markers.potential_statuses entry '{}' is not a built-in status",
                    status
                );
            }
        }

        validate_positive_number("selection.shard_threshold", self.selection.shard_threshold, 1)?;
        if let Some(max_shards) = self.selection.max_shards {
            validate_positive_number("selection.max_shards", max_shards, 1)?;
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(MapError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    /// 側邊欄顯示時，視覺中心向右偏移側邊欄寬度的一半
    pub fn fit_options(&self, sidebar_visible: bool) -> FitOptions {
        FitOptions {
            padding_px: self.viewport.padding_px,
            max_zoom: self.viewport.max_zoom,
            horizontal_offset_px: if sidebar_visible {
                self.viewport.sidebar_width_px / 2.0
            } else {
                0.0
            },
        }
    }

    pub fn viewport_size(&self) -> ViewportSize {
        ViewportSize {
            width_px: self.viewport.width_px,
            height_px: self.viewport.height_px,
        }
    }

    pub fn initial_camera(&self) -> CameraState {
        let [lng, lat] = self.viewport.initial_center;
        CameraState {
            center: LngLat::new(lng, lat),
            zoom: self.viewport.initial_zoom,
            pitch: 0.0,
        }
    }

    pub fn drill_in(&self) -> DrillIn {
        DrillIn {
            zoom: self.drill_in.zoom,
            pitch: self.drill_in.pitch,
        }
    }

    pub fn shard_policy(&self) -> ShardPolicy {
        let defaults = ShardPolicy::default();
        ShardPolicy {
            threshold: self.selection.shard_threshold,
            max_shards: self.selection.max_shards.unwrap_or(defaults.max_shards),
        }
    }

    pub fn filter_pipeline(&self) -> FilterPipeline {
        FilterPipeline::new(
            self.markers
                .potential_statuses
                .iter()
                .filter_map(|status| status.parse::<UnitStatus>().ok()),
        )
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for MapConfig {
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
    fn test_empty_config_uses_defaults() {
        let config = MapConfig::from_toml_str("").unwrap();
        assert_eq!(config.viewport.max_zoom, 17.0);
        assert_eq!(config.drill_in.pitch, 45.0);
        assert_eq!(config.markers.neutral_color, "#9ca3af");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r##"
[viewport]
max_zoom = 16
sidebar_width_px = 360

[markers]
neutral_color = "#777"

[logging]
level = "debug"
"##;

        let config = MapConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.viewport.max_zoom, 16.0);
        assert_eq!(config.viewport.padding_px, 60.0);
        assert_eq!(config.fit_options(true).horizontal_offset_px, 180.0);
        assert_eq!(config.fit_options(false).horizontal_offset_px, 0.0);
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LAUFLISTEN_TEST_DRILL_ZOOM", "19");

        let toml_content = r#"
[drill_in]
zoom = ${LAUFLISTEN_TEST_DRILL_ZOOM}
"#;

        let config = MapConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.drill_in().zoom, 19.0);

        std::env::remove_var("LAUFLISTEN_TEST_DRILL_ZOOM");
    }

    #[test]
    fn test_config_validation() {
        let bad_color = MapConfig::from_toml_str("[markers]\nneutral_color = \"grey\"").unwrap();
        assert!(bad_color.validate().is_err());

        let bad_zoom =
            MapConfig::from_toml_str("[viewport]\nmin_zoom = 12\nmax_zoom = 10").unwrap();
        assert!(bad_zoom.validate().is_err());

        let bad_level = MapConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap();
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_potential_statuses_must_not_be_empty() {
        let empty = MapConfig::from_toml_str("[markers]\npotential_statuses = []").unwrap();
        let err = empty.validate().unwrap_err();
        assert!(err.to_string().contains("markers.potential_statuses"));

        let blank = MapConfig::from_toml_str("[markers]\npotential_statuses = [\" \"]").unwrap();
        assert!(blank.validate().is_err());

        // unknown names only warn
        let custom =
            MapConfig::from_toml_str("[markers]\npotential_statuses = [\"offen\", \"rückruf\"]")
                .unwrap();
        assert!(custom.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[selection]\nshard_threshold = 500\nmax_shards = 3\n")
            .unwrap();

        let config = MapConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.shard_policy(),
            ShardPolicy {
                threshold: 500,
                max_shards: 3
            }
        );
    }
}
