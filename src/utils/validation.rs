use crate::domain::model::LngLat;
use crate::utils::error::{MapError, Result};
use regex::Regex;
use std::fmt::Display;
use std::path::Path;
use std::sync::OnceLock;

/// Web Mercator zoom range accepted by every vector tile style we load.
pub const ZOOM_RANGE: (f64, f64) = (0.0, 22.0);

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl Display, reason: impl Into<String>) -> MapError {
    MapError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
    })
}

/// List and marker colors are painted as-is, so only `#rgb` / `#rrggbb`.
pub fn validate_hex_color(field_name: &str, color: &str) -> Result<()> {
    if !hex_color_pattern().is_match(color) {
        return Err(invalid(
            field_name,
            color,
            "Expected a hex color like #ff0000 or #f00",
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    match path {
        "" => Err(invalid(field_name, path, "Path cannot be empty")),
        p if p.contains('\0') => Err(invalid(field_name, path, "Path contains null bytes")),
        _ => Ok(()),
    }
}

pub fn validate_file_extension(field_name: &str, path: &str, allowed: &[&str]) -> Result<()> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| invalid(field_name, path, "File has no extension or invalid filename"))?;

    if !allowed.iter().any(|a| a.eq_ignore_ascii_case(extension)) {
        return Err(invalid(
            field_name,
            path,
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed.join(", ")
            ),
        ));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| MapError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // written so that NaN fails
    if !(value >= min && value <= max) {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_zoom(field_name: &str, zoom: f64) -> Result<()> {
    validate_range(field_name, zoom, ZOOM_RANGE.0, ZOOM_RANGE.1)
}

/// WGS84 bounds. `(0, 0)` is allowed here; placement is decided elsewhere.
pub fn validate_lng_lat(field_name: &str, point: LngLat) -> Result<()> {
    validate_range(&format!("{}.lng", field_name), point.lng, -180.0, 180.0)?;
    validate_range(&format!("{}.lat", field_name), point.lat, -90.0, 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("markers.neutral_color", "#ff0000").is_ok());
        assert!(validate_hex_color("markers.neutral_color", "#F0a").is_ok());
        assert!(validate_hex_color("markers.neutral_color", "red").is_err());
        assert!(validate_hex_color("markers.neutral_color", "#ff00").is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_zoom("viewport.max_zoom", 17.0).is_ok());
        assert!(validate_zoom("viewport.max_zoom", 23.0).is_err());
        assert!(validate_zoom("viewport.max_zoom", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_lng_lat() {
        assert!(validate_lng_lat("polygon", LngLat::new(6.95, 50.94)).is_ok());
        let err = validate_lng_lat("polygon", LngLat::new(50.94, 96.0)).unwrap_err();
        assert!(err.to_string().contains("polygon.lat"));
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("addresses", "export/addresses.JSON", &["json"]).is_ok());
        assert!(validate_file_extension("addresses", "addresses.csv", &["json"]).is_err());
        assert!(validate_file_extension("addresses", "addresses", &["json"]).is_err());
    }

    #[test]
    fn test_validate_path_and_required() {
        assert!(validate_path("config", "").is_err());
        assert!(validate_path("config", "map.toml").is_ok());

        let missing: Option<String> = None;
        assert!(validate_required_field("polygon", &missing).is_err());
        assert_eq!(
            validate_required_field("polygon", &Some(3)).map(|v| *v).ok(),
            Some(3)
        );
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("selection.max_shards", 4, 1).is_ok());
        assert!(validate_positive_number("selection.max_shards", 0, 1).is_err());
    }
}
