use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Tunables for the lensed starfield.
///
/// Lengths are in canvas sub-pixels (two per terminal row), times in
/// milliseconds. Values are trusted as given.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Stars per square sub-pixel.
    pub star_density: f32,
    pub all_stars_twinkle: bool,
    pub twinkle_probability: f32,
    pub min_twinkle_speed: f32,
    pub max_twinkle_speed: f32,
    /// Diameter of the spawn-free disc at the canvas centre.
    pub exclusion_size: f32,
    pub gravity_strength: f32,
    pub swirl_strength: f32,
    /// Outer gravity radius as a fraction of the shorter canvas side.
    pub gravity_radius_factor: f32,
    /// Radius of the full-strength core, same units as the outer factor.
    pub inner_gravity_radius_factor: f32,
    pub trail_length: usize,
    /// Radians per millisecond, scaled by the local effect strength.
    pub swirl_rotation_speed: f32,
    pub min_trail_strength: f32,
    /// Fixed RNG seed; random when absent.
    pub seed: Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            star_density: 0.012,
            all_stars_twinkle: false,
            twinkle_probability: 0.7,
            min_twinkle_speed: 0.5,
            max_twinkle_speed: 1.0,
            exclusion_size: 10.0,
            gravity_strength: 0.35,
            swirl_strength: 0.8,
            gravity_radius_factor: 0.45,
            inner_gravity_radius_factor: 0.08,
            trail_length: 10,
            swirl_rotation_speed: 0.0004,
            min_trail_strength: 0.2,
            seed: None,
        }
    }
}

impl StarfieldConfig {
    /// Radius of the spawn-free disc.
    pub fn exclusion_radius(&self) -> f32 {
        self.exclusion_size / 2.0
    }
}

pub fn load_config(path: &Path) -> Result<StarfieldConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read config file {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

pub fn parse_config(raw: &str) -> Result<StarfieldConfig> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = parse_config(r#"{ "trail_length": 4, "seed": 7 }"#).unwrap();
        assert_eq!(config.trail_length, 4);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.star_density, StarfieldConfig::default().star_density);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(parse_config("{}").unwrap(), StarfieldConfig::default());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(parse_config("{ trail_length: ").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/lensfield.json")).unwrap_err();
        assert!(format!("{err}").contains("/nonexistent/lensfield.json"));
    }

    #[test]
    fn exclusion_radius_is_half_the_size() {
        let config = StarfieldConfig {
            exclusion_size: 30.0,
            ..Default::default()
        };
        assert_eq!(config.exclusion_radius(), 15.0);
    }
}
