use std::{ops::RangeInclusive, path::PathBuf, str::FromStr};

/// Tunables of a visualization session.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Width of the grid area, in pixels of the drawing canvas
    pub grid_width_px: u32,
    /// Height of the grid area, in pixels of the drawing canvas
    pub grid_height_px: u32,
    /// Side of one grid cell, in pixels
    pub cell_size_px: u32,
    /// Number of bars in a freshly generated array
    pub array_len: usize,
    /// Values of a generated array are drawn uniformly from this range
    pub value_range: RangeInclusive<i32>,
    /// Initial animation speed multiplier
    pub speed: f32,
    /// Carving moves per tick while a maze is being generated
    pub maze_steps_per_tick: usize,
    /// Seed for every random choice, `None` to seed from the OS
    pub seed: Option<u64>,
    /// Directory the log file is written to
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_width_px: 1029,
            grid_height_px: 567,
            cell_size_px: 21,
            array_len: 50,
            value_range: 10..=400,
            speed: 1.0,
            maze_steps_per_tick: 10,
            seed: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    pub const ENV_SEED: &'static str = "ALGOVIZ_SEED";
    pub const ENV_ARRAY_SIZE: &'static str = "ALGOVIZ_ARRAY_SIZE";
    pub const ENV_SPEED: &'static str = "ALGOVIZ_SPEED";
    pub const ENV_LOG_DIR: &'static str = "ALGOVIZ_LOG_DIR";

    /// Smallest and largest array the size control allows.
    pub const ARRAY_LEN_RANGE: RangeInclusive<usize> = 10..=100;

    /// Defaults overridden by the `ALGOVIZ_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reading variables through `lookup`.
    /// Values that do not parse are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(seed) = parse_var::<u64>(&lookup, Self::ENV_SEED) {
            config.seed = Some(seed);
        }
        if let Some(len) = parse_var::<usize>(&lookup, Self::ENV_ARRAY_SIZE) {
            if Self::ARRAY_LEN_RANGE.contains(&len) {
                config.array_len = len;
            } else {
                tracing::warn!(
                    "[config] {} = {} is outside {:?}, using {}",
                    Self::ENV_ARRAY_SIZE,
                    len,
                    Self::ARRAY_LEN_RANGE,
                    config.array_len
                );
            }
        }
        if let Some(speed) = parse_var::<f32>(&lookup, Self::ENV_SPEED) {
            if speed.is_finite() {
                config.speed = speed.clamp(super::SpeedControl::MIN, super::SpeedControl::MAX);
            } else {
                tracing::warn!("[config] {} must be a finite number", Self::ENV_SPEED);
            }
        }
        if let Some(dir) = lookup(Self::ENV_LOG_DIR).filter(|dir| !dir.trim().is_empty()) {
            config.log_dir = PathBuf::from(dir);
        }

        tracing::debug!("[config] loaded {:?}", config);
        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("[config] ignoring invalid {} = {:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_give_a_27_by_49_grid() {
        let config = Config::default();
        assert_eq!(config.grid_width_px / config.cell_size_px, 49);
        assert_eq!(config.grid_height_px / config.cell_size_px, 27);
        assert_eq!(config.array_len, 50);
        assert_eq!(config.value_range, 10..=400);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("ALGOVIZ_SEED", "42"),
            ("ALGOVIZ_ARRAY_SIZE", "80"),
            ("ALGOVIZ_SPEED", "2.5"),
            ("ALGOVIZ_LOG_DIR", "/tmp/algoviz"),
        ]));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.array_len, 80);
        assert_eq!(config.speed, 2.5);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/algoviz"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("ALGOVIZ_SEED", "not a number"),
            ("ALGOVIZ_ARRAY_SIZE", "5000"),
            ("ALGOVIZ_SPEED", "9"),
        ]));
        let defaults = Config::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.array_len, defaults.array_len);
        // Out of range speeds are clamped rather than rejected
        assert_eq!(config.speed, 5.0);
    }
}
