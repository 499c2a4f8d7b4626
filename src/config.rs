use std::convert::TryFrom;
use std::path::Path;
use std::time::Duration;

use async_std::fs::File;
use async_std::prelude::*;
use yaml_rust::{ Yaml, YamlLoader };

use crate::error::ConfigError;

pub const DEFAULT_MINIMUM_SWITCH_INTERVAL_SECS: u64 = 3;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectorConfig {
    pub minimum_switch_interval: Duration,
    pub auto_switch_enabled: bool,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        DirectorConfig {
            minimum_switch_interval: Duration::from_secs(DEFAULT_MINIMUM_SWITCH_INTERVAL_SECS),
            auto_switch_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    pub queue_capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig { queue_capacity: DEFAULT_QUEUE_CAPACITY }
    }
}

/// Parameters of the simulated telemetry source.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub cars: u16,
    pub track_meters: f32,
    pub realtime_update_interval: Duration,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            cars: 12,
            track_meters: 5793.0,
            realtime_update_interval: Duration::from_millis(250),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub director: DirectorConfig,
    pub sink: SinkConfig,
    pub simulation: SimulationConfig,
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_string(), reason: reason.to_string() }
}

fn read_u64(value: &Yaml, key: &str) -> Result<Option<u64>, ConfigError> {
    match value {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(number) if *number >= 0 => Ok(Some(*number as u64)),
        Yaml::Integer(_) => Err(invalid(key, "must not be negative")),
        _ => Err(invalid(key, "expected an integer")),
    }
}

fn read_f64(value: &Yaml, key: &str) -> Result<Option<f64>, ConfigError> {
    match value {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(number) => Ok(Some(*number as f64)),
        Yaml::Real(_) => value.as_f64().map(Some).ok_or_else(|| invalid(key, "not a number")),
        _ => Err(invalid(key, "expected a number")),
    }
}

fn read_bool(value: &Yaml, key: &str) -> Result<Option<bool>, ConfigError> {
    match value {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Boolean(flag) => Ok(Some(*flag)),
        _ => Err(invalid(key, "expected true or false")),
    }
}

impl TryFrom<&String> for Config {
    type Error = ConfigError;

    fn try_from(str: &String) -> Result<Self, Self::Error> {
        let documents = YamlLoader::load_from_str(str)
                .map_err(|err| ConfigError::Parse(format!("{:?}", err)))?;

        let mut config = Config::default();
        let parsed = match documents.first() {
            Some(parsed) => parsed,
            None => return Ok(config),
        };

        let director = &parsed["director"];
        if let Some(interval) = read_f64(&director["minimum_switch_interval_seconds"], "director.minimum_switch_interval_seconds")? {
            if !(interval >= 0.0) || !interval.is_finite() {
                return Err(invalid("director.minimum_switch_interval_seconds", "must be a non-negative number"));
            }
            config.director.minimum_switch_interval = Duration::from_secs_f64(interval);
        }
        if let Some(enabled) = read_bool(&director["auto_switch_enabled"], "director.auto_switch_enabled")? {
            config.director.auto_switch_enabled = enabled;
        }

        if let Some(capacity) = read_u64(&parsed["sink"]["queue_capacity"], "sink.queue_capacity")? {
            if capacity == 0 {
                return Err(invalid("sink.queue_capacity", "must be at least 1"));
            }
            config.sink.queue_capacity = capacity as usize;
        }

        let simulation = &parsed["simulation"];
        if let Some(cars) = read_u64(&simulation["cars"], "simulation.cars")? {
            if cars == 0 || cars > u16::MAX as u64 {
                return Err(invalid("simulation.cars", "must be between 1 and 65535"));
            }
            config.simulation.cars = cars as u16;
        }
        if let Some(meters) = read_f64(&simulation["track_meters"], "simulation.track_meters")? {
            if !(meters > 0.0) {
                return Err(invalid("simulation.track_meters", "must be positive"));
            }
            config.simulation.track_meters = meters as f32;
        }
        if let Some(interval) = read_u64(&simulation["realtime_update_interval_ms"], "simulation.realtime_update_interval_ms")? {
            config.simulation.realtime_update_interval = Duration::from_millis(interval);
        }
        config.simulation.seed = read_u64(&simulation["seed"], "simulation.seed")?;

        Ok(config)
    }
}

impl Config {
    pub async fn load(path: &Path) -> Result<Config, ConfigError> {
        info!["Loading config file {}", path.display()];

        let mut file = File::open(path).await
            .map_err(|err| ConfigError::Parse(format!("could not open {}: {}", path.display(), err)))?;
        let mut content = String::new();
        file.read_to_string(&mut content).await
            .map_err(|err| ConfigError::Parse(format!("could not read {}: {}", path.display(), err)))?;

        Config::try_from(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::try_from(&String::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.director.minimum_switch_interval, Duration::from_secs(3));
        assert!(!config.director.auto_switch_enabled);
    }

    #[test]
    fn reads_all_sections() {
        let yaml = "
director:
  minimum_switch_interval_seconds: 8
  auto_switch_enabled: true
sink:
  queue_capacity: 16
simulation:
  cars: 20
  track_meters: 4011.5
  realtime_update_interval_ms: 100
  seed: 42
".to_string();
        let config = Config::try_from(&yaml).unwrap();

        assert_eq!(config.director.minimum_switch_interval, Duration::from_secs(8));
        assert!(config.director.auto_switch_enabled);
        assert_eq!(config.sink.queue_capacity, 16);
        assert_eq!(config.simulation.cars, 20);
        assert_eq!(config.simulation.track_meters, 4011.5);
        assert_eq!(config.simulation.realtime_update_interval, Duration::from_millis(100));
        assert_eq!(config.simulation.seed, Some(42));
    }

    #[test]
    fn fractional_interval() {
        let yaml = "director:\n  minimum_switch_interval_seconds: 1.5\n".to_string();
        let config = Config::try_from(&yaml).unwrap();
        assert_eq!(config.director.minimum_switch_interval, Duration::from_millis(1500));
        assert_eq!(config.sink, SinkConfig::default());
    }

    #[test]
    fn rejects_wrong_types_and_ranges() {
        let wrong_type = "director:\n  auto_switch_enabled: sometimes\n".to_string();
        assert!(matches!(Config::try_from(&wrong_type), Err(ConfigError::InvalidValue { .. })));

        let zero_capacity = "sink:\n  queue_capacity: 0\n".to_string();
        assert!(matches!(Config::try_from(&zero_capacity), Err(ConfigError::InvalidValue { .. })));

        let negative = "director:\n  minimum_switch_interval_seconds: -2\n".to_string();
        assert!(matches!(Config::try_from(&negative), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn rejects_broken_yaml() {
        let broken = "director: [unclosed".to_string();
        assert!(matches!(Config::try_from(&broken), Err(ConfigError::Parse(_))));
    }
}
