//! meter settings read from a json file
//!
//! Anything missing from the file falls back to the defaults, so running
//! without a settings file at all is fine.
use json::JsonValue;
use log::{info, warn};
use regex::Regex;
use simple_error::bail;
use std::{
    error::Error,
    fmt,
    fs::File,
    io::{ErrorKind, Write},
};

use crate::common::box_error::BoxError;
use crate::dsp::meter_table::{MeterTable, DEFAULT_MIN_DECIBELS, DEFAULT_ROOT, DEFAULT_TABLE_SIZE};
use crate::dsp::power_meter::DEFAULT_SAMPLE_RATE;
use crate::meter::level_display::{DEFAULT_REFRESH_RATE, MAX_REFRESH_RATE, MIN_REFRESH_RATE};

pub const DEFAULT_SETTINGS_FILE: &str = "meter_settings.json";

#[derive(Debug)]
pub struct MissingConfigError {
    key: String,
}

impl fmt::Display for MissingConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Required configuration value '{}' is missing", self.key)
    }
}

impl Error for MissingConfigError {}

/// key/value settings backed by a json file with a set of defaults underneath
pub struct Config {
    filename: String,
    settings: JsonValue,
    defaults: JsonValue,
}

impl Config {
    pub fn build(filename: &str, defaults: JsonValue) -> Result<Config, std::io::Error> {
        let filename_regex = Regex::new(r"^[a-zA-Z0-9_\-\.]+\.json$")
            .map_err(|e| std::io::Error::new(ErrorKind::Other, e))?;
        if !filename_regex.is_match(filename) {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("Invalid filename '{}' - letters, numbers, underscore, dash, dot only and must end in .json", filename),
            ));
        }

        let mut config = Config {
            filename: filename.to_string(),
            settings: json::object! {},
            defaults,
        };
        if let Err(err) = config.load_from_file() {
            warn!("{}: using default settings: {}", config.filename, err);
        }
        Ok(config)
    }

    fn load_from_file(&mut self) -> std::io::Result<()> {
        let raw_data = std::fs::read_to_string(&self.filename)?;
        match json::parse(&raw_data) {
            Ok(parsed) => {
                self.settings = parsed;
                info!("Loaded settings from {}: {}", self.filename, self.settings.dump());
            }
            Err(err) => {
                warn!("Failed to parse config file {}: {}", self.filename, err);
            }
        }
        Ok(())
    }

    fn lookup<T>(
        &self,
        key: &str,
        default: Option<T>,
        get: impl Fn(&JsonValue) -> Option<T>,
    ) -> Result<T, MissingConfigError> {
        get(&self.settings[key])
            .or(default)
            .or_else(|| get(&self.defaults[key]))
            .ok_or_else(|| MissingConfigError { key: key.to_string() })
    }

    pub fn get_f64_value(&self, key: &str, default: Option<f64>) -> Result<f64, MissingConfigError> {
        self.lookup(key, default, |v| v.as_f64())
    }

    pub fn get_u32_value(&self, key: &str, default: Option<u32>) -> Result<u32, MissingConfigError> {
        self.lookup(key, default, |v| v.as_u32())
    }

    pub fn get_bool_value(&self, key: &str, default: Option<bool>) -> Result<bool, MissingConfigError> {
        self.lookup(key, default, |v| v.as_bool())
    }

    pub fn set_value(&mut self, key: &str, val: impl Into<JsonValue>) -> Result<(), String> {
        let json_val = val.into();
        match json_val {
            JsonValue::Boolean(_) | JsonValue::Number(_) => {
                self.settings[key] = json_val;
                Ok(())
            }
            _ => Err(format!("Unsupported value type for key: {}", key)),
        }
    }

    pub fn save_settings(&self) -> std::io::Result<()> {
        let mut f = File::create(&self.filename)?;
        f.write_all(self.settings.pretty(2).as_bytes())?;
        f.sync_all()
    }
}

/// everything needed to put a meter on screen
#[derive(Debug, Clone, PartialEq)]
pub struct MeterSettings {
    pub min_decibels: f32,
    pub table_size: usize,
    pub root: f32,
    pub sample_rate: f64,
    /// redraws per second
    pub refresh_rate: f64,
    pub num_lights: usize,
    pub shows_peaks: bool,
    pub variable_intensity: bool,
}

impl Default for MeterSettings {
    fn default() -> Self {
        MeterSettings {
            min_decibels: DEFAULT_MIN_DECIBELS,
            table_size: DEFAULT_TABLE_SIZE,
            root: DEFAULT_ROOT,
            sample_rate: DEFAULT_SAMPLE_RATE,
            refresh_rate: DEFAULT_REFRESH_RATE,
            num_lights: 30,
            shows_peaks: true,
            variable_intensity: true,
        }
    }
}

impl MeterSettings {
    pub fn defaults() -> JsonValue {
        let d = MeterSettings::default();
        json::object! {
            "min_decibels": d.min_decibels,
            "table_size": d.table_size,
            "root": d.root,
            "sample_rate": d.sample_rate,
            "refresh_rate": d.refresh_rate,
            "num_lights": d.num_lights,
            "shows_peaks": d.shows_peaks,
            "variable_intensity": d.variable_intensity
        }
    }

    pub fn from_config(config: &Config) -> Result<MeterSettings, BoxError> {
        let settings = MeterSettings {
            min_decibels: config.get_f64_value("min_decibels", None)? as f32,
            table_size: config.get_u32_value("table_size", None)? as usize,
            root: config.get_f64_value("root", None)? as f32,
            sample_rate: config.get_f64_value("sample_rate", None)?,
            refresh_rate: config.get_f64_value("refresh_rate", None)?,
            num_lights: config.get_u32_value("num_lights", None)? as usize,
            shows_peaks: config.get_bool_value("shows_peaks", None)?,
            variable_intensity: config.get_bool_value("variable_intensity", None)?,
        };
        if !(MIN_REFRESH_RATE..=MAX_REFRESH_RATE).contains(&settings.refresh_rate) {
            bail!(
                "refresh_rate must be within {}..={} Hz, got {}",
                MIN_REFRESH_RATE,
                MAX_REFRESH_RATE,
                settings.refresh_rate
            );
        }
        if !settings.sample_rate.is_finite() || settings.sample_rate <= 0.0 {
            bail!("sample_rate must be positive, got {}", settings.sample_rate);
        }
        // surface a bad curve now rather than when the first meter is drawn
        settings.meter_table()?;
        Ok(settings)
    }

    pub fn load(filename: &str) -> Result<MeterSettings, BoxError> {
        let config = Config::build(filename, MeterSettings::defaults())?;
        MeterSettings::from_config(&config)
    }

    pub fn meter_table(&self) -> Result<MeterTable, BoxError> {
        Ok(MeterTable::build(self.min_decibels, self.table_size, self.root)?)
    }
}
