//! turns meter readings into 0..1 levels at the redraw rate
//!
//! Call [`LevelDisplay::refresh`] from the UI timer.  While running the levels
//! follow the meters through the [`MeterTable`].  Once stopped they fall off
//! linearly until everything reads zero, at which point the timer can go.
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::warn;

use crate::common::config::MeterSettings;
use crate::dsp::meter_table::MeterTable;

use super::meter_readings::MeterReadings;

/// display units per second the level drops after stopping
pub const LEVEL_FALLOFF_PER_SEC: f32 = 0.8;
/// display units per second the peak drops after stopping
pub const PEAK_FALLOFF_PER_SEC: f32 = 0.7;
pub const DEFAULT_REFRESH_RATE: f64 = 60.0;
pub const MIN_REFRESH_RATE: f64 = 1.0;
pub const MAX_REFRESH_RATE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelLevel {
    pub level: f32,
    /// 0 when peaks are not shown
    pub peak_level: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Active,
    /// stopped and fully fallen off; nothing will change until restarted
    Idle,
}

pub struct LevelDisplay {
    table: MeterTable,
    readings: Arc<[MeterReadings]>,
    levels: Vec<ChannelLevel>,
    running: bool,
    shows_peaks: bool,
    refresh_interval: Duration,
    falloff_from: Option<Instant>,
}

impl LevelDisplay {
    /// a refresh rate outside 1..=1000 Hz falls back to 60 Hz
    pub fn new(table: MeterTable, readings: Arc<[MeterReadings]>, settings: &MeterSettings) -> LevelDisplay {
        LevelDisplay {
            table,
            levels: vec![ChannelLevel::default(); readings.len()],
            readings,
            running: false,
            shows_peaks: settings.shows_peaks,
            refresh_interval: refresh_interval(settings.refresh_rate),
            falloff_from: None,
        }
    }

    pub fn set_running(&mut self, running: bool, now: Instant) -> () {
        if self.running && !running {
            self.falloff_from = Some(now);
        }
        self.running = running;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_shows_peaks(&mut self, shows_peaks: bool) -> () {
        self.shows_peaks = shows_peaks;
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn levels(&self) -> &[ChannelLevel] {
        &self.levels
    }

    pub fn refresh(&mut self, now: Instant) -> RefreshState {
        if self.running {
            for (level, reading) in self.levels.iter_mut().zip(self.readings.iter()) {
                level.level = self.table.value_at(reading.average_power_db() as f32);
                level.peak_level = if self.shows_peaks {
                    self.table.value_at(reading.peak_power_db() as f32)
                } else {
                    0.0
                };
            }
            return RefreshState::Active;
        }

        let elapsed = match self.falloff_from {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.falloff_from = Some(now);

        let mut max_level: f32 = 0.0;
        for level in self.levels.iter_mut() {
            level.level = (level.level - elapsed * LEVEL_FALLOFF_PER_SEC).max(0.0);
            if self.shows_peaks {
                level.peak_level = (level.peak_level - elapsed * PEAK_FALLOFF_PER_SEC).max(0.0);
                max_level = max_level.max(level.peak_level);
            } else {
                max_level = max_level.max(level.level);
            }
        }
        if max_level <= 0.0 {
            RefreshState::Idle
        } else {
            RefreshState::Active
        }
    }
}

fn refresh_interval(refresh_rate: f64) -> Duration {
    if (MIN_REFRESH_RATE..=MAX_REFRESH_RATE).contains(&refresh_rate) {
        if let Ok(interval) = Duration::try_from_secs_f64(1.0 / refresh_rate) {
            return interval;
        }
    }
    warn!("refresh rate {} Hz out of range, using {} Hz", refresh_rate, DEFAULT_REFRESH_RATE);
    Duration::from_secs_f64(1.0 / DEFAULT_REFRESH_RATE)
}

#[cfg(test)]
mod test_level_display {
    use super::*;
    use crate::dsp::power_meter::PowerMeter;

    fn loud_readings() -> Arc<[MeterReadings]> {
        let readings: Arc<[MeterReadings]> = vec![MeterReadings::new(), MeterReadings::new()].into();
        let mut meter = PowerMeter::new();
        meter.process_i16(&vec![i16::MAX; 1024], 1, 1024);
        readings[0].publish(&meter);
        readings
    }

    #[test]
    fn follows_meters_while_running() {
        let settings = MeterSettings::default();
        let mut display = LevelDisplay::new(MeterTable::default(), loud_readings(), &settings);
        assert!((display.refresh_interval().as_secs_f64() - 1.0 / 60.0).abs() < 1e-6);
        let now = Instant::now();
        display.set_running(true, now);
        assert_eq!(display.refresh(now), RefreshState::Active);
        let levels = display.levels();
        assert!(levels[0].level > 0.99);
        assert!(levels[0].peak_level > 0.99);
        assert_eq!(levels[1], ChannelLevel::default());

        display.set_shows_peaks(false);
        display.refresh(now);
        assert_eq!(display.levels()[0].peak_level, 0.0);
    }

    #[test]
    fn falls_off_when_stopped() {
        let settings = MeterSettings::default();
        let mut display = LevelDisplay::new(MeterTable::default(), loud_readings(), &settings);
        let start = Instant::now();
        display.set_running(true, start);
        display.refresh(start);
        let before = display.levels()[0];
        display.set_running(false, start);
        assert!(!display.is_running());

        assert_eq!(display.refresh(start + Duration::from_millis(500)), RefreshState::Active);
        let after = display.levels()[0];
        assert!((before.level - after.level - 0.4).abs() < 1e-3);
        assert!((before.peak_level - after.peak_level - 0.35).abs() < 1e-3);

        // level is gone after 1.25 s, the peak lingers until ~1.43 s
        assert_eq!(display.refresh(start + Duration::from_millis(1300)), RefreshState::Active);
        assert_eq!(display.levels()[0].level, 0.0);
        assert!(display.levels()[0].peak_level > 0.0);
        assert_eq!(display.refresh(start + Duration::from_millis(1500)), RefreshState::Idle);
        assert_eq!(display.levels()[0].peak_level, 0.0);
    }

    #[test]
    fn bad_refresh_rate_falls_back() {
        let default_interval = Duration::from_secs_f64(1.0 / DEFAULT_REFRESH_RATE);
        for rate in [0.0, -30.0, 1e-300, f64::NAN, f64::INFINITY, 1e9] {
            let settings = MeterSettings {
                refresh_rate: rate,
                ..MeterSettings::default()
            };
            let display = LevelDisplay::new(MeterTable::default(), loud_readings(), &settings);
            assert_eq!(display.refresh_interval(), default_interval);
        }
        let settings = MeterSettings {
            refresh_rate: 20.0,
            ..MeterSettings::default()
        };
        let display = LevelDisplay::new(MeterTable::default(), loud_readings(), &settings);
        assert_eq!(display.refresh_interval(), Duration::from_millis(50));
    }

    #[test]
    fn never_started_is_idle() {
        let settings = MeterSettings::default();
        let mut display = LevelDisplay::new(MeterTable::default(), loud_readings(), &settings);
        assert_eq!(display.refresh(Instant::now()), RefreshState::Idle);
    }
}
