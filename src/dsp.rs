//! Modules related to DSP algorithms, ie: PowerMeter, MeterTable

pub mod meter_table;
pub mod pcm_sample;
pub mod power_meter;
