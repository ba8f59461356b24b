//! one [`PowerMeter`] per displayed channel of an interleaved stream
//!
//! The bank lives on the audio thread.  Hand [`MeterBank::readings`] to
//! whatever polls the levels.
use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use simple_error::bail;

use crate::common::box_error::BoxError;
use crate::dsp::pcm_sample::PcmSample;
use crate::dsp::power_meter::PowerMeter;

use super::meter_readings::MeterReadings;

/// highest channel index a bank will meter
pub const MAX_CHANNEL: usize = 127;

pub struct MeterBank {
    channels: Vec<usize>,
    meters: Vec<PowerMeter>,
    readings: Arc<[MeterReadings]>,
}

impl MeterBank {
    /// `channels` are the indices, within the interleaved buffer, of the channels to meter
    pub fn build(channels: &[usize], sample_rate: f64) -> Result<MeterBank, BoxError> {
        if channels.is_empty() {
            bail!("meter bank needs at least one channel");
        }
        if let Some(c) = channels.iter().find(|c| **c > MAX_CHANNEL) {
            bail!("channel {} is out of range (max {})", c, MAX_CHANNEL);
        }
        let readings: Arc<[MeterReadings]> = channels.iter().map(|_| MeterReadings::new()).collect();
        let mut bank = MeterBank {
            channels: channels.to_vec(),
            meters: vec![],
            readings,
        };
        bank.set_sample_rate(sample_rate);
        info!("meter bank on channels {:?} at {} Hz", bank.channels, sample_rate);
        Ok(bank)
    }

    /// starts every channel over with fresh meters
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> () {
        self.meters = self
            .channels
            .iter()
            .map(|_| {
                let mut m = PowerMeter::new();
                m.set_sample_rate(sample_rate);
                m
            })
            .collect();
        self.publish();
        debug!("meter bank sample rate now {}", sample_rate);
    }

    pub fn readings(&self) -> Arc<[MeterReadings]> {
        Arc::clone(&self.readings)
    }

    pub fn channels(&self) -> &[usize] {
        &self.channels
    }

    pub fn meter(&self, idx: usize) -> Option<&PowerMeter> {
        self.meters.get(idx)
    }

    /// meter a buffer of `frames` frames of `num_channels` interleaved samples
    ///
    /// configured channels the buffer doesn't carry are metered as silence
    pub fn process_interleaved<S: PcmSample>(&mut self, buffer: &[S], num_channels: usize, frames: usize) -> () {
        for (meter, channel) in self.meters.iter_mut().zip(self.channels.iter()) {
            if *channel < num_channels && *channel < buffer.len() {
                meter.process(&buffer[*channel..], num_channels, frames);
            } else {
                meter.process_silence(frames);
            }
        }
        self.publish();
    }

    pub fn process_silence(&mut self, frames: usize) -> () {
        for meter in self.meters.iter_mut() {
            meter.process_silence(frames);
        }
        self.publish();
    }

    pub fn reset(&mut self) -> () {
        for meter in self.meters.iter_mut() {
            meter.reset();
        }
        self.publish();
    }

    fn publish(&self) {
        for (meter, reading) in self.meters.iter().zip(self.readings.iter()) {
            reading.publish(meter);
        }
    }
}

impl fmt::Display for MeterBank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (channel, reading) in self.channels.iter().zip(self.readings.iter()) {
            write!(f, "{}: {} ", channel, reading)?;
        }
        Ok(())
    }
}
