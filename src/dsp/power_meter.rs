//! calculates running average RMS power and peak of an audio stream
//!
//! Feed it blocks from the audio callback with [`PowerMeter::process`].  Decay
//! times are expressed per sample and turned into one coefficient per block,
//! which is only recomputed when the block size changes.  Nothing here
//! allocates, blocks or fails, so it is safe to call on a real time thread.
//!
//! used by [`crate::meter::meter_bank::MeterBank`]
use std::f64::consts::SQRT_2;
use std::fmt::{self, Display};

use crate::utils::{calc_decay_constant, linear_to_db};

use super::pcm_sample::PcmSample;

/// 60 dB decay time of the held peak once the hold time is over
pub const PEAK_DECAY_TIME: f64 = 2.5;
/// 60 dB decay time of the peak and average envelopes
pub const DECAY_TIME: f64 = 1.24;
/// seconds a new maximum peak is held before it starts to fall
pub const PEAK_RESET_TIME: f64 = 0.9;
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;
pub const UNKNOWN_SAMPLE_RATE: f64 = 0.0;

// per block coefficients in effect until the first block sizes them
const PEAK_DECAY: f64 = 0.006;
const DECAY: f64 = 0.016;

// average power is a one pole low pass, coefficient 1/32
const AVERAGE_FILTER_SHIFT: u32 = 5;
// sample is 0..32768 (2^15), so average power is relative to 2^30
const AVERAGE_POWER_FULL_SCALE: f64 = (1u64 << 30) as f64;
const SAMPLE_FULL_SCALE: f64 = (1u64 << 15) as f64;

#[derive(Debug, Clone)]
pub struct PowerMeter {
    sample_rate: f64,
    peak_decay_1: f64,
    peak_decay: f64,
    decay_1: f64,
    decay: f64,
    prev_block_size: Option<usize>,

    average_power: i64,
    peak_hold_count: usize,
    peak: f64,
    average_power_peak: f64,
    max_peak: f64,
}

impl PowerMeter {
    pub fn new() -> PowerMeter {
        PowerMeter {
            sample_rate: UNKNOWN_SAMPLE_RATE,
            peak_decay_1: 0.0,
            peak_decay: PEAK_DECAY,
            decay_1: 0.0,
            decay: DECAY,
            prev_block_size: None,
            average_power: 0,
            peak_hold_count: 0,
            peak: 0.0,
            average_power_peak: 0.0,
            max_peak: 0.0,
        }
    }

    pub fn reset(&mut self) -> () {
        self.clear_envelopes();
        self.prev_block_size = None;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) -> () {
        self.sample_rate = sample_rate;
        self.peak_decay_1 = calc_decay_constant(PEAK_DECAY_TIME, sample_rate);
        self.decay_1 = calc_decay_constant(DECAY_TIME, sample_rate);
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// drop all signal history when there is no audio (muted, underrun)
    ///
    /// sample rate and block size derived coefficients are kept
    pub fn process_silence(&mut self, _frames: usize) -> () {
        self.clear_envelopes();
    }

    pub fn process_i16(&mut self, samples: &[i16], stride: usize, frames: usize) -> () {
        self.process(samples, stride, frames);
    }

    pub fn process_i32(&mut self, samples: &[i32], stride: usize, frames: usize) -> () {
        self.process(samples, stride, frames);
    }

    /// meter `frames` samples taken every `stride` elements of `samples`
    ///
    /// A stride larger than one pulls a single channel out of an interleaved
    /// buffer.  Frames past the end of the slice are not read, and a zero
    /// frame count or stride leaves the meter untouched.
    pub fn process<S: PcmSample>(&mut self, samples: &[S], stride: usize, frames: usize) -> () {
        if stride == 0 || samples.is_empty() {
            return;
        }
        let frames = frames.min((samples.len() - 1) / stride + 1);
        if frames == 0 {
            return;
        }
        self.scale_decay_constants(frames);

        let mut average_power = self.average_power;
        let mut max_sample: i64 = 0;
        for s in samples.iter().step_by(stride).take(frames) {
            let sample = s.to_meter_scale().abs();
            if sample > max_sample {
                max_sample = sample;
            }
            average_power += (sample * sample - average_power) >> AVERAGE_FILTER_SHIFT;
        }

        self.save_peaks(frames, average_power, max_sample);
    }

    /// linear RMS reading, 0..1
    pub fn average_power_linear(&self) -> f64 {
        self.average_power_peak
    }

    /// linear held peak reading, 0..1
    pub fn peak_power_linear(&self) -> f64 {
        self.max_peak
    }

    pub fn average_power_db(&self) -> f64 {
        linear_to_db(self.average_power_linear())
    }

    pub fn peak_power_db(&self) -> f64 {
        linear_to_db(self.peak_power_linear())
    }

    fn clear_envelopes(&mut self) {
        self.peak = 0.0;
        self.max_peak = 0.0;
        self.average_power = 0;
        self.average_power_peak = 0.0;
        self.peak_hold_count = 0;
    }

    fn scale_decay_constants(&mut self, frames: usize) {
        if self.prev_block_size != Some(frames) {
            if self.sample_rate == UNKNOWN_SAMPLE_RATE {
                self.set_sample_rate(DEFAULT_SAMPLE_RATE);
            }
            let n = frames as f64;
            self.peak_decay = 1.0 - self.peak_decay_1.powf(n);
            self.decay = 1.0 - self.decay_1.powf(n);
            self.prev_block_size = Some(frames);
        }
    }

    fn save_peaks(&mut self, frames: usize, average_power: i64, max_sample: i64) {
        let f_average_power = average_power as f64 / AVERAGE_POWER_FULL_SCALE;
        let peak_value = max_sample as f64 / SAMPLE_FULL_SCALE;
        // filtered energy of a sine sits 3 dB under its peak
        let power_value = f_average_power.sqrt() * SQRT_2;

        self.average_power = average_power;

        if self.peak > peak_value {
            self.peak += (peak_value - self.peak) * self.decay;
        } else {
            self.peak = peak_value;
        }

        self.peak_hold_count += frames;
        let peak_reset_frames = (PEAK_RESET_TIME * self.sample_rate) as usize;
        if self.peak_hold_count >= peak_reset_frames {
            self.max_peak -= self.max_peak * self.peak_decay;
        }
        if self.max_peak < self.peak {
            self.max_peak = self.peak;
            self.peak_hold_count = 0;
        }

        if self.average_power_peak > power_value {
            self.average_power_peak += (power_value - self.average_power_peak) * self.decay;
        } else {
            self.average_power_peak = power_value;
        }

        // keeps the average bar from ever drawing above the peak; a full scale
        // square wave would otherwise read sqrt(2)
        if self.average_power_peak > self.max_peak {
            self.average_power_peak = self.max_peak;
        }
    }
}

impl Default for PowerMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PowerMeter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{ peak: {}, max_peak: {}, avg: {}, hold: {} }}",
            self.peak, self.max_peak, self.average_power_peak, self.peak_hold_count
        )
    }
}
