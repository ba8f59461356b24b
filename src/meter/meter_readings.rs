//! readings of one meter shared between the audio thread and the redraw timer
//!
//! The audio thread publishes once per block, any number of readers poll.  A
//! reader can see the average from one block and the peak from the next; for a
//! meter that is fine.
use std::fmt;
use std::sync::atomic::Ordering;

use atomic_float::AtomicF64;

use crate::dsp::power_meter::PowerMeter;
use crate::utils::linear_to_db;

#[derive(Debug, Default)]
pub struct MeterReadings {
    average: AtomicF64,
    peak: AtomicF64,
}

impl MeterReadings {
    pub fn new() -> MeterReadings {
        MeterReadings::default()
    }

    pub fn publish(&self, meter: &PowerMeter) -> () {
        self.average.store(meter.average_power_linear(), Ordering::Relaxed);
        self.peak.store(meter.peak_power_linear(), Ordering::Relaxed);
    }

    pub fn clear(&self) -> () {
        self.average.store(0.0, Ordering::Relaxed);
        self.peak.store(0.0, Ordering::Relaxed);
    }

    pub fn average_power_linear(&self) -> f64 {
        self.average.load(Ordering::Relaxed)
    }

    pub fn peak_power_linear(&self) -> f64 {
        self.peak.load(Ordering::Relaxed)
    }

    pub fn average_power_db(&self) -> f64 {
        linear_to_db(self.average_power_linear())
    }

    pub fn peak_power_db(&self) -> f64 {
        linear_to_db(self.peak_power_linear())
    }
}

impl fmt::Display for MeterReadings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[ avg: {:.1} dB, peak: {:.1} dB ]",
            self.average_power_db(),
            self.peak_power_db()
        )
    }
}
