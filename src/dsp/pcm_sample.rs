//! integer PCM formats the [`PowerMeter`](crate::dsp::power_meter::PowerMeter) can ingest
//!
//! Every format is brought onto the same 15 bit magnitude scale so one filter
//! handles all of them.

/// 8.24 fixed point is really S7.24, shifting by 9 leaves S0.15
pub const INT32_SCALE_SHIFT: u32 = 9;

pub trait PcmSample: Copy {
    /// sample value on the meter's 2^15 full scale (sign preserved)
    fn to_meter_scale(self) -> i64;
}

impl PcmSample for i16 {
    fn to_meter_scale(self) -> i64 {
        self as i64
    }
}

impl PcmSample for i32 {
    fn to_meter_scale(self) -> i64 {
        (self >> INT32_SCALE_SHIFT) as i64
    }
}

#[cfg(test)]
mod test_pcm_sample {
    use super::*;

    #[test]
    fn scales() {
        assert_eq!(i16::MAX.to_meter_scale(), 32767);
        assert_eq!(i16::MIN.to_meter_scale(), -32768);
        // 1.0 in 8.24 lands on 2^15
        assert_eq!((1i32 << 24).to_meter_scale(), 1 << 15);
        assert_eq!((-(1i32 << 24)).to_meter_scale(), -(1 << 15));
        // arithmetic shift rounds toward -inf
        assert_eq!((-1i32).to_meter_scale(), -1);
    }
}
