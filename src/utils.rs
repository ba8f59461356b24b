use num::{Float, FromPrimitive};

// utility functions

/// natural log of 0.001 (0.001 is -60 dB)
pub const LOG_001: f64 = -6.907755278982137;
/// linear values at or below this are reported as [`MIN_DECIBELS_POWER`]
pub const MIN_LINEAR_POWER: f64 = 1e-6;
pub const MIN_DECIBELS_POWER: f64 = -120.0;

/// per sample multiplier that takes a value down 60 dB in `decay_time` seconds
///
/// returns 0.0 (decay instantly) when the product of time and rate is too small to divide by
pub fn calc_decay_constant(decay_time: f64, sample_rate: f64) -> f64 {
    let denominator = decay_time * sample_rate;
    if denominator < 1e-5 {
        return 0.0;
    }
    (LOG_001 / denominator).exp()
}

pub fn amp_to_db<T: Float + FromPrimitive>(amp: T) -> T {
    T::from_f64(20.0).unwrap() * amp.log10()
}

pub fn db_to_amp<T: Float + FromPrimitive>(db: T) -> T {
    T::from_f64(10.0).unwrap().powf(T::from_f64(0.05).unwrap() * db)
}

/// amp_to_db with a floor so silence never turns into -inf or NaN
pub fn linear_to_db(p: f64) -> f64 {
    if p.is_nan() || p <= MIN_LINEAR_POWER {
        MIN_DECIBELS_POWER
    } else {
        amp_to_db(p)
    }
}

#[cfg(test)]

mod test_utils {
    use super::*;

    #[test]
    fn decay_constant_hits_minus_60_db() {
        let k = calc_decay_constant(1.0, 100.0);
        let after = k.powi(100);
        assert!((after - 0.001).abs() < 1e-9);
    }

    #[test]
    fn decay_constant_guards_tiny_denominator() {
        assert_eq!(calc_decay_constant(2.5, 0.0), 0.0);
        assert_eq!(calc_decay_constant(0.0, 44100.0), 0.0);
        assert_eq!(calc_decay_constant(1e-7, 1.0), 0.0);
    }

    #[test]
    fn db_conversions() {
        assert!((amp_to_db(1.0_f64)).abs() < 1e-12);
        assert!((amp_to_db(0.1_f64) + 20.0).abs() < 1e-9);
        assert!((db_to_amp(-20.0_f32) - 0.1).abs() < 1e-6);
        assert!((db_to_amp(0.0_f64) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn linear_to_db_floor() {
        assert_eq!(linear_to_db(0.0), MIN_DECIBELS_POWER);
        assert_eq!(linear_to_db(1e-6), MIN_DECIBELS_POWER);
        assert_eq!(linear_to_db(-1.0), MIN_DECIBELS_POWER);
        assert_eq!(linear_to_db(f64::NAN), MIN_DECIBELS_POWER);
        assert!((linear_to_db(0.5) + 6.0206).abs() < 1e-3);
    }
}
