//! components that carry meter levels from the audio thread to a display
//!
//! The audio callback feeds a [`MeterBank`](crate::meter::meter_bank::MeterBank),
//! which publishes into shared [`MeterReadings`](crate::meter::meter_readings::MeterReadings).
//! A [`LevelDisplay`](crate::meter::level_display::LevelDisplay) polls those at the
//! redraw rate and a [`LightLadder`](crate::meter::light_ladder::LightLadder) turns
//! the result into lights.

pub mod level_display;
pub mod light_ladder;
pub mod meter_bank;
pub mod meter_readings;
