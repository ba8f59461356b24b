//! rtmeter - Real Time level Meter library
//!
//! provides the pieces to put audio levels on screen: a streaming power/peak
//! meter that runs inside the audio callback, a decibel response curve for the
//! display, and the redraw side that polls the meters at a fixed rate
pub mod common;
pub mod dsp;
pub mod meter;
pub mod utils;
