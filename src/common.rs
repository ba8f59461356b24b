//! These modules are shared among the library and the demo tools.
pub mod box_error;
pub mod config;
