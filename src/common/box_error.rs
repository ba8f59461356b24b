//! error type for everything outside the audio path
//!
//! `Send + Sync` so results can cross into the threads that own the meters.
pub type BoxError = std::boxed::Box<
    dyn std::error::Error // must implement Error to satisfy ?
        + std::marker::Send // needed for threads
        + std::marker::Sync, // needed for threads
>;
