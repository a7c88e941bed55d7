//! Integration tests

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod realtime;
pub mod sync;
