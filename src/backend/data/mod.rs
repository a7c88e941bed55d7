//! REST handlers for the shared document

pub mod handlers;

pub use handlers::{handle_get_data, handle_put_data, handle_version};
