//! FFI entry crate for the Flutter mind-map shell.

pub mod api;
