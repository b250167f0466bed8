mod cbox;
mod connection;
mod driver;
mod extract;
mod prepared;

use libsqlite3_sys::SQLITE_TOOBIG;
use sqlbind_core::DriverError;
use std::{
    ffi::{CStr, c_char, c_int},
    ptr,
};

pub(crate) use cbox::*;
pub use connection::*;
pub use driver::*;
pub use prepared::*;

pub(crate) fn error_message_from_ptr<'a>(ptr: &'a *const c_char) -> &'a str {
    unsafe {
        if *ptr != ptr::null() {
            CStr::from_ptr(*ptr)
                .to_str()
                .unwrap_or("Unknown error (the error message was not a valid C string)")
        } else {
            "Unknown error (could not extract the error message)"
        }
    }
}

/// Length or index as the `int` SQLite expects, failing instead of truncating.
pub(crate) fn as_c_int(value: usize, what: &str) -> Result<c_int, DriverError> {
    c_int::try_from(value).map_err(|_| {
        DriverError::new(
            SQLITE_TOOBIG,
            format!("The {what} is too large for sqlite: {value}"),
        )
    })
}
