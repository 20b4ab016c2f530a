mod cbox;
mod connection;
mod driver;
mod extract;
mod prepared;
mod sql_writer;
mod transaction;

use std::{
    ffi::{CStr, c_char},
    ptr,
};

pub(crate) use cbox::*;
pub use connection::*;
pub use driver::*;
pub use prepared::*;
pub use sql_writer::*;
pub use transaction::*;

/// Result returning coordinator over SQLite.
pub type SqliteDatabase = rowmap_core::Database<SqliteConnection>;
/// Error latching coordinator over SQLite.
pub type SqliteSession = rowmap_core::Session<SqliteConnection>;

pub(crate) fn error_message_from_ptr(ptr: &'_ *const c_char) -> &'_ str {
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
