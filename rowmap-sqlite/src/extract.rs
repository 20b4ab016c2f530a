use libsqlite3_sys::*;
use rowmap_core::{Error, Result, Value};
use std::{ffi::c_int, slice};

unsafe fn column_bytes<'a>(ptr: *const u8, statement: *mut sqlite3_stmt, index: c_int) -> &'a [u8] {
    unsafe {
        let len = sqlite3_column_bytes(statement, index) as usize;
        if ptr.is_null() || len == 0 {
            return &[];
        }
        slice::from_raw_parts(ptr, len)
    }
}

pub(crate) fn extract_value(statement: *mut sqlite3_stmt, index: c_int) -> Result<Value> {
    unsafe {
        let column_type = sqlite3_column_type(statement, index);
        Ok(match column_type {
            SQLITE_NULL => Value::Null,
            SQLITE_INTEGER => Value::Int64(sqlite3_column_int64(statement, index)),
            SQLITE_FLOAT => Value::Float64(sqlite3_column_double(statement, index)),
            SQLITE_BLOB => {
                let ptr = sqlite3_column_blob(statement, index) as *const u8;
                Value::Blob(column_bytes(ptr, statement, index).to_vec())
            }
            SQLITE_TEXT => {
                let ptr = sqlite3_column_text(statement, index);
                let bytes = column_bytes(ptr, statement, index);
                Value::Varchar(String::from_utf8_lossy(bytes).into_owned())
            }
            _ => {
                return Err(Error::msg(format!(
                    "Unexpected column type {}",
                    column_type
                )));
            }
        })
    }
}
