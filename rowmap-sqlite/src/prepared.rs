use crate::{CBox, connection::Handle, error_message_from_ptr, extract::extract_value};
use libsqlite3_sys::*;
use rowmap_core::{Error, Prepared, Result, Row, Rows, RowsAffected, Value, truncate_long};
use std::{
    cell::Cell,
    ffi::{CStr, c_int},
    fmt::{self, Display},
    os::raw::{c_char, c_void},
    rc::Rc,
    thread,
};

pub(crate) struct Statement {
    statement: CBox<*mut sqlite3_stmt>,
    // Keeps the connection open for as long as the statement lives.
    connection: Handle,
    generation: Cell<u64>,
}

impl Statement {
    fn sql(&self) -> String {
        unsafe {
            let sql = sqlite3_sql(*self.statement);
            if sql.is_null() {
                return String::new();
            }
            CStr::from_ptr(sql).to_string_lossy().into_owned()
        }
    }

    fn error(&self, rc: c_int) -> Error {
        let message =
            unsafe { error_message_from_ptr(&sqlite3_errmsg(**self.connection)).to_string() };
        Error::msg(format!("{} (code {})", message, rc))
    }

    /// Reset the statement and bind `args`, invalidating any previous rows.
    fn start(&self, args: &[Value]) -> Result<u64> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        unsafe {
            sqlite3_reset(*self.statement);
            sqlite3_clear_bindings(*self.statement);
            let expected = sqlite3_bind_parameter_count(*self.statement) as usize;
            if expected != args.len() {
                return Err(Error::msg(format!(
                    "The statement expects {} arguments, {} were supplied",
                    expected,
                    args.len()
                )));
            }
            for (i, value) in args.iter().enumerate() {
                self.bind(i as c_int + 1, value)?;
            }
        }
        Ok(generation)
    }

    unsafe fn bind(&self, index: c_int, value: &Value) -> Result<()> {
        let statement = *self.statement;
        let rc = unsafe {
            match value {
                Value::Null => sqlite3_bind_null(statement, index),
                Value::Boolean(v) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int8(v) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int16(v) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int32(v) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int64(v) => sqlite3_bind_int64(statement, index, *v),
                Value::UInt8(v) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::UInt16(v) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::UInt32(v) => sqlite3_bind_int64(statement, index, *v as sqlite3_int64),
                Value::UInt64(v) => {
                    let Ok(v) = sqlite3_int64::try_from(*v) else {
                        return Err(Error::msg(format!(
                            "Cannot bind u64 value `{}` into sqlite integer because it's out of bounds",
                            v
                        )));
                    };
                    sqlite3_bind_int64(statement, index, v)
                }
                Value::Float32(v) => sqlite3_bind_double(statement, index, *v as f64),
                Value::Float64(v) => sqlite3_bind_double(statement, index, *v),
                Value::Varchar(v) => sqlite3_bind_text(
                    statement,
                    index,
                    v.as_ptr() as *const c_char,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                Value::Blob(v) => sqlite3_bind_blob(
                    statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
            }
        };
        if rc != SQLITE_OK {
            return Err(self
                .error(rc)
                .context(format!("Cannot bind parameter {}", index)));
        }
        Ok(())
    }

    fn step(&self) -> Result<bool> {
        loop {
            match unsafe { sqlite3_step(*self.statement) } {
                SQLITE_ROW => return Ok(true),
                SQLITE_DONE => return Ok(false),
                SQLITE_BUSY if self.busy_retry() => thread::yield_now(),
                rc => return Err(self.error(rc)),
            }
        }
    }

    /// Only a COMMIT or a statement outside an explicit transaction may wait on a
    /// busy database, inside a transaction the lock holder can be waiting on us.
    fn busy_retry(&self) -> bool {
        let autocommit = unsafe { sqlite3_get_autocommit(**self.connection) } != 0;
        autocommit || {
            let sql = self.sql();
            let sql = sql.trim_start().as_bytes();
            sql.len() >= 6 && sql[..6].eq_ignore_ascii_case(b"COMMIT")
        }
    }

    fn reset(&self) {
        unsafe {
            sqlite3_reset(*self.statement);
        }
    }

    fn context(&self, error: Error) -> Error {
        let error = error.context(format!(
            "While executing the query:\n{}",
            truncate_long!(self.sql())
        ));
        log::error!("{:#}", error);
        error
    }
}

/// Compiled SQLite statement, clones share the same compiled handle.
#[derive(Clone)]
pub struct SqlitePrepared {
    inner: Rc<Statement>,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<*mut sqlite3_stmt>, connection: Handle) -> Self {
        Self {
            inner: Rc::new(Statement {
                statement,
                connection,
                generation: Cell::new(0),
            }),
        }
    }
}

impl Prepared for SqlitePrepared {
    type Rows = SqliteRows;

    fn execute(&self, args: &[Value]) -> Result<RowsAffected> {
        let statement = &self.inner;
        let connection = **statement.connection;
        let before = unsafe { sqlite3_total_changes64(connection) };
        let result = statement.start(args).and_then(|_| {
            while statement.step()? {}
            Ok(())
        });
        statement.reset();
        match result {
            Ok(()) => unsafe {
                Ok(RowsAffected {
                    rows_affected: (sqlite3_total_changes64(connection) - before).max(0) as u64,
                    last_affected_id: Some(sqlite3_last_insert_rowid(connection)),
                })
            },
            Err(e) => Err(statement.context(e)),
        }
    }

    fn query(&self, args: &[Value]) -> Result<SqliteRows> {
        let generation = match self.inner.start(args) {
            Ok(v) => v,
            Err(e) => {
                self.inner.reset();
                return Err(self.inner.context(e));
            }
        };
        Ok(SqliteRows {
            statement: self.inner.clone(),
            generation,
            current: false,
            done: false,
        })
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&truncate_long!(self.inner.sql()))
    }
}

/// Rows of one query, valid until the statement runs again.
pub struct SqliteRows {
    statement: Rc<Statement>,
    generation: u64,
    current: bool,
    done: bool,
}

impl SqliteRows {
    fn check(&self) -> Result<()> {
        if self.statement.generation.get() != self.generation {
            return Err(Error::msg(
                "The rows are no longer valid, the statement was executed again",
            ));
        }
        Ok(())
    }
}

impl Rows for SqliteRows {
    fn next(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        self.check()?;
        let step = self.statement.step();
        self.current = matches!(step, Ok(true));
        match step {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.done = true;
                self.statement.reset();
                Ok(false)
            }
            Err(e) => {
                self.done = true;
                self.statement.reset();
                Err(self.statement.context(e))
            }
        }
    }

    fn row(&self) -> Result<Row> {
        self.check()?;
        if !self.current {
            return Err(Error::msg("There is no current row"));
        }
        let statement = *self.statement.statement;
        let count = unsafe { sqlite3_column_count(statement) };
        (0..count)
            .map(|i| extract_value(statement, i))
            .collect::<Result<Vec<_>>>()
            .map(Vec::into_boxed_slice)
    }
}

impl Drop for SqliteRows {
    fn drop(&mut self) {
        if !self.done && self.statement.generation.get() == self.generation {
            self.statement.reset();
        }
    }
}
