use crate::{CBox, SqliteDriver, SqlitePrepared, SqliteTransaction, error_message_from_ptr};
use libsqlite3_sys::{
    SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI, sqlite3,
    sqlite3_close, sqlite3_errmsg, sqlite3_finalize, sqlite3_open_v2, sqlite3_prepare_v2,
};
use rowmap_core::{Connection, Context, Driver, Error, Result, truncate_long};
use std::{
    ffi::{CStr, CString, c_int},
    ptr,
    rc::Rc,
};

pub(crate) type Handle = Rc<CBox<*mut sqlite3>>;

/// One SQLite database opened by url: `sqlite://data/example.db?mode=rwc` or
/// `sqlite://:memory:`.
pub struct SqliteConnection {
    pub(crate) connection: Handle,
}

pub(crate) fn prepare(connection: &Handle, sql: &str) -> Result<SqlitePrepared> {
    let context = || format!("While preparing the query:\n{}", truncate_long!(sql));
    let sql_c = match CString::new(sql.as_bytes()) {
        Ok(v) => v,
        Err(e) => {
            let error = Error::new(e)
                .context("Could not create a CString from the query String")
                .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
    };
    unsafe {
        let mut statement = CBox::new(ptr::null_mut(), |p| {
            sqlite3_finalize(p);
        });
        let mut tail = ptr::null();
        let rc = sqlite3_prepare_v2(
            ***connection,
            sql_c.as_ptr(),
            sql.len() as c_int + 1,
            &mut *statement,
            &mut tail,
        );
        if rc != SQLITE_OK {
            let error =
                Error::msg(error_message_from_ptr(&sqlite3_errmsg(***connection)).to_string())
                    .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        if statement.is_null() {
            let error = Error::msg("The query does not contain any statement").context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        if !tail.is_null() && !CStr::from_ptr(tail).to_bytes().trim_ascii().is_empty() {
            let error =
                Error::msg("Cannot prepare more than one statement at a time").context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(SqlitePrepared::new(statement, connection.clone()))
    }
}

impl Connection for SqliteConnection {
    type Driver = SqliteDriver;
    type Prepared = SqlitePrepared;
    type Transaction = SqliteTransaction;

    fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = format!("{}://", <Self::Driver as Driver>::NAME);
        let Some(location) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                &prefix
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let uri = CString::new(format!("file:{}", location)).with_context(context)?;
        let mut connection: CBox<*mut sqlite3>;
        unsafe {
            connection = CBox::new(ptr::null_mut(), |p| {
                sqlite3_close(p);
            });
            let rc = sqlite3_open_v2(
                uri.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                ptr::null(),
            );
            if rc != SQLITE_OK {
                let message = if connection.is_null() {
                    "Could not allocate the connection".to_string()
                } else {
                    error_message_from_ptr(&sqlite3_errmsg(*connection)).to_string()
                };
                let error = Error::msg(message).context(format!("Could not open `{}`", url));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(Self {
            connection: Rc::new(connection),
        })
    }

    fn driver(&self) -> &SqliteDriver {
        &SqliteDriver {}
    }

    fn prepare(&mut self, sql: &str) -> Result<SqlitePrepared> {
        prepare(&self.connection, sql)
    }

    fn begin(&mut self) -> Result<SqliteTransaction> {
        SqliteTransaction::new(self.connection.clone())
    }
}
