use crate::{SqliteDriver, connection::{Handle, prepare}};
use libsqlite3_sys::sqlite3_get_autocommit;
use rowmap_core::{Driver, Prepared, Result, SqlWriter, Transaction};

/// Transaction opened with `BEGIN` on the connection it was started from.
pub struct SqliteTransaction {
    connection: Handle,
}

impl SqliteTransaction {
    pub(crate) fn new(connection: Handle) -> Result<Self> {
        let result = Self { connection };
        result.run(|w, out| w.write_transaction_begin(out))?;
        Ok(result)
    }

    fn run(
        &self,
        write: impl FnOnce(&<SqliteDriver as Driver>::SqlWriter, &mut String),
    ) -> Result<()> {
        let mut sql = String::new();
        write(&SqliteDriver::new().sql_writer(), &mut sql);
        prepare(&self.connection, &sql)?.execute(&[]).map(|_| ())
    }
}

impl Transaction for SqliteTransaction {
    /// A failed COMMIT can leave the transaction open (deferred constraints), it is
    /// rolled back so the connection is idle either way.
    fn commit(self) -> Result<()> {
        let result = self.run(|w, out| w.write_transaction_commit(out));
        if result.is_err() && unsafe { sqlite3_get_autocommit(**self.connection) } == 0 {
            if let Err(e) = self.run(|w, out| w.write_transaction_rollback(out)) {
                log::error!("{:#}", e.context("While rolling back after a failed commit"));
            }
        }
        result
    }

    fn rollback(self) -> Result<()> {
        self.run(|w, out| w.write_transaction_rollback(out))
    }
}
