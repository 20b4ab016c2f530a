use crate::{Connection, Result, SqlWriter};

/// Entry point of an engine backend.
pub trait Driver {
    type Connection: Connection;
    type SqlWriter: SqlWriter;

    /// Url scheme handled by this driver, e.g. `sqlite`.
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;

    fn connect(&self, url: &str) -> Result<Self::Connection> {
        Self::Connection::connect(url)
    }
}
