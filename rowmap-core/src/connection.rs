use crate::{Driver, Prepared, Result, Transaction};

/// An open store the coordinator drives synchronously.
pub trait Connection: Sized {
    type Driver: Driver;
    type Prepared: Prepared;
    type Transaction: Transaction;

    /// Open the store addressed by `url`, whose scheme must match the driver name.
    fn connect(url: &str) -> Result<Self>;

    fn driver(&self) -> &Self::Driver;

    /// Compile one statement.
    fn prepare(&mut self, sql: &str) -> Result<Self::Prepared>;

    /// Open a transaction, statements run on this connection belong to it until it
    /// is committed or rolled back.
    fn begin(&mut self) -> Result<Self::Transaction>;
}
