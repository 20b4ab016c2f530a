use crate::Result;

/// An open transaction, finished exactly once.
pub trait Transaction {
    /// Leaves no transaction open on the connection, even when it fails.
    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}
