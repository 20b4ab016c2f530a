use crate::{Result, Row, RowsAffected, Value};
use std::fmt::Display;

/// A compiled statement, cheap to clone, reusable with different arguments.
///
/// Arguments are positional and bound on every call. Executing a statement again
/// invalidates the rows of any previous query on it.
pub trait Prepared: Clone + Display {
    type Rows: Rows;

    /// Run a statement that returns no rows.
    fn execute(&self, args: &[Value]) -> Result<RowsAffected>;

    /// Run a statement that returns rows.
    fn query(&self, args: &[Value]) -> Result<Self::Rows>;
}

/// Forward only cursor over the rows of a query.
pub trait Rows {
    /// Step to the next row, `false` once exhausted.
    fn next(&mut self) -> Result<bool>;

    /// Values of the current row, in select order.
    fn row(&self) -> Result<Row>;
}
