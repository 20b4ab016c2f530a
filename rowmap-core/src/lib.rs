mod as_value;
mod connection;
mod database;
mod descriptor;
mod driver;
mod error;
mod marshal;
mod prepared;
mod query;
mod record;
mod scalar;
mod session;
mod sql_writer;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use connection::*;
pub use database::*;
pub use descriptor::*;
pub use driver::*;
pub use error::*;
pub use marshal::*;
pub use prepared::*;
pub use query::*;
pub use record::*;
pub use scalar::*;
pub use session::*;
pub use sql_writer::*;
pub use transaction::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
