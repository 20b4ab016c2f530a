use thiserror::Error;

/// Failures raised by the mapping layer itself.
///
/// Describe-time variants are permanent for a given record definition, a failed
/// build never reaches the descriptor cache. Engine failures are not listed here:
/// they travel as plain [`crate::Error`] values carrying the engine message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("Record `{record}` has no field annotated as a column")]
    NoManagedFields { record: &'static str },

    #[error("Record `{record}` has no field carrying the table annotation")]
    MissingTableTag { record: &'static str },

    #[error("Record `{record}` carries the table annotation on more than one field")]
    MultipleTableTags { record: &'static str },

    #[error("Record `{record}` carries the primary key annotation on more than one field")]
    MultiplePrimaryKeyTags { record: &'static str },

    #[error("Primary key field `{field}` must be i64, found `{found}`")]
    PrimaryKeyTypeMismatch {
        field: &'static str,
        found: &'static str,
    },

    #[error("Field `{field}` has type `{found}` which cannot be stored in a column")]
    UnsupportedFieldType {
        field: &'static str,
        found: &'static str,
    },

    #[error("Index annotation `{segment}` on field `{field}` is not of the form `name<sequence>`")]
    MalformedIndexTag { field: &'static str, segment: String },

    #[error("Index `{index}` uses sequence number {sequence} more than once")]
    DuplicateIndexSequence { index: String, sequence: u32 },

    #[error("Index name `{index}` must not be empty or start with `_`")]
    InvalidIndexName { index: String },

    #[error("Index `{index}` is declared more than once")]
    DuplicateIndex { index: String },

    #[error("Column `{column}` is declared more than once")]
    DuplicateColumn { column: String },

    #[error("Column name `{column}` is reserved for the row identifier")]
    ReservedColumn { column: String },

    #[error("Column `{column}` is not managed by the table `{table}`")]
    UnknownColumn { table: String, column: String },

    #[error("Record `{record}` has no primary key")]
    MissingPrimaryKey { record: &'static str },

    #[error("Field `{field}` was expected to be `{expected}`")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Cannot convert {found} into `{expected}`")]
    ArgumentTypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("Nested transactions are not supported")]
    NestedTransaction,

    #[error("There is no active transaction")]
    NoActiveTransaction,

    #[error("The query did not return any row")]
    NoRows,

    #[error("The connection was closed")]
    ConnectionClosed,
}
