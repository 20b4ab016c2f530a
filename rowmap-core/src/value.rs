use std::fmt::{self, Display};

/// Storage classes a managed column can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Numeric,
    Text,
    Binary,
}

/// Dynamically typed value moving between record fields and statement parameters.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Varchar(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Name of the variant, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "bool",
            Value::Int8(..) => "i8",
            Value::Int16(..) => "i16",
            Value::Int32(..) => "i32",
            Value::Int64(..) => "i64",
            Value::UInt8(..) => "u8",
            Value::UInt16(..) => "u16",
            Value::UInt32(..) => "u32",
            Value::UInt64(..) => "u64",
            Value::Float32(..) => "f32",
            Value::Float64(..) => "f64",
            Value::Varchar(..) => "text",
            Value::Blob(..) => "blob",
        }
    }
}

macro_rules! write_integer {
    ($f:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $f.write_str(buffer.format($value))
    }};
}
macro_rules! write_float {
    ($f:ident, $value:expr) => {{
        if $value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            $f.write_str(buffer.format($value))
        } else {
            write!($f, "{}", $value)
        }
    }};
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Int8(v) => write_integer!(f, *v),
            Value::Int16(v) => write_integer!(f, *v),
            Value::Int32(v) => write_integer!(f, *v),
            Value::Int64(v) => write_integer!(f, *v),
            Value::UInt8(v) => write_integer!(f, *v),
            Value::UInt16(v) => write_integer!(f, *v),
            Value::UInt32(v) => write_integer!(f, *v),
            Value::UInt64(v) => write_integer!(f, *v),
            Value::Float32(v) => write_float!(f, *v),
            Value::Float64(v) => write_float!(f, *v),
            Value::Varchar(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Blob(v) => {
                f.write_str("X'")?;
                for b in v {
                    write!(f, "{:02X}", b)?;
                }
                f.write_str("'")
            }
        }
    }
}
