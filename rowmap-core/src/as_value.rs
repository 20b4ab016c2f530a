use crate::{MapError, Result, Value};
use std::any;

/// Conversion between native Rust scalars and the dynamically typed [`Value`].
///
/// Conversions never cross storage classes: an integer column read into a `String`
/// field is an error, never a coercion. Within the numeric class, integers are
/// range checked and floats accept integer values.
///
/// ```rust
/// use rowmap_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(42)));
/// let n: u8 = AsValue::try_from_value(Value::Int64(42)).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.into())
    }
}

fn mismatch<T>(value: &Value) -> crate::Error {
    MapError::ArgumentTypeMismatch {
        expected: any::type_name::<T>(),
        found: format!("{} value {}", value.type_name(), value),
    }
    .into()
}

fn integer(value: &Value) -> Option<i128> {
    Some(match *value {
        Value::Boolean(v) => v as i128,
        Value::Int8(v) => v as i128,
        Value::Int16(v) => v as i128,
        Value::Int32(v) => v as i128,
        Value::Int64(v) => v as i128,
        Value::UInt8(v) => v as i128,
        Value::UInt16(v) => v as i128,
        Value::UInt32(v) => v as i128,
        Value::UInt64(v) => v as i128,
        _ => return None,
    })
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                $destination(self as _)
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let $destination(v) = value {
                    return Ok(v as _);
                }
                integer(&value)
                    .and_then(|v| <$source>::try_from(v).ok())
                    .ok_or_else(|| mismatch::<$source>(&value))
            }
        }
    };
}

impl_as_value!(i8, Value::Int8);
impl_as_value!(i16, Value::Int16);
impl_as_value!(i32, Value::Int32);
impl_as_value!(i64, Value::Int64);
impl_as_value!(isize, Value::Int64);
impl_as_value!(u8, Value::UInt8);
impl_as_value!(u16, Value::UInt16);
impl_as_value!(u32, Value::UInt32);
impl_as_value!(u64, Value::UInt64);
impl_as_value!(usize, Value::UInt64);

impl AsValue for bool {
    fn as_value(self) -> Value {
        Value::Boolean(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match integer(&value) {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(mismatch::<bool>(&value)),
        }
    }
}

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                $destination(self)
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Float32(v) => Ok(v as _),
                    Value::Float64(v) => Ok(v as _),
                    Value::Boolean(..) => Err(mismatch::<$source>(&value)),
                    ref v => integer(v)
                        .map(|v| v as _)
                        .ok_or_else(|| mismatch::<$source>(&value)),
                }
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for String {
    fn as_value(self) -> Value {
        Value::Varchar(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(v) => Ok(v),
            v => Err(mismatch::<String>(&v)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_value(self) -> Value {
        Value::Blob(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            v => Err(mismatch::<Vec<u8>>(&v)),
        }
    }
}
