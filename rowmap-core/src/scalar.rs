use crate::{AsValue, MapError, Result, StorageClass, Value};
use std::{
    any::{self, Any, TypeId},
    fmt::{self, Debug},
    sync::LazyLock,
};

/// Entry of the fixed table of Rust types that can back a column.
///
/// Each entry carries the codec the marshaler uses to move a field in and out
/// of a [`Value`], so the per-field lookup happens once when a descriptor is built.
pub struct ScalarType {
    pub name: &'static str,
    pub type_id: TypeId,
    pub storage: StorageClass,
    pub sql_type: &'static str,
    read: fn(&dyn Any) -> Option<Value>,
    write: fn(&mut dyn Any, Value) -> Option<Result<()>>,
}

impl ScalarType {
    fn of<T: AsValue + Clone + Any>(storage: StorageClass, sql_type: &'static str) -> Self {
        Self {
            name: any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            storage,
            sql_type,
            read: |field| field.downcast_ref::<T>().map(|v| v.clone().as_value()),
            write: |field, value| {
                let field = field.downcast_mut::<T>()?;
                Some(T::try_from_value(value).map(|v| *field = v))
            },
        }
    }

    /// Look up the entry for `type_id`, `None` when the type cannot be stored.
    pub fn find(type_id: TypeId) -> Option<&'static ScalarType> {
        SCALARS.iter().find(|v| v.type_id == type_id)
    }

    pub(crate) fn read(&self, field_name: &'static str, field: &dyn Any) -> Result<Value> {
        (self.read)(field).ok_or_else(|| {
            MapError::TypeMismatch {
                field: field_name,
                expected: self.name,
            }
            .into()
        })
    }

    pub(crate) fn write(
        &self,
        field_name: &'static str,
        field: &mut dyn Any,
        value: Value,
    ) -> Result<()> {
        (self.write)(field, value).unwrap_or_else(|| {
            Err(MapError::TypeMismatch {
                field: field_name,
                expected: self.name,
            }
            .into())
        })
    }
}

impl Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .field("storage", &self.storage)
            .field("sql_type", &self.sql_type)
            .finish()
    }
}

static SCALARS: LazyLock<Vec<ScalarType>> = LazyLock::new(|| {
    use StorageClass::*;
    vec![
        ScalarType::of::<bool>(Numeric, "INTEGER"),
        ScalarType::of::<i8>(Numeric, "INTEGER"),
        ScalarType::of::<i16>(Numeric, "INTEGER"),
        ScalarType::of::<i32>(Numeric, "INTEGER"),
        ScalarType::of::<i64>(Numeric, "INTEGER"),
        ScalarType::of::<isize>(Numeric, "INTEGER"),
        ScalarType::of::<u8>(Numeric, "INTEGER"),
        ScalarType::of::<u16>(Numeric, "INTEGER"),
        ScalarType::of::<u32>(Numeric, "INTEGER"),
        ScalarType::of::<u64>(Numeric, "INTEGER"),
        ScalarType::of::<usize>(Numeric, "INTEGER"),
        ScalarType::of::<f32>(Numeric, "REAL"),
        ScalarType::of::<f64>(Numeric, "REAL"),
        ScalarType::of::<String>(Text, "TEXT"),
        ScalarType::of::<Vec<u8>>(Binary, "BLOB"),
    ]
});
