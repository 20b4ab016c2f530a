use crate::{ColumnDef, Descriptor, Error, FieldDef, MapError, Result, Value};

/// A record handed to an insert, either borrowed for reading or exclusively so
/// the generated row identifier can be written back.
pub enum RecordRef<'r, R> {
    Value(&'r R),
    Pointer(&'r mut R),
}

impl<'r, R> RecordRef<'r, R> {
    pub fn get(&self) -> &R {
        match self {
            RecordRef::Value(v) => v,
            RecordRef::Pointer(v) => v,
        }
    }
}

impl<'r, R> From<&'r R> for RecordRef<'r, R> {
    fn from(value: &'r R) -> Self {
        RecordRef::Value(value)
    }
}

impl<'r, R> From<&'r mut R> for RecordRef<'r, R> {
    fn from(value: &'r mut R) -> Self {
        RecordRef::Pointer(value)
    }
}

/// Sets the identifier assigned by the engine into the primary key field.
pub struct IdWriteBack<'r, R> {
    record: &'r mut R,
    field: ColumnDef<R>,
}

impl<'r, R> IdWriteBack<'r, R> {
    pub fn write(self, id: i64) -> Result<()> {
        self.field.scalar.write(
            self.field.field.name,
            self.field.field.get_mut(self.record),
            Value::Int64(id),
        )
    }
}

/// Values bound to an insert, in column order.
pub struct InsertArgs<'r, R> {
    pub values: Vec<Value>,
    pub write_back: Option<IdWriteBack<'r, R>>,
}

fn read<R>(column: &ColumnDef<R>, record: &R) -> Result<Value> {
    column
        .scalar
        .read(column.field.name, column.field.get(record))
}

/// Column values of `record` in declaration order.
pub fn column_values<R>(descriptor: &Descriptor<R>, record: &R) -> Result<Vec<Value>> {
    descriptor
        .columns()
        .iter()
        .map(|c| read(c, record))
        .collect()
}

pub fn insert_args<'r, R>(
    descriptor: &Descriptor<R>,
    record: RecordRef<'r, R>,
) -> Result<InsertArgs<'r, R>> {
    let values = column_values(descriptor, record.get())?;
    let write_back = match (record, descriptor.primary_key()) {
        (RecordRef::Pointer(record), Some(field)) => Some(IdWriteBack {
            record,
            field: field.clone(),
        }),
        _ => None,
    };
    Ok(InsertArgs { values, write_back })
}

/// SET values of the requested columns followed by the primary key value.
pub fn update_args<R>(descriptor: &Descriptor<R>, record: &R, columns: &[&str]) -> Result<Vec<Value>> {
    let Some(primary_key) = descriptor.primary_key() else {
        return Err(MapError::MissingPrimaryKey {
            record: descriptor.record(),
        }
        .into());
    };
    let mut values = descriptor
        .resolve_columns(columns)?
        .into_iter()
        .map(|c| read(c, record))
        .collect::<Result<Vec<_>>>()?;
    values.push(read(primary_key, record)?);
    Ok(values)
}

/// Writable destinations of a select row: the primary key first when present,
/// then every managed column.
///
/// The same targets serve every row fetched by one query, each scan overwrites
/// the destination record in place.
pub struct ScanTargets<'r, R> {
    record: &'r mut R,
    targets: Vec<ColumnDef<R>>,
}

impl<'r, R> ScanTargets<'r, R> {
    pub fn new(descriptor: &Descriptor<R>, record: &'r mut R) -> Self {
        let targets = descriptor
            .primary_key()
            .into_iter()
            .chain(descriptor.columns())
            .cloned()
            .collect();
        Self { record, targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDef<R>> {
        self.targets.iter().map(|v| &v.field)
    }

    pub fn scan(&mut self, row: &[Value]) -> Result<()> {
        if row.len() != self.targets.len() {
            return Err(Error::msg(format!(
                "Expected {} values in the row, found {}",
                self.targets.len(),
                row.len()
            )));
        }
        for (target, value) in self.targets.iter().zip(row) {
            target.scalar.write(
                target.field.name,
                target.field.get_mut(self.record),
                value.clone(),
            )?;
        }
        Ok(())
    }

    pub fn record(&self) -> &R {
        self.record
    }

    pub fn into_inner(self) -> &'r mut R {
        self.record
    }
}
