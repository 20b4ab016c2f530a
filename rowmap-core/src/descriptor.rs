use crate::{
    FieldDef, MapError, Record, Result, ScalarType, separated_by, write_identifier_quoted,
};
use std::{
    any::{self, Any, TypeId},
    collections::HashMap,
    fmt::{self, Debug},
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

/// A field mapped to a table column.
pub struct ColumnDef<R> {
    pub name: String,
    pub field: FieldDef<R>,
    pub scalar: &'static ScalarType,
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            field: self.field.clone(),
            scalar: self.scalar,
        }
    }
}

impl<R> Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("name", &self.name)
            .field("field", &self.field.name)
            .field("scalar", &self.scalar.name)
            .finish()
    }
}

/// Named secondary index, columns kept in ascending sequence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGroup {
    pub name: String,
    pub columns: Vec<(String, u32)>,
}

impl IndexGroup {
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

/// Immutable mapping of a record type to its table.
pub struct Descriptor<R> {
    record: &'static str,
    table: String,
    primary_key: Option<ColumnDef<R>>,
    columns: Vec<ColumnDef<R>>,
    indexes: Vec<IndexGroup>,
    column_list: String,
    placeholders: String,
    create_columns: String,
}

/// Name through which the engine exposes the row identifier.
pub const ROW_ID: &str = "rowid";

static DESCRIPTORS: LazyLock<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(Default::default);

impl<R: Record> Descriptor<R> {
    /// The process wide descriptor of `R`, built and validated on first use.
    ///
    /// Concurrent first uses may build redundantly, the first one stored wins and
    /// every caller receives that instance. Failed builds are not cached.
    pub fn of() -> Result<Arc<Self>> {
        let type_id = TypeId::of::<R>();
        let cached = DESCRIPTORS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned();
        let entry = match cached {
            Some(entry) => entry,
            None => {
                let built: Arc<dyn Any + Send + Sync> = Arc::new(Self::build()?);
                let entry = DESCRIPTORS
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(type_id)
                    .or_insert(built)
                    .clone();
                log::debug!(
                    "Described `{}` as table `{}`",
                    any::type_name::<R>(),
                    entry
                        .downcast_ref::<Self>()
                        .map(|v| v.table.as_str())
                        .unwrap_or_default()
                );
                entry
            }
        };
        entry.downcast::<Self>().map_err(|_| {
            MapError::TypeMismatch {
                field: "<record>",
                expected: any::type_name::<R>(),
            }
            .into()
        })
    }

    /// Validate the field list of `R` and build a fresh, uncached descriptor.
    pub fn build() -> Result<Self> {
        let record = any::type_name::<R>();
        let mut table: Option<&'static str> = None;
        let mut primary_key = None;
        let mut columns: Vec<ColumnDef<R>> = Vec::new();
        let mut indexes: Vec<IndexGroup> = Vec::new();
        for field in R::fields() {
            let tags = field.tags.clone();
            if tags.primary_key {
                if primary_key.is_some() {
                    return Err(MapError::MultiplePrimaryKeyTags { record }.into());
                }
                if field.type_id != TypeId::of::<i64>() {
                    return Err(MapError::PrimaryKeyTypeMismatch {
                        field: field.name,
                        found: field.type_name,
                    }
                    .into());
                }
                primary_key = Some(ColumnDef {
                    name: field.name.into(),
                    scalar: scalar_of(&field)?,
                    field: field.clone(),
                });
            } else if let Some(column) = tags.column {
                let name = if column == "*" { field.name } else { column };
                let scalar = scalar_of(&field)?;
                if name.eq_ignore_ascii_case(ROW_ID) {
                    return Err(MapError::ReservedColumn {
                        column: name.into(),
                    }
                    .into());
                }
                if columns.iter().any(|c| c.name == name) {
                    return Err(MapError::DuplicateColumn {
                        column: name.into(),
                    }
                    .into());
                }
                if let Some(groups) = tags.index {
                    for (group, sequence) in parse_index_tag(field.name, groups)? {
                        let position = indexes.iter().position(|v| v.name == group);
                        let index = match position {
                            Some(i) => &mut indexes[i],
                            None => {
                                indexes.push(IndexGroup {
                                    name: group,
                                    columns: Vec::new(),
                                });
                                let last = indexes.len() - 1;
                                &mut indexes[last]
                            }
                        };
                        index.columns.push((name.into(), sequence));
                    }
                }
                columns.push(ColumnDef {
                    name: name.into(),
                    field: field.clone(),
                    scalar,
                });
            }
            if let Some(name) = tags.table {
                if table.is_some() {
                    return Err(MapError::MultipleTableTags { record }.into());
                }
                table = Some(name);
            }
        }
        if columns.is_empty() {
            return Err(MapError::NoManagedFields { record }.into());
        }
        let table = match table {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => return Err(MapError::MissingTableTag { record }.into()),
        };
        for index in R::indexes() {
            if indexes.iter().any(|v| v.name == index.name) {
                return Err(MapError::DuplicateIndex {
                    index: index.name.into(),
                }
                .into());
            }
            let mut group = IndexGroup {
                name: index.name.into(),
                columns: Vec::with_capacity(index.columns.len()),
            };
            for (i, column) in index.columns.iter().enumerate() {
                if !columns.iter().any(|c| c.name == *column) {
                    return Err(MapError::UnknownColumn {
                        table,
                        column: column.to_string(),
                    }
                    .into());
                }
                group.columns.push((column.to_string(), i as u32 + 1));
            }
            indexes.push(group);
        }
        for index in &mut indexes {
            if index.name.is_empty() || index.name.starts_with('_') {
                return Err(MapError::InvalidIndexName {
                    index: index.name.clone(),
                }
                .into());
            }
            index.columns.sort_by_key(|(_, sequence)| *sequence);
            if let Some(pair) = index.columns.windows(2).find(|w| w[0].1 == w[1].1) {
                return Err(MapError::DuplicateIndexSequence {
                    index: index.name.clone(),
                    sequence: pair[0].1,
                }
                .into());
            }
        }
        let mut column_list = String::with_capacity(columns.len() * 16);
        separated_by(
            &mut column_list,
            &columns,
            |out, v| write_identifier_quoted(out, &v.name),
            ", ",
        );
        let mut placeholders = String::with_capacity(columns.len() * 3);
        separated_by(&mut placeholders, &columns, |out, _| out.push('?'), ", ");
        let mut create_columns = String::with_capacity(columns.len() * 24);
        separated_by(
            &mut create_columns,
            &columns,
            |out, v| {
                write_identifier_quoted(out, &v.name);
                out.push(' ');
                out.push_str(v.scalar.sql_type);
            },
            ",\n",
        );
        Ok(Self {
            record,
            table,
            primary_key,
            columns,
            indexes,
            column_list,
            placeholders,
            create_columns,
        })
    }
}

impl<R> Descriptor<R> {
    /// Name of the record type.
    pub fn record(&self) -> &'static str {
        self.record
    }
    pub fn table(&self) -> &str {
        &self.table
    }
    /// The field realized as the engine row identifier.
    pub fn primary_key(&self) -> Option<&ColumnDef<R>> {
        self.primary_key.as_ref()
    }
    /// Managed columns in declaration order.
    pub fn columns(&self) -> &[ColumnDef<R>] {
        &self.columns
    }
    pub fn column(&self, name: &str) -> Option<&ColumnDef<R>> {
        self.columns.iter().find(|c| c.name == name)
    }
    pub fn indexes(&self) -> &[IndexGroup] {
        &self.indexes
    }
    /// `"a", "b", ...`
    pub fn column_list(&self) -> &str {
        &self.column_list
    }
    /// `?, ?, ...`
    pub fn placeholders(&self) -> &str {
        &self.placeholders
    }
    /// Column definitions of the create statement, one per line.
    pub fn create_columns(&self) -> &str {
        &self.create_columns
    }

    /// Columns selected by an update: all of them for an empty list or `*`.
    pub fn resolve_columns(&self, names: &[&str]) -> Result<Vec<&ColumnDef<R>>> {
        if names.is_empty() || names[0] == "*" {
            return Ok(self.columns.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.column(name).ok_or_else(|| {
                    MapError::UnknownColumn {
                        table: self.table.clone(),
                        column: name.to_string(),
                    }
                    .into()
                })
            })
            .collect()
    }
}

impl<R> Debug for Descriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("record", &self.record)
            .field("table", &self.table)
            .field("primary_key", &self.primary_key)
            .field("columns", &self.columns)
            .field("indexes", &self.indexes)
            .finish()
    }
}

fn scalar_of<R>(field: &FieldDef<R>) -> Result<&'static ScalarType> {
    ScalarType::find(field.type_id).ok_or_else(|| {
        MapError::UnsupportedFieldType {
            field: field.name,
            found: field.type_name,
        }
        .into()
    })
}

/// Split `"name1, other2"` into `[("name", 1), ("other", 2)]`.
///
/// A lone `*` is a single column index named after the field.
pub fn parse_index_tag(field: &'static str, tag: &str) -> Result<Vec<(String, u32)>> {
    if tag.trim() == "*" {
        return Ok(vec![(field.to_string(), 1)]);
    }
    tag.split(',')
        .map(str::trim)
        .map(|segment| {
            let malformed = || MapError::MalformedIndexTag {
                field,
                segment: segment.to_string(),
            };
            let split = segment.trim_end_matches(|c: char| c.is_ascii_digit()).len();
            let (name, sequence) = segment.split_at(split);
            if name.is_empty() || sequence.is_empty() || name.contains(|c: char| c.is_ascii_digit())
            {
                return Err(malformed().into());
            }
            let sequence = sequence.parse::<u32>().map_err(|_| malformed())?;
            Ok((name.to_string(), sequence))
        })
        .collect()
}
