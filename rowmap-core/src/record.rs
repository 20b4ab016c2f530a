use crate::{Descriptor, Result};
use std::{
    any::{self, Any, TypeId},
    fmt::{self, Debug},
    sync::Arc,
};

/// A record type mapped to one table.
///
/// The field list is declared statically, usually by `#[derive(Record)]`, and
/// validated once by the descriptor builder on first use.
///
/// ```rust,ignore
/// #[derive(Record, Default, Clone)]
/// struct Musketeer {
///     #[rowmap(primary_key, table = "rec")]
///     id: i64,
///     #[rowmap(column, index)]
///     name: String,
/// }
/// ```
pub trait Record: 'static + Sized {
    /// Every annotated field, in declaration order.
    fn fields() -> Vec<FieldDef<Self>>;

    /// Indexes declared as a whole rather than through field annotations.
    fn indexes() -> Vec<IndexDef> {
        Vec::new()
    }

    /// The cached descriptor of this type.
    fn descriptor() -> Result<Arc<Descriptor<Self>>> {
        Descriptor::of()
    }
}

/// Annotations a field can carry.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Tags {
    /// Table name, on exactly one field.
    pub table: Option<&'static str>,
    /// Marks the `i64` field realized as the engine row identifier.
    pub primary_key: bool,
    /// Column name, `*` uses the field name.
    pub column: Option<&'static str>,
    /// Comma separated `group<sequence>` segments, `*` for a single column index named after the field.
    pub index: Option<&'static str>,
}

/// Typed access to one field, erased over the field type.
pub trait Accessor<R>: Send + Sync {
    fn get<'a>(&self, record: &'a R) -> &'a dyn Any;
    fn get_mut<'a>(&self, record: &'a mut R) -> &'a mut dyn Any;
}

struct FieldAccessor<R, T> {
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R, T: Any> Accessor<R> for FieldAccessor<R, T> {
    fn get<'a>(&self, record: &'a R) -> &'a dyn Any {
        (self.get)(record)
    }
    fn get_mut<'a>(&self, record: &'a mut R) -> &'a mut dyn Any {
        (self.get_mut)(record)
    }
}

/// One field as seen by the descriptor builder: name, declared type, annotations
/// and an accessor pair.
pub struct FieldDef<R> {
    pub name: &'static str,
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub tags: Tags,
    pub(crate) accessor: Arc<dyn Accessor<R>>,
}

impl<R: 'static> FieldDef<R> {
    pub fn new<T: Any>(
        name: &'static str,
        get: fn(&R) -> &T,
        get_mut: fn(&mut R) -> &mut T,
    ) -> Self {
        Self {
            name,
            type_name: any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            tags: Tags::default(),
            accessor: Arc::new(FieldAccessor { get, get_mut }),
        }
    }

    pub fn table(mut self, name: &'static str) -> Self {
        self.tags.table = Some(name);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.tags.primary_key = true;
        self
    }

    pub fn column(mut self, name: &'static str) -> Self {
        self.tags.column = Some(name);
        self
    }

    pub fn index(mut self, groups: &'static str) -> Self {
        self.tags.index = Some(groups);
        self
    }
}

impl<R> FieldDef<R> {
    pub fn get<'a>(&self, record: &'a R) -> &'a dyn Any {
        self.accessor.get(record)
    }

    pub fn get_mut<'a>(&self, record: &'a mut R) -> &'a mut dyn Any {
        self.accessor.get_mut(record)
    }
}

impl<R> Clone for FieldDef<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            type_name: self.type_name,
            type_id: self.type_id,
            tags: self.tags.clone(),
            accessor: self.accessor.clone(),
        }
    }
}

impl<R> Debug for FieldDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Secondary index declared by name with its columns in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
}

impl IndexDef {
    pub fn new(name: &'static str, columns: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            name,
            columns: columns.into_iter().collect(),
        }
    }
}
