use crate::{
    Connection, Database, Error, MapError, Record, RecordCursor, RecordRef, Result, RowsAffected,
    Value,
};
use std::{
    cell::{Cell, RefCell},
    fmt::{self, Debug},
    rc::Rc,
};

struct Shared<C: Connection> {
    database: Option<Database<C>>,
    error: Option<Error>,
}

/// Coordinator that latches the first failure.
///
/// Every operation is the matching [`Database`] operation run through [`Session::latch`]:
/// once an error is stored, later calls do nothing and return an empty result until
/// [`Session::clear_error`]. The error is inspected once, at the end of a unit of work.
///
/// Sessions created with [`Session::join`] share the connection, the transaction, the
/// statement cache and the error, so one transaction can span several record types.
///
/// ```rust,ignore
/// let session = Session::<SqliteConnection>::connect("sqlite://:memory:");
/// session.create_table::<Musketeer>();
/// session.insert_all(&musketeers);
/// if let Some(error) = session.map_error() { ... }
/// ```
pub struct Session<C: Connection> {
    shared: Rc<RefCell<Shared<C>>>,
    result: Cell<RowsAffected>,
}

impl<C: Connection> Session<C> {
    pub fn new(database: Database<C>) -> Self {
        Self::with(Some(database), None)
    }

    /// Open `url`, a failure to connect is latched like any other.
    pub fn connect(url: &str) -> Self {
        match Database::connect(url) {
            Ok(database) => Self::new(database),
            Err(error) => Self::with(None, Some(error)),
        }
    }

    fn with(database: Option<Database<C>>, error: Option<Error>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared { database, error })),
            result: Default::default(),
        }
    }

    /// Another session over the same connection, transaction and error.
    pub fn join(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            result: Default::default(),
        }
    }

    /// Run `f` unless an error is latched, latching its failure.
    ///
    /// Returns `T::default()` whenever `f` is skipped or fails.
    pub fn latch<T: Default>(&self, f: impl FnOnce(&mut Database<C>) -> Result<T>) -> T {
        let mut guard = self.shared.borrow_mut();
        let shared = &mut *guard;
        if shared.error.is_some() {
            return T::default();
        }
        let Some(database) = shared.database.as_mut() else {
            shared.error = Some(MapError::ConnectionClosed.into());
            return T::default();
        };
        match f(database) {
            Ok(v) => v,
            Err(e) => {
                shared.error = Some(e);
                T::default()
            }
        }
    }

    fn latch_affected(&self, f: impl FnOnce(&mut Database<C>) -> Result<RowsAffected>) -> RowsAffected {
        let result = self.latch(f);
        self.result.set(result);
        result
    }

    pub fn ok(&self) -> bool {
        self.shared.borrow().error.is_none()
    }

    pub fn failed(&self) -> bool {
        !self.ok()
    }

    /// Latched error with its context chain, empty when none.
    pub fn error_message(&self) -> String {
        self.shared
            .borrow()
            .error
            .as_ref()
            .map(|e| format!("{:#}", e))
            .unwrap_or_default()
    }

    /// The latched error when it comes from the mapping layer.
    pub fn map_error(&self) -> Option<MapError> {
        self.shared
            .borrow()
            .error
            .as_ref()
            .and_then(|e| e.downcast_ref::<MapError>())
            .cloned()
    }

    pub fn with_error<T>(&self, f: impl FnOnce(Option<&Error>) -> T) -> T {
        f(self.shared.borrow().error.as_ref())
    }

    /// Latch `error` unless another one is already stored.
    pub fn set_error(&self, error: impl Into<Error>) {
        let mut shared = self.shared.borrow_mut();
        if shared.error.is_none() {
            shared.error = Some(error.into());
        }
    }

    /// Remove and return the latched error, operations resume afterwards.
    pub fn clear_error(&self) -> Option<Error> {
        self.shared.borrow_mut().error.take()
    }

    /// Outcome of the last statement run by this session that returns no rows.
    pub fn result(&self) -> RowsAffected {
        self.result.get()
    }

    pub fn trace(&self, enabled: bool) {
        if let Some(database) = self.shared.borrow_mut().database.as_mut() {
            database.trace(enabled);
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.shared
            .borrow()
            .database
            .as_ref()
            .is_some_and(Database::in_transaction)
    }

    pub fn is_closed(&self) -> bool {
        self.shared.borrow().database.is_none()
    }

    pub fn create_table<R: Record>(&self) {
        self.latch(Database::create_table::<R>)
    }

    pub fn insert<'r, R: Record>(&self, record: impl Into<RecordRef<'r, R>>) -> RowsAffected {
        self.latch_affected(|db| db.insert(record))
    }

    pub fn insert_or_replace<'r, R: Record>(
        &self,
        record: impl Into<RecordRef<'r, R>>,
    ) -> RowsAffected {
        self.latch_affected(|db| db.insert_or_replace(record))
    }

    pub fn insert_all<'r, R, It>(&self, records: It) -> RowsAffected
    where
        R: Record,
        It: IntoIterator,
        It::Item: Into<RecordRef<'r, R>>,
    {
        // Drained before latching, the iterator may itself look at the session.
        let records: Vec<RecordRef<'r, R>> = records.into_iter().map(Into::into).collect();
        self.latch_affected(|db| db.insert_all(records))
    }

    pub fn update<R: Record>(&self, record: &R, columns: &[&str]) -> RowsAffected {
        self.latch_affected(|db| db.update(record, columns))
    }

    pub fn delete<R: Record>(&self, tail: &str, args: &[Value]) -> RowsAffected {
        self.latch_affected(|db| db.delete::<R>(tail, args))
    }

    pub fn truncate<R: Record>(&self) -> RowsAffected {
        self.latch_affected(Database::truncate::<R>)
    }

    pub fn exec(&self, sql: &str, args: &[Value]) -> RowsAffected {
        self.latch_affected(|db| db.exec(sql, args))
    }

    /// Append the selected rows to `out`, which keeps what was appended before a failure.
    pub fn retrieve<R: Record + Default + Clone>(
        &self,
        out: &mut Vec<R>,
        tail: &str,
        args: &[Value],
    ) -> usize {
        self.latch(|db| db.retrieve(out, tail, args))
    }

    /// Write the first selected row into `record`, a missing row latches [`MapError::NoRows`].
    pub fn query_row<R: Record>(&self, record: &mut R, tail: &str, args: &[Value]) -> bool {
        self.latch(|db| db.query_row(record, tail, args).map(|_| true))
    }

    /// Select rows to be stepped through with [`Cursor::next`].
    pub fn query<'s, 'r, R: Record>(
        &'s self,
        record: &'r mut R,
        tail: &str,
        args: &[Value],
    ) -> Cursor<'s, 'r, C, R> {
        let inner = self.latch(move |db| db.query(record, tail, args).map(Some));
        Cursor {
            session: self,
            inner,
        }
    }

    pub fn begin(&self) {
        self.latch(Database::begin)
    }

    pub fn commit(&self) {
        self.latch(Database::commit)
    }

    pub fn rollback(&self) {
        self.latch(Database::rollback)
    }

    /// Commit when no error is latched, otherwise roll back.
    ///
    /// Runs even with an error latched: a failed rollback is logged and the first
    /// error is kept.
    pub fn end(&self) {
        let mut guard = self.shared.borrow_mut();
        let shared = &mut *guard;
        let Some(database) = shared.database.as_mut() else {
            if shared.error.is_none() {
                shared.error = Some(MapError::ConnectionClosed.into());
            }
            return;
        };
        if shared.error.is_none() {
            if let Err(e) = database.commit() {
                shared.error = Some(e);
            }
        } else if database.in_transaction() {
            if let Err(e) = database.rollback() {
                log::error!("{:#}", e.context("While ending a failed transaction"));
            }
        }
    }

    /// Release the connection for this session and every joined one.
    pub fn close(&self) {
        let database = self.shared.borrow_mut().database.take();
        if let Some(database) = database {
            if let Err(e) = database.close() {
                self.set_error(e);
            }
        }
    }
}

impl<C: Connection> Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("Session")
            .field("closed", &shared.database.is_none())
            .field("error", &shared.error)
            .field("result", &self.result.get())
            .finish()
    }
}

/// Rows selected by [`Session::query`].
pub struct Cursor<'s, 'r, C: Connection, R> {
    session: &'s Session<C>,
    inner: Option<RecordCursor<'r, C, R>>,
}

impl<'s, 'r, C: Connection, R> Cursor<'s, 'r, C, R> {
    /// Write the next row into the destination record.
    ///
    /// `false` both once the rows are exhausted and on failure, tell them apart
    /// through the session error.
    pub fn next(&mut self) -> bool {
        if self.session.failed() {
            return false;
        }
        let Some(inner) = self.inner.as_mut() else {
            return false;
        };
        match inner.next() {
            Ok(v) => v,
            Err(e) => {
                self.session.set_error(e);
                false
            }
        }
    }

    /// The destination record holding the last row read, `None` when the query did not run.
    pub fn record(&self) -> Option<&R> {
        self.inner.as_ref().map(RecordCursor::record)
    }
}
