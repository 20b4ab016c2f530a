use crate::{
    Connection, Driver, MapError, Prepared, Record, RecordRef, Result, Rows, RowsAffected,
    ScanTargets, SqlWriter, Transaction, Value, insert_args, truncate_long, update_args,
};
use std::collections::HashMap;

type WriterOf<C> = <<C as Connection>::Driver as Driver>::SqlWriter;
type RowsOf<C> = <<C as Connection>::Prepared as Prepared>::Rows;

/// Coordinator over one connection where every operation returns its own result.
///
/// Owns the open transaction, if any, and the cache of compiled statements keyed by
/// their exact text. Not meant to be shared between threads: use one `Database` per
/// connection.
pub struct Database<C: Connection> {
    connection: C,
    writer: WriterOf<C>,
    transaction: Option<C::Transaction>,
    statements: HashMap<String, C::Prepared>,
    trace: bool,
}

impl<C: Connection> Database<C> {
    pub fn new(connection: C) -> Self {
        let writer = connection.driver().sql_writer();
        Self {
            connection,
            writer,
            transaction: None,
            statements: HashMap::new(),
            trace: false,
        }
    }

    /// Open `url`, e.g. `sqlite://data/example.db` or `sqlite://:memory:`.
    pub fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(C::connect(url)?))
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn sql_writer(&self) -> &WriterOf<C> {
        &self.writer
    }

    /// Log every statement at info level with its cache and transaction flags.
    pub fn trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn is_tracing(&self) -> bool {
        self.trace
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Number of distinct statements compiled so far.
    pub fn cached_statements(&self) -> usize {
        self.statements.len()
    }

    fn statement(&mut self, sql: &str) -> Result<(C::Prepared, bool)> {
        if let Some(prepared) = self.statements.get(sql) {
            return Ok((prepared.clone(), true));
        }
        let prepared = self.connection.prepare(sql)?;
        self.statements.insert(sql.to_string(), prepared.clone());
        Ok((prepared, false))
    }

    fn report(&self, sql: &str, cached: bool, failed: bool) {
        if self.trace {
            log::info!(
                "[{}{}{}] {}",
                if cached { "C" } else { "-" },
                if self.transaction.is_some() { "T" } else { "-" },
                if failed { "E" } else { "-" },
                truncate_long!(sql)
            );
        } else {
            log::trace!("{}", truncate_long!(sql));
        }
    }

    fn run<T>(
        &mut self,
        sql: &str,
        f: impl FnOnce(&C::Prepared) -> Result<T>,
    ) -> Result<T> {
        let (result, cached) = match self.statement(sql) {
            Ok((prepared, cached)) => (f(&prepared), cached),
            Err(e) => (Err(e), false),
        };
        self.report(sql, cached, result.is_err());
        result
    }

    /// Execute caller supplied statement text that returns no rows.
    pub fn exec(&mut self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        self.run(sql, |prepared| prepared.execute(args))
    }

    /// Execute caller supplied statement text and return its raw rows.
    pub fn query_rows(&mut self, sql: &str, args: &[Value]) -> Result<RowsOf<C>> {
        self.run(sql, |prepared| prepared.query(args))
    }

    pub fn begin(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            return Err(MapError::NestedTransaction.into());
        }
        self.transaction = Some(self.connection.begin()?);
        self.report_transaction(|w, out| w.write_transaction_begin(out));
        Ok(())
    }

    pub fn commit(&mut self) -> Result<()> {
        let Some(transaction) = self.transaction.take() else {
            return Err(MapError::NoActiveTransaction.into());
        };
        self.report_transaction(|w, out| w.write_transaction_commit(out));
        transaction.commit()
    }

    pub fn rollback(&mut self) -> Result<()> {
        let Some(transaction) = self.transaction.take() else {
            return Err(MapError::NoActiveTransaction.into());
        };
        self.report_transaction(|w, out| w.write_transaction_rollback(out));
        transaction.rollback()
    }

    /// Commit when `success`, roll back otherwise.
    pub fn end(&mut self, success: bool) -> Result<()> {
        if success {
            self.commit()
        } else {
            self.rollback()
        }
    }

    fn report_transaction(&self, f: impl FnOnce(&WriterOf<C>, &mut String)) {
        let mut sql = String::with_capacity(16);
        f(&self.writer, &mut sql);
        self.report(&sql, false, false);
    }

    /// Open a transaction unless the caller already did, returns whether this call owns it.
    fn begin_owned(&mut self) -> Result<bool> {
        if self.transaction.is_some() {
            return Ok(false);
        }
        self.begin()?;
        Ok(true)
    }

    /// Finish a transaction opened by `begin_owned`, a caller opened one is left alone.
    fn finish_owned<T>(&mut self, owned: bool, result: Result<T>) -> Result<T> {
        if !owned {
            return result;
        }
        match result {
            Ok(v) => {
                self.commit()?;
                Ok(v)
            }
            Err(e) => {
                if let Err(rollback) = self.rollback() {
                    log::error!("{:#}", rollback.context("While rolling back after a failure"));
                }
                Err(e)
            }
        }
    }

    fn within_transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let owned = self.begin_owned()?;
        let result = f(self);
        self.finish_owned(owned, result)
    }

    /// Drop the table of `R` and its indexes, then create them again.
    ///
    /// Any data previously stored in the table is lost.
    pub fn create_table<R: Record>(&mut self) -> Result<()> {
        let descriptor = R::descriptor()?;
        let mut statements = self.writer.drop_statements(&descriptor);
        statements.extend(self.writer.create_statements(&descriptor));
        for sql in statements {
            self.exec(&sql, &[])?;
        }
        Ok(())
    }

    fn insert_with<'r, R: Record>(
        &mut self,
        record: RecordRef<'r, R>,
        replace: bool,
    ) -> Result<RowsAffected> {
        let descriptor = R::descriptor()?;
        let mut sql = String::new();
        self.writer.write_insert(&mut sql, &descriptor, replace);
        let args = insert_args(&descriptor, record)?;
        let result = self.exec(&sql, &args.values)?;
        if let (Some(write_back), Some(id)) = (args.write_back, result.last_affected_id) {
            write_back.write(id)?;
        }
        Ok(result)
    }

    /// Insert one record.
    ///
    /// Passing `&mut record` stores the assigned row identifier into its primary key.
    pub fn insert<'r, R: Record>(
        &mut self,
        record: impl Into<RecordRef<'r, R>>,
    ) -> Result<RowsAffected> {
        self.insert_with(record.into(), false)
    }

    /// Insert one record, replacing a conflicting row.
    pub fn insert_or_replace<'r, R: Record>(
        &mut self,
        record: impl Into<RecordRef<'r, R>>,
    ) -> Result<RowsAffected> {
        self.insert_with(record.into(), true)
    }

    /// Insert every record inside one transaction.
    ///
    /// The first failure stops the iteration and rolls the transaction back when
    /// this call opened it, leaving none of the records stored.
    pub fn insert_all<'r, R, It>(&mut self, records: It) -> Result<RowsAffected>
    where
        R: Record,
        It: IntoIterator,
        It::Item: Into<RecordRef<'r, R>>,
    {
        self.within_transaction(|db| {
            let mut total = RowsAffected::default();
            for record in records {
                total.extend([db.insert_with(record.into(), false)?]);
            }
            Ok(total)
        })
    }

    /// Update the listed columns (every column when empty or `["*"]`) of the row
    /// identified by the primary key of `record`.
    pub fn update<R: Record>(&mut self, record: &R, columns: &[&str]) -> Result<RowsAffected> {
        let descriptor = R::descriptor()?;
        let args = update_args(&descriptor, record, columns)?;
        let mut sql = String::new();
        self.writer.write_update(&mut sql, &descriptor, columns)?;
        self.within_transaction(|db| db.exec(&sql, &args))
    }

    /// Delete the rows matching `tail`, e.g. `WHERE Num > ?`.
    pub fn delete<R: Record>(&mut self, tail: &str, args: &[Value]) -> Result<RowsAffected> {
        let descriptor = R::descriptor()?;
        let mut sql = String::new();
        self.writer.write_delete(&mut sql, &descriptor, tail);
        self.within_transaction(|db| db.exec(&sql, args))
    }

    /// Delete every row.
    pub fn truncate<R: Record>(&mut self) -> Result<RowsAffected> {
        let descriptor = R::descriptor()?;
        let mut sql = String::new();
        self.writer.write_truncate(&mut sql, &descriptor);
        self.within_transaction(|db| db.exec(&sql, &[]))
    }

    fn select<R: Record>(&mut self, tail: &str, args: &[Value]) -> Result<RowsOf<C>> {
        let descriptor = R::descriptor()?;
        let mut sql = String::new();
        self.writer.write_select(&mut sql, &descriptor, tail);
        self.query_rows(&sql, args)
    }

    /// Append every row selected by `tail` to `out`, returns how many were appended.
    ///
    /// On failure `out` keeps the rows appended before it.
    pub fn retrieve<R: Record + Default + Clone>(
        &mut self,
        out: &mut Vec<R>,
        tail: &str,
        args: &[Value],
    ) -> Result<usize> {
        let descriptor = R::descriptor()?;
        let mut rows = self.select::<R>(tail, args)?;
        let mut buffer = R::default();
        let mut targets = ScanTargets::new(&descriptor, &mut buffer);
        let mut count = 0;
        while rows.next()? {
            targets.scan(&rows.row()?)?;
            out.push(targets.record().clone());
            count += 1;
        }
        Ok(count)
    }

    /// Overwrite `record` with the first row selected by `tail`.
    pub fn query_row<R: Record>(&mut self, record: &mut R, tail: &str, args: &[Value]) -> Result<()> {
        let descriptor = R::descriptor()?;
        let mut rows = self.select::<R>(tail, args)?;
        if !rows.next()? {
            return Err(MapError::NoRows.into());
        }
        ScanTargets::new(&descriptor, record).scan(&rows.row()?)
    }

    /// Open a cursor writing each selected row into `record`.
    pub fn query<'r, R: Record>(
        &mut self,
        record: &'r mut R,
        tail: &str,
        args: &[Value],
    ) -> Result<RecordCursor<'r, C, R>> {
        let descriptor = R::descriptor()?;
        let rows = self.select::<R>(tail, args)?;
        Ok(RecordCursor {
            rows,
            targets: ScanTargets::new(&descriptor, record),
        })
    }

    /// Roll back any open transaction and release the connection.
    pub fn close(mut self) -> Result<()> {
        if self.transaction.is_some() {
            log::warn!("Closing the connection with a transaction still open, rolling it back");
            self.rollback()?;
        }
        Ok(())
    }
}

/// Rows of a select, each one written into the same destination record.
pub struct RecordCursor<'r, C: Connection, R> {
    rows: RowsOf<C>,
    targets: ScanTargets<'r, R>,
}

impl<'r, C: Connection, R> RecordCursor<'r, C, R> {
    /// Advance to the next row and write it into the destination record, `false`
    /// once the rows are exhausted.
    pub fn next(&mut self) -> Result<bool> {
        if !self.rows.next()? {
            return Ok(false);
        }
        let row = self.rows.row()?;
        self.targets.scan(&row)?;
        Ok(true)
    }

    /// The destination record, holding the current row.
    pub fn record(&self) -> &R {
        self.targets.record()
    }

    pub fn into_inner(self) -> &'r mut R {
        self.targets.into_inner()
    }
}

impl<C: Connection> From<C> for Database<C> {
    fn from(connection: C) -> Self {
        Self::new(connection)
    }
}
