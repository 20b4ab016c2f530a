use crate::{Descriptor, IndexGroup, Result, separated_by, trim_tail, write_identifier_quoted};

/// Dialect printer turning a [`Descriptor`] into statement text.
///
/// Output is a pure function of the descriptor and the arguments: the same inputs
/// always produce byte-identical text, which is what the statement cache keys on.
/// Each `write_*` method appends one statement terminated by `;` and separates it
/// with a newline from whatever the buffer already holds.
pub trait SqlWriter {
    /// Engine reserved alias of the implicit row identifier, written unquoted.
    fn row_id_alias(&self) -> &'static str;

    /// Leading keywords of an insert that overwrites a conflicting row.
    fn insert_or_replace_verb(&self) -> &'static str;

    fn write_identifier(&self, out: &mut String, value: &str) {
        write_identifier_quoted(out, value);
    }

    /// Indexes are named after the table and the group: `<table>_<group>`.
    ///
    /// Underscores in the table are doubled and groups never start with one, so
    /// the first lone `_` always separates the two halves and distinct pairs never
    /// share a name.
    fn write_index_name(&self, out: &mut String, table: &str, group: &str) {
        self.write_identifier(out, &format!("{}_{}", table.replace('_', "__"), group));
    }

    fn write_create_table<R>(&self, out: &mut String, descriptor: &Descriptor<R>) {
        out.reserve(32 + descriptor.table().len() + descriptor.create_columns().len());
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("CREATE TABLE ");
        self.write_identifier(out, descriptor.table());
        out.push_str(" (\n");
        out.push_str(descriptor.create_columns());
        out.push_str("\n);");
    }

    fn write_create_index(&self, out: &mut String, table: &str, index: &IndexGroup) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("CREATE INDEX ");
        self.write_index_name(out, table, &index.name);
        out.push_str(" ON ");
        self.write_identifier(out, table);
        out.push_str(" (");
        separated_by(
            out,
            index.column_names(),
            |out, v| self.write_identifier(out, v),
            ", ",
        );
        out.push_str(");");
    }

    fn write_drop_table(&self, out: &mut String, table: &str) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("DROP TABLE IF EXISTS ");
        self.write_identifier(out, table);
        out.push(';');
    }

    fn write_drop_index(&self, out: &mut String, table: &str, index: &IndexGroup) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("DROP INDEX IF EXISTS ");
        self.write_index_name(out, table, &index.name);
        out.push(';');
    }

    /// Statements removing the table and its indexes, one per entry.
    fn drop_statements<R>(&self, descriptor: &Descriptor<R>) -> Vec<String> {
        let mut result = Vec::with_capacity(1 + descriptor.indexes().len());
        let mut out = String::new();
        self.write_drop_table(&mut out, descriptor.table());
        result.push(out);
        for index in descriptor.indexes() {
            let mut out = String::new();
            self.write_drop_index(&mut out, descriptor.table(), index);
            result.push(out);
        }
        result
    }

    /// Statements creating the table and then each index group.
    fn create_statements<R>(&self, descriptor: &Descriptor<R>) -> Vec<String> {
        let mut result = Vec::with_capacity(1 + descriptor.indexes().len());
        let mut out = String::new();
        self.write_create_table(&mut out, descriptor);
        result.push(out);
        for index in descriptor.indexes() {
            let mut out = String::new();
            self.write_create_index(&mut out, descriptor.table(), index);
            result.push(out);
        }
        result
    }

    fn write_insert<R>(&self, out: &mut String, descriptor: &Descriptor<R>, replace: bool) {
        out.reserve(
            32 + descriptor.table().len()
                + descriptor.column_list().len()
                + descriptor.placeholders().len(),
        );
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(if replace {
            self.insert_or_replace_verb()
        } else {
            "INSERT INTO"
        });
        out.push(' ');
        self.write_identifier(out, descriptor.table());
        out.push_str(" (");
        out.push_str(descriptor.column_list());
        out.push_str(") VALUES (");
        out.push_str(descriptor.placeholders());
        out.push_str(");");
    }

    /// Select the row identifier (when mapped) and every column, followed by `tail`.
    fn write_select<R>(&self, out: &mut String, descriptor: &Descriptor<R>, tail: &str) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT ");
        if descriptor.primary_key().is_some() {
            out.push_str(self.row_id_alias());
            out.push_str(", ");
        }
        out.push_str(descriptor.column_list());
        out.push_str(" FROM ");
        self.write_identifier(out, descriptor.table());
        self.write_tail(out, tail);
        out.push(';');
    }

    /// Update the given columns (all of them when empty or `*`) of the row matching
    /// the primary key.
    fn write_update<R>(
        &self,
        out: &mut String,
        descriptor: &Descriptor<R>,
        columns: &[&str],
    ) -> Result<()> {
        let columns = descriptor.resolve_columns(columns)?;
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("UPDATE ");
        self.write_identifier(out, descriptor.table());
        out.push_str(" SET ");
        separated_by(
            out,
            columns,
            |out, v| {
                self.write_identifier(out, &v.name);
                out.push_str(" = ?");
            },
            ", ",
        );
        out.push_str(" WHERE ");
        out.push_str(self.row_id_alias());
        out.push_str(" = ?;");
        Ok(())
    }

    fn write_delete<R>(&self, out: &mut String, descriptor: &Descriptor<R>, tail: &str) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("DELETE FROM ");
        self.write_identifier(out, descriptor.table());
        self.write_tail(out, tail);
        out.push(';');
    }

    fn write_truncate<R>(&self, out: &mut String, descriptor: &Descriptor<R>) {
        self.write_delete(out, descriptor, "");
    }

    /// Append the caller clause verbatim, dropping its own terminator.
    fn write_tail(&self, out: &mut String, tail: &str) {
        let tail = trim_tail(tail);
        if !tail.is_empty() {
            out.push(' ');
            out.push_str(tail);
        }
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("BEGIN;");
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT;");
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK;");
    }
}
