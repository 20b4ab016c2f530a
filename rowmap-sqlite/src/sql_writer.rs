use rowmap_core::{ROW_ID, SqlWriter};

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter {}

impl SqlWriter for SqliteSqlWriter {
    fn row_id_alias(&self) -> &'static str {
        ROW_ID
    }

    fn insert_or_replace_verb(&self) -> &'static str {
        "INSERT OR REPLACE INTO"
    }
}
