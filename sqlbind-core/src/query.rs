use crate::Value;
use std::sync::Arc;

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Identifier generated by the last insert, when the driver reports one.
    pub last_affected_id: Option<i64>,
}

/// Result of [`crate::Statement::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The positive identifier generated for the new row.
    GeneratedId(i64),
    /// No identifier was generated: whether any row was written.
    Affected(bool),
}

impl RowsAffected {
    pub fn insert_outcome(&self) -> InsertOutcome {
        match self.last_affected_id {
            Some(id) if id > 0 => InsertOutcome::GeneratedId(id),
            _ => InsertOutcome::Affected(self.rows_affected > 0),
        }
    }
}

impl InsertOutcome {
    pub fn succeeded(&self) -> bool {
        match self {
            InsertOutcome::GeneratedId(..) => true,
            InsertOutcome::Affected(v) => *v,
        }
    }
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}
