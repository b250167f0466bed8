use crate::{Driver, DriverError, Prepared, Result, RowLabeled, RowsAffected, TypeCode, Value};

/// Boundary with the SQL driver.
///
/// Statements only ever use these calls, the connection keeps ownership of
/// the session. Every operation is a blocking round trip, the core assumes
/// at most one in flight prepare/execute per connection.
pub trait Connection: Sized {
    type Driver: Driver<Connection = Self>;
    type Prepared: Prepared;

    /// Open a connection to the given URL.
    fn connect(url: &str) -> Result<Self>;

    fn prepare(&self, sql: &str) -> std::result::Result<Self::Prepared, DriverError>;

    /// Bind `values` with their parallel `types` signature, replacing any
    /// previous binding of the handle.
    fn bind(
        &self,
        prepared: &mut Self::Prepared,
        types: &[TypeCode],
        values: &[Value],
    ) -> std::result::Result<(), DriverError>;

    fn execute(&self, prepared: &mut Self::Prepared) -> std::result::Result<bool, DriverError>;

    /// Cursor over the rows produced by the last execution.
    fn fetch_rows<'p>(
        &'p self,
        prepared: &'p mut Self::Prepared,
    ) -> impl Iterator<Item = std::result::Result<RowLabeled, DriverError>> + 'p;

    fn close(&self, prepared: Self::Prepared);

    fn last_insert_id(&self, prepared: &Self::Prepared) -> Option<i64>;

    fn affected_rows(&self, prepared: &Self::Prepared) -> u64;

    /// Prepare, execute and close a parameterless statement.
    fn execute_raw(&self, sql: &str) -> std::result::Result<RowsAffected, DriverError> {
        let mut prepared = self.prepare(sql)?;
        let result = self.execute(&mut prepared).and_then(|success| {
            if success {
                Ok(RowsAffected {
                    rows_affected: self.affected_rows(&prepared),
                    last_affected_id: self.last_insert_id(&prepared),
                })
            } else {
                Err(DriverError::new(0, "The driver reported an unsuccessful execution"))
            }
        });
        self.close(prepared);
        result
    }

    fn begin(&self) -> std::result::Result<(), DriverError> {
        self.execute_raw("BEGIN").map(|_| ())
    }

    fn commit(&self) -> std::result::Result<(), DriverError> {
        self.execute_raw("COMMIT").map(|_| ())
    }

    fn rollback(&self) -> std::result::Result<(), DriverError> {
        self.execute_raw("ROLLBACK").map(|_| ())
    }

    /// Escape a string literal. Prefer binding parameters.
    fn escape(&self, value: &str) -> String {
        value.replace('\'', "''")
    }
}
