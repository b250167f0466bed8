use crate::{CBox, as_c_int, error_message_from_ptr};
use libsqlite3_sys::*;
use sqlbind_core::{DriverError, Prepared, TypeCode, Value, truncate_long};
use std::{
    ffi::c_int,
    fmt::{self, Display},
    os::raw::{c_char, c_void},
};

pub struct SqlitePrepared {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
    pub(crate) sql: String,
    /// The last step produced a row not yet handed out.
    pub(crate) row_pending: bool,
    /// No more rows until the next execution.
    pub(crate) exhausted: bool,
    pub(crate) changes: u64,
    pub(crate) inserted_id: Option<i64>,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<*mut sqlite3_stmt>, sql: String) -> Self {
        Self {
            statement,
            sql,
            row_pending: false,
            exhausted: true,
            changes: 0,
            inserted_id: None,
        }
    }

    pub(crate) fn last_error(&self) -> DriverError {
        unsafe {
            let db = sqlite3_db_handle(*self.statement);
            DriverError::new(
                sqlite3_extended_errcode(db),
                error_message_from_ptr(&sqlite3_errmsg(db)),
            )
        }
    }

    pub(crate) fn is_readonly(&self) -> bool {
        unsafe { sqlite3_stmt_readonly(*self.statement) != 0 }
    }

    /// Replace every binding of the statement, values are converted to the
    /// SQLite storage class matching their type code.
    pub(crate) fn bind_all(
        &mut self,
        types: &[TypeCode],
        values: &[Value],
    ) -> Result<(), DriverError> {
        unsafe {
            sqlite3_reset(*self.statement);
            sqlite3_clear_bindings(*self.statement);
            let expected = sqlite3_bind_parameter_count(*self.statement) as usize;
            if expected != values.len() || types.len() != values.len() {
                return Err(DriverError::new(
                    SQLITE_RANGE,
                    format!(
                        "The query expects {expected} parameters but {} were provided:\n{}",
                        values.len(),
                        truncate_long!(self.sql)
                    ),
                ));
            }
        }
        for (i, (ty, value)) in types.iter().zip(values).enumerate() {
            self.bind_index(as_c_int(i + 1, "parameter index")?, *ty, value)?;
        }
        Ok(())
    }

    fn bind_index(&mut self, index: c_int, ty: TypeCode, value: &Value) -> Result<(), DriverError> {
        let mismatch = |e: sqlbind_core::Error| {
            DriverError::new(
                SQLITE_MISMATCH,
                format!("Cannot bind parameter {index} as `{ty}`: {e:#}"),
            )
        };
        let statement = *self.statement;
        let rc = unsafe {
            if value.is_null() {
                sqlite3_bind_null(statement, index)
            } else {
                match ty {
                    TypeCode::Integer => {
                        sqlite3_bind_int64(statement, index, value.coerce_i64().map_err(mismatch)?)
                    }
                    TypeCode::Double => {
                        sqlite3_bind_double(statement, index, value.coerce_f64().map_err(mismatch)?)
                    }
                    TypeCode::String => {
                        let v = value.coerce_text().map_err(mismatch)?;
                        sqlite3_bind_text(
                            statement,
                            index,
                            v.as_ptr() as *const c_char,
                            as_c_int(v.len(), "text length")?,
                            SQLITE_TRANSIENT(),
                        )
                    }
                    TypeCode::Blob => {
                        let v = value.coerce_bytes().map_err(mismatch)?;
                        sqlite3_bind_blob(
                            statement,
                            index,
                            v.as_ptr() as *const c_void,
                            as_c_int(v.len(), "blob length")?,
                            SQLITE_TRANSIENT(),
                        )
                    }
                }
            }
        };
        if rc != SQLITE_OK {
            let mut error = self.last_error();
            error.message = format!("Cannot bind parameter {index}: {}", error.message);
            return Err(error);
        }
        Ok(())
    }
}

impl Prepared for SqlitePrepared {
    fn sql(&self) -> &str {
        &self.sql
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:p} {}", *self.statement, truncate_long!(self.sql))
    }
}
