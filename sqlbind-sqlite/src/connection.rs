use crate::{
    CBox, SqliteDriver, SqlitePrepared, as_c_int, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::{
    SQLITE_BUSY, SQLITE_DONE, SQLITE_MISUSE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_changes64, sqlite3_close, sqlite3_column_count,
    sqlite3_errmsg, sqlite3_extended_errcode, sqlite3_finalize, sqlite3_last_insert_rowid,
    sqlite3_open_v2, sqlite3_prepare_v2, sqlite3_reset, sqlite3_set_last_insert_rowid,
    sqlite3_step,
};
use sqlbind_core::{
    Connection, Context, Driver, DriverError, Error, Result, RowLabeled, RowNames, TypeCode,
    Value, truncate_long,
};
use std::{
    ffi::{CStr, CString, c_int},
    ptr,
};

pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
}

impl SqliteConnection {
    fn last_error(&self) -> DriverError {
        unsafe {
            DriverError::new(
                sqlite3_extended_errcode(*self.connection),
                error_message_from_ptr(&sqlite3_errmsg(*self.connection)),
            )
        }
    }
}

impl Connection for SqliteConnection {
    type Driver = SqliteDriver;
    type Prepared = SqlitePrepared;

    fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = format!("{}://", <Self::Driver as Driver>::NAME);
        if !url.starts_with(&prefix) {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                &prefix
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let path = CString::new(format!("file:{}", url.trim_start_matches(&prefix)))
            .with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            if sqlite3_close(p) != SQLITE_OK {
                log::warn!("Could not close the sqlite connection, some statements are still open");
            }
        });
        let rc = unsafe {
            sqlite3_open_v2(
                path.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                ptr::null(),
            )
        };
        let result = Self { connection };
        if rc != SQLITE_OK {
            let error = Error::new(result.last_error()).context(format!(
                "Could not open the database `{}`",
                url
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(result)
    }

    fn prepare(&self, sql: &str) -> std::result::Result<SqlitePrepared, DriverError> {
        let query = CString::new(sql.as_bytes()).map_err(|e| {
            DriverError::new(
                SQLITE_MISUSE,
                format!("Could not create a CString from the query String: {e}"),
            )
        })?;
        let mut statement = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_finalize(p);
        });
        let length = as_c_int(sql.len() + 1, "query length")?;
        let mut tail = ptr::null();
        let rc = unsafe {
            sqlite3_prepare_v2(
                *self.connection,
                query.as_ptr(),
                length,
                &mut *statement,
                &mut tail,
            )
        };
        if rc != SQLITE_OK {
            return Err(self.last_error());
        }
        if statement.is_null() {
            return Err(DriverError::new(
                SQLITE_MISUSE,
                format!("The query contains no statement:\n{}", truncate_long!(sql)),
            ));
        }
        let remaining = if tail.is_null() {
            ""
        } else {
            unsafe { CStr::from_ptr(tail) }.to_str().unwrap_or_default()
        };
        if !remaining.trim().is_empty() {
            return Err(DriverError::new(
                SQLITE_MISUSE,
                "Cannot prepare more than one statement at a time",
            ));
        }
        Ok(SqlitePrepared::new(statement, sql.to_string()))
    }

    fn bind(
        &self,
        prepared: &mut SqlitePrepared,
        types: &[TypeCode],
        values: &[Value],
    ) -> std::result::Result<(), DriverError> {
        prepared.bind_all(types, values)
    }

    fn execute(&self, prepared: &mut SqlitePrepared) -> std::result::Result<bool, DriverError> {
        unsafe {
            sqlite3_reset(*prepared.statement);
            let readonly = prepared.is_readonly();
            // Zero means no rowid was generated by this step
            sqlite3_set_last_insert_rowid(*self.connection, 0);
            let rc = loop {
                match sqlite3_step(*prepared.statement) {
                    SQLITE_BUSY => continue,
                    rc => break rc,
                }
            };
            prepared.row_pending = rc == SQLITE_ROW;
            prepared.exhausted = rc != SQLITE_ROW;
            if rc != SQLITE_ROW && rc != SQLITE_DONE {
                return Err(self.last_error());
            }
            if readonly {
                (prepared.changes, prepared.inserted_id) = (0, None);
            } else {
                let changes = sqlite3_changes64(*self.connection) as u64;
                let rowid = sqlite3_last_insert_rowid(*self.connection);
                prepared.changes = changes;
                prepared.inserted_id = (changes > 0 && rowid > 0).then_some(rowid);
            }
        }
        Ok(true)
    }

    fn fetch_rows<'p>(
        &'p self,
        prepared: &'p mut SqlitePrepared,
    ) -> impl Iterator<Item = std::result::Result<RowLabeled, DriverError>> + 'p {
        let statement = *prepared.statement;
        let count = unsafe { sqlite3_column_count(statement) };
        let labels = (0..count)
            .map(|i| extract_name(statement, i))
            .collect::<std::result::Result<RowNames, _>>();
        SqliteRows {
            prepared,
            labels,
            count,
            done: false,
        }
    }

    fn close(&self, prepared: SqlitePrepared) {
        drop(prepared);
    }

    fn last_insert_id(&self, prepared: &SqlitePrepared) -> Option<i64> {
        prepared.inserted_id
    }

    fn affected_rows(&self, prepared: &SqlitePrepared) -> u64 {
        prepared.changes
    }
}

/// Rows of an executed statement: the one produced by the execution step first,
/// then one per further step.
struct SqliteRows<'p> {
    prepared: &'p mut SqlitePrepared,
    labels: std::result::Result<RowNames, DriverError>,
    count: c_int,
    done: bool,
}

impl<'p> Iterator for SqliteRows<'p> {
    type Item = std::result::Result<RowLabeled, DriverError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let labels = match &self.labels {
            Ok(labels) => labels.clone(),
            Err(e) => {
                self.done = true;
                return Some(Err(e.clone()));
            }
        };
        if !self.prepared.row_pending {
            if self.prepared.exhausted {
                self.done = true;
                return None;
            }
            let rc = loop {
                match unsafe { sqlite3_step(*self.prepared.statement) } {
                    SQLITE_BUSY => continue,
                    rc => break rc,
                }
            };
            match rc {
                SQLITE_ROW => {}
                SQLITE_DONE => {
                    self.done = true;
                    self.prepared.exhausted = true;
                    return None;
                }
                _ => {
                    self.done = true;
                    self.prepared.exhausted = true;
                    return Some(Err(self.prepared.last_error()));
                }
            }
        }
        self.prepared.row_pending = false;
        let statement = *self.prepared.statement;
        let values = (0..self.count)
            .map(|i| extract_value(statement, i))
            .collect::<std::result::Result<Box<[_]>, _>>();
        Some(values.map(|values| RowLabeled::new(labels, values)))
    }
}
