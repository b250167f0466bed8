#![allow(dead_code)]
use log::LevelFilter;
use sqlbind_core::{
    Connection, Driver, DriverError, Prepared, Result, RowLabeled, RowNames, TypeCode, Value,
    signature,
};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
    env,
    fmt::{self, Display},
    sync::Arc,
};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger.is_test(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Code the mock server reports when it went away.
pub const SERVER_GONE: i32 = 2006;

pub struct MockDriver;

impl Driver for MockDriver {
    type Connection = MockConnection;
    const NAME: &'static str = "mock";
    const CONNECTION_LOST_CODE: Option<i32> = Some(SERVER_GONE);
}

/// Driver calls recorded by [`MockConnection`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare(String),
    Bind(String, Vec<Value>),
    Execute(String),
    Close(String),
}

#[derive(Debug)]
pub struct MockPrepared {
    id: usize,
    sql: String,
}

impl Prepared for MockPrepared {
    fn sql(&self) -> &str {
        &self.sql
    }
}

impl Display for MockPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.sql)
    }
}

/// In memory connection recording every call and serving canned rows.
#[derive(Default)]
pub struct MockConnection {
    pub calls: RefCell<Vec<Call>>,
    pub rows: RefCell<Vec<RowLabeled>>,
    pub prepare_error: RefCell<Option<DriverError>>,
    pub bind_error: RefCell<Option<DriverError>>,
    pub execute_error: RefCell<Option<DriverError>>,
    pub execute_result: Cell<Option<bool>>,
    pub affected: Cell<u64>,
    pub last_id: Cell<Option<i64>>,
    next_id: Cell<usize>,
    open: RefCell<BTreeSet<usize>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `rows` with the given column names on every fetch.
    pub fn with_rows<const N: usize>(labels: [&str; N], rows: Vec<[Value; N]>) -> Self {
        let result = Self::default();
        result.set_rows(labels, rows);
        result
    }

    pub fn set_rows<const N: usize>(&self, labels: [&str; N], rows: Vec<[Value; N]>) {
        let labels: RowNames = labels.into_iter().map(String::from).collect();
        *self.rows.borrow_mut() = rows
            .into_iter()
            .map(|v| RowLabeled::new(labels.clone(), v.into()))
            .collect();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn prepared_sql(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|v| match v {
                Call::Prepare(sql) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn binds(&self) -> Vec<(String, Vec<Value>)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|v| match v {
                Call::Bind(signature, values) => Some((signature.clone(), values.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|v| f(v)).count()
    }

    /// Handles prepared and not closed yet.
    pub fn open_handles(&self) -> usize {
        self.open.borrow().len()
    }
}

impl Connection for MockConnection {
    type Driver = MockDriver;
    type Prepared = MockPrepared;

    fn connect(url: &str) -> Result<Self> {
        if !url.starts_with("mock://") {
            return Err(anyhow::anyhow!("Unexpected url `{url}`"));
        }
        Ok(Self::default())
    }

    fn prepare(&self, sql: &str) -> std::result::Result<Self::Prepared, DriverError> {
        self.calls.borrow_mut().push(Call::Prepare(sql.to_string()));
        if let Some(error) = self.prepare_error.borrow().clone() {
            return Err(error);
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.open.borrow_mut().insert(id);
        Ok(MockPrepared {
            id,
            sql: sql.to_string(),
        })
    }

    fn bind(
        &self,
        _prepared: &mut Self::Prepared,
        types: &[TypeCode],
        values: &[Value],
    ) -> std::result::Result<(), DriverError> {
        self.calls
            .borrow_mut()
            .push(Call::Bind(signature(types), values.to_vec()));
        match self.bind_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn execute(&self, prepared: &mut Self::Prepared) -> std::result::Result<bool, DriverError> {
        self.calls
            .borrow_mut()
            .push(Call::Execute(prepared.sql.clone()));
        if let Some(error) = self.execute_error.borrow().clone() {
            return Err(error);
        }
        Ok(self.execute_result.get().unwrap_or(true))
    }

    fn fetch_rows<'p>(
        &'p self,
        _prepared: &'p mut Self::Prepared,
    ) -> impl Iterator<Item = std::result::Result<RowLabeled, DriverError>> + 'p {
        self.rows.borrow().clone().into_iter().map(Ok)
    }

    fn close(&self, prepared: Self::Prepared) {
        self.calls.borrow_mut().push(Call::Close(prepared.sql.clone()));
        self.open.borrow_mut().remove(&prepared.id);
    }

    fn last_insert_id(&self, _prepared: &Self::Prepared) -> Option<i64> {
        self.last_id.get()
    }

    fn affected_rows(&self, _prepared: &Self::Prepared) -> u64 {
        self.affected.get()
    }
}

pub fn labels(names: &[&str]) -> RowNames {
    names.iter().map(|v| v.to_string()).collect::<Arc<[String]>>()
}
