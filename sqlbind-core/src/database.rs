use crate::{
    Connection, ConnectionSettings, Driver, Error, InsertOutcome, Model, Params, Record,
    RecordType, Result, RowsAffected, Statement, StatementConfig, StatementError, StatsSnapshot,
    log_error, truncate_long,
};
use std::{
    cell::{Cell, OnceCell},
    rc::Rc,
    sync::Arc,
};

/// Entry point over one connection: statements, one-shot queries and transactions.
///
/// ```rust,ignore
/// let db = Database::<SqliteConnection>::connect("sqlite://app.db?mode=rwc")?;
/// let user = db.fetch_one("SELECT * FROM users WHERE id = ?", 2, None)?;
/// ```
pub struct Database<C: Connection> {
    connection: C,
    config: StatementConfig,
    transaction: Cell<bool>,
}

impl<C: Connection> Database<C> {
    pub fn new(connection: C) -> Self {
        Self::with_config(connection, StatementConfig::default())
    }

    pub fn with_config(connection: C, config: StatementConfig) -> Self {
        Self {
            connection,
            config,
            transaction: Cell::new(false),
        }
    }

    pub fn connect(url: &str) -> Result<Self> {
        log::debug!("Connecting to {} through the {} driver", url, <C::Driver as Driver>::NAME);
        Ok(Self::new(C::connect(url)?))
    }

    pub fn connect_with(settings: &ConnectionSettings) -> Result<Self> {
        Self::connect(&settings.to_url())
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn config(&self) -> &StatementConfig {
        &self.config
    }

    /// Make a derived record type selectable by name through [`Statement::set_result_type`].
    pub fn register<R: Record>(&mut self) -> &mut Self {
        Arc::make_mut(&mut self.config.registry).register_record::<R>();
        self
    }

    pub fn register_type(&mut self, record_type: RecordType) -> &mut Self {
        Arc::make_mut(&mut self.config.registry).register(record_type);
        self
    }

    /// New statement sharing this database's registry and counters.
    pub fn prepare(&self, sql: impl Into<String>) -> Result<Statement<'_, C>> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(log_error!(StatementError::EmptySql));
        }
        Ok(Statement::with_config(
            &self.connection,
            sql,
            self.config.clone(),
        ))
    }

    pub fn fetch_one(
        &self,
        sql: impl Into<String>,
        params: impl Into<Params>,
        result_type: Option<&str>,
    ) -> Result<Option<Model>> {
        let mut statement = self.prepare(sql)?;
        statement.set_result_type(result_type)?.fetch_one(params)
    }

    pub fn fetch_all(
        &self,
        sql: impl Into<String>,
        params: impl Into<Params>,
        result_type: Option<&str>,
    ) -> Result<Vec<Model>> {
        let mut statement = self.prepare(sql)?;
        statement.set_result_type(result_type)?.fetch_all(params)
    }

    pub fn fetch_one_as<R: Record>(
        &self,
        sql: impl Into<String>,
        params: impl Into<Params>,
    ) -> Result<Option<R>> {
        self.prepare(sql)?.fetch_one_as(params)
    }

    pub fn fetch_all_as<R: Record>(
        &self,
        sql: impl Into<String>,
        params: impl Into<Params>,
    ) -> Result<Vec<R>> {
        self.prepare(sql)?.fetch_all_as(params)
    }

    pub fn insert(&self, sql: impl Into<String>, params: impl Into<Params>) -> Result<InsertOutcome> {
        self.prepare(sql)?.insert(params)
    }

    pub fn update(&self, sql: impl Into<String>, params: impl Into<Params>) -> Result<u64> {
        self.prepare(sql)?.update(params)
    }

    pub fn delete(&self, sql: impl Into<String>, params: impl Into<Params>) -> Result<u64> {
        self.prepare(sql)?.delete(params)
    }

    /// Run raw SQL without parameters.
    pub fn query(&self, sql: &str) -> Result<RowsAffected> {
        log::debug!("Running {}", truncate_long!(sql));
        self.connection.execute_raw(sql).map_err(|e| {
            Self::failure(e).context(format!("While running the query:\n{}", truncate_long!(sql)))
        })
    }

    /// Escape a string literal for the connected backend.
    pub fn escape(&self, value: &str) -> String {
        self.connection.escape(value)
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.get()
    }

    /// Start a transaction, does nothing when one is already open.
    pub fn begin(&self) -> Result<()> {
        if self.transaction.get() {
            log::debug!("Already in a transaction, `begin` ignored");
            return Ok(());
        }
        self.connection
            .begin()
            .map_err(|e| Self::failure(e).context("While starting a transaction"))?;
        self.transaction.set(true);
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        if !self.transaction.get() {
            return Err(log_error!(StatementError::NotInTransaction { action: "commit" }));
        }
        self.connection
            .commit()
            .map_err(|e| Self::failure(e).context("While committing the transaction"))?;
        self.transaction.set(false);
        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        if !self.transaction.get() {
            return Err(log_error!(StatementError::NotInTransaction {
                action: "rollback"
            }));
        }
        self.connection
            .rollback()
            .map_err(|e| Self::failure(e).context("While rolling back the transaction"))?;
        self.transaction.set(false);
        Ok(())
    }

    /// Counters of the statements created through this database.
    pub fn stats(&self) -> StatsSnapshot {
        self.config.stats.snapshot()
    }

    fn failure(error: crate::DriverError) -> Error {
        log_error!(StatementError::execute_failed(
            error,
            <C::Driver as Driver>::CONNECTION_LOST_CODE
        ))
    }
}

/// A [`Database`] that connects on first use.
pub struct LazyDatabase<C: Connection> {
    settings: ConnectionSettings,
    config: StatementConfig,
    database: OnceCell<Database<C>>,
}

impl<C: Connection> LazyDatabase<C> {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self::with_config(settings, StatementConfig::default())
    }

    pub fn with_config(settings: ConnectionSettings, config: StatementConfig) -> Self {
        Self {
            settings,
            config,
            database: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn is_connected(&self) -> bool {
        self.database.get().is_some()
    }

    /// The connected database, opening the connection if needed. A failed
    /// attempt is retried on the next call.
    pub fn database(&self) -> Result<&Database<C>> {
        if let Some(database) = self.database.get() {
            return Ok(database);
        }
        let connection = C::connect(&self.settings.to_url())?;
        Ok(self
            .database
            .get_or_init(|| Database::with_config(connection, self.config.clone())))
    }
}

/// Component running its queries through a database it is handed, either
/// already connected or lazy.
pub trait DatabaseAware<C: Connection> {
    fn set_database(&mut self, database: Rc<Database<C>>);
    fn set_lazy_database(&mut self, database: Rc<LazyDatabase<C>>);
}
