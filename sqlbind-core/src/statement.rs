use crate::{
    Bindings, Connection, Context, Driver, DriverError, Error, InsertOutcome, Model, ParamKey,
    Params, Record, RecordRegistry, RecordType, Result, RowsAffected, Stats, StatementError,
    TypeCode, Value, log_error, resolve_named, truncate_long,
};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Debug},
    sync::Arc,
};

/// Lifecycle of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    /// Constructed, nothing bound or prepared yet.
    Init,
    /// A driver handle is ready, waiting to be executed.
    Prepared,
    /// Named values were bound, the template is resolved at the next execution.
    Bound,
    /// The last execution completed, successfully or not.
    Executed,
}

/// Collaborators injected into a [`Statement`].
#[derive(Debug, Clone)]
pub struct StatementConfig {
    /// Record types [`Statement::set_result_type`] may select.
    pub registry: Arc<RecordRegistry>,
    pub stats: Arc<Stats>,
    /// Hydration target used when no result type is set on the statement.
    pub default_type: Option<Arc<RecordType>>,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            registry: Arc::new(RecordRegistry::default()),
            stats: Stats::global(),
            default_type: None,
        }
    }
}

enum Fetch {
    One,
    All,
}

/// One logical query against a connection.
///
/// Values are bound by name (`?label`), as a positional list or as a single
/// scalar. The statement owns its driver handle exclusively and releases it
/// when re-prepared, after a fetch, on failures and when dropped.
///
/// ```rust,ignore
/// let mut statement = Statement::new(&connection, "SELECT * FROM users WHERE id = ?int_id");
/// let user = statement.bind("int_id", 2).fetch_one(())?;
/// ```
pub struct Statement<'c, C: Connection> {
    connection: &'c C,
    config: StatementConfig,
    template: String,
    state: StatementState,
    raw_params: BTreeMap<ParamKey, Value>,
    explicit_types: HashMap<String, TypeCode>,
    bindings: Bindings,
    /// Rewritten SQL of the last resolution, what the driver receives.
    sql: Option<String>,
    result_type: Option<Arc<RecordType>>,
    prepared: Option<C::Prepared>,
    failure: Option<StatementError>,
}

impl<'c, C: Connection> Statement<'c, C> {
    pub fn new(connection: &'c C, sql: impl Into<String>) -> Self {
        Self::with_config(connection, sql, StatementConfig::default())
    }

    pub fn with_config(connection: &'c C, sql: impl Into<String>, config: StatementConfig) -> Self {
        config.stats.statement_created();
        Self {
            connection,
            config,
            template: sql.into(),
            state: StatementState::Init,
            raw_params: BTreeMap::new(),
            explicit_types: HashMap::new(),
            bindings: Bindings::default(),
            sql: None,
            result_type: None,
            prepared: None,
            failure: None,
        }
    }

    pub fn state(&self) -> StatementState {
        self.state
    }

    /// The SQL template this statement was constructed with.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// SQL sent to the driver by the last preparation.
    pub fn prepared_sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Types and values of the last binding, in placeholder order.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn signature(&self) -> String {
        self.bindings.signature()
    }

    pub fn is_open(&self) -> bool {
        self.prepared.is_some()
    }

    pub fn result_type(&self) -> Option<&Arc<RecordType>> {
        self.result_type.as_ref()
    }

    /// Bind a named value, its type is taken from the name prefix or the value itself.
    ///
    /// Binding a name again overwrites the previous value and any explicit type.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        self.explicit_types.remove(&name);
        self.raw_params.insert(ParamKey::Name(name), value.into());
        self.state = StatementState::Bound;
        self
    }

    /// Bind a named value with an explicit type, overriding any prefix hint.
    pub fn bind_typed(
        &mut self,
        name: impl Into<String>,
        ty: TypeCode,
        value: impl Into<Value>,
    ) -> &mut Self {
        let name = name.into();
        log::trace!("Binding `{name}` as `{ty}`");
        self.explicit_types.insert(name.clone(), ty);
        self.raw_params.insert(ParamKey::Name(name), value.into());
        self.state = StatementState::Bound;
        self
    }

    pub fn bind_int(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.bind_typed(name, TypeCode::Integer, value)
    }

    pub fn bind_string(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.bind_typed(name, TypeCode::String, value)
    }

    pub fn bind_double(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.bind_typed(name, TypeCode::Double, value)
    }

    pub fn bind_blob(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.bind_typed(name, TypeCode::Blob, value)
    }

    /// Select the registered record type rows are hydrated into, `None` restores the default.
    pub fn set_result_type(&mut self, name: Option<&str>) -> Result<&mut Self> {
        self.result_type = match name {
            Some(name) => Some(self.config.registry.resolve(name)?),
            None => None,
        };
        Ok(self)
    }

    /// Resolve, prepare and bind without executing.
    pub fn prepare(&mut self) -> Result<&mut Self> {
        self.prepare_with(Params::None)?;
        Ok(self)
    }

    /// First row as a generic [`Model`], `None` when the query produced no rows.
    pub fn fetch_one(&mut self, params: impl Into<Params>) -> Result<Option<Model>> {
        self.fetch_one_as::<Model>(params)
    }

    /// Every row as a generic [`Model`], possibly empty.
    pub fn fetch_all(&mut self, params: impl Into<Params>) -> Result<Vec<Model>> {
        self.fetch_all_as::<Model>(params)
    }

    pub fn fetch_one_as<R: Record>(&mut self, params: impl Into<Params>) -> Result<Option<R>> {
        let mut rows = self.fetch::<R>(params.into(), Fetch::One)?;
        Ok(rows.pop())
    }

    pub fn fetch_all_as<R: Record>(&mut self, params: impl Into<Params>) -> Result<Vec<R>> {
        self.fetch::<R>(params.into(), Fetch::All)
    }

    /// Execute a statement producing no rows, the handle stays open for the next execution.
    pub fn execute(&mut self, params: impl Into<Params>) -> Result<RowsAffected> {
        self.run(params.into())?;
        let Some(prepared) = self.prepared.as_ref() else {
            return Ok(RowsAffected::default());
        };
        let result = RowsAffected {
            rows_affected: self.connection.affected_rows(prepared),
            last_affected_id: self.connection.last_insert_id(prepared),
        };
        log::debug!(
            "{} rows affected, last id {:?}",
            result.rows_affected,
            result.last_affected_id
        );
        Ok(result)
    }

    /// Generated identifier when positive, else whether any row was written.
    pub fn insert(&mut self, params: impl Into<Params>) -> Result<InsertOutcome> {
        Ok(self.execute(params)?.insert_outcome())
    }

    pub fn update(&mut self, params: impl Into<Params>) -> Result<u64> {
        Ok(self.execute(params)?.rows_affected)
    }

    pub fn delete(&mut self, params: impl Into<Params>) -> Result<u64> {
        Ok(self.execute(params)?.rows_affected)
    }

    /// Release the driver handle, if any. The statement can still be executed again.
    pub fn close(&mut self) {
        if let Some(prepared) = self.prepared.take() {
            log::trace!("Closing {}", prepared);
            self.connection.close(prepared);
        }
    }

    fn fetch<R: Record>(&mut self, params: Params, mode: Fetch) -> Result<Vec<R>> {
        self.run(params)?;
        let target = self
            .result_type
            .clone()
            .or_else(|| self.config.default_type.clone())
            .unwrap_or_else(R::record_type);
        let connection = self.connection;
        let Some(prepared) = self.prepared.as_mut() else {
            return Ok(Vec::new());
        };
        let mut result = Vec::new();
        let mut failure: Option<Error> = None;
        for row in connection.fetch_rows(prepared) {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    failure = Some(Self::execute_error(e));
                    break;
                }
            };
            match Model::hydrate(row, target.clone()).and_then(R::from_model) {
                Ok(record) => result.push(record),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
            if matches!(mode, Fetch::One) {
                break;
            }
        }
        self.close();
        if let Some(error) = failure {
            return Err(error.context(format!(
                "While fetching the rows of the query:\n{}",
                truncate_long!(self.template)
            )));
        }
        log::debug!("Fetched {} rows as `{}`", result.len(), target.name);
        Ok(result)
    }

    /// Bring the statement up to a bound handle, following the dispatch rules:
    /// explicit parameters, then named binds, then the pending template, then
    /// the existing handle.
    fn prepare_with(&mut self, params: Params) -> Result<()> {
        if let Some(failure) = &self.failure {
            return Err(Error::new(failure.clone()).context(format!(
                "The statement previously failed to prepare:\n{}",
                truncate_long!(self.template)
            )));
        }
        let resolved = match params {
            Params::Named(values) if !values.is_empty() => {
                for (name, value) in values {
                    self.explicit_types.remove(&name);
                    self.raw_params.insert(ParamKey::Name(name), value);
                }
                Some(self.resolve()?)
            }
            params if !params.is_empty() => {
                self.raw_params.retain(|k, _| matches!(k, ParamKey::Name(..)));
                self.raw_params.extend(params.into_raw());
                let bindings = Bindings::indexed(self.raw_params.iter().filter_map(|(k, v)| {
                    matches!(k, ParamKey::Index(..)).then_some(v)
                }));
                Some((self.template.clone(), bindings))
            }
            _ => match self.state {
                StatementState::Bound => Some(self.resolve()?),
                StatementState::Init => Some(self.resolve()?),
                StatementState::Prepared | StatementState::Executed => None,
            },
        };
        match resolved {
            Some((sql, bindings)) => {
                self.bindings = bindings;
                self.load(sql)?;
            }
            None if self.prepared.is_none() => {
                let sql = match self.sql.clone() {
                    Some(sql) => sql,
                    None => self.resolve()?.0,
                };
                self.load(sql)?;
            }
            None => {}
        }
        self.state = StatementState::Prepared;
        Ok(())
    }

    fn resolve(&self) -> Result<(String, Bindings)> {
        let resolved = resolve_named(&self.template, &self.raw_params, &self.explicit_types)
            .with_context(|| {
                format!(
                    "While resolving the placeholders of the query:\n{}",
                    truncate_long!(self.template)
                )
            })?;
        Ok((resolved.sql, resolved.bindings))
    }

    /// Make sure a handle prepared from `sql` exists and bind the current values.
    fn load(&mut self, sql: String) -> Result<()> {
        let reuse = self
            .prepared
            .as_ref()
            .is_some_and(|_| self.sql.as_deref() == Some(sql.as_str()));
        if !reuse {
            self.close();
            log::debug!("Preparing {}", truncate_long!(sql));
            self.config.stats.prepare_issued();
            match self.connection.prepare(&sql) {
                Ok(prepared) => self.prepared = Some(prepared),
                Err(e) => {
                    let error = StatementError::prepare_failed(e);
                    self.failure = Some(error.clone());
                    self.state = StatementState::Executed;
                    return Err(log_error!(error).context(format!(
                        "While preparing the query:\n{}",
                        truncate_long!(sql)
                    )));
                }
            }
        }
        self.sql = Some(sql);
        if self.bindings.is_empty() {
            return Ok(());
        }
        log::trace!(
            "Binding `{}` with {:?}",
            self.bindings.signature(),
            self.bindings.values
        );
        let connection = self.connection;
        let Some(prepared) = self.prepared.as_mut() else {
            return Ok(());
        };
        if let Err(e) = connection.bind(prepared, &self.bindings.types, &self.bindings.values) {
            self.close();
            return Err(log_error!(StatementError::bind_failed(e)).context(format!(
                "While binding `{}` to the query:\n{}",
                self.bindings.signature(),
                truncate_long!(self.template)
            )));
        }
        Ok(())
    }

    fn run(&mut self, params: Params) -> Result<()> {
        self.prepare_with(params)?;
        let connection = self.connection;
        let Some(prepared) = self.prepared.as_mut() else {
            return Ok(());
        };
        log::debug!("Executing {}", prepared);
        self.config.stats.execution_issued();
        let result = connection.execute(prepared);
        self.state = StatementState::Executed;
        let error = match result {
            Ok(true) => return Ok(()),
            Ok(false) => DriverError::new(0, "The driver reported an unsuccessful execution"),
            Err(e) => e,
        };
        self.close();
        Err(Self::execute_error(error).context(format!(
            "While executing the query:\n{}",
            truncate_long!(self.template)
        )))
    }

    fn execute_error(error: DriverError) -> Error {
        log_error!(StatementError::execute_failed(
            error,
            <C::Driver as Driver>::CONNECTION_LOST_CODE
        ))
    }
}

impl<'c, C: Connection> Drop for Statement<'c, C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<'c, C: Connection> Debug for Statement<'c, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("template", &self.template)
            .field("state", &self.state)
            .field("sql", &self.sql)
            .field("bindings", &self.bindings)
            .field("result_type", &self.result_type.as_ref().map(|v| &v.name))
            .field("open", &self.prepared.is_some())
            .finish()
    }
}
