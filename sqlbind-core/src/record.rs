use crate::{AsValue, Error, Result, RowLabeled, RowNames, StatementError, Value, log_error};
use std::{
    borrow::Cow,
    collections::HashMap,
    sync::{Arc, LazyLock},
};

/// Name of the generic, open shaped record type.
pub const MODEL: &str = "Model";

/// Description of a hydration target.
///
/// A closed shape lists the fields it accepts, any other column is an
/// [`StatementError::UnknownField`]. An open shape accepts arbitrary columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    pub name: Cow<'static, str>,
    pub fields: Option<Box<[Cow<'static, str>]>>,
}

impl RecordType {
    pub fn open(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            fields: None,
        }
    }

    pub fn closed<F, It>(name: impl Into<Cow<'static, str>>, fields: It) -> Self
    where
        F: Into<Cow<'static, str>>,
        It: IntoIterator<Item = F>,
    {
        Self {
            name: name.into(),
            fields: Some(fields.into_iter().map(Into::into).collect()),
        }
    }

    /// The shared generic record type.
    pub fn model() -> Arc<RecordType> {
        static MODEL_TYPE: LazyLock<Arc<RecordType>> =
            LazyLock::new(|| Arc::new(RecordType::open(MODEL)));
        MODEL_TYPE.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.fields.is_none()
    }

    pub fn accepts(&self, field: &str) -> bool {
        match &self.fields {
            None => true,
            Some(fields) => fields.iter().any(|v| v == field),
        }
    }
}

/// Registry of the record types a statement may hydrate into, by name.
#[derive(Debug, Clone)]
pub struct RecordRegistry {
    types: HashMap<String, Arc<RecordType>>,
}

impl Default for RecordRegistry {
    fn default() -> Self {
        let model = RecordType::model();
        Self {
            types: HashMap::from([(model.name.to_string(), model)]),
        }
    }
}

impl RecordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any previous one with the same name.
    pub fn register(&mut self, record_type: impl Into<Arc<RecordType>>) -> &mut Self {
        let record_type = record_type.into();
        log::trace!("Registering record type `{}`", record_type.name);
        self.types
            .insert(record_type.name.to_string(), record_type);
        self
    }

    pub fn register_record<R: Record>(&mut self) -> &mut Self {
        self.register(R::record_type())
    }

    pub fn get(&self, name: &str) -> Option<Arc<RecordType>> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Like [`RecordRegistry::get`] but an unknown name is an
    /// [`StatementError::InvalidResultType`].
    pub fn resolve(&self, name: &str) -> Result<Arc<RecordType>> {
        self.get(name).ok_or_else(|| {
            log_error!(StatementError::InvalidResultType {
                name: name.to_string(),
            })
        })
    }
}

/// Generic field-named record, the default hydration target.
///
/// Every `Model` owns its values: mutating one never affects another row.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    record_type: Arc<RecordType>,
    labels: RowNames,
    values: Box<[Value]>,
}

impl Model {
    /// Materialize `row` as a record of `record_type`, rejecting columns a
    /// closed shape does not declare.
    pub fn hydrate(row: RowLabeled, record_type: Arc<RecordType>) -> Result<Self> {
        if let Some(field) = row.labels.iter().find(|v| !record_type.accepts(v)) {
            return Err(log_error!(StatementError::UnknownField {
                record: record_type.name.to_string(),
                field: field.clone(),
            }));
        }
        Ok(Self {
            record_type,
            labels: row.labels,
            values: row.values,
        })
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn type_name(&self) -> &str {
        &self.record_type.name
    }

    pub fn names(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &mut self.values[i])
    }

    /// Convert the field `name` into `T`.
    pub fn get_as<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name).ok_or_else(|| {
            Error::msg(format!(
                "Column `{name}` does not exist in the `{}` record",
                self.record_type.name
            ))
        })?;
        T::try_from_value(value.clone())
    }

    /// Overwrite an existing field, returns the previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.get_mut(name)
            .map(|v| std::mem::replace(v, value.into()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Fails with [`StatementError::InvalidResultType`] unless this model was
    /// hydrated into the type named `name`.
    pub fn expect_type(&self, name: &str) -> Result<()> {
        if self.record_type.name != name {
            return Err(log_error!(StatementError::InvalidResultType {
                name: self.record_type.name.to_string(),
            })
            .context(format!(
                "The row was hydrated as `{}` but `{}` was requested",
                self.record_type.name, name
            )));
        }
        Ok(())
    }
}

impl IntoIterator for Model {
    type Item = (String, Value);
    type IntoIter = std::iter::Zip<std::vec::IntoIter<String>, std::vec::IntoIter<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels
            .to_vec()
            .into_iter()
            .zip(self.values.into_vec())
    }
}

impl From<Model> for RowLabeled {
    fn from(value: Model) -> Self {
        RowLabeled::new(value.labels, value.values)
    }
}

/// A type rows can be hydrated into.
///
/// Implemented by [`Model`] and by `#[derive(Record)]` structs.
pub trait Record: Sized {
    /// The type description used to validate the row columns.
    fn record_type() -> Arc<RecordType>;
    /// Build the record out of an hydrated model.
    fn from_model(model: Model) -> Result<Self>;
}

impl Record for Model {
    fn record_type() -> Arc<RecordType> {
        RecordType::model()
    }
    fn from_model(model: Model) -> Result<Self> {
        Ok(model)
    }
}
