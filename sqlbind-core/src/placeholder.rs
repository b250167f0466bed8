use crate::{ParamKey, Result, StatementError, TypeCode, Value, log_error, signature};
use regex::{Captures, Regex};
use std::{
    collections::{BTreeMap, HashMap},
    sync::LazyLock,
};

/// Marker every placeholder is rewritten to before reaching the driver.
pub const MARKER: char = '?';

/// `?` followed by one or more word characters.
static NAMED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\?((?-u:\w)+)").unwrap()
});

/// Types and values in the exact order the driver binds them.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Bindings {
    pub types: Vec<TypeCode>,
    pub values: Vec<Value>,
}

impl Bindings {
    pub fn push(&mut self, ty: TypeCode, value: Value) {
        self.types.push(ty);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Compact type signature, like `"is"`.
    pub fn signature(&self) -> String {
        signature(&self.types)
    }

    /// Positional binding, the type comes from the runtime kind only.
    pub fn indexed<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut result = Bindings::default();
        for value in values {
            result.push(TypeCode::infer(value), value.clone());
        }
        result
    }
}

/// Output of the named placeholder resolution.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The SQL with every named placeholder replaced by [`MARKER`].
    pub sql: String,
    pub bindings: Bindings,
}

/// Names of the named placeholders in `sql`, in source order (repetitions included).
pub fn placeholder_names(sql: &str) -> impl Iterator<Item = &str> {
    NAMED_PLACEHOLDER
        .captures_iter(sql)
        .filter_map(|v| v.get(1).map(|v| v.as_str()))
}

/// Bind type of the named parameter: explicit type, then reserved prefix,
/// then runtime kind.
pub fn resolve_type(name: &str, value: &Value, explicit: &HashMap<String, TypeCode>) -> TypeCode {
    explicit
        .get(name)
        .copied()
        .or_else(|| TypeCode::from_prefix(name))
        .unwrap_or_else(|| TypeCode::infer(value))
}

/// Rewrite every named placeholder of `sql` to the universal marker, collecting
/// the bind types and values in placeholder order.
///
/// A bare `?` is left untouched. Parameters never referenced are ignored, a
/// placeholder without a value fails with [`StatementError::MissingParameter`].
pub fn resolve_named(
    sql: &str,
    params: &BTreeMap<ParamKey, Value>,
    explicit: &HashMap<String, TypeCode>,
) -> Result<Resolved> {
    let mut bindings = Bindings::default();
    let mut missing = None;
    let rewritten = NAMED_PLACEHOLDER.replace_all(sql, |captures: &Captures| {
        let name = &captures[1];
        if missing.is_some() {
            return MARKER.to_string();
        }
        match params.get(&ParamKey::Name(name.to_string())) {
            Some(value) => {
                bindings.push(resolve_type(name, value, explicit), value.clone());
            }
            None => missing = Some(name.to_string()),
        }
        MARKER.to_string()
    });
    if let Some(name) = missing {
        return Err(log_error!(StatementError::MissingParameter { name }));
    }
    Ok(Resolved {
        sql: rewritten.into_owned(),
        bindings,
    })
}
