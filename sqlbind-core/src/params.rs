use crate::{AsValue, Value};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display},
};

/// Key of a raw parameter: a placeholder name or a position in a list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    Name(String),
    Index(usize),
}

impl Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Name(v) => write!(f, "?{v}"),
            ParamKey::Index(v) => write!(f, "#{v}"),
        }
    }
}

/// Parameters passed directly to a fetch or execute call.
///
/// ```rust
/// use sqlbind_core::{Params, Value};
/// let positional = Params::from(vec![Value::from(1), "web".into()]);
/// let scalar = Params::from(2);
/// let named = Params::named([("int_id", 2)]);
/// assert_eq!(positional.len(), 2);
/// assert_eq!(scalar.len(), 1);
/// assert_eq!(named.len(), 1);
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Params {
    #[default]
    None,
    /// A single bare value, treated as a one element list.
    Scalar(Value),
    Indexed(Vec<Value>),
    Named(BTreeMap<String, Value>),
}

impl Params {
    pub fn named<K, V, It>(values: It) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        It: IntoIterator<Item = (K, V)>,
    {
        Params::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Params::None => 0,
            Params::Scalar(..) => 1,
            Params::Indexed(v) => v.len(),
            Params::Named(v) => v.len(),
        }
    }

    /// An empty collection counts as no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw parameters keyed by name or position.
    pub fn into_raw(self) -> BTreeMap<ParamKey, Value> {
        match self {
            Params::None => BTreeMap::new(),
            Params::Scalar(v) => BTreeMap::from([(ParamKey::Index(0), v)]),
            Params::Indexed(v) => v
                .into_iter()
                .enumerate()
                .map(|(i, v)| (ParamKey::Index(i), v))
                .collect(),
            Params::Named(v) => v.into_iter().map(|(k, v)| (ParamKey::Name(k), v)).collect(),
        }
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::None
    }
}

impl<V: AsValue> From<V> for Params {
    fn from(value: V) -> Self {
        Params::Scalar(value.as_value())
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Params::Scalar(value)
    }
}

impl From<&str> for Params {
    fn from(value: &str) -> Self {
        Params::Scalar(value.into())
    }
}

impl<V: Into<Value>> From<Vec<V>> for Params {
    fn from(value: Vec<V>) -> Self {
        Params::Indexed(value.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>, const N: usize> From<[V; N]> for Params {
    fn from(value: [V; N]) -> Self {
        Params::Indexed(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for Params {
    fn from(value: HashMap<K, V>) -> Self {
        Params::named(value)
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Params {
    fn from(value: BTreeMap<K, V>) -> Self {
        Params::named(value)
    }
}
