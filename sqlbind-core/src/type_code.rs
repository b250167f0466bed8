use crate::Value;
use std::fmt::{self, Display, Write};

/// Wire level type a parameter is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Integer,
    String,
    Double,
    Blob,
}

/// Reserved parameter name prefixes hinting the bind type.
pub const TYPE_HINT_PREFIXES: [(&str, TypeCode); 4] = [
    ("int_", TypeCode::Integer),
    ("str_", TypeCode::String),
    ("dbl_", TypeCode::Double),
    ("blb_", TypeCode::Blob),
];

impl TypeCode {
    /// Single character code (`i`, `s`, `d`, `b`).
    pub const fn as_char(self) -> char {
        match self {
            TypeCode::Integer => 'i',
            TypeCode::String => 's',
            TypeCode::Double => 'd',
            TypeCode::Blob => 'b',
        }
    }

    pub const fn from_char(c: char) -> Option<TypeCode> {
        match c {
            'i' => Some(TypeCode::Integer),
            's' => Some(TypeCode::String),
            'd' => Some(TypeCode::Double),
            'b' => Some(TypeCode::Blob),
            _ => None,
        }
    }

    /// Type implied by a reserved prefix of `name`, if any.
    pub fn from_prefix(name: &str) -> Option<TypeCode> {
        TYPE_HINT_PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, code)| *code)
    }

    /// Type inferred from the runtime kind of the value. Nulls are strings,
    /// typed ones (`Int32(None)`) included.
    pub fn infer(value: &Value) -> TypeCode {
        if value.is_null() {
            TypeCode::String
        } else if value.is_integral() {
            TypeCode::Integer
        } else if value.is_floating() {
            TypeCode::Double
        } else {
            TypeCode::String
        }
    }
}

impl Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.as_char())
    }
}

/// Renders a sequence of type codes as the compact signature string (`"is"`).
pub fn signature(types: &[TypeCode]) -> String {
    types.iter().map(|v| v.as_char()).collect()
}
