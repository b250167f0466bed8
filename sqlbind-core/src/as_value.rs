use crate::{Error, Result, Value, truncate_long};
use anyhow::Context;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{any, borrow::Cow, str::FromStr};
use time::format_description::parse_borrowed;
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// It is used both ways: when binding parameters (`as_value`) and when
/// hydrating a row into a typed record (`try_from_value`).
///
/// # Error semantics
/// - Integer narrowing is range checked, the message includes both the
///   offending value and the target type.
/// - Text coming back from the driver (`Value::Varchar`) is parsed when the
///   target is numeric or temporal, drivers like SQLite do not keep the
///   declared type of a column.
///
/// # Examples
/// ```rust
/// use sqlbind_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The typed null of this type.
    fn as_empty_value() -> Value;
    /// Convert into the owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

fn parse_text<T: FromStr>(value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse::<T>().with_context(|| {
        format!(
            "Cannot parse `{}` as {}",
            truncate_long!(value),
            any::type_name::<T>()
        )
    })
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {value:?} to {}",
        any::type_name::<T>(),
    ))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let wide: i128 = match value {
                    $destination(Some(v)) => return Ok(v),
                    Value::Boolean(Some(v)) => v as i128,
                    Value::Int8(Some(v)) => v as i128,
                    Value::Int16(Some(v)) => v as i128,
                    Value::Int32(Some(v)) => v as i128,
                    Value::Int64(Some(v)) => v as i128,
                    Value::UInt8(Some(v)) => v as i128,
                    Value::UInt16(Some(v)) => v as i128,
                    Value::UInt32(Some(v)) => v as i128,
                    Value::UInt64(Some(v)) => v as i128,
                    Value::Decimal(Some(v)) => {
                        let error = Error::msg(format!(
                            "Value {v}: Decimal does not fit into {}",
                            any::type_name::<Self>()
                        ));
                        if !v.is_integer() {
                            return Err(error.context("The value is not a integer"));
                        }
                        v.to_i128().ok_or(error)?
                    }
                    Value::Varchar(Some(ref v)) => return parse_text::<Self>(v),
                    _ => return Err(conversion_error::<Self>(&value)),
                };
                <$source>::try_from(wide).map_err(|_| {
                    Error::msg(format!(
                        "Value {wide} is out of range for {}",
                        any::type_name::<Self>(),
                    ))
                })
            }
        }
    };
}
impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    Value::Float32(Some(v)) => Ok(v as _),
                    Value::Float64(Some(v)) => Ok(v as _),
                    Value::Int8(Some(v)) => Ok(v as _),
                    Value::Int16(Some(v)) => Ok(v as _),
                    Value::Int32(Some(v)) => Ok(v as _),
                    Value::Int64(Some(v)) => Ok(v as _),
                    Value::UInt8(Some(v)) => Ok(v as _),
                    Value::UInt16(Some(v)) => Ok(v as _),
                    Value::UInt32(Some(v)) => Ok(v as _),
                    Value::UInt64(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) => v
                        .to_f64()
                        .map(|v| v as _)
                        .ok_or_else(|| conversion_error::<Self>(&value)),
                    Value::Varchar(Some(ref v)) => parse_text::<Self>(v),
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v != 0),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt8(Some(v)) => Ok(v != 0),
            Value::UInt16(Some(v)) => Ok(v != 0),
            Value::UInt32(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) => match v.trim() {
                x if x.eq_ignore_ascii_case("true") || x == "1" => Ok(true),
                x if x.eq_ignore_ascii_case("false") || x == "0" => Ok(false),
                _ => Err(conversion_error::<Self>(&value)),
            },
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for char {
    fn as_empty_value() -> Value {
        Value::Char(None)
    }
    fn as_value(self) -> Value {
        Value::Char(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::msg(format!(
                        "Cannot convert Value::Varchar `{}` into a char, it must contain exactly one character",
                        truncate_long!(v)
                    ))),
                }
            }
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Char(Some(v)) => Ok(v.into()),
            Value::Blob(Some(ref v)) => String::from_utf8(v.to_vec())
                .with_context(|| format!("Cannot convert {value:?} to String")),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl<'a> AsValue for Cow<'a, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Cow::Owned)
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(Decimal::from(v)),
            Value::Int16(Some(v)) => Ok(Decimal::from(v)),
            Value::Int32(Some(v)) => Ok(Decimal::from(v)),
            Value::Int64(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt8(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt16(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt32(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt64(Some(v)) => Ok(Decimal::from(v)),
            Value::Float32(Some(v)) => {
                Decimal::from_f32(v).ok_or_else(|| conversion_error::<Self>(&value))
            }
            Value::Float64(Some(v)) => {
                Decimal::from_f64(v).ok_or_else(|| conversion_error::<Self>(&value))
            }
            Value::Varchar(Some(ref v)) => parse_text::<Self>(v),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => parse_text::<Self>(v),
            Value::Blob(Some(ref v)) => {
                Uuid::from_slice(v).with_context(|| format!("Cannot convert {value:?} to Uuid"))
            }
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

macro_rules! parse_time {
    ($value:expr, $($formats:literal),+ $(,)?) => {
        'value: {
            let value: &str = $value.trim();
            for format in [$($formats,)+] {
                let format = parse_borrowed::<2>(format)?;
                if let Ok(result) = <Self>::parse(value, &format) {
                    break 'value Ok(result);
                }
            }
            Err(Error::msg(format!(
                "Cannot parse `{}` as {}",
                truncate_long!(value),
                any::type_name::<Self>()
            )))
        }
    };
}

impl AsValue for time::Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(ref v)) => parse_time!(v, "[year]-[month]-[day]"),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for time::Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.time()),
            Value::Varchar(Some(ref v)) => parse_time!(
                v,
                "[hour]:[minute]:[second].[subsecond]",
                "[hour]:[minute]:[second]",
                "[hour]:[minute]",
            ),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for time::PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => parse_time!(
                v,
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
                "[year]-[month]-[day]T[hour]:[minute]:[second]",
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
                "[year]-[month]-[day] [hour]:[minute]:[second]",
                "[year]-[month]-[day] [hour]:[minute]",
            ),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(<T as AsValue>::try_from_value(value)?))
    }
}
