use crate::{Error, Result, Value, truncate_long};
use rust_decimal::prelude::ToPrimitive;
use std::borrow::Cow;

/// Conversions applied by drivers when a value is bound with a type code that
/// does not match its runtime kind (a string bound to `int_id` for example).
impl Value {
    /// Integer representation. Text is trimmed and parsed, floating values are
    /// truncated toward zero.
    pub fn coerce_i64(&self) -> Result<i64> {
        let error = || Error::msg(format!("Cannot bind {self:?} as an integer"));
        Ok(match self {
            Value::Boolean(Some(v)) => *v as i64,
            Value::Int8(Some(v)) => *v as i64,
            Value::Int16(Some(v)) => *v as i64,
            Value::Int32(Some(v)) => *v as i64,
            Value::Int64(Some(v)) => *v,
            Value::UInt8(Some(v)) => *v as i64,
            Value::UInt16(Some(v)) => *v as i64,
            Value::UInt32(Some(v)) => *v as i64,
            Value::UInt64(Some(v)) => i64::try_from(*v).map_err(|_| error())?,
            Value::Float32(Some(v)) => v.trunc() as i64,
            Value::Float64(Some(v)) => v.trunc() as i64,
            Value::Decimal(Some(v)) => v.trunc().to_i64().ok_or_else(error)?,
            Value::Varchar(Some(v)) => {
                let v = v.trim();
                match v.parse::<i64>() {
                    Ok(v) => v,
                    Err(..) => v.parse::<f64>().map(|v| v.trunc() as i64).map_err(|_| {
                        Error::msg(format!(
                            "Cannot bind text `{}` as an integer",
                            truncate_long!(v)
                        ))
                    })?,
                }
            }
            Value::Char(Some(v)) => v.to_digit(10).map(|v| v as i64).ok_or_else(error)?,
            _ => return Err(error()),
        })
    }

    /// Floating point representation. Text is trimmed and parsed.
    pub fn coerce_f64(&self) -> Result<f64> {
        let error = || Error::msg(format!("Cannot bind {self:?} as a double"));
        Ok(match self {
            Value::Float32(Some(v)) => *v as f64,
            Value::Float64(Some(v)) => *v,
            Value::Decimal(Some(v)) => v.to_f64().ok_or_else(error)?,
            Value::Varchar(Some(v)) => v.trim().parse::<f64>().map_err(|_| {
                Error::msg(format!(
                    "Cannot bind text `{}` as a double",
                    truncate_long!(v)
                ))
            })?,
            v if v.is_integral() => v.coerce_i64()? as f64,
            _ => return Err(error()),
        })
    }

    /// Textual representation. Collections are rendered in a bracketed form.
    pub fn coerce_text(&self) -> Result<Cow<'_, str>> {
        Ok(match self {
            Value::Varchar(Some(v)) => Cow::Borrowed(v.as_str()),
            Value::Boolean(Some(v)) => Cow::Borrowed(if *v { "1" } else { "0" }),
            Value::Int8(Some(v)) => itoa::Buffer::new().format(*v).to_owned().into(),
            Value::Int16(Some(v)) => itoa::Buffer::new().format(*v).to_owned().into(),
            Value::Int32(Some(v)) => itoa::Buffer::new().format(*v).to_owned().into(),
            Value::Int64(Some(v)) => itoa::Buffer::new().format(*v).to_owned().into(),
            Value::UInt8(Some(v)) => itoa::Buffer::new().format(*v).to_owned().into(),
            Value::UInt16(Some(v)) => itoa::Buffer::new().format(*v).to_owned().into(),
            Value::UInt32(Some(v)) => itoa::Buffer::new().format(*v).to_owned().into(),
            Value::UInt64(Some(v)) => itoa::Buffer::new().format(*v).to_owned().into(),
            Value::Float32(Some(v)) => ryu::Buffer::new().format(*v).to_owned().into(),
            Value::Float64(Some(v)) => ryu::Buffer::new().format(*v).to_owned().into(),
            Value::Decimal(Some(v)) => v.to_string().into(),
            Value::Char(Some(v)) => v.to_string().into(),
            Value::Blob(Some(v)) => String::from_utf8_lossy(v),
            Value::Date(Some(v)) => v.to_string().into(),
            Value::Time(Some(v)) => v.to_string().into(),
            Value::Timestamp(Some(v)) => v.to_string().into(),
            Value::Uuid(Some(v)) => v.to_string().into(),
            Value::List(Some(v)) => {
                let mut out = String::from("[");
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&item.coerce_text()?);
                }
                out.push(']');
                out.into()
            }
            Value::Map(Some(v)) => {
                let mut out = String::from("{");
                for (i, (key, item)) in v.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(key);
                    out.push_str(": ");
                    out.push_str(&item.coerce_text()?);
                }
                out.push('}');
                out.into()
            }
            _ => {
                return Err(Error::msg(format!("Cannot bind {self:?} as text")));
            }
        })
    }

    /// Raw bytes: blobs as they are, anything else through its text form.
    pub fn coerce_bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(match self {
            Value::Blob(Some(v)) => Cow::Borrowed(v.as_ref()),
            _ => match self.coerce_text()? {
                Cow::Borrowed(v) => Cow::Borrowed(v.as_bytes()),
                Cow::Owned(v) => Cow::Owned(v.into_bytes()),
            },
        })
    }
}
