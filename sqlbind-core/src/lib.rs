mod as_value;
mod coerce;
mod connection;
mod database;
mod driver;
mod error;
mod params;
mod placeholder;
mod prepared;
mod query;
mod record;
mod settings;
mod statement;
mod stats;
mod type_code;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use connection::*;
pub use database::*;
pub use driver::*;
pub use error::*;
pub use params::*;
pub use placeholder::*;
pub use prepared::*;
pub use query::*;
pub use record::*;
pub use settings::*;
pub use statement::*;
pub use stats::*;
pub use type_code::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
