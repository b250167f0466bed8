mod dml;
mod errors;
mod invoices;
mod reuse;
#[cfg(not(feature = "disable-transactions"))]
mod transaction;
mod users;

use crate::{dml::dml, errors::errors, invoices::invoices, reuse::reuse, users::users};
use log::LevelFilter;
use sqlbind::{Connection, Database, StatementConfig, Stats};
use std::{env, sync::Arc};
#[cfg(not(feature = "disable-transactions"))]
use transaction::transaction;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the whole suite against a freshly opened connection.
///
/// Every part creates (and drops first) the tables it uses, the database
/// must accept `CREATE TABLE`, `DROP TABLE IF EXISTS` and single statements.
pub fn execute_tests<C: Connection>(connection: C) {
    let mut db = Database::with_config(
        connection,
        StatementConfig {
            stats: Arc::new(Stats::new()),
            ..Default::default()
        },
    );
    users(&mut db);
    reuse(&db);
    dml(&db);
    invoices(&mut db);
    errors(&db);
    #[cfg(not(feature = "disable-transactions"))]
    transaction(&db);
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
