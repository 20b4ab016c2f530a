mod bulk;
mod crud;
mod cursor;
mod joined;
mod latch;
mod musketeers;
mod scalars;
mod transactions;

use crate::{
    bulk::bulk_insert,
    crud::crud,
    cursor::cursor,
    joined::joined_sessions,
    latch::{closed_session, records_inspecting_session, sticky_error},
    musketeers::musketeers,
    scalars::scalars,
    transactions::transactions,
};
use log::LevelFilter;
use rowmap::Connection;
use std::env;

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

/// Run every scenario against the store addressed by `url`, each one on its own
/// connection.
pub fn execute_tests<C: Connection>(url: &str) {
    crud::<C>(url);
    scalars::<C>(url);
    cursor::<C>(url);
    transactions::<C>(url);
    bulk_insert::<C>(url);
    musketeers::<C>(url);
    sticky_error::<C>(url);
    records_inspecting_session::<C>(url);
    closed_session::<C>(url);
    joined_sessions::<C>(url);
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
