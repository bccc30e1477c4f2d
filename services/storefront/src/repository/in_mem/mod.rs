pub(super) mod catalog;
pub(super) mod order;

use std::result::Result as DefaultResult;
use std::str::FromStr;

use crate::datastore::AppInMemFetchedSingleRow;
use crate::error::{AppError, AppErrorCode};

// primary keys of the sequence table, each row keeps the last id assigned
mod _id_sequence {
    pub(super) const TABLE_LABEL: &str = "id_sequence";
}

fn next_seq_id(
    fetched: Option<&AppInMemFetchedSingleRow>,
) -> DefaultResult<u32, AppError> {
    let last = match fetched.and_then(|row| row.first()) {
        Some(raw) => parse_column::<u32>(raw.as_str(), "id_sequence")?,
        None => 0,
    };
    Ok(last + 1)
}

fn parse_column<T: FromStr>(raw: &str, label: &str) -> DefaultResult<T, AppError> {
    raw.parse::<T>().map_err(|_e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("column:{label}, raw:{raw}")),
    })
}

fn get_column<'a>(
    row: &'a AppInMemFetchedSingleRow,
    idx: usize,
    label: &str,
) -> DefaultResult<&'a str, AppError> {
    row.get(idx).map(String::as_str).ok_or_else(|| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("missing-column:{label}, idx:{idx}")),
    })
}
