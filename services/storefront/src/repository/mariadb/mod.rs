pub(super) mod catalog;
pub(super) mod order;

use std::io::ErrorKind;
use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use sqlx::error::Error;
use sqlx::mysql::MySqlQueryResult;

use crate::error::{AppError, AppErrorCode};

impl From<Error> for AppError {
    fn from(value: Error) -> Self {
        let (code, detail) = match value {
            Error::Configuration(e) => (
                AppErrorCode::InvalidInput,
                e.to_string() + " invalid-db-config",
            ),
            Error::Io(e) => (
                AppErrorCode::IOerror(e.kind()),
                e.to_string() + " io-err-mariadb",
            ),
            Error::Database(e) => (AppErrorCode::RemoteDbServerFailure, e.to_string()),
            Error::Protocol(errmsg) => (AppErrorCode::IOerror(ErrorKind::InvalidData), errmsg),
            Error::Decode(e) => (AppErrorCode::DataCorruption, e.to_string()),
            Error::ColumnDecode { index, source } => (
                AppErrorCode::DataCorruption,
                source.to_string() + ", when decoding column at idx " + index.as_str(),
            ),
            Error::Tls(e) => (
                AppErrorCode::IOerror(ErrorKind::NotConnected),
                e.to_string(),
            ),
            Error::ColumnNotFound(col_name) => (
                AppErrorCode::IOerror(ErrorKind::NotFound),
                col_name + "no-col",
            ),
            Error::RowNotFound => (
                AppErrorCode::IOerror(ErrorKind::NotFound),
                "no-row".to_string(),
            ),
            Error::PoolTimedOut => (AppErrorCode::DatabaseServerBusy, "no-conn-avail".to_string()),
            Error::PoolClosed => (AppErrorCode::Unknown, "pool-closed".to_string()),
            _others => (
                AppErrorCode::Unknown,
                "internal-implementation-issue".to_string(),
            ),
        };
        Self {
            code,
            detail: Some(detail),
        }
    } // end of fn from
} // end of impl AppError

// all time columns are saved in UTC
fn to_app_time(raw: NaiveDateTime) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_naive_utc_and_offset(raw, Utc).fixed_offset()
}

fn check_num_affected(
    resultset: &MySqlQueryResult,
    expect: usize,
) -> DefaultResult<(), AppError> {
    let actual = resultset.rows_affected() as usize;
    if actual == expect {
        Ok(())
    } else {
        Err(AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(format!("num_affected, actual:{actual}, expect:{expect}")),
        })
    }
}

fn in_clause(num: usize) -> String {
    (0..num).map(|_| "?").collect::<Vec<_>>().join(",")
}
