//! Unix-second timestamp columns

use jiff::Timestamp;
use sqlx::{Row, sqlite::SqliteRow};

pub(crate) fn to_unix(timestamp: Timestamp) -> i64 {
    timestamp.as_second()
}

pub(crate) fn from_unix(column: &str, seconds: i64) -> Result<Timestamp, sqlx::Error> {
    Timestamp::from_second(seconds).map_err(|error| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    })
}

pub(crate) fn get_timestamp(row: &SqliteRow, column: &str) -> Result<Timestamp, sqlx::Error> {
    from_unix(column, row.try_get(column)?)
}

pub(crate) fn get_optional_timestamp(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Timestamp>, sqlx::Error> {
    row.try_get::<Option<i64>, _>(column)?
        .map(|seconds| from_unix(column, seconds))
        .transpose()
}
