//! Column conversion helpers shared by the query modules.

use jiff::Timestamp;
use rusqlite::{types::Type, Row};

use crate::models::StepType;

/// Renders a timestamp for storage.
///
/// The fraction is always nine digits so that text comparison in SQL agrees
/// with chronological order.
pub(super) fn timestamp_to_sql(timestamp: &Timestamp) -> String {
    format!("{timestamp:.9}")
}

pub(super) fn optional_timestamp_to_sql(timestamp: Option<&Timestamp>) -> Option<String> {
    timestamp.map(timestamp_to_sql)
}

/// Escapes backslashes and the `%` and `_` wildcards so a
/// `LIKE ... ESCAPE '\'` pattern matches them literally.
pub(super) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(super) fn id_column(row: &Row, index: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(index)? as u64)
}

pub(super) fn optional_id_column(row: &Row, index: usize) -> rusqlite::Result<Option<u64>> {
    Ok(row.get::<_, Option<i64>>(index)?.map(|id| id as u64))
}

pub(super) fn timestamp_column(row: &Row, index: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(index)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

pub(super) fn optional_timestamp_column(
    row: &Row,
    index: usize,
) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(index)?
        .map(|value| {
            value.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

pub(super) fn step_type_column(row: &Row, index: usize) -> rusqlite::Result<StepType> {
    let value: String = row.get(index)?;
    value.parse::<StepType>().map_err(|reason| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, reason.into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_timestamps_sort_chronologically() {
        let whole: Timestamp = "2024-03-01T10:00:00Z".parse().unwrap();
        let fraction: Timestamp = "2024-03-01T10:00:00.5Z".parse().unwrap();

        let whole_sql = timestamp_to_sql(&whole);
        let fraction_sql = timestamp_to_sql(&fraction);

        assert_eq!(whole_sql, "2024-03-01T10:00:00.000000000Z");
        assert!(whole_sql < fraction_sql);
        assert_eq!(whole_sql.parse::<Timestamp>().unwrap(), whole);
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("Release"), "Release");
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
