//! Removal of identifier and free-text columns before modeling

use polars::prelude::*;

use super::schema::{DOMAIN_COLUMN, FILENAME_COLUMN, TITLE_COLUMN, URL_COLUMN};

/// Columns that must never reach the model
pub const IDENTIFIER_COLUMNS: [&str; 4] =
    [FILENAME_COLUMN, TITLE_COLUMN, DOMAIN_COLUMN, URL_COLUMN];

/// Drop the identifier columns that are present.
///
/// Absent identifiers are ignored, so the call is idempotent. Returns the
/// pruned frame and the names that were actually removed.
pub fn drop_identifier_columns(df: DataFrame) -> (DataFrame, Vec<String>) {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .filter(|name| IDENTIFIER_COLUMNS.contains(&name.as_str()))
        .collect();

    if present.is_empty() {
        return (df, present);
    }

    let pruned = df.drop_many(present.iter().map(|s| s.as_str()));
    (pruned, present)
}
