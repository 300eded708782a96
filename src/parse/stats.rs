//! Generic header-keyed table mapping, used for the player stats page.

use std::collections::BTreeMap;

use crate::parse::tables::RawTable;

/// Zip each body row with the header row. Rows shorter than the header were
/// already skipped at extraction; extra trailing cells are ignored.
pub fn map_rows(table: &RawTable) -> Vec<BTreeMap<String, String>> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
        .collect()
}
