//! Extraction of the traffic counters from the router's statistics page.
//!
//! The page lists its counters in a table identified by its `summary`
//! attribute. Each row carries the counter name in a `<th>` and the value in a
//! `<td>`:
//!
//! ```html
//! <table summary="Ethernet IPv4 Statistics Table">
//!   <tr><th>Receive Bytes</th><td>1740360955</td></tr>
//!   <tr><th>Transmit Bytes</th><td>328481009</td></tr>
//! </table>
//! ```

use crate::{
    DocumentParseError,
    StatsSnapshot,
};
use scraper::{
    ElementRef,
    Html,
    Selector,
};
use std::collections::HashMap;

pub const STATISTICS_TABLE_SUMMARY: &str = "Ethernet IPv4 Statistics Table";
pub const RECEIVE_BYTES_LABEL: &str = "Receive Bytes";
pub const TRANSMIT_BYTES_LABEL: &str = "Transmit Bytes";

const TABLE_SELECTOR: &str = r#"table[summary="Ethernet IPv4 Statistics Table"]"#;
const ROW_SELECTOR: &str = "tr";
const LABEL_SELECTOR: &str = "th";
const VALUE_SELECTOR: &str = "td";

impl StatsSnapshot {
    /// Parses the router statistics page.
    ///
    /// Only the first table labelled [`STATISTICS_TABLE_SUMMARY`] is read. Its
    /// rows may come in any order.
    pub fn from_document(document: &str) -> Result<StatsSnapshot, DocumentParseError> {
        let html = Html::parse_document(document);
        let table_selector = selector(TABLE_SELECTOR)?;

        let table = html
            .select(&table_selector)
            .next()
            .ok_or(DocumentParseError::MissingTable {
                summary: STATISTICS_TABLE_SUMMARY,
            })?;
        let rows = table_rows(table)?;

        let received_bytes = counter(&rows, RECEIVE_BYTES_LABEL)?;
        let transmitted_bytes = counter(&rows, TRANSMIT_BYTES_LABEL)?;

        Ok(StatsSnapshot::from_counters(received_bytes, transmitted_bytes))
    }
}

fn selector(css: &'static str) -> Result<Selector, DocumentParseError> {
    Selector::parse(css).map_err(|e| DocumentParseError::Selector {
        selector: css,
        reason: e.to_string(),
    })
}

/// Maps each row label to its value. The first row wins when a label repeats.
fn table_rows(table: ElementRef<'_>) -> Result<HashMap<String, String>, DocumentParseError> {
    let row_selector = selector(ROW_SELECTOR)?;
    let label_selector = selector(LABEL_SELECTOR)?;
    let value_selector = selector(VALUE_SELECTOR)?;

    let mut rows = HashMap::new();
    for row in table.select(&row_selector) {
        let (Some(label), Some(value)) = (
            row.select(&label_selector).next(),
            row.select(&value_selector).next(),
        ) else {
            continue;
        };
        rows.entry(text(label)).or_insert_with(|| text(value));
    }
    Ok(rows)
}

fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn counter(rows: &HashMap<String, String>, label: &'static str) -> Result<u64, DocumentParseError> {
    let value = rows.get(label).ok_or(DocumentParseError::MissingRow { label })?;
    value.parse().map_err(|source| DocumentParseError::InvalidCounter {
        label,
        value: value.clone(),
        source,
    })
}
