//! Reads candidate rows out of the rendered screener table.

use crate::types::{RawRow, MIN_CELLS, MISSING_CELL};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

pub const DEFAULT_PAIR_MARKER: &str = "usdt";

lazy_static! {
    static ref ROW: Selector = Selector::parse("tr").expect("static selector");
    static ref CELL: Selector = Selector::parse("td").expect("static selector");
}

pub struct RowExtractor {
    marker: String,
}

impl Default for RowExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PAIR_MARKER)
    }
}

impl RowExtractor {
    pub fn new(marker: &str) -> Self {
        Self { marker: marker.to_lowercase() }
    }

    /// Lazily yields every row with at least four cells whose text mentions the pair marker.
    pub fn rows<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = RawRow> + 'a {
        document.select(&ROW).filter_map(move |row| self.read_row(row))
    }

    fn read_row(&self, row: ElementRef<'_>) -> Option<RawRow> {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        if cells.len() < MIN_CELLS {
            return None;
        }

        let text = row.text().collect::<String>().to_lowercase();
        if !text.contains(&self.marker) {
            return None;
        }

        let cells: Vec<String> = cells.iter().take(MIN_CELLS).map(cell_text).collect();
        debug!("Candidate row: {:?}", cells);
        Some(RawRow { cells, text })
    }
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    let text = cell.text().collect::<String>();
    match text.trim() {
        "" => MISSING_CELL.to_string(),
        trimmed => trimmed.to_string(),
    }
}
