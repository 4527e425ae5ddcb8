use crate::types::{RawRow, Signal, BUY_LABEL};

const BULLISH_WORDS: &[&str] = &["buy", "strong"];

/// Decides whether a candidate row is a reportable buy signal.
#[derive(Default)]
pub struct SignalClassifier;

impl SignalClassifier {
    pub fn is_bullish(&self, row: &RawRow) -> bool {
        BULLISH_WORDS.iter().any(|w| row.text.contains(w)) || row.cell(2).contains('+')
    }

    pub fn classify(&self, row: &RawRow) -> Option<Signal> {
        if !self.is_bullish(row) {
            return None;
        }
        Some(Signal {
            symbol: row.cell(0).to_string(),
            price: row.cell(1).to_string(),
            change: row.cell(2).to_string(),
            volume: row.cell(3).to_string(),
            label: BUY_LABEL.to_string(),
        })
    }

    pub fn classify_all<I>(&self, rows: I) -> Vec<Signal>
    where
        I: IntoIterator<Item = RawRow>,
    {
        rows.into_iter().filter_map(|row| self.classify(&row)).collect()
    }
}
