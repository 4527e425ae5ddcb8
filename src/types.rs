use serde::{Deserialize, Serialize};

/// Cell count a table row must have to be considered.
pub const MIN_CELLS: usize = 4;

pub const MISSING_CELL: &str = "N/A";

pub const BUY_LABEL: &str = "Potential Buy Signal";

/// One `<tr>` as observed in the rendered page: the first four cells, trimmed,
/// plus the lowercased text of the whole row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow { pub cells: Vec<String>, pub text: String }

impl RawRow {
    pub fn cell(&self, idx: usize) -> &str {
        self.cells.get(idx).map(String::as_str).filter(|c| !c.is_empty()).unwrap_or(MISSING_CELL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub price: String,
    pub change: String,
    pub volume: String,
    #[serde(rename = "signal")]
    pub label: String,
}

impl Signal {
    pub fn identity(&self) -> SignalIdentity {
        SignalIdentity { symbol: self.symbol.clone(), price: self.price.clone(), change: self.change.clone() }
    }
}

/// Dedup key for a signal: the same symbol quoted at the same price and change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalIdentity { pub symbol: String, pub price: String, pub change: String }

impl std::fmt::Display for SignalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.symbol, self.price, self.change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanStage { #[default] Idle, Rendering, Extracting, Classifying, Formatting, Notifying, Failed }

impl std::fmt::Display for ScanStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Rendering => "rendering",
            Self::Extracting => "extracting",
            Self::Classifying => "classifying",
            Self::Formatting => "formatting",
            Self::Notifying => "notifying",
            Self::Failed => "failed",
        })
    }
}

/// What started a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger { Timer, Manual }

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self { Self::Timer => "scheduled", Self::Manual => "manual" })
    }
}
