use serde::{Deserialize, Serialize};

/// Per-document "observed on storage" flags. Only the verification
/// reconciler produces values other than the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFlags {
    pub text: bool,
    pub figures: bool,
    pub metadata: bool,
    pub tables: bool,
    pub formulas: bool,
}

impl ExtractionFlags {
    pub fn count_present(&self) -> usize {
        [
            self.text,
            self.figures,
            self.metadata,
            self.tables,
            self.formulas,
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}
