use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the five extraction tasks a Run can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Metadata,
    Text,
    Figures,
    Tables,
    Formulas,
}

impl TaskKind {
    /// Canonical order used on the extraction command line.
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Metadata,
        TaskKind::Text,
        TaskKind::Figures,
        TaskKind::Tables,
        TaskKind::Formulas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Metadata => "metadata",
            TaskKind::Text => "text",
            TaskKind::Figures => "figures",
            TaskKind::Tables => "tables",
            TaskKind::Formulas => "formulas",
        }
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metadata" => Ok(TaskKind::Metadata),
            "text" => Ok(TaskKind::Text),
            "figures" => Ok(TaskKind::Figures),
            "tables" => Ok(TaskKind::Tables),
            "formulas" => Ok(TaskKind::Formulas),
            other => Err(format!("Unknown task: {}", other)),
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five independent task toggles of a Run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSelection {
    pub metadata: bool,
    pub text: bool,
    pub figures: bool,
    pub tables: bool,
    pub formulas: bool,
}

impl TaskSelection {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut selection = TaskSelection::default();
        for name in names {
            selection.set(name.as_ref().parse()?, true);
        }
        Ok(selection)
    }

    pub fn is_enabled(&self, task: TaskKind) -> bool {
        match task {
            TaskKind::Metadata => self.metadata,
            TaskKind::Text => self.text,
            TaskKind::Figures => self.figures,
            TaskKind::Tables => self.tables,
            TaskKind::Formulas => self.formulas,
        }
    }

    pub fn set(&mut self, task: TaskKind, enabled: bool) {
        match task {
            TaskKind::Metadata => self.metadata = enabled,
            TaskKind::Text => self.text = enabled,
            TaskKind::Figures => self.figures = enabled,
            TaskKind::Tables => self.tables = enabled,
            TaskKind::Formulas => self.formulas = enabled,
        }
    }

    pub fn selected(&self) -> Vec<TaskKind> {
        TaskKind::ALL
            .into_iter()
            .filter(|task| self.is_enabled(*task))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected().is_empty()
    }
}
