use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ProjectRef, TaskKind, TaskSelection};

pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_CLASSIFICATION_THRESHOLD: f64 = 0.5;
pub const DEFAULT_CHUNK_SEPARATOR: &str = "\n\n";
pub const DEFAULT_CHUNK_SIZE: i32 = 1000;
pub const DEFAULT_CHUNK_OVERLAP: i32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureTuning {
    pub score_threshold: f64,
    pub classification_threshold: f64,
    pub candidate_labels: Vec<String>,
    pub accepted_labels: Vec<String>,
}

impl Default for FigureTuning {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            classification_threshold: DEFAULT_CLASSIFICATION_THRESHOLD,
            candidate_labels: Vec::new(),
            accepted_labels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphTuning {
    pub chunk_separator: String,
    pub chunk_size: i32,
    pub chunk_overlap: i32,
    /// Comma-separated node types, split when the command line is built.
    pub allowed_nodes: Option<String>,
    pub allowed_relationships: Option<String>,
    pub retry_condition: Option<String>,
    pub additional_instructions: Option<String>,
}

impl Default for GraphTuning {
    fn default() -> Self {
        Self {
            chunk_separator: DEFAULT_CHUNK_SEPARATOR.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            allowed_nodes: None,
            allowed_relationships: None,
            retry_condition: None,
            additional_instructions: None,
        }
    }
}

/// Externally reported per-task progress, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub metadata: f32,
    pub text: f32,
    pub figures: f32,
    pub tables: f32,
    pub formulas: f32,
}

/// Partial update of a Run's configuration. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunUpdate {
    pub metadata: Option<bool>,
    pub text: Option<bool>,
    pub figures: Option<bool>,
    pub tables: Option<bool>,
    pub formulas: Option<bool>,
    pub score_threshold: Option<f64>,
    pub classification_threshold: Option<f64>,
    pub candidate_labels: Option<Vec<String>>,
    pub accepted_labels: Option<Vec<String>>,
    pub chunk_separator: Option<String>,
    pub chunk_size: Option<i32>,
    pub chunk_overlap: Option<i32>,
    pub allowed_nodes: Option<String>,
    pub allowed_relationships: Option<String>,
    pub retry_condition: Option<String>,
    pub additional_instructions: Option<String>,
}

impl RunUpdate {
    pub fn field_count(&self) -> usize {
        let toggles = [
            self.metadata,
            self.text,
            self.figures,
            self.tables,
            self.formulas,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count();

        let others = [
            self.score_threshold.is_some(),
            self.classification_threshold.is_some(),
            self.candidate_labels.is_some(),
            self.accepted_labels.is_some(),
            self.chunk_separator.is_some(),
            self.chunk_size.is_some(),
            self.chunk_overlap.is_some(),
            self.allowed_nodes.is_some(),
            self.allowed_relationships.is_some(),
            self.retry_condition.is_some(),
            self.additional_instructions.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        toggles + others
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ProgressUpdate {
    pub metadata: Option<f32>,
    pub text: Option<f32>,
    pub figures: Option<f32>,
    pub tables: Option<f32>,
    pub formulas: Option<f32>,
}

/// One batch-processing job over a set of Documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    id: i32,
    project: ProjectRef,
    tasks: TaskSelection,
    figure_tuning: FigureTuning,
    graph_tuning: GraphTuning,
    is_executed: bool,
    progress: TaskProgress,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Run {
    /// A freshly created Run: nothing selected, never executed.
    pub fn new(id: i32, project: ProjectRef) -> Self {
        let now = Utc::now();
        Self {
            id,
            project,
            tasks: TaskSelection::default(),
            figure_tuning: FigureTuning::default(),
            graph_tuning: GraphTuning::default(),
            is_executed: false,
            progress: TaskProgress::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_database(
        id: i32,
        project: ProjectRef,
        tasks: TaskSelection,
        figure_tuning: FigureTuning,
        graph_tuning: GraphTuning,
        is_executed: bool,
        progress: TaskProgress,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project,
            tasks,
            figure_tuning,
            graph_tuning,
            is_executed,
            progress,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn project(&self) -> &ProjectRef {
        &self.project
    }

    pub fn tasks(&self) -> &TaskSelection {
        &self.tasks
    }

    pub fn figure_tuning(&self) -> &FigureTuning {
        &self.figure_tuning
    }

    pub fn graph_tuning(&self) -> &GraphTuning {
        &self.graph_tuning
    }

    pub fn is_executed(&self) -> bool {
        self.is_executed
    }

    pub fn progress(&self) -> &TaskProgress {
        &self.progress
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn belongs_to(&self, project: &ProjectRef) -> bool {
        &self.project == project
    }

    /// Applies a partial configuration update, returning how many fields it
    /// carried. The Run is left untouched when validation fails.
    pub fn apply_update(&mut self, update: RunUpdate) -> Result<usize, String> {
        let count = update.field_count();
        if count == 0 {
            return Err("No valid fields to update".to_string());
        }

        let mut tasks = self.tasks;
        let mut figure = self.figure_tuning.clone();
        let mut graph = self.graph_tuning.clone();

        for (task, value) in [
            (TaskKind::Metadata, update.metadata),
            (TaskKind::Text, update.text),
            (TaskKind::Figures, update.figures),
            (TaskKind::Tables, update.tables),
            (TaskKind::Formulas, update.formulas),
        ] {
            if let Some(enabled) = value {
                tasks.set(task, enabled);
            }
        }

        if let Some(threshold) = update.score_threshold {
            figure.score_threshold = threshold;
        }
        if let Some(threshold) = update.classification_threshold {
            figure.classification_threshold = threshold;
        }
        if let Some(labels) = update.candidate_labels {
            figure.candidate_labels = labels;
        }
        if let Some(labels) = update.accepted_labels {
            figure.accepted_labels = labels;
        }

        if let Some(separator) = update.chunk_separator {
            graph.chunk_separator = separator;
        }
        if let Some(size) = update.chunk_size {
            graph.chunk_size = size;
        }
        if let Some(overlap) = update.chunk_overlap {
            graph.chunk_overlap = overlap;
        }
        if let Some(nodes) = update.allowed_nodes {
            graph.allowed_nodes = non_blank(nodes);
        }
        if let Some(relationships) = update.allowed_relationships {
            graph.allowed_relationships = non_blank(relationships);
        }
        if let Some(condition) = update.retry_condition {
            graph.retry_condition = non_blank(condition);
        }
        if let Some(instructions) = update.additional_instructions {
            graph.additional_instructions = non_blank(instructions);
        }

        validate_figure_tuning(&figure)?;
        validate_graph_tuning(&graph)?;

        self.tasks = tasks;
        self.figure_tuning = figure;
        self.graph_tuning = graph;
        self.updated_at = Utc::now();
        Ok(count)
    }

    /// Flips `is_executed` to true. Returns whether this call made the
    /// transition; there is no way back to false.
    pub fn mark_executed(&mut self) -> bool {
        if self.is_executed {
            return false;
        }
        self.is_executed = true;
        self.updated_at = Utc::now();
        true
    }

    pub fn record_progress(&mut self, update: ProgressUpdate) -> Result<usize, String> {
        let fields = [
            ("metadata", update.metadata),
            ("text", update.text),
            ("figures", update.figures),
            ("tables", update.tables),
            ("formulas", update.formulas),
        ];

        for (name, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                    return Err(format!("Progress for {} must be between 0 and 100", name));
                }
            }
        }

        let count = fields.iter().filter(|(_, v)| v.is_some()).count();
        if count == 0 {
            return Err("No progress values supplied".to_string());
        }

        if let Some(v) = update.metadata {
            self.progress.metadata = v;
        }
        if let Some(v) = update.text {
            self.progress.text = v;
        }
        if let Some(v) = update.figures {
            self.progress.figures = v;
        }
        if let Some(v) = update.tables {
            self.progress.tables = v;
        }
        if let Some(v) = update.formulas {
            self.progress.formulas = v;
        }
        self.updated_at = Utc::now();
        Ok(count)
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn validate_figure_tuning(figure: &FigureTuning) -> Result<(), String> {
    for (name, value) in [
        ("score_threshold", figure.score_threshold),
        ("classification_threshold", figure.classification_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("{} must be between 0 and 1", name));
        }
    }

    if let Some(label) = figure
        .accepted_labels
        .iter()
        .find(|label| !figure.candidate_labels.contains(*label))
    {
        return Err(format!(
            "Accepted label '{}' is not one of the candidate labels",
            label
        ));
    }
    Ok(())
}

fn validate_graph_tuning(graph: &GraphTuning) -> Result<(), String> {
    if graph.chunk_separator.is_empty() {
        return Err("chunk_separator cannot be empty".to_string());
    }
    if graph.chunk_size <= 0 {
        return Err("chunk_size must be positive".to_string());
    }
    if graph.chunk_overlap < 0 || graph.chunk_overlap >= graph.chunk_size {
        return Err("chunk_overlap must be non-negative and smaller than chunk_size".to_string());
    }
    Ok(())
}
