use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::entities::Run;
use crate::domain::entities::run::{FigureTuning, GraphTuning, TaskProgress};
use crate::domain::value_objects::{ProjectRef, TaskSelection};
use crate::infrastructure::database::schema::runs;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RunModel {
    pub id: i32,
    pub user_id: i32,
    pub project_name: String,
    pub metadata: bool,
    pub text: bool,
    pub figures: bool,
    pub tables: bool,
    pub formulas: bool,
    pub score_threshold: f64,
    pub classification_threshold: f64,
    pub candidate_labels: Vec<String>,
    pub accepted_labels: Vec<String>,
    pub chunk_separator: String,
    pub chunk_size: i32,
    pub chunk_overlap: i32,
    pub allowed_nodes: Option<String>,
    pub allowed_relationships: Option<String>,
    pub retry_condition: Option<String>,
    pub additional_instructions: Option<String>,
    pub is_executed: bool,
    pub extract_metadata_state: f32,
    pub extract_text_state: f32,
    pub extract_figures_state: f32,
    pub extract_tables_state: f32,
    pub extract_formulas_state: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything else takes its column default.
#[derive(Debug, Insertable)]
#[diesel(table_name = runs)]
pub struct NewRunModel {
    pub user_id: i32,
    pub project_name: String,
}

/// Task toggles and tuning; never carries `is_executed`.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = runs)]
#[diesel(treat_none_as_null = true)]
pub struct RunConfigurationChangeset {
    pub metadata: bool,
    pub text: bool,
    pub figures: bool,
    pub tables: bool,
    pub formulas: bool,
    pub score_threshold: f64,
    pub classification_threshold: f64,
    pub candidate_labels: Vec<String>,
    pub accepted_labels: Vec<String>,
    pub chunk_separator: String,
    pub chunk_size: i32,
    pub chunk_overlap: i32,
    pub allowed_nodes: Option<String>,
    pub allowed_relationships: Option<String>,
    pub retry_condition: Option<String>,
    pub additional_instructions: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = runs)]
pub struct RunProgressChangeset {
    pub extract_metadata_state: f32,
    pub extract_text_state: f32,
    pub extract_figures_state: f32,
    pub extract_tables_state: f32,
    pub extract_formulas_state: f32,
    pub updated_at: DateTime<Utc>,
}

impl From<&ProjectRef> for NewRunModel {
    fn from(project: &ProjectRef) -> Self {
        Self {
            user_id: project.user_id,
            project_name: project.project_name.clone(),
        }
    }
}

impl From<&Run> for RunConfigurationChangeset {
    fn from(run: &Run) -> Self {
        let tasks = run.tasks();
        let figure = run.figure_tuning();
        let graph = run.graph_tuning();
        Self {
            metadata: tasks.metadata,
            text: tasks.text,
            figures: tasks.figures,
            tables: tasks.tables,
            formulas: tasks.formulas,
            score_threshold: figure.score_threshold,
            classification_threshold: figure.classification_threshold,
            candidate_labels: figure.candidate_labels.clone(),
            accepted_labels: figure.accepted_labels.clone(),
            chunk_separator: graph.chunk_separator.clone(),
            chunk_size: graph.chunk_size,
            chunk_overlap: graph.chunk_overlap,
            allowed_nodes: graph.allowed_nodes.clone(),
            allowed_relationships: graph.allowed_relationships.clone(),
            retry_condition: graph.retry_condition.clone(),
            additional_instructions: graph.additional_instructions.clone(),
            updated_at: run.updated_at(),
        }
    }
}

impl From<&Run> for RunProgressChangeset {
    fn from(run: &Run) -> Self {
        let progress = run.progress();
        Self {
            extract_metadata_state: progress.metadata,
            extract_text_state: progress.text,
            extract_figures_state: progress.figures,
            extract_tables_state: progress.tables,
            extract_formulas_state: progress.formulas,
            updated_at: run.updated_at(),
        }
    }
}

impl From<RunModel> for Run {
    fn from(model: RunModel) -> Self {
        Run::from_database(
            model.id,
            ProjectRef::new(model.user_id, model.project_name),
            TaskSelection {
                metadata: model.metadata,
                text: model.text,
                figures: model.figures,
                tables: model.tables,
                formulas: model.formulas,
            },
            FigureTuning {
                score_threshold: model.score_threshold,
                classification_threshold: model.classification_threshold,
                candidate_labels: model.candidate_labels,
                accepted_labels: model.accepted_labels,
            },
            GraphTuning {
                chunk_separator: model.chunk_separator,
                chunk_size: model.chunk_size,
                chunk_overlap: model.chunk_overlap,
                allowed_nodes: model.allowed_nodes,
                allowed_relationships: model.allowed_relationships,
                retry_condition: model.retry_condition,
                additional_instructions: model.additional_instructions,
            },
            model.is_executed,
            TaskProgress {
                metadata: model.extract_metadata_state,
                text: model.extract_text_state,
                figures: model.extract_figures_state,
                tables: model.extract_tables_state,
                formulas: model.extract_formulas_state,
            },
            model.created_at,
            model.updated_at,
        )
    }
}
