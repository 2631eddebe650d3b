use diesel::prelude::*;

use crate::domain::entities::Setting;
use crate::domain::value_objects::ProjectRef;
use crate::infrastructure::database::schema::settings;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SettingModel {
    pub user_id: i32,
    pub project_name: String,
    pub raw_doc_path: Option<String>,
    pub raw_doc_prefix: Option<String>,
    pub metadata_doc_path: Option<String>,
    pub metadata_doc_prefix: Option<String>,
    pub text_doc_path: Option<String>,
    pub text_doc_prefix: Option<String>,
    pub figures_doc_path: Option<String>,
    pub figures_doc_prefix: Option<String>,
    pub formulas_doc_path: Option<String>,
    pub formulas_doc_prefix: Option<String>,
    pub tables_doc_path: Option<String>,
    pub tables_doc_prefix: Option<String>,
    pub hierarchy_doc_path: Option<String>,
    pub hierarchy_doc_prefix: Option<String>,
    pub shrinks_doc_path: Option<String>,
    pub shrinks_doc_prefix: Option<String>,
    pub llm_provider: Option<String>,
    pub llm: Option<String>,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub dimensions: Option<i32>,
    pub similarity_metric: Option<String>,
    pub extraction_max_retries: Option<i32>,
    pub lexical_graph_meta_label: Option<String>,
    pub domain_graph_meta_label: Option<String>,
    pub hierarchy_level: Option<serde_json::Value>,
    pub llm_graph_builder_url: Option<String>,
    pub neo4j_uri: Option<String>,
    pub neo4j_username: Option<String>,
    pub neo4j_password: Option<String>,
    pub neo4j_database: Option<String>,
    pub neo4j_auradb: bool,
}

impl From<SettingModel> for Setting {
    fn from(model: SettingModel) -> Self {
        Setting {
            project: ProjectRef::new(model.user_id, model.project_name),
            raw_doc_path: model.raw_doc_path,
            raw_doc_prefix: model.raw_doc_prefix,
            metadata_doc_path: model.metadata_doc_path,
            metadata_doc_prefix: model.metadata_doc_prefix,
            text_doc_path: model.text_doc_path,
            text_doc_prefix: model.text_doc_prefix,
            figures_doc_path: model.figures_doc_path,
            figures_doc_prefix: model.figures_doc_prefix,
            formulas_doc_path: model.formulas_doc_path,
            formulas_doc_prefix: model.formulas_doc_prefix,
            tables_doc_path: model.tables_doc_path,
            tables_doc_prefix: model.tables_doc_prefix,
            hierarchy_doc_path: model.hierarchy_doc_path,
            hierarchy_doc_prefix: model.hierarchy_doc_prefix,
            shrinks_doc_path: model.shrinks_doc_path,
            shrinks_doc_prefix: model.shrinks_doc_prefix,
            llm_provider: model.llm_provider,
            llm: model.llm,
            embedding_provider: model.embedding_provider,
            embedding_model: model.embedding_model,
            dimensions: model.dimensions,
            similarity_metric: model.similarity_metric,
            extraction_max_retries: model.extraction_max_retries,
            lexical_graph_meta_label: model.lexical_graph_meta_label,
            domain_graph_meta_label: model.domain_graph_meta_label,
            hierarchy_level: model.hierarchy_level,
            llm_graph_builder_url: model.llm_graph_builder_url,
            neo4j_uri: model.neo4j_uri,
            neo4j_username: model.neo4j_username,
            neo4j_password: model.neo4j_password,
            neo4j_database: model.neo4j_database,
            neo4j_auradb: model.neo4j_auradb,
        }
    }
}
