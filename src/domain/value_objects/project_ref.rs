use serde::{Deserialize, Serialize};

/// Identity of a project: the `(user_id, project_name)` pair every Run,
/// Document and Setting row is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
    pub user_id: i32,
    pub project_name: String,
}

impl ProjectRef {
    pub fn new(user_id: i32, project_name: impl Into<String>) -> Self {
        Self {
            user_id,
            project_name: project_name.into(),
        }
    }
}

impl std::fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.project_name)
    }
}
