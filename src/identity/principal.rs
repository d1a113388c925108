use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Principal {
    pub fn operator(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), roles: vec!["operator".into()] }
    }
}
