use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Excerpt {
    pub id: i64,
    pub source: String,
    pub position: i64,
    pub content: String,
}
