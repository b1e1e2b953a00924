use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::Excerpt;

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<Excerpt>>;
}

pub struct SqliteRetriever {
    db: Arc<Mutex<Connection>>,
}

impl SqliteRetriever {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Retriever for SqliteRetriever {
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<Excerpt>> {
        let db = self
            .db
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        queries::search_excerpts(&db, query, limit)
    }
}

/// Joins excerpts into the text handed back to the model.
pub fn render_excerpts(excerpts: &[Excerpt]) -> String {
    if excerpts.is_empty() {
        return "No relevant excerpts found in the document.".to_string();
    }

    excerpts
        .iter()
        .map(|e| e.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn test_sqlite_retriever_searches_store() {
        let mut conn = db::init_db(":memory:").unwrap();
        queries::replace_source(
            &mut conn,
            "guide",
            &[
                "Query parameters are optional by default.".to_string(),
                "Response models filter the output data.".to_string(),
            ],
        )
        .unwrap();

        let retriever = SqliteRetriever::new(Arc::new(Mutex::new(conn)));
        let found = retriever.search("response model", 4).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].content.starts_with("Response models"));
    }

    #[test]
    fn test_render_excerpts() {
        let excerpts = vec![
            Excerpt {
                id: 1,
                source: "guide".to_string(),
                position: 0,
                content: "first".to_string(),
            },
            Excerpt {
                id: 2,
                source: "guide".to_string(),
                position: 1,
                content: "second".to_string(),
            },
        ];
        assert_eq!(render_excerpts(&excerpts), "first\n\nsecond");
        assert!(render_excerpts(&[]).starts_with("No relevant excerpts"));
    }
}
