use rusqlite::{params, Connection};

use crate::models::Excerpt;

// FTS5 operators that break a query when they appear as bare terms
const FTS5_KEYWORDS: &[&str] = &["OR", "NOT", "AND", "NEAR"];

// ── Excerpts ──

/// Replaces every excerpt of `source` with `chunks`, in order.
pub fn replace_source(conn: &mut Connection, source: &str, chunks: &[String]) -> anyhow::Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM excerpts WHERE source = ?1", params![source])?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO excerpts (source, position, content) VALUES (?1, ?2, ?3)")?;
        for (position, chunk) in chunks.iter().enumerate() {
            stmt.execute(params![source, position as i64, chunk])?;
        }
    }
    tx.commit()?;
    Ok(chunks.len())
}

pub fn count_excerpts(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM excerpts", [], |row| row.get(0))?;
    Ok(count)
}

/// Ranked full-text search. Any term may match; bm25 orders the results.
pub fn search_excerpts(conn: &Connection, query: &str, limit: usize) -> anyhow::Result<Vec<Excerpt>> {
    let match_expr = sanitize_fts_query(query);
    if match_expr.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT e.id, e.source, e.position, e.content
         FROM excerpts_fts f
         JOIN excerpts e ON e.id = f.rowid
         WHERE excerpts_fts MATCH ?1
         ORDER BY f.rank
         LIMIT ?2",
    )?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map(params![match_expr, limit], row_to_excerpt)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn row_to_excerpt(row: &rusqlite::Row<'_>) -> rusqlite::Result<Excerpt> {
    Ok(Excerpt {
        id: row.get(0)?,
        source: row.get(1)?,
        position: row.get(2)?,
        content: row.get(3)?,
    })
}

fn sanitize_fts_query(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| !FTS5_KEYWORDS.contains(t))
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}
