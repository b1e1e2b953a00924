use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;

use crate::db::queries;

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 200;

/// Splits text on whitespace into chunks of at most `chunk_size` characters.
/// Consecutive chunks share up to `overlap` characters of whole words. A
/// single word longer than `chunk_size` becomes its own chunk.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for word in words {
        let word_len = word.chars().count();
        let added = if current.is_empty() { word_len } else { word_len + 1 };

        if !current.is_empty() && current_len + added > chunk_size {
            chunks.push(current.join(" "));

            // carry trailing words into the next chunk
            let mut carried: Vec<&str> = Vec::new();
            let mut carried_len = 0;
            for &w in current.iter().rev() {
                let len = w.chars().count() + usize::from(!carried.is_empty());
                if carried_len + len > overlap || carried_len + len + word_len + 1 > chunk_size {
                    break;
                }
                carried.push(w);
                carried_len += len;
            }
            carried.reverse();
            current = carried;
            current_len = carried_len;
        }

        current_len += if current.is_empty() { word_len } else { word_len + 1 };
        current.push(word);
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

pub fn ingest_text(conn: &mut Connection, source: &str, text: &str) -> anyhow::Result<usize> {
    let chunks = split_text(text, CHUNK_SIZE, CHUNK_OVERLAP);
    anyhow::ensure!(!chunks.is_empty(), "document '{source}' has no text");

    let count = queries::replace_source(conn, source, &chunks)?;
    tracing::info!(source, chunks = count, "document ingested");
    Ok(count)
}

pub fn ingest_file(conn: &mut Connection, path: &Path, source: Option<&str>) -> anyhow::Result<usize> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document: {}", path.display()))?;

    let default_source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    ingest_text(conn, source.unwrap_or(&default_source), &text)
}

/// Loads the configured document when the store is still empty.
pub fn ensure_ingested(conn: &mut Connection, path: &Path) -> anyhow::Result<()> {
    if queries::count_excerpts(conn)? > 0 {
        return Ok(());
    }

    if !path.exists() {
        tracing::warn!(path = %path.display(), "document not found, answering without excerpts");
        return Ok(());
    }

    ingest_file(conn, path, None)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("  hello   brave\nnew world ", 100, 20);
        assert_eq!(chunks, vec!["hello brave new world"]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split_text(" \n\t ", 100, 20).is_empty());
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let text = (0..200).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let chunks = split_text(&text, 60, 15);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 60, "chunk too long: {chunk}");
        }
        for pair in chunks.windows(2) {
            let last_word = pair[0].split(' ').last().unwrap();
            assert!(pair[1].split(' ').any(|w| w == last_word));
        }
        assert!(chunks.last().unwrap().ends_with("word199"));
    }

    #[test]
    fn test_zero_overlap() {
        let chunks = split_text("aa bb cc dd", 5, 0);
        assert_eq!(chunks, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn test_oversized_word_is_own_chunk() {
        let chunks = split_text("tiny enormousword tiny", 6, 0);
        assert_eq!(chunks, vec!["tiny", "enormousword", "tiny"]);
    }

    #[test]
    fn test_ingest_text_stores_chunks() {
        let mut conn = db::init_db(":memory:").unwrap();
        let count = ingest_text(&mut conn, "guide", "routing and middleware").unwrap();
        assert_eq!(count, 1);
        assert_eq!(queries::count_excerpts(&conn).unwrap(), 1);
    }

    #[test]
    fn test_ingest_empty_text_fails() {
        let mut conn = db::init_db(":memory:").unwrap();
        assert!(ingest_text(&mut conn, "guide", "   ").is_err());
    }

    #[test]
    fn test_ensure_ingested_missing_file_is_ok() {
        let mut conn = db::init_db(":memory:").unwrap();
        ensure_ingested(&mut conn, Path::new("does/not/exist.txt")).unwrap();
        assert_eq!(queries::count_excerpts(&conn).unwrap(), 0);
    }
}
