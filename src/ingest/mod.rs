//! Ingestion pipeline: source directory → embedded chunks in the store.
//!
//! Idempotent by count: a populated store is left alone unless a rebuild is
//! forced. Callers must not run ingestion concurrently with query traffic
//! against the same store.

pub mod parser;

use std::path::Path;

use serde::Serialize;

use crate::core::config::AppConfig;
use crate::core::errors::RagError;
use crate::rag::{Chunk, RagContext};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Source files read.
    pub files: usize,
    /// Chunks extracted from the sources.
    pub extracted: usize,
    /// Chunks embedded and stored by this run.
    pub embedded: usize,
    pub skipped_lines: usize,
    pub skipped_entries: usize,
    /// The store was already populated and nothing was embedded.
    pub skipped_existing: bool,
}

pub struct Ingestor {
    context: RagContext,
    embed_batch_size: usize,
    upsert_batch_size: usize,
}

impl Ingestor {
    pub fn new(context: RagContext, embed_batch_size: usize, upsert_batch_size: usize) -> Self {
        Self {
            context,
            embed_batch_size: embed_batch_size.max(1),
            upsert_batch_size: upsert_batch_size.max(1),
        }
    }

    pub fn from_config(context: RagContext, config: &AppConfig) -> Self {
        Self::new(
            context,
            config.embedding.batch_size,
            config.ingest.upsert_batch_size,
        )
    }

    pub async fn ingest(
        &self,
        source_dir: &Path,
        force_rebuild: bool,
    ) -> Result<IngestReport, RagError> {
        let extracted = parser::load_source_dir(source_dir)?;
        let mut report = IngestReport {
            files: extracted.files,
            extracted: extracted.texts.len(),
            skipped_lines: extracted.skipped_lines,
            skipped_entries: extracted.skipped_entries,
            ..Default::default()
        };
        tracing::info!(
            "Extracted {} chunk(s) from {} file(s) in {}",
            report.extracted,
            report.files,
            source_dir.display()
        );

        let store = &self.context.store;
        if force_rebuild {
            tracing::info!("Forced rebuild: clearing vector store");
            store.delete_all().await?;
        } else {
            let existing = store.count().await?;
            if existing > 0 {
                tracing::info!(
                    "Vector store already holds {} chunk(s); skipping embedding",
                    existing
                );
                report.skipped_existing = true;
                return Ok(report);
            }
        }

        let chunks: Vec<Chunk> = extracted
            .texts
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk::new(Chunk::sequential_id(index), content))
            .collect();
        if chunks.is_empty() {
            return Ok(report);
        }

        let vectors = self.embed_all(&chunks).await?;

        let mut items = chunks.into_iter().zip(vectors).peekable();
        while items.peek().is_some() {
            let batch: Vec<(Chunk, Vec<f32>)> =
                items.by_ref().take(self.upsert_batch_size).collect();
            let batch_len = batch.len();
            store.upsert(batch).await?;
            report.embedded += batch_len;
            tracing::debug!("Stored {}/{} chunk(s)", report.embedded, report.extracted);
        }

        tracing::info!("Stored {} embedded chunk(s)", report.embedded);
        Ok(report)
    }

    async fn embed_all(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.embed_batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embedded = self.context.embedder.embed(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(RagError::Embedding(format!(
                    "{} returned {} vectors for {} inputs",
                    self.context.embedder.name(),
                    embedded.len(),
                    texts.len()
                )));
            }
            vectors.extend(embedded);
            tracing::debug!("Encoded {}/{} chunk(s)", vectors.len(), chunks.len());
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{keyword_context, FailingEmbedder};
    use std::fs;
    use std::sync::Arc;

    fn write_sources(dir: &Path) {
        fs::write(
            dir.join("doshas.json"),
            r#"["Vata governs movement.", {"content": "Pitta governs metabolism."}, 12]"#,
        )
        .unwrap();
        fs::write(
            dir.join("remedies.jsonl"),
            "{\"content\": \"Ginger calms Vata.\"}\n{oops\n\"Kapha governs structure.\"\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn ingests_all_chunks_with_sequential_ids() {
        let store_dir = tempfile::tempdir().unwrap();
        let source = tempfile::tempdir().unwrap();
        write_sources(source.path());
        let (context, embedder) = keyword_context(store_dir.path()).await;

        let report = Ingestor::new(context.clone(), 2, 3)
            .ingest(source.path(), false)
            .await
            .unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.extracted, 4);
        assert_eq!(report.embedded, 4);
        assert_eq!(report.skipped_lines, 1);
        assert_eq!(report.skipped_entries, 1);
        assert!(!report.skipped_existing);
        assert_eq!(embedder.calls(), 2);
        assert_eq!(context.store.count().await.unwrap(), 4);

        let query = crate::test_support::KeywordEmbedder::vector("ginger");
        let top = context.store.query(&query, 1).await.unwrap();
        assert_eq!(top[0].chunk.id, "doc_2");
        assert_eq!(top[0].chunk.content, "Ginger calms Vata.");
    }

    #[tokio::test]
    async fn second_run_on_populated_store_embeds_nothing() {
        let store_dir = tempfile::tempdir().unwrap();
        let source = tempfile::tempdir().unwrap();
        write_sources(source.path());
        let (context, embedder) = keyword_context(store_dir.path()).await;
        let ingestor = Ingestor::new(context.clone(), 32, 50);

        ingestor.ingest(source.path(), false).await.unwrap();
        let calls_after_first = embedder.calls();

        for _ in 0..2 {
            let report = ingestor.ingest(source.path(), false).await.unwrap();
            assert_eq!(report.embedded, 0);
            assert!(report.skipped_existing);
        }
        assert_eq!(embedder.calls(), calls_after_first);
        assert_eq!(context.store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn forced_rebuild_replaces_old_entries() {
        let store_dir = tempfile::tempdir().unwrap();
        let source = tempfile::tempdir().unwrap();
        write_sources(source.path());
        let (context, _) = keyword_context(store_dir.path()).await;
        let ingestor = Ingestor::new(context.clone(), 32, 50);
        ingestor.ingest(source.path(), false).await.unwrap();

        let smaller = tempfile::tempdir().unwrap();
        fs::write(smaller.path().join("one.json"), r#"["Only Kapha remains."]"#).unwrap();

        let report = ingestor.ingest(smaller.path(), true).await.unwrap();
        assert_eq!(report.embedded, 1);
        assert_eq!(context.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn forced_rebuild_from_missing_directory_keeps_the_store() {
        let store_dir = tempfile::tempdir().unwrap();
        let source = tempfile::tempdir().unwrap();
        write_sources(source.path());
        let (context, _) = keyword_context(store_dir.path()).await;
        let ingestor = Ingestor::new(context.clone(), 32, 50);
        ingestor.ingest(source.path(), false).await.unwrap();

        let absent = source.path().join("data");
        let err = ingestor.ingest(&absent, true).await.unwrap_err();
        assert!(matches!(&err, RagError::SourceMissing(path) if *path == absent));
        assert!(err.to_string().contains(&absent.display().to_string()));
        assert_eq!(context.store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn empty_source_leaves_store_empty() {
        let store_dir = tempfile::tempdir().unwrap();
        let source = tempfile::tempdir().unwrap();
        let (context, embedder) = keyword_context(store_dir.path()).await;

        let report = Ingestor::new(context.clone(), 32, 50)
            .ingest(source.path(), false)
            .await
            .unwrap();
        assert_eq!(report, IngestReport::default());
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn parse_and_embedding_failures_are_fatal() {
        let store_dir = tempfile::tempdir().unwrap();
        let (context, _) = keyword_context(store_dir.path()).await;

        let broken = tempfile::tempdir().unwrap();
        fs::write(broken.path().join("bad.json"), "{not json").unwrap();
        let err = Ingestor::new(context.clone(), 32, 50)
            .ingest(broken.path(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::SourceParse { .. }));

        let source = tempfile::tempdir().unwrap();
        write_sources(source.path());
        let failing = RagContext::new(Arc::new(FailingEmbedder), context.store.clone());
        let err = Ingestor::new(failing, 32, 50)
            .ingest(source.path(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
        assert_eq!(context.store.count().await.unwrap(), 0);
    }
}
