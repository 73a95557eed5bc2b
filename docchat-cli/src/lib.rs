//! Command-line front end for docchat.
//!
//! `docchat chunk <file>` prints the chunks of a document as JSON.
//! `docchat ask --doc <file>... <question>` ingests the files into an
//! in-memory store with the OpenAI providers and prints the answer.
//!
//! Defaults come from [`RagConfig::from_env`]; flags override them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use docchat_rag::openai::{OpenAIAnswerGenerator, OpenAIEmbeddingProvider};
use docchat_rag::{
    Chunker, Document, DocumentQa, FileTextExtractor, InMemoryChunkStore, RagConfig,
    RegexSentenceSplitter, SemanticChunker, SentenceSplitter, TextExtractor,
    UnicodeSentenceSplitter,
};
use serde::Serialize;
use tracing::info;

/// Chunk documents and ask questions about them.
#[derive(Parser, Debug)]
#[command(name = "docchat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a document into chunks and print them as JSON.
    Chunk {
        /// Path or URL of the document.
        file: String,

        #[command(flatten)]
        chunking: ChunkingArgs,
    },
    /// Answer a question from one or more documents.
    Ask {
        /// Document to ingest. Repeat for several documents.
        #[arg(long = "doc", required = true)]
        docs: Vec<String>,

        /// The question to answer.
        question: String,

        #[command(flatten)]
        chunking: ChunkingArgs,

        /// Number of chunks used as context.
        #[arg(long)]
        top_k: Option<usize>,

        /// Minimum similarity score for a chunk to be used.
        #[arg(long)]
        threshold: Option<f32>,

        /// Chat model used for the answer.
        #[arg(long)]
        model: Option<String>,

        /// Print the full answer with its sources as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Chunking flags shared by both subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ChunkingArgs {
    /// Target maximum chunk size in characters.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters carried over from the previous chunk.
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Keep oversized chunks instead of re-splitting them by length.
    #[arg(long)]
    pub no_recursive: bool,

    /// Use Unicode sentence boundaries instead of punctuation rules.
    #[arg(long)]
    pub unicode_sentences: bool,
}

impl ChunkingArgs {
    fn splitter(&self) -> Arc<dyn SentenceSplitter> {
        if self.unicode_sentences {
            Arc::new(UnicodeSentenceSplitter)
        } else {
            Arc::new(RegexSentenceSplitter)
        }
    }

    fn chunker(&self, config: &RagConfig) -> docchat_rag::Result<SemanticChunker> {
        Ok(SemanticChunker::from_config(config)?.with_sentence_splitter(self.splitter()))
    }
}

/// Apply command-line overrides on top of `base`.
pub fn resolve_config(
    base: &RagConfig,
    chunking: &ChunkingArgs,
    top_k: Option<usize>,
    threshold: Option<f32>,
) -> docchat_rag::Result<RagConfig> {
    let mut builder = RagConfig::builder()
        .chunk_size(chunking.chunk_size.unwrap_or(base.chunk_size))
        .chunk_overlap(chunking.overlap.unwrap_or(base.chunk_overlap))
        .recursive(base.recursive && !chunking.no_recursive)
        .top_k(top_k.unwrap_or(base.top_k));
    if let Some(threshold) = threshold.or(base.similarity_threshold) {
        builder = builder.similarity_threshold(threshold);
    }
    builder.build()
}

/// One chunk as printed by `docchat chunk`.
#[derive(Debug, Serialize)]
pub struct ChunkView {
    pub id: String,
    pub index: usize,
    pub chars: usize,
    pub text: String,
}

/// Run a parsed command and return what should be printed.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let base = RagConfig::from_env().context("invalid DOCCHAT_* environment")?;

    match cli.command {
        Command::Chunk { file, chunking } => {
            let config = resolve_config(&base, &chunking, None, None)?;
            let chunks = chunk_file(&file, &chunking, &config).await?;
            Ok(serde_json::to_string_pretty(&chunks)?)
        }
        Command::Ask { docs, question, chunking, top_k, threshold, model, json } => {
            let config = resolve_config(&base, &chunking, top_k, threshold)?;
            ask(&docs, &question, &chunking, config, model, json).await
        }
    }
}

/// Extract and chunk a single document.
pub async fn chunk_file(
    source: &str,
    chunking: &ChunkingArgs,
    config: &RagConfig,
) -> anyhow::Result<Vec<ChunkView>> {
    let text = FileTextExtractor::new()
        .extract(source)
        .await
        .with_context(|| format!("failed to read {source}"))?;
    let chunker = chunking.chunker(config)?;

    let chunks = chunker.chunk(&document_id(source, 0), &text);
    info!(source, chunk_count = chunks.len(), "chunked document");
    Ok(chunks
        .into_iter()
        .map(|c| ChunkView {
            chars: c.text.chars().count(),
            id: c.id,
            index: c.index,
            text: c.text,
        })
        .collect())
}

async fn ask(
    docs: &[String],
    question: &str,
    chunking: &ChunkingArgs,
    config: RagConfig,
    model: Option<String>,
    json: bool,
) -> anyhow::Result<String> {
    let embedder = OpenAIEmbeddingProvider::from_env()?;
    let mut generator = OpenAIAnswerGenerator::from_env()?;
    if let Some(model) = model {
        generator = generator.with_model(model);
    }

    let qa = DocumentQa::builder()
        .chunker(Arc::new(chunking.chunker(&config)?))
        .config(config)
        .embedding_provider(Arc::new(embedder))
        .store(Arc::new(InMemoryChunkStore::new()))
        .answer_generator(Arc::new(generator))
        .build()?;

    let documents: Vec<Document> = docs
        .iter()
        .enumerate()
        .map(|(i, source)| Document::from_source(document_id(source, i), title(source), source))
        .collect();
    let chunks = qa.ingest_batch(&documents).await?;
    info!(documents = documents.len(), chunks = chunks.len(), "ingested documents");

    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    let answer = qa.ask(&ids, question).await?;

    if json { Ok(serde_json::to_string_pretty(&answer)?) } else { Ok(answer.text) }
}

/// Identifier for the `position`-th document given on the command line:
/// the file stem, prefixed by its position so repeated names stay distinct.
pub fn document_id(source: &str, position: usize) -> String {
    let stem = Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("doc");
    format!("{position}-{stem}")
}

fn title(source: &str) -> String {
    PathBuf::from(source)
        .file_name()
        .and_then(|s| s.to_str())
        .map_or_else(|| source.to_string(), str::to_string)
}
