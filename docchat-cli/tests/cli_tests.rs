use std::io::Write;

use clap::Parser;
use docchat_cli::{ChunkingArgs, Cli, Command, chunk_file, document_id, resolve_config};
use docchat_rag::RagConfig;

#[test]
fn parses_ask_with_repeated_docs() {
    let cli = Cli::try_parse_from([
        "docchat",
        "ask",
        "--doc",
        "a.txt",
        "--doc",
        "notes/b.md",
        "--top-k",
        "3",
        "What is the refund window?",
    ])
    .unwrap();

    match cli.command {
        Command::Ask { docs, question, top_k, json, .. } => {
            assert_eq!(docs, vec!["a.txt", "notes/b.md"]);
            assert_eq!(question, "What is the refund window?");
            assert_eq!(top_k, Some(3));
            assert!(!json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn ask_requires_a_document() {
    assert!(Cli::try_parse_from(["docchat", "ask", "anything?"]).is_err());
}

#[test]
fn parses_chunking_flags() {
    let cli = Cli::try_parse_from([
        "docchat",
        "chunk",
        "--chunk-size",
        "200",
        "--overlap",
        "20",
        "--no-recursive",
        "--unicode-sentences",
        "doc.txt",
    ])
    .unwrap();

    let Command::Chunk { file, chunking } = cli.command else {
        panic!("expected chunk command");
    };
    assert_eq!(file, "doc.txt");
    assert_eq!(chunking.chunk_size, Some(200));
    assert_eq!(chunking.overlap, Some(20));
    assert!(chunking.no_recursive);
    assert!(chunking.unicode_sentences);
}

#[test]
fn flags_override_base_config() {
    let base = RagConfig::default();
    let chunking = ChunkingArgs { chunk_size: Some(300), no_recursive: true, ..Default::default() };

    let config = resolve_config(&base, &chunking, Some(2), Some(0.4)).unwrap();
    assert_eq!(config.chunk_size, 300);
    assert_eq!(config.chunk_overlap, 150);
    assert!(!config.recursive);
    assert_eq!(config.top_k, 2);
    assert_eq!(config.similarity_threshold, Some(0.4));

    let unchanged = resolve_config(&base, &ChunkingArgs::default(), None, None).unwrap();
    assert_eq!(unchanged, base);
}

#[test]
fn inconsistent_overrides_are_rejected() {
    let chunking = ChunkingArgs { chunk_size: Some(100), overlap: Some(100), ..Default::default() };
    assert!(resolve_config(&RagConfig::default(), &chunking, None, None).is_err());
}

#[test]
fn document_ids_keep_position_and_stem() {
    assert_eq!(document_id("/tmp/policies.txt", 0), "0-policies");
    assert_eq!(document_id("notes/policies.md", 1), "1-policies");
}

#[tokio::test]
async fn chunk_file_reports_chunks_in_order() {
    let mut file = tempfile::Builder::new().prefix("handbook").suffix(".txt").tempfile().unwrap();
    write!(file, "Refunds take 14 days.\n\nShipping takes 3 days.").unwrap();
    let source = file.path().to_str().unwrap().to_string();

    let chunking = ChunkingArgs::default();
    let config = RagConfig::builder().chunk_size(30).chunk_overlap(0).build().unwrap();
    let chunks = chunk_file(&source, &chunking, &config).await.unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "Refunds take 14 days.");
    assert_eq!(chunks[0].chars, 21);
    assert_eq!(chunks[1].index, 1);
    assert!(chunks[1].id.starts_with("0-handbook"));
    assert!(chunks[1].id.ends_with("_1"));

    let json = serde_json::to_value(&chunks).unwrap();
    assert_eq!(json[1]["text"], "Shipping takes 3 days.");
}

#[tokio::test]
async fn chunk_file_reports_missing_file() {
    let config = RagConfig::default();
    let err = chunk_file("/no/such/file.txt", &ChunkingArgs::default(), &config).await.unwrap_err();
    assert!(err.to_string().contains("/no/such/file.txt"));
}
