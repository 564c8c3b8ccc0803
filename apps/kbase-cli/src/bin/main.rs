use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kbase_core::config::{expand_path, Config, RetrievalSettings};
use kbase_core::data_processor::DataProcessor;
use kbase_core::types::SearchRequest;
use kbase_text::search::{ingest_with, search_request};
use kbase_text::KnowledgeBase;

const USAGE: &str = "Usage: kbase <command> [args...]

Commands:
  ingest <file> [--chunk-size N]              print chunks and keywords as JSON
  search <query> [--dir DIR] [--limit N] [--json]
  stats [--dir DIR]";

struct Args {
    positional: Vec<String>,
    dir: Option<PathBuf>,
    limit: Option<i64>,
    chunk_size: Option<usize>,
    json: bool,
}

fn parse_args() -> anyhow::Result<(String, Args)> {
    let mut raw: Vec<String> = env::args().skip(1).collect();
    if raw.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    let cmd = raw.remove(0);
    let mut args = Args { positional: Vec::new(), dir: None, limit: None, chunk_size: None, json: false };

    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            flag @ ("--dir" | "--limit" | "--chunk-size") => {
                let value = raw.get(i + 1).with_context(|| format!("{flag} requires a value"))?;
                match flag {
                    "--dir" => args.dir = Some(expand_path(value)),
                    "--limit" => args.limit = Some(value.parse().with_context(|| format!("invalid --limit: {value}"))?),
                    _ => args.chunk_size = Some(value.parse().with_context(|| format!("invalid --chunk-size: {value}"))?),
                }
                i += 2;
            }
            "--json" => { args.json = true; i += 1; }
            s if s.starts_with("--") => anyhow::bail!("Unknown flag: {s}"),
            s => { args.positional.push(s.to_string()); i += 1; }
        }
    }
    Ok((cmd, args))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn docs_dir(config: &Config, args: &Args) -> PathBuf {
    args.dir.clone().unwrap_or_else(|| {
        let dir: String = config.get("data.docs_dir").unwrap_or_else(|_| "./docs".to_string());
        expand_path(dir)
    })
}

fn load_knowledge_base(dir: &Path, settings: RetrievalSettings) -> anyhow::Result<KnowledgeBase> {
    let documents = DataProcessor::new()
        .load_directory(dir)
        .with_context(|| format!("loading documents from {}", dir.display()))?;
    let mut kb = KnowledgeBase::new(settings);

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents {msg}")?
            .progress_chars("#>-"),
    );
    for doc in documents {
        pb.set_message(doc.filename.clone());
        let filename = doc.filename.clone();
        if let Err(e) = kb.add_document(doc) {
            warn!(file = %filename, error = %e, "document skipped");
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let stats = kb.stats();
    info!(dir = %dir.display(), documents = stats.documents, chunks = stats.chunks, "knowledge base loaded");
    Ok(kb)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.retrieval()?;
    let (cmd, args) = parse_args()?;

    match cmd.as_str() {
        "ingest" => {
            let Some(file) = args.positional.first() else {
                eprintln!("Usage: kbase ingest <file> [--chunk-size N]");
                std::process::exit(1);
            };
            let doc = DataProcessor::new().load_file(&expand_path(file))?;
            let drafts = ingest_with(&doc.text, args.chunk_size, &settings)?;
            println!("{}", serde_json::to_string_pretty(&drafts)?);
        }
        "search" => {
            if args.positional.is_empty() {
                eprintln!("Usage: kbase search \"<query>\" [--dir DIR] [--limit N] [--json]");
                std::process::exit(1);
            }
            let kb = load_knowledge_base(&docs_dir(&config, &args), settings.clone())?;
            let request = SearchRequest { query: args.positional.join(" "), limit: args.limit };
            let hits = search_request(&request, kb.chunks(), &kb, &settings);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                if hits.is_empty() {
                    println!("No results for \"{}\"", request.query);
                }
                for (i, h) in hits.iter().enumerate() {
                    println!("{:>2}. score={:.2} doc={} #{}\n    {}", i + 1, h.score, h.document_name, h.position, h.content);
                }
            }
        }
        "stats" => {
            let kb = load_knowledge_base(&docs_dir(&config, &args), settings)?;
            println!("{}", serde_json::to_string_pretty(&kb.stats())?);
        }
        _ => {
            eprintln!("Unknown command: {}\n\n{USAGE}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
