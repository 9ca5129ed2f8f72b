//! govdoc server and indexer entrypoint.
//!
//! ```text
//! govdoc                  serve the HTTP gateway
//! govdoc index <doc_id>   re-embed a stored normalized.json into the index
//! govdoc query <text>     print fused retrieval results as JSON
//! govdoc eval <golden.jsonl> [--baseline <report.json>]
//!                         score retrieval citations against a golden set
//! govdoc --health-check   exit 0 if the local server answers /healthz
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use govdoc::answer::{AskService, GenaiAnswerGenerator};
use govdoc::chunking::Chunker;
use govdoc::config::Config;
use govdoc::embedding::{CohereEmbedder, EmbeddingPivot, EmbeddingProvider};
use govdoc::eval::{EvalRunner, load_golden_set, load_report};
use govdoc::gateway::{AppState, create_router_with_state};
use govdoc::ingest::IngestPipeline;
use govdoc::lang::{LanguageIdentifier, WhatlangIdentifier};
use govdoc::normalize::BlockGraphReducer;
use govdoc::ocr::{HttpOcrEngine, OcrEngine};
use govdoc::rerank::{CohereReranker, LexicalReranker, RerankProvider};
use govdoc::retrieval::RetrievalFusion;
use govdoc::storage::{LocalObjectStore, ObjectStore};
use govdoc::translate::{HttpTranslator, IdentityTranslator, Translator};
use govdoc::vectordb::{LazyQdrantIndex, VectorIndex};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

enum Command {
    Serve,
    Index { doc_id: String },
    Query { text: String },
    Eval {
        golden: PathBuf,
        baseline: Option<PathBuf>,
    },
}

impl Command {
    fn from_args(args: &[String]) -> anyhow::Result<Self> {
        match args.first().map(String::as_str) {
            None | Some("serve") => Ok(Command::Serve),
            Some("index") => match args.get(1) {
                Some(doc_id) => Ok(Command::Index {
                    doc_id: doc_id.clone(),
                }),
                None => bail!("usage: govdoc index <doc_id>"),
            },
            Some("query") => {
                let text = args[1..].join(" ");
                if text.trim().is_empty() {
                    bail!("usage: govdoc query <text>");
                }
                Ok(Command::Query { text })
            }
            Some("eval") => Self::eval_from_args(&args[1..]),
            Some(other) => bail!("unknown command '{}'", other),
        }
    }

    fn eval_from_args(args: &[String]) -> anyhow::Result<Self> {
        const USAGE: &str = "usage: govdoc eval <golden.jsonl> [--baseline <report.json>]";
        let mut golden = None;
        let mut baseline = None;
        let mut rest = args.iter();
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "--baseline" => match rest.next() {
                    Some(path) => baseline = Some(PathBuf::from(path)),
                    None => bail!(USAGE),
                },
                path if golden.is_none() && !path.starts_with("--") => {
                    golden = Some(PathBuf::from(path))
                }
                _ => bail!(USAGE),
            }
        }
        match golden {
            Some(golden) => Ok(Command::Eval { golden, baseline }),
            None => bail!(USAGE),
        }
    }
}

struct Services {
    retrieval: RetrievalFusion,
    ask: AskService,
    ingest: IngestPipeline,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let command = Command::from_args(&args)?;

    let config = Config::from_env()?;
    config.validate()?;
    tracing::debug!(config = ?config, "Loaded configuration");

    let services = build_services(&config).await?;

    match command {
        Command::Serve => serve(&config, services).await,
        Command::Index { doc_id } => {
            let summary = services
                .ingest
                .reindex(&doc_id)
                .await
                .with_context(|| format!("failed to index '{}'", doc_id))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Query { text } => {
            let results = services
                .retrieval
                .retrieve(&text, services.ask.params())
                .await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::Eval { golden, baseline } => {
            let examples = load_golden_set(&golden).await?;
            let runner = EvalRunner::new(services.retrieval, *services.ask.params());
            let mut report = runner.run(&examples).await?;
            if let Some(path) = baseline {
                report = report.with_baseline(&load_report(&path).await?);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

async fn build_services(config: &Config) -> anyhow::Result<Services> {
    let retry = config.retry_policy();
    let identifier: Arc<dyn LanguageIdentifier> = Arc::new(WhatlangIdentifier);

    let translator: Arc<dyn Translator> = match config.translator_config() {
        Some(translator_config) => Arc::new(HttpTranslator::new(translator_config)?),
        None => {
            tracing::info!("No GOVDOC_TRANSLATE_URL configured, translation disabled");
            Arc::new(IdentityTranslator)
        }
    };
    let pivot = EmbeddingPivot::new(translator.clone());

    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(CohereEmbedder::new(config.embedder_config()?)?);

    let reranker: Arc<dyn RerankProvider> = match config.reranker_config()? {
        Some(reranker_config) => Arc::new(CohereReranker::new(reranker_config)?),
        None => {
            tracing::warn!("Using the offline lexical reranker; rerank quality is reduced");
            Arc::new(LexicalReranker::new())
        }
    };

    let index: Arc<dyn VectorIndex> = Arc::new(LazyQdrantIndex::new(config.qdrant_index_config()));

    let retrieval = RetrievalFusion::new(embedder.clone(), index.clone(), reranker, pivot.clone())
        .with_capability(config.embedding_capability)
        .with_retry(retry.clone())
        .with_identifier(identifier.clone());

    let generator = Arc::new(GenaiAnswerGenerator::new(config.llm_model.clone()));
    let ask = AskService::new(retrieval.clone(), generator, translator)
        .with_params(config.retrieval_params());

    let local_store = LocalObjectStore::new(config.storage_path.clone());
    local_store
        .ensure_root()
        .await
        .with_context(|| format!("storage root {}", config.storage_path.display()))?;
    let store: Arc<dyn ObjectStore> = Arc::new(local_store);

    let mut ingest = IngestPipeline::new(
        BlockGraphReducer::new(identifier),
        Chunker::new(config.chunker_config())?,
        store.clone(),
        pivot,
        embedder,
        index,
    )
    .with_capability(config.embedding_capability)
    .with_retry(retry)
    .with_upsert_batch_size(config.upsert_batch_size);

    match config.ocr_config() {
        Some(ocr_config) => {
            let engine: Arc<dyn OcrEngine> = Arc::new(HttpOcrEngine::new(ocr_config, store)?);
            ingest = ingest.with_ocr(engine, config.poll_config());
        }
        None => tracing::info!("No GOVDOC_OCR_URL configured, PDF upload disabled"),
    }

    Ok(Services {
        retrieval,
        ask,
        ingest,
    })
}

async fn serve(config: &Config, services: Services) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        collection = %config.collection,
        "govdoc starting"
    );

    let state = AppState::new(services.ask).with_ingest(services.ingest);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("govdoc shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var("GOVDOC_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
