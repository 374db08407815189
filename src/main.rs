use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lab_search::{
    document::loader::load_documents, Document, FieldSource, Projection, SearchConfig, SearchRequest,
    SearchResponse, SearchService,
};

/// Search experiments of a process-development tracker
#[derive(Parser, Debug, Clone)]
#[command(name = "lab-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Args {
    /// Corpus file: JSON array of experiment objects, or CBOR with `.cbor`
    #[arg(long, env = "LAB_SEARCH_CORPUS", value_name = "PATH")]
    corpus: PathBuf,

    /// Search configuration (JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run one query and exit; without it an interactive prompt starts
    #[arg(long)]
    query: Option<String>,

    /// Number of results
    #[arg(long = "top-k", allow_negative_numbers = true)]
    top_k: Option<i64>,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(args: &Args) {
    // RUST_LOG wins unless a flag asks otherwise
    let filter = if args.quiet || args.verbose > 0 {
        EnvFilter::new(args.log_level())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_response(response: &SearchResponse<Document>, as_json: bool) -> lab_search::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }
    println!("{}", response.summary);
    if !response.results.is_empty() {
        println!();
        println!("{:>4}  {:>7}  {:<12}  {}", "rank", "score", "id", "eval_item");
        for (rank, entry) in response.results.iter().enumerate() {
            let id = entry.document.doc_key().unwrap_or_default();
            let item = entry.document.field_text("eval_item").unwrap_or_default();
            println!("{:>4}  {:>7.3}  {:<12}  {}", rank + 1, entry.score, id, item);
        }
    }
    if !response.suggestions.is_empty() {
        println!();
        println!("suggestions:");
        for suggestion in &response.suggestions {
            println!("  {:<16} {}", suggestion.keyword, suggestion.context);
        }
    }
    Ok(())
}

fn run_query(service: &SearchService, args: &Args, query: &str) {
    let request = SearchRequest { query: query.to_string(), top_k: args.top_k };
    let started = Instant::now();
    match service.search(&request) {
        Ok(response) => {
            info!(elapsed_ms = started.elapsed().as_millis() as u64, results = response.results.len(), "query done");
            if let Err(err) = print_response(&response, args.json) {
                error!("failed to print response: {err}");
            }
        }
        Err(err) => error!("{err}"),
    }
}

fn interactive(service: &SearchService, args: &Args) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Query> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let query = line.trim();
        match query {
            "" | "exit" | "quit" => break,
            ":reindex" => match load_documents(&args.corpus) {
                Ok(documents) => {
                    let count = service.reindex(documents);
                    println!("reindexed {count} documents");
                }
                Err(err) => error!("reindex failed: {err}"),
            },
            _ => run_query(service, args, query),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    let config = match &args.config {
        Some(path) => match SearchConfig::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => SearchConfig::default(),
    };
    let documents = match load_documents(&args.corpus) {
        Ok(documents) => documents,
        Err(err) => {
            error!(corpus = %args.corpus.display(), "{err}");
            return ExitCode::FAILURE;
        }
    };
    let service: SearchService = SearchService::new(documents, Projection::experiment(), config);

    match &args.query {
        Some(query) => run_query(&service, &args, query),
        None => {
            if let Err(err) = interactive(&service, &args) {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
