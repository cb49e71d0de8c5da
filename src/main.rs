use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use doc_analyzer::classify::{self, ClassifierSettings};
use doc_analyzer::config::{self, AnalyzerConfig, DEFAULT_CONFIG_PATH};
use doc_analyzer::dataset::Dataset;
use doc_analyzer::download::{self, DownloadSettings};
use doc_analyzer::feedback::Feedback;
use doc_analyzer::{search, serve, AnalyzerError, Result};

#[derive(Parser, Debug)]
#[command(
    name = "doc-analyzer",
    version,
    about = "Search sampled arXiv PDFs for a keyword and classify abstracts"
)]
struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(
        long,
        global = true,
        help = "Write the resolved config to disk before running"
    )]
    write_config: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web UI.
    #[command(name = "serve")]
    Serve(ServeCommandArgs),
    /// Download a sample of PDFs and search them for a keyword.
    #[command(name = "search")]
    Search(SearchArgs),
    /// Print the dataset's first rows ordered by title.
    #[command(name = "sort")]
    Sort(DatasetArgs),
    /// Train the abstract classifier and print its report as JSON.
    #[command(name = "classify")]
    Classify(DatasetArgs),
    /// Print dataset counts.
    #[command(name = "info")]
    Info(DatasetArgs),
}

#[derive(Args, Debug, Clone)]
struct DatasetArgs {
    #[arg(long, help = "CSV with title, pdf_url and optional abstract, category columns")]
    csv: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct SearchArgs {
    #[command(flatten)]
    dataset: DatasetArgs,
    #[arg(long, help = "Keyword to look for (defaults to the configured keyword)")]
    keyword: Option<String>,
    #[arg(long, help = "Number of PDFs to download, clamped to 1..=max_limit")]
    limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct ServeCommandArgs {
    #[arg(long = "host", default_value = "127.0.0.1", help = "address to bind")]
    host: String,
    #[arg(long = "port", default_value_t = 8501, help = "port to serve on")]
    port: u16,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = Dataset::from_path(path)?;
    if dataset.is_empty() {
        warn!(path = %path.display(), "dataset has no rows with both a title and a pdf_url");
    }
    Ok(dataset)
}

fn run_search(args: &SearchArgs, config: &AnalyzerConfig) -> Result<()> {
    let dataset = load_dataset(&args.dataset.csv)?;
    let keyword = args
        .keyword
        .clone()
        .unwrap_or_else(|| config.default_keyword.clone());
    let limit = config.clamp_limit(args.limit.unwrap_or(config.default_limit));

    let mut feedback = Feedback::new();
    let documents =
        download::download_pdfs(&dataset, limit, &DownloadSettings::from(config), &mut feedback)?;
    let results =
        search::search_keyword_in_pdfs(&documents, &keyword, config.snippet_radius, &mut feedback);

    if results.is_empty() {
        println!("No matching documents found.");
    }
    for result in results {
        println!("✅ {}\n    ...{}...", result.title, result.snippet);
    }
    Ok(())
}

fn run_sort(args: &DatasetArgs, config: &AnalyzerConfig) -> Result<()> {
    let dataset = load_dataset(&args.csv)?;
    println!("title\tcategory");
    for row in dataset.sorted_by_title(config.preview_rows) {
        println!("{}\t{}", row.title, row.category.as_deref().unwrap_or(""));
    }
    Ok(())
}

fn run_classify(args: &DatasetArgs, config: &AnalyzerConfig) -> Result<()> {
    let dataset = load_dataset(&args.csv)?;
    let report = classify::classify_documents(&dataset, &ClassifierSettings::from(config))?;
    println!("{}", report.to_pretty_json()?);
    Ok(())
}

fn run_info(args: &DatasetArgs) -> Result<()> {
    let dataset = load_dataset(&args.csv)?;
    let summary = dataset.summary();
    println!("Total Documents: {}", summary.total_documents);
    match summary.unique_categories {
        Some(count) => println!("Unique Categories: {count}"),
        None => println!("Unique Categories: n/a (no category column)"),
    }
    println!("Unique Titles: {}", summary.unique_titles);
    Ok(())
}

fn run_serve(args: &ServeCommandArgs, config: &AnalyzerConfig) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().map_err(AnalyzerError::Server)?;
    rt.block_on(serve::run(config.clone(), &args.host, args.port))
}

fn dispatch_command(command: Commands, config: &AnalyzerConfig) -> Result<()> {
    match command {
        Commands::Serve(args) => run_serve(&args, config),
        Commands::Search(args) => run_search(&args, config),
        Commands::Sort(args) => run_sort(&args, config),
        Commands::Classify(args) => run_classify(&args, config),
        Commands::Info(args) => run_info(&args),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if cli.write_config {
        if let Err(err) = config::write_config(&cli.config, &config) {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }

    let Some(command) = cli.command else {
        if !cli.write_config {
            eprintln!("No subcommand supplied. Use --help for usage details.");
            std::process::exit(2);
        }
        return;
    };

    if let Err(err) = dispatch_command(command, &config) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
