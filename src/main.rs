use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

use pubmed_affil::models::Paper;
use pubmed_affil::{output, ClientConfig, Config, PaperPipeline, PubMedClient};

#[derive(Parser, Debug)]
#[command(name = "pubmed-affil")]
#[command(version = "0.1.0")]
#[command(about = "Find PubMed papers with at least one pharmaceutical/biotech-affiliated author")]
struct Args {
    /// PubMed query (full PubMed syntax)
    query: String,

    /// Print debug information during execution
    #[arg(short, long)]
    debug: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    file: Option<String>,

    /// Maximum number of search results to consider
    #[arg(short, long, default_value = "1000")]
    max_results: u32,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Ids per request (overrides PUBMED_BATCH_SIZE)
    #[arg(long)]
    batch_size: Option<u32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging on stderr so stdout stays clean
    let level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("pubmed_affil={}", level).parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    let mut client_config = ClientConfig::from(&config);
    if let Some(batch_size) = args.batch_size {
        client_config = client_config.with_batch_size(batch_size);
    }

    let client = PubMedClient::new(client_config)?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{bar:40}] {pos}/{len} papers fetched")?
            .progress_chars("=> "),
    );
    let bar = progress.clone();

    let pipeline = PaperPipeline::new(client).on_progress(move |p| {
        bar.set_length(p.total as u64);
        bar.set_position(p.processed as u64);
    });

    let report = pipeline.run(&args.query, args.max_results).await?;
    progress.finish_and_clear();

    if !report.warnings.is_empty() {
        tracing::warn!("{} record(s) skipped", report.warnings.len());
    }

    if report.papers.is_empty() {
        if report.all_records_skipped() {
            eprintln!("No papers could be parsed from the {} results found.", report.ids_found);
        } else {
            eprintln!("No papers found with pharmaceutical/biotech affiliations.");
        }
        return Ok(());
    }

    write_papers(&report.papers, &args)?;

    Ok(())
}

fn write_papers(papers: &[Paper], args: &Args) -> anyhow::Result<()> {
    match &args.file {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            render(&mut writer, papers, args.format)?;
            writer.flush()?;
            tracing::info!("Output written to: {}", path);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            render(&mut writer, papers, args.format)?;
            writer.flush()?;
        }
    }

    Ok(())
}

fn render<W: Write>(writer: W, papers: &[Paper], format: Format) -> pubmed_affil::Result<()> {
    match format {
        Format::Csv => output::write_csv(writer, papers),
        Format::Json => output::write_json(writer, papers),
    }
}
