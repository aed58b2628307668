use std::{
    io::{self, BufRead, Read, Write},
    path::PathBuf,
    sync::Arc,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fake_news_detector::{
    Detection, DetectionInput, Detector, DetectorConfig, ExternalAnalyzer, ModelStore, OpenAiAnalyzer,
    TermImportance, VerdictSource,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fake-news-detector")]
#[command(about = "Classify news text as likely fake or real")]
#[command(version)]
struct Args {
    /// Directory holding the persisted vectorizer and model
    #[arg(long, env = "FAKENEWS_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Directory holding True.csv, Fake.csv and scraped.csv
    #[arg(long, env = "FAKENEWS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Skip the external language-model check even if a key is configured
    #[arg(long)]
    local_only: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify TEXT (read from stdin when omitted)
    Classify { text: Option<String> },
    /// Show the terms that weigh most for TEXT (stdin when omitted)
    Explain { text: Option<String> },
    /// Retrain from the corpus and replace the persisted model
    Retrain,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = DetectorConfig::from_env();
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if args.local_only {
        config.external.api_key = None;
    }

    let start = Instant::now();
    let analyzer = OpenAiAnalyzer::from_config(&config.external).map(|a| Box::new(a) as Box<dyn ExternalAnalyzer>);
    let (store, outcome) = ModelStore::initialize(config);
    let detector = Detector::new(Arc::new(store), analyzer);
    info!(%outcome, elapsed_ms = start.elapsed().as_millis() as u64, external = detector.has_external(), "ready");

    match args.command {
        Some(Command::Classify { text }) => {
            let text = text_or_stdin(text)?;
            let detection = detector.detect(&DetectionInput::text(text))?;
            print_detection(&detection);
        }
        Some(Command::Explain { text }) => {
            let text = text_or_stdin(text)?;
            print_terms(&detector.explain(&text)?);
        }
        Some(Command::Retrain) => {
            let pair = detector.store().retrain().context("retraining failed")?;
            println!(
                "retrained: {} features, {} trees",
                pair.vectorizer().vocab_size(),
                pair.forest().n_estimators()
            );
        }
        None => run_interactive(&detector)?,
    }
    Ok(())
}

fn text_or_stdin(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).context("reading stdin")?;
    if buf.trim().is_empty() {
        bail!("no text given on the command line or stdin");
    }
    Ok(buf)
}

fn print_detection(d: &Detection) {
    println!("{}", d.summary);
    println!("  local:    {}", d.local);
    match d.external {
        Some(ext) => println!("  external: {ext}"),
        None => println!("  external: unavailable"),
    }
    let source = match d.source {
        VerdictSource::Local => "local model",
        VerdictSource::External => "external analysis",
    };
    println!("  decided by {source}");
    print_terms(&d.explanation);
}

fn print_terms(terms: &[TermImportance]) {
    if terms.is_empty() {
        println!("  (no known terms)");
        return;
    }
    for term in terms {
        println!("  {:<20}\t{:.4}", term.token, term.importance);
    }
}

fn run_interactive(detector: &Detector) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        print!("News> ");
        stdout.flush()?;
        let Some(line) = lines.next() else { break };
        let line = line.context("reading stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        let t0 = Instant::now();
        let detection = detector.detect(&DetectionInput::text(trimmed))?;
        print_detection(&detection);
        info!(elapsed_ms = t0.elapsed().as_millis() as u64, "classified");
    }
    eprintln!("bye");
    Ok(())
}
