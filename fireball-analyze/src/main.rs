use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use fireball_core::{
    CatalogSource, CityInput, Config, FileFetcher, FireballProcessor, Leaderboard, LoadCatalog,
    ProcessedCatalog, QueryIssue, QueryOutcome, QueryReport,
};
use fireball_http::HttpFetcher;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(about = "Rank cities by the brightest fireball within 15 degrees")]
struct Args {
    /// JSON config file (camelCase keys).
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of {"city", "latitude", "longitude"}.
    #[arg(long)]
    cities: Option<PathBuf>,

    /// NAME:LAT:LON, repeatable.
    #[arg(long = "city")]
    city: Vec<String>,

    /// Read a saved catalog instead of calling the API.
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogSummary {
    source: String,
    sha256: Option<String>,
    records: usize,
    skipped: usize,
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisOutput {
    catalog: CatalogSummary,
    queries: Vec<QueryReport>,
    ranking: Vec<QueryOutcome>,
    best: Option<QueryOutcome>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cfg = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    cfg.validate()?;

    let cities = collect_cities(&args)?;
    if cities.is_empty() {
        bail!("no cities given; use --cities FILE or --city NAME:LAT:LON");
    }

    let label = match &args.catalog_file {
        Some(path) => path.display().to_string(),
        None => cfg.catalog_url(),
    };
    let source: Box<dyn LoadCatalog> = match &args.catalog_file {
        Some(path) => Box::new(CatalogSource::new(FileFetcher::new(path), FireballProcessor)),
        None => Box::new(CatalogSource::new(HttpFetcher::new(&cfg)?, FireballProcessor)),
    };

    let output = analyze(&label, source.as_ref(), &cities);

    if args.json {
        let text = serde_json::to_string_pretty(&output)
            .unwrap_or_else(|_| "{\"error\":\"failed to serialize\"}".to_string());
        println!("{text}");
        return Ok(());
    }

    print_catalog(&output.catalog);
    println!("\nPer-city results:");
    for report in &output.queries {
        print_query(report);
    }
    println!("\nRanking:");
    for (i, o) in output.ranking.iter().enumerate() {
        println!(
            "{:>3}. {} energy={} at ({:.1}, {:.1})",
            i + 1,
            o.city,
            o.energy,
            o.location.0,
            o.location.1
        );
    }
    match &output.best {
        Some(best) => println!("\nBrightest: {} {}", best.city, best.energy),
        None => println!("\nBrightest: no city matched any fireball."),
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "fireball_analyze=info,fireball_core=info,fireball_http=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn collect_cities(args: &Args) -> anyhow::Result<Vec<CityInput>> {
    let mut out = Vec::new();
    if let Some(path) = &args.cities {
        let list = CityInput::load_list(path)
            .with_context(|| format!("reading cities from {}", path.display()))?;
        out.extend(list);
    }
    for flag in &args.city {
        out.push(CityInput::parse_flag(flag)?);
    }
    Ok(out)
}

/// Runs every city against a single catalog snapshot.
fn analyze(label: &str, source: &dyn LoadCatalog, cities: &[CityInput]) -> AnalysisOutput {
    let (catalog, error) = match source.load_catalog() {
        Ok(c) => (c, None),
        Err(err) => {
            warn!("catalog unavailable: {}", err);
            (ProcessedCatalog::default(), Some(err.to_string()))
        }
    };
    info!(
        "scanning {} records for {} cities",
        catalog.records.len(),
        cities.len()
    );

    let mut board = Leaderboard::new();
    let mut queries = Vec::with_capacity(cities.len());
    for city in cities {
        let mut report = city.query().evaluate(&catalog);
        if let Some(message) = &error {
            report.issues.insert(
                0,
                QueryIssue::CatalogUnavailable {
                    message: message.clone(),
                },
            );
        }
        if let Some(outcome) = report.outcome() {
            board.record(outcome);
        }
        queries.push(report);
    }

    AnalysisOutput {
        catalog: CatalogSummary {
            source: label.to_string(),
            sha256: catalog.sha256.clone(),
            records: catalog.records.len(),
            skipped: catalog.skipped,
            error,
        },
        ranking: board.ranked().into_iter().cloned().collect(),
        best: board.best().cloned(),
        queries,
    }
}

fn print_catalog(c: &CatalogSummary) {
    println!("Catalog: {}", c.source);
    if let Some(err) = &c.error {
        println!("  unavailable: {}", err);
        return;
    }
    println!("  records={} skipped={}", c.records, c.skipped);
    if let Some(sha) = &c.sha256 {
        println!("  sha256={}", sha);
    }
}

fn print_query(r: &QueryReport) {
    let window = match (r.latitude.interval, r.longitude.interval) {
        (Some(lat), Some(lon)) => format!(
            "lat[{:.1},{:.1}) lon[{:.1},{:.1})",
            lat.low, lat.high, lon.low, lon.high
        ),
        _ => "window incomplete".to_string(),
    };
    match &r.best {
        Some(m) => println!(
            "- {} {} best energy={} at ({:.1}, {:.1}){}",
            r.city,
            window,
            m.energy,
            m.latitude,
            m.longitude,
            m.date.as_deref().map(|d| format!(" on {}", d)).unwrap_or_default()
        ),
        None => println!("- {} {} no result", r.city, window),
    }
    for issue in &r.issues {
        println!("  [!] {}", issue);
    }
}
