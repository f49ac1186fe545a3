use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use fireball_core::{
    CatalogSource, Config, FileFetcher, FireballProcessor, LoadCatalog, QueryOutcome, QueryReport,
    ReportDecision, Session, SessionState,
};
use fireball_http::HttpFetcher;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(about = "Find which city had the brightest fireball nearby")]
struct Args {
    /// JSON config file (camelCase keys).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read a saved catalog instead of calling the API.
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cfg.validate()?;

    let source: Box<dyn LoadCatalog> = match &args.catalog_file {
        Some(path) => Box::new(CatalogSource::new(FileFetcher::new(path), FireballProcessor)),
        None => Box::new(CatalogSource::new(HttpFetcher::new(&cfg)?, FireballProcessor)),
    };

    println!("Fireball finder running");
    match &args.catalog_file {
        Some(path) => println!("  catalog: {}", path.display()),
        None => println!("  catalog: {}", cfg.catalog_url()),
    }
    println!("  window:  {} .. {}", cfg.date_min, cfg.date_max);
    println!("Answer 'yes' to compare cities so far, 'exit' to quit.");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let session = run_session(stdin.lock(), stdout.lock(), source.as_ref())?;
    info!("session ended with {} recorded outcomes", session.leaderboard().len());
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "fireball=info,fireball_core=info,fireball_http=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run_session<R: BufRead, W: Write>(
    mut input: R,
    mut out: W,
    source: &dyn LoadCatalog,
) -> io::Result<Session> {
    let mut session = Session::new();

    while session.state() == SessionState::AwaitingCityInput {
        let Some(city) = prompt(&mut input, &mut out, "Enter the cityName: ")? else { break };
        let Some(lat) = prompt(&mut input, &mut out, "Enter the latitude: ")? else { break };
        let Some(lon) = prompt(&mut input, &mut out, "Enter the longitude: ")? else { break };

        let report = session
            .submit(&city, &lat, &lon, source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        print_report(&mut out, &report)?;

        let Some(answer) = prompt(&mut input, &mut out, "print the ComparisonResult: ")? else {
            break;
        };
        let decision = ReportDecision::parse(&answer);
        let best = session
            .decide(decision)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        if decision == ReportDecision::Report {
            print_best(&mut out, best.as_ref())?;
        }
    }

    session.terminate();
    Ok(session)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> io::Result<Option<String>> {
    write!(out, "{}", text)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

fn print_report<W: Write>(out: &mut W, report: &QueryReport) -> io::Result<()> {
    for issue in &report.issues {
        writeln!(out, "[!] {} {}", report.city, issue)?;
    }
    match &report.best {
        Some(m) => {
            write!(
                out,
                "[ok] {} energy={} at lat={:.1} lon={:.1}",
                report.city, m.energy, m.latitude, m.longitude
            )?;
            if let Some(date) = &m.date {
                write!(out, " on {}", date)?;
            }
            writeln!(out)
        }
        None => writeln!(out, "[??] {} no result", report.city),
    }
}

fn print_best<W: Write>(out: &mut W, best: Option<&QueryOutcome>) -> io::Result<()> {
    match best {
        Some(b) => writeln!(out, "{} {}", b.city, b.energy),
        None => writeln!(out, "No city has a result yet."),
    }
}
