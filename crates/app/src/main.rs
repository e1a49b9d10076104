mod config;

use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{AppServices, Clock, exam_source_for};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

use crate::config::{AppConfig, ArgsError, prepare_sqlite_file, require_value};

struct DesktopApp {
    services: AppServices,
    query: String,
}

impl UiApp for DesktopApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }

    fn initial_query(&self) -> String {
        self.query.clone()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui      [--db <sqlite_url>] [--source <url|dir>] [--flow timed|classic] [--step <step>]");
    eprintln!("  cargo run -p app -- years   <subject> <type> [--db ..] [--source ..]");
    eprintln!("  cargo run -p app -- history [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://exams.sqlite3");
    eprintln!("  --source .   (expects exams/<subject>/<type>/<year>.json)");
    eprintln!("  --flow timed");
    eprintln!();
    eprintln!("Environment (.env is read first):");
    eprintln!("  EXAM_DB_URL, EXAM_SOURCE, EXAM_FLOW, EXAM_EXTENDED_TYPES, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Years,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "years" => Some(Self::Years),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct YearsQuery {
    subject: Option<String>,
    exam_type: Option<String>,
}

fn parse_args(
    config: &mut AppConfig,
    args: &mut impl Iterator<Item = String>,
) -> Result<YearsQuery, ArgsError> {
    let mut query = YearsQuery::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--subject" => query.subject = Some(require_value(args, "--subject")?),
            "--type" => query.exam_type = Some(require_value(args, "--type")?),
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => {
                if !config.apply_flag(flag, args)? {
                    return Err(ArgsError::UnknownArg(arg));
                }
            }
            _ if query.subject.is_none() => query.subject = Some(arg),
            _ if query.exam_type.is_none() => query.exam_type = Some(arg),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(query)
}

fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::new(&config.rust_log);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the window.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut config = AppConfig::from_env()?;
    let years_query = parse_args(&mut config, &mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    init_tracing(&config);

    prepare_sqlite_file(&config.db_url)?;
    let clock = Clock::default_clock();
    let source = exam_source_for(&config.source, clock.clone());
    let services =
        AppServices::new_sqlite(&config.db_url, source, config.service_options(), clock).await?;
    tracing::info!(db = %config.db_url, flow = ?config.flow, "configured");

    match cmd {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                services,
                query: config.query.clone(),
            });
            let context = build_app_context(&app);

            // Some dev setups default tao windows to always-on-top.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Exam Practice")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Years => {
            let subject = years_query
                .subject
                .ok_or(ArgsError::MissingFlag { flag: "<subject>" })?;
            let exam_type = years_query
                .exam_type
                .ok_or(ArgsError::MissingFlag { flag: "<type>" })?;
            let years = services.catalog().list_years(&subject, &exam_type).await?;
            for option in years {
                let status = if option.available { "available" } else { "not available" };
                match option.best_percentage {
                    Some(best) => println!("{}  {status}  best {best}%", option.year),
                    None => println!("{}  {status}", option.year),
                }
            }
            Ok(())
        }
        Command::History => {
            let results = services.history().list().await?;
            if results.is_empty() {
                println!("No completed exams yet.");
            }
            for result in results {
                println!(
                    "{}  best {}/{} ({}%)  attempts {}  last {}",
                    result.title(),
                    result.effective_best_score(),
                    result.total,
                    result.effective_best_percentage(),
                    result.attempts,
                    result.last_attempt.format("%Y-%m-%d %H:%M"),
                );
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
