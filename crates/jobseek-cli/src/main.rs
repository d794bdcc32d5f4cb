//! `jobseek`: search a job board from the terminal, with a five minute
//! result cache and a persisted recent-search history.

mod config;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;

use clap::{Parser, Subcommand, ValueEnum};
use jobseek_core::models::{
    CoreError, CoreErrorKind, CoreResult, FETCH_FAILURE_MESSAGE, SearchKey, SearchRequest,
    ThemePreference,
};
use jobseek_core::orchestration::{SearchController, SearchOutcome};
use jobseek_core::persistence::KeyValueStore;
use jobseek_core::preferences::ThemePreferences;
use jobseek_core::service::HttpJobSearchService;
use jobseek_core::sqlite::SqliteStore;

use crate::config::ClientConfig;

#[derive(Parser)]
#[command(name = "jobseek")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search job postings with cached recent searches")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Job search API base URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// SQLite database holding recent searches and preferences
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for jobs
    Search {
        query: String,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        job_type: Option<String>,

        #[arg(long)]
        experience_level: Option<String>,

        /// 1-based result page to show
        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long)]
        json: bool,
    },

    /// List recent searches, newest first
    History {
        #[arg(long)]
        json: bool,
    },

    /// Run a recent search again by its history index
    Rerun {
        index: usize,

        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long)]
        json: bool,
    },

    /// Show or change the theme preference
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },

    /// Check that the job search API is reachable
    Health,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ThemeAction {
    Show,
    Toggle,
    Dark,
    Light,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if error.is_fetch_failure() {
                eprintln!("{FETCH_FAILURE_MESSAGE}");
            }
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CoreResult<()> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    logging::init_logging(&config.log_level);
    tracing::debug!(
        endpoint = %config.endpoint,
        database = %config.database_path.display(),
        "starting jobseek"
    );

    let service = HttpJobSearchService::with_options(
        config.endpoint.clone(),
        config.request_timeout(),
        &config.user_agent,
    );

    match cli.command {
        Commands::Search {
            query,
            location,
            job_type,
            experience_level,
            page,
            json,
        } => {
            let key = SearchKey::new(
                query,
                location.as_deref(),
                job_type.as_deref(),
                experience_level.as_deref(),
            );
            let controller = open_controller(&config, service)?;
            let outcome = block_on(controller.search(SearchRequest {
                key,
                issued_at: SystemTime::now(),
            }))??;
            show_page(&controller, &outcome, page, json)
        }
        Commands::History { json } => {
            let controller = open_controller(&config, service)?;
            output::print_history(&controller.recent_searches()?, json)
        }
        Commands::Rerun { index, page, json } => {
            let controller = open_controller(&config, service)?;
            let history = controller.recent_searches()?;
            let entry = index
                .checked_sub(1)
                .and_then(|position| history.get(position))
                .ok_or_else(|| {
                    CoreError::new(
                        CoreErrorKind::InvalidInput,
                        format!(
                            "no recent search at index {index}; history has {} item(s)",
                            history.len()
                        ),
                    )
                })?;
            let outcome = block_on(controller.search_again(entry, SystemTime::now()))??;
            show_page(&controller, &outcome, page, json)
        }
        Commands::Theme { action } => {
            let store = open_store(&config)?;
            let mut preferences = ThemePreferences::load(store);
            let theme = match action {
                ThemeAction::Show => preferences.current(),
                ThemeAction::Toggle => preferences.toggle()?,
                ThemeAction::Dark => set_theme(&mut preferences, ThemePreference::Dark)?,
                ThemeAction::Light => set_theme(&mut preferences, ThemePreference::Light)?,
            };
            output::print_theme(theme);
            Ok(())
        }
        Commands::Health => {
            service.check_health()?;
            println!("healthy ({})", service.base_url());
            Ok(())
        }
    }
}

fn open_store(config: &ClientConfig) -> CoreResult<Arc<dyn KeyValueStore>> {
    let store = SqliteStore::new(config.database_path.clone());
    store.migrate_to_latest()?;
    Ok(Arc::new(store))
}

fn open_controller(
    config: &ClientConfig,
    service: HttpJobSearchService,
) -> CoreResult<SearchController> {
    let store = open_store(config)?;
    Ok(SearchController::new(Arc::new(service), store))
}

fn show_page(
    controller: &SearchController,
    outcome: &SearchOutcome,
    page: i64,
    json: bool,
) -> CoreResult<()> {
    check_page(page, controller.page_snapshot()?.page_count)?;
    controller.go_to_page(page)?;
    output::print_page(outcome, &controller.page_snapshot()?, json)
}

/// Any page is accepted for an empty result set, which renders the
/// "no jobs" message.
fn check_page(page: i64, page_count: usize) -> CoreResult<()> {
    if page_count == 0 {
        return Ok(());
    }
    let last = i64::try_from(page_count).unwrap_or(i64::MAX);
    if (1..=last).contains(&page) {
        Ok(())
    } else {
        Err(CoreError::new(
            CoreErrorKind::InvalidInput,
            format!("page {page} is out of range; results span pages 1 to {last}"),
        ))
    }
}

fn set_theme(
    preferences: &mut ThemePreferences,
    theme: ThemePreference,
) -> CoreResult<ThemePreference> {
    preferences.set(theme)?;
    Ok(theme)
}

fn block_on<F: std::future::Future>(future: F) -> CoreResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| {
            CoreError::new(
                CoreErrorKind::Internal,
                format!("failed to start async runtime: {error}"),
            )
        })?;
    Ok(runtime.block_on(future))
}
