use clap::{Parser, Subcommand};
use folio_core::backend::{DashboardBackend, HttpBackend};
use folio_core::dashboard;
use folio_core::domain::optimization::{Objective, OptimizationRequest, DEFAULT_HORIZON_DAYS};
use folio_core::domain::portfolio::{NewPortfolio, DEFAULT_PERFORMANCE_LIMIT};
use folio_core::optimization::{OptimizationFlow, PollConfig, PollTerminal};
use folio_core::render;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod view;

#[derive(Debug, Parser)]
#[command(name = "folio_dashboard")]
struct Args {
    /// Backend base URL. Overrides FOLIO_API_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Backend health plus the portfolio list.
    Overview,

    Health,

    Portfolios,

    /// Recent performance metrics for one portfolio.
    Performance {
        #[arg(long)]
        portfolio_id: i64,

        #[arg(long, default_value_t = DEFAULT_PERFORMANCE_LIMIT)]
        limit: u32,
    },

    CreatePortfolio {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value_t = 10_000.0)]
        initial_capital: f64,

        #[arg(long, default_value_t = 0.5)]
        risk_tolerance: f64,
    },

    /// Submit an optimization job and follow it until it finishes.
    Optimize {
        #[arg(long)]
        strategy_id: i64,

        /// Repeat for each asset.
        #[arg(long = "asset-id")]
        asset_ids: Vec<i64>,

        #[arg(long, default_value = "sharpe_ratio")]
        objective: String,

        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = folio_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(base_url) = args.base_url {
        settings = settings.with_base_url(base_url);
    }

    let backend = HttpBackend::from_settings(&settings)?;
    tracing::debug!(base_url = %settings.api_base_url, "backend configured");

    let res = run(args.command, &backend, &settings).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "command failed");
    }
    res
}

async fn run(
    command: Command,
    backend: &HttpBackend,
    settings: &folio_core::config::Settings,
) -> anyhow::Result<()> {
    match command {
        Command::Overview => {
            let overview = dashboard::load_overview(backend).await;
            match &overview.health {
                Ok(report) => println!("{}", render::health_line(report)),
                Err(err) => println!("API: offline ({err})"),
            }
            match overview.portfolios {
                Ok(portfolios) => print!("{}", render::portfolio_table(&portfolios)),
                Err(err) => println!("Could not load portfolios: {err}"),
            }
        }
        Command::Health => {
            let report = backend.health().await?;
            println!("{}", render::health_line(&report));
            anyhow::ensure!(report.is_ok(), "backend reports status {}", report.status);
        }
        Command::Portfolios => {
            let portfolios = backend.list_portfolios().await?;
            print!("{}", render::portfolio_table(&portfolios));
        }
        Command::Performance {
            portfolio_id,
            limit,
        } => {
            let points = dashboard::load_performance(backend, portfolio_id, limit).await?;
            print!("{}", render::performance_table(&points));
        }
        Command::CreatePortfolio {
            name,
            description,
            initial_capital,
            risk_tolerance,
        } => {
            let created = dashboard::create_portfolio(
                backend,
                NewPortfolio {
                    name,
                    description,
                    initial_capital,
                    risk_tolerance,
                },
            )
            .await?;
            println!("Created portfolio {} ({})", created.name, created.id);
        }
        Command::Optimize {
            strategy_id,
            asset_ids,
            objective,
            days,
        } => {
            let objective = objective.parse::<Objective>()?;
            let request = OptimizationRequest::new(strategy_id, asset_ids)
                .with_objective(objective)
                .with_days(days);
            optimize(backend, settings, &request).await?;
        }
    }
    Ok(())
}

async fn optimize(
    backend: &HttpBackend,
    settings: &folio_core::config::Settings,
    request: &OptimizationRequest,
) -> anyhow::Result<()> {
    let view = view::TerminalView;
    let flow = OptimizationFlow::new(PollConfig::from_settings(settings));

    let session = flow.start(backend, &view, request).await?;

    let cancel = session.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let outcome = session.run(backend, &view).await;
    match outcome.poll.terminal {
        PollTerminal::Completed { .. } | PollTerminal::Cancelled => Ok(()),
        PollTerminal::Failed { message } => {
            Err(folio_core::error::DashboardError::JobFailure(message).into())
        }
        PollTerminal::PollError { message } => Err(anyhow::anyhow!(message)),
    }
}

fn init_sentry(settings: &folio_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
