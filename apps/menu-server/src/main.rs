mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use api_gateway::ApiGateway;
use authn_resolver::IdentityResolver;
use authz_resolver::PermissionChecker;
use authz_resolver_sdk::PolicyStoreClient;
use clap::Parser;
use menu::{InMemoryMenuRepository, MenuRepository, MenuService, PgMenuRepository};
use menu_db::{DatabaseConfig, DatabaseDriver, DbProvider, InMemoryConnector, PgConnector};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat, LoggingConfig, PolicyStoreConfig};

/// Menu administration backend.
#[derive(Debug, Parser)]
#[command(name = "menu-server", version, about)]
struct Cli {
    /// YAML configuration file. Environment variables `MENU_<SECTION>__<KEY>`
    /// override its values.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration (secrets omitted) and exit.
    #[arg(long)]
    print_config: bool,
}

fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = match cfg.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}

fn build_policy_store(cfg: &PolicyStoreConfig) -> Result<Arc<dyn PolicyStoreClient>> {
    Ok(match cfg {
        PolicyStoreConfig::OpenFga(fga) => Arc::new(
            openfga_authz_plugin::Service::new(fga).context("invalid OpenFGA configuration")?,
        ),
        PolicyStoreConfig::Static(st) => {
            tracing::warn!("using the static in-memory policy store");
            Arc::new(static_authz_plugin::Service::from_config(st))
        }
    })
}

async fn build_repository(cfg: &DatabaseConfig) -> Result<Arc<dyn MenuRepository>> {
    tracing::info!(
        driver = cfg.driver.as_str(),
        connection = %cfg.redacted(),
        "configuring menu storage"
    );
    let repo: Arc<dyn MenuRepository> = match cfg.driver {
        DatabaseDriver::Memory => {
            tracing::warn!("menu data is kept in memory and lost on restart");
            let db = DbProvider::new(cfg.clone(), Arc::new(InMemoryConnector::new()));
            Arc::new(InMemoryMenuRepository::new(db))
        }
        DatabaseDriver::Postgres => {
            let connector = PgConnector::new(cfg.connect_timeout());
            let repo = PgMenuRepository::new(DbProvider::new(cfg.clone(), Arc::new(connector)));
            repo.migrate().await.context("failed to migrate the menu schema")?;
            Arc::new(repo)
        }
    };
    Ok(repo)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg.redacted_json())?);
        return Ok(());
    }

    init_logging(&cfg.logging);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = %cli
            .config
            .as_deref()
            .map_or_else(|| "<none>".to_owned(), |p| p.display().to_string()),
        "starting menu-server"
    );

    let store = build_policy_store(&cfg.policy_store)?;
    let permissions = PermissionChecker::new(store, &cfg.authz);
    let resolver = Arc::new(
        IdentityResolver::new(&cfg.authn).context("invalid identity configuration")?,
    );

    let repo = build_repository(&cfg.database).await?;
    let menu = MenuService::new(repo, permissions.clone());

    let gateway = ApiGateway::new(cfg.server.clone(), resolver, menu, permissions);
    gateway.serve(shutdown_signal()).await?;
    Ok(())
}
