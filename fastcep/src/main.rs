mod config;
mod logging;
mod statsd;

use clap::{Args, Parser};
use config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fastcep", about = "Resolves Brazilian postal codes (CEP) by racing two lookup providers")]
enum CliCommand {
    /// Serve lookups on the configured listener
    Run(ConfigArgs),
    /// Load and validate the configuration, then exit
    ValidateConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// YAML config file. Defaults apply when omitted; BRASILAPI_URL,
    /// VIACEP_URL, TIMEOUT and PORT override either.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    match cli {
        CliCommand::Run(args) => run(args),
        CliCommand::ValidateConfig(args) => validate_config(args),
    }
}

fn run(args: ConfigArgs) -> ExitCode {
    let Some((config, _sentry)) = load_config(&args) else {
        return ExitCode::FAILURE;
    };

    if let Some(metrics_config) = &config.common.metrics
        && let Err(e) = statsd::init(metrics_config)
    {
        tracing::error!("Failed to initialize metrics: {e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(cep_router::run(config.cep_router)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("cep-router error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_config(args: ConfigArgs) -> ExitCode {
    let Some((config, _sentry)) = load_config(&args) else {
        return ExitCode::FAILURE;
    };

    let router = &config.cep_router;
    println!("listener: {}:{}", router.listener.host, router.listener.port);
    if let Some(admin) = &router.admin_listener {
        println!("admin_listener: {}:{}", admin.host, admin.port);
    }
    println!("timeout: {:?}", router.timeout);
    println!("brasilapi: {}", router.upstreams.brasilapi);
    println!("viacep: {}", router.upstreams.viacep);
    println!("config ok");

    ExitCode::SUCCESS
}

/// Loads the file, starts logging, then applies environment overrides so
/// that warnings about ignored values are logged.
fn load_config(args: &ConfigArgs) -> Option<(Config, Option<sentry::ClientInitGuard>)> {
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return None;
        }
    };

    let sentry_guard = logging::init(config.common.logging.as_ref());

    if let Err(e) = config.finalize(|key| std::env::var(key).ok()) {
        tracing::error!("{e}");
        return None;
    }

    Some((config, sentry_guard))
}
