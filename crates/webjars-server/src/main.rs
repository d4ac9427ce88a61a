//! webjars-server entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use webjars_config::{ConfigLoader, WebjarsConfig};
use webjars_server::{Server, ServerResult, WebjarsService};

const DEFAULT_CONFIG: &str = "webjars.toml";

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("webjars-server {}", webjars_server::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"webjars-server - serve library assets from webjar archives

USAGE:
    webjars-server [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
                           [default: ./webjars.toml if present]
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    WEBJARS__SERVER__HTTP_ADDR           Listen address (default: 0.0.0.0:8080)
    WEBJARS__SERVER__CONTEXT_PATH        Prefix stripped from request paths
    WEBJARS__ASSETS__SEARCH_PATH         ':'-separated archives and directories
    WEBJARS__DELIVERY__GZIP              Compress for gzip-capable clients
    WEBJARS__DELIVERY__ALLOW_CACHING     Allow client caching
    WEBJARS__TELEMETRY__LOGGING__LEVEL   Log filter (default: info)
    WEBJARS__TELEMETRY__METRICS__ENABLED Serve Prometheus metrics

EXAMPLES:
    webjars-server --config /etc/webjars/webjars.toml
    WEBJARS__ASSETS__SEARCH_PATH=lib/ webjars-server
"
    );
}

fn load_config(path: Option<PathBuf>) -> Result<WebjarsConfig, webjars_config::ConfigError> {
    let loader = ConfigLoader::new();
    let loader = match path {
        Some(path) => loader.with_file(path)?,
        None => loader.with_optional_file(DEFAULT_CONFIG)?,
    };
    loader.with_dotenv()?.with_env_prefix("WEBJARS").load()
}

async fn run(config: WebjarsConfig) -> ServerResult<()> {
    let service = WebjarsService::from_config(&config)?;
    info!(
        version = webjars_server::VERSION,
        assets = service.pipeline().index().len(),
        routes = service.pipeline().routes().len(),
        "starting webjars server"
    );
    Server::from_config(&config, service)?.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = webjars_telemetry::init_telemetry(&config.telemetry.to_telemetry_config()) {
        eprintln!("Failed to initialize telemetry: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
