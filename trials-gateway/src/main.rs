use anyhow::Context;
use trials_gateway::{Gateway, GatewayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        r#"Trials Gateway - rate-limited, caching front for the ClinicalTrials.gov v2 API

USAGE:
    trials-gateway [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    HOST                Server host (default: 0.0.0.0)
    PORT                Server port (default: 8080)
    TRUSTED_PROXIES     Comma-separated proxy IPs whose X-Forwarded-For is honoured
    UPSTREAM_BASE_URL   Registry API root (default: https://clinicaltrials.gov/api/v2)
    RUST_LOG            Log level filter

EXAMPLES:
    # Run with defaults
    trials-gateway

    # Run with config file
    trials-gateway --config gateway.json

    # Run with custom port
    PORT=9000 trials-gateway
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trials_gateway=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            GatewayConfig::from_file(&path)?
        }
        None => {
            tracing::info!("Using default configuration");
            GatewayConfig::default()
        }
    };
    let config = config.apply_env_overrides()?;

    tracing::info!("Upstream registry: {}", config.upstream.base_url);
    tracing::info!(
        "Rate limit: {} requests burst, {} tokens/s refill",
        config.rate_limits.capacity,
        config.rate_limits.refill_per_second
    );
    tracing::info!("Response cache TTL: {}s", config.upstream.cache_ttl_secs);

    let gateway = Gateway::new(config).context("failed to initialise gateway")?;

    tracing::info!("Available endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/filtered-studies");
    tracing::info!("  GET  /api/filtered-studies/geo-bounds");
    tracing::info!("  GET  /api/sorted-studies/multiple-fields");
    tracing::info!("  GET  /api/enriched-studies/multi-conditions");
    tracing::info!("  GET  /api/studies/{{nct_id}}");
    tracing::info!("  GET  /api/study-results/participant-flow/{{nct_id}}");
    tracing::info!("  GET  /api/geo-stats, /api/time-stats");
    tracing::info!("  GET  /api/enrollment-insights, /api/enrollment-stats");
    tracing::info!("  GET  /api/enums, /api/search-areas, /api/stats/size, /api/stats/field/values");

    gateway.run().await.context("server error")
}
