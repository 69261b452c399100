//! 边缘代理主程序入口

use clap::Parser;
use tracing::Level;

use lingua_edge::env::{EnvConfig, EnvVar};
use lingua_edge::web::{EdgeServer, WebConfig};

#[derive(Parser, Debug)]
#[command(
    name = "lingua-edge",
    version,
    about = "Edge proxy that serves a website translated by language path segment"
)]
struct Cli {
    /// Bind address [env: LINGUA_BIND_ADDRESS, default: 127.0.0.1]
    #[arg(short, long)]
    bind: Option<String>,

    /// Port number [env: LINGUA_PORT, default: 7080]
    #[arg(short, long)]
    port: Option<u16>,

    /// Origin base URL [env: LINGUA_ORIGIN_URL]
    #[arg(short, long)]
    origin: Option<String>,

    /// Print the supported environment variables and exit
    #[arg(long)]
    list_env: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if cli.list_env {
        print_env_help();
        return Ok(());
    }

    let env_config = EnvConfig::from_env()?;
    init_logging(&env_config);
    env_config.log_summary();

    let mut web_config = WebConfig::from_env_config(&env_config);
    if let Some(bind) = cli.bind {
        web_config.bind_addr = bind;
    }
    if let Some(port) = cli.port {
        web_config.port = port;
    }
    if let Some(origin) = cli.origin {
        web_config.origin_url = origin.trim_end_matches('/').to_string();
    }

    let server = EdgeServer::new(web_config);
    server.start().await?;

    Ok(())
}

fn init_logging(config: &EnvConfig) {
    let level = match config.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!config.no_color)
        .with_target(false)
        .init();
}

fn print_env_help() {
    use lingua_edge::env::{cache, core as general, service, web};

    let rows = [
        (service::ApiKey::NAME, service::ApiKey::DESCRIPTION),
        (service::ApiUrl::NAME, service::ApiUrl::DESCRIPTION),
        (service::TranslateTimeout::NAME, service::TranslateTimeout::DESCRIPTION),
        (cache::PageTtl::NAME, cache::PageTtl::DESCRIPTION),
        (cache::ConfigTtl::NAME, cache::ConfigTtl::DESCRIPTION),
        (cache::LanguagesTtl::NAME, cache::LanguagesTtl::DESCRIPTION),
        (web::BindAddress::NAME, web::BindAddress::DESCRIPTION),
        (web::Port::NAME, web::Port::DESCRIPTION),
        (web::OriginUrl::NAME, web::OriginUrl::DESCRIPTION),
        (general::LogLevel::NAME, general::LogLevel::DESCRIPTION),
        (general::NoColor::NAME, general::NoColor::DESCRIPTION),
    ];

    println!("ENVIRONMENT:");
    for (name, description) in rows {
        println!("    {:<30} {}", name, description);
    }
}
