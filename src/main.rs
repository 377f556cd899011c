//! CLI entry point for portfolio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio::config::SiteConfig;
use portfolio::Portfolio;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(version)]
#[command(about = "A portfolio and blog server with themes and htmx partials", long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the portfolio server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,

        /// Default theme
        #[arg(short, long)]
        theme: Option<String>,

        /// Serve assets from this directory instead of the embedded bundle
        #[arg(short, long)]
        assets_dir: Option<PathBuf>,
    },

    /// Start the latency ping server
    Ping {
        /// Port to listen on
        #[arg(short, long, default_value = "8081")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "0.0.0.0")]
        ip: String,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag, theme)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Print a post's fields and rendered HTML
    Show {
        slug: String,

        /// Print the markdown source instead of HTML
        #[arg(long)]
        raw: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "portfolio=debug,info"
    } else {
        "portfolio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = SiteConfig::load_or_default(cli.config.as_ref())?;

    match cli.command {
        Commands::Serve {
            port,
            ip,
            theme,
            assets_dir,
        } => {
            if port.is_some() || ip.is_some() {
                let (default_ip, default_port) = split_addr(&config.addr);
                let ip = ip.unwrap_or(default_ip);
                let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip.as_str() };
                config.addr = format!("{}:{}", bind_ip, port.unwrap_or(default_port));
            }
            if let Some(theme) = theme {
                config.default_theme = theme;
            }
            if assets_dir.is_some() {
                config.assets_dir = assets_dir;
            }
            config.validate()?;

            tracing::info!("Starting server at http://{}", config.addr);
            Portfolio::new(config).serve().await?;
        }

        Commands::Ping { port, ip } => {
            let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip.as_str() };
            let addr = format!("{}:{}", bind_ip, port);
            tracing::info!("Starting ping server at http://{}", addr);
            portfolio::ping::start(&addr).await?;
        }

        Commands::List { r#type } => {
            let site = Portfolio::new(config);
            portfolio::commands::list::run(&site, &r#type)?;
        }

        Commands::Show { slug, raw } => {
            let site = Portfolio::new(config);
            portfolio::commands::show::run(&site, &slug, raw)?;
        }

        Commands::Version => {
            println!("portfolio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Split "host:port", falling back to port 8080
fn split_addr(addr: &str) -> (String, u16) {
    match addr.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse().unwrap_or(8080)),
        None => (addr.to_string(), 8080),
    }
}
