use anyhow::{Context, Result};
use attemptviz::api::VizServer;
use attemptviz::config::{Config, PORT_ENV};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "attemptviz")]
#[command(about = "Serve discovery-pipeline attempts as an interactive graph", version)]
struct Args {
    /// Port to listen on (default 9876)
    #[arg(env = PORT_ENV)]
    port: Option<u16>,

    /// Directory containing the attempt_* folders
    #[arg(long, short = 'r')]
    results: Option<PathBuf>,

    /// Directory with the HTML visualizer (index.html)
    #[arg(long, short = 'w')]
    web: Option<PathBuf>,

    /// Directory with labels_<attempt>.json files
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,
}

/// Resolves on SIGINT or SIGTERM (ctrl-c elsewhere).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    log::info!("Shutdown signal received, stopping server");
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();

    log::info!("Starting Attemptviz v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::new(args.results, args.web, args.labels, args.host, args.port);
    config.validate().context("Invalid configuration")?;
    log::info!("Labels directory: {}", config.labels_dir().display());

    VizServer::new(config)
        .run(wait_for_shutdown_signal())
        .await
        .context("HTTP server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serialize tests that mutate the port environment variable.
    static PORT_ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_port_env(value: Option<&str>, f: impl FnOnce()) {
        let _lock = PORT_ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::var(PORT_ENV).ok();
        match value {
            Some(v) => std::env::set_var(PORT_ENV, v),
            None => std::env::remove_var(PORT_ENV),
        }
        f();
        std::env::remove_var(PORT_ENV);
        if let Some(v) = original {
            std::env::set_var(PORT_ENV, v);
        }
    }

    #[test]
    fn test_positional_port() {
        with_port_env(None, || {
            let args = Args::try_parse_from(["attemptviz", "8000"]).unwrap();
            assert_eq!(args.port, Some(8000));
        });
    }

    #[test]
    fn test_port_from_env() {
        with_port_env(Some("7000"), || {
            let args = Args::try_parse_from(["attemptviz"]).unwrap();
            assert_eq!(args.port, Some(7000));
        });
    }

    #[test]
    fn test_positional_port_beats_env() {
        with_port_env(Some("7000"), || {
            let args = Args::try_parse_from(["attemptviz", "8001"]).unwrap();
            assert_eq!(args.port, Some(8001));
        });
    }

    #[test]
    fn test_default_port_when_unset() {
        with_port_env(None, || {
            let args = Args::try_parse_from(["attemptviz"]).unwrap();
            assert_eq!(args.port, None);
            let config = Config::new(args.results, args.web, args.labels, args.host, args.port);
            assert_eq!(config.server.port, 9876);
        });
    }

    #[test]
    fn test_non_numeric_port_rejected() {
        with_port_env(None, || {
            assert!(Args::try_parse_from(["attemptviz", "abc"]).is_err());
        });
    }

    #[test]
    fn test_results_and_web_flags() {
        with_port_env(None, || {
            let args =
                Args::try_parse_from(["attemptviz", "--results", "/data/results", "-w", "/data/web"])
                    .unwrap();
            assert_eq!(args.results, Some(PathBuf::from("/data/results")));
            assert_eq!(args.web, Some(PathBuf::from("/data/web")));
        });
    }
}
