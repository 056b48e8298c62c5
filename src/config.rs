use anyhow::Result;
use std::path::{Path, PathBuf};

/// Port the visualizer listens on unless overridden
pub const DEFAULT_PORT: u16 = 9876;

/// Environment variable that may override the port
pub const PORT_ENV: &str = "ATTEMPTVIZ_PORT";

/// Main configuration structure, built once at startup and handed to the server
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub results: ResultsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
        }
    }
}

/// Where the pipeline output and the visualizer assets live
#[derive(Debug, Clone)]
pub struct ResultsConfig {
    /// Directory holding one `attempt_*` folder per research run.
    /// Also the root for static figure/report paths.
    pub results_root: PathBuf,
    /// Optional directory with the HTML visualizer; consulted when a static
    /// path is not found under `results_root`.
    pub web_root: Option<PathBuf>,
    /// Directory with `labels_<attempt>.json` evaluation files
    pub labels_dir: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_results_root() -> PathBuf {
    PathBuf::from("results")
}

/// Labels sit next to the results directory, not inside it.
fn default_labels_dir(results_root: &Path) -> PathBuf {
    match results_root.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join("human_labels"),
        _ => PathBuf::from("human_labels"),
    }
}

impl Config {
    /// Assemble a configuration from optional command-line values.
    ///
    /// Anything left unset falls back to the defaults: `./results`,
    /// `<results parent>/human_labels`, `127.0.0.1` and port 9876.
    pub fn new(
        results_root: Option<PathBuf>,
        web_root: Option<PathBuf>,
        labels_dir: Option<PathBuf>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Self {
        let results_root = results_root.unwrap_or_else(default_results_root);
        let labels_dir = labels_dir.unwrap_or_else(|| default_labels_dir(&results_root));

        Self {
            server: ServerConfig {
                host: host.unwrap_or_else(default_host),
                port: port.unwrap_or(DEFAULT_PORT),
            },
            results: ResultsConfig {
                results_root,
                web_root,
                labels_dir,
            },
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        let root = &self.results.results_root;
        if root.exists() && !root.is_dir() {
            anyhow::bail!(
                "results root must be a directory, not a file: {}",
                root.display()
            );
        }
        if !root.exists() {
            // Requests will answer 404 until the pipeline creates it.
            log::warn!("Results root does not exist yet: {}", root.display());
        }

        if let Some(web) = &self.results.web_root {
            if !web.is_dir() {
                anyhow::bail!("web root is not a directory: {}", web.display());
            }
        }

        Ok(())
    }

    /// Get the results root path
    pub fn results_root(&self) -> &Path {
        &self.results.results_root
    }

    /// Get the labels directory
    pub fn labels_dir(&self) -> &Path {
        &self.results.labels_dir
    }

    /// Address string the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
