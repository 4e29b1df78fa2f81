use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmulatorError {
  #[error("Step Functions Local did not open port {port} within {timeout:?}")]
  StartupTimeout { port: u16, timeout: Duration },

  #[error("Step Functions Local exited before it was ready ({status})")]
  Exited { status: String },

  #[error("failed to spawn '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to download {url}: {source}")]
  Download {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("failed to download {url}: HTTP {status}")]
  DownloadStatus { url: String, status: u16 },

  #[error("failed to extract {}: {message}", archive.display())]
  Extract { archive: PathBuf, message: String },

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
}
