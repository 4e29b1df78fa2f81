use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::config::{EmulatorConfig, JAR_NAME};
use crate::error::EmulatorError;

const ARCHIVE_NAME: &str = "StepFunctionsLocal.zip";

/// Make sure the Step Functions Local distribution is present.
///
/// Returns `false` when the jar already exists and nothing was downloaded.
pub async fn install(config: &EmulatorConfig) -> Result<bool, EmulatorError> {
  let jar = config.jar_path();
  if fs::try_exists(&jar).await? {
    debug!(jar = %jar.display(), "Step Functions Local already installed");
    return Ok(false);
  }

  info!(
    url = %config.download_url,
    dir = %config.install_dir.display(),
    "installing Step Functions Local"
  );
  fs::create_dir_all(&config.install_dir).await?;

  let archive = config.install_dir.join(ARCHIVE_NAME);
  download(&config.download_url, &archive).await?;
  extract(&archive, &config.install_dir).await?;
  fs::remove_file(&archive).await?;

  if !fs::try_exists(&jar).await? {
    return Err(EmulatorError::Extract {
      archive,
      message: format!("archive does not contain {}", JAR_NAME),
    });
  }

  info!(jar = %jar.display(), "Step Functions Local installed");
  Ok(true)
}

async fn download(url: &str, dest: &Path) -> Result<(), EmulatorError> {
  let response = reqwest::get(url)
    .await
    .map_err(|source| EmulatorError::Download {
      url: url.to_string(),
      source,
    })?;

  if !response.status().is_success() {
    return Err(EmulatorError::DownloadStatus {
      url: url.to_string(),
      status: response.status().as_u16(),
    });
  }

  let bytes = response
    .bytes()
    .await
    .map_err(|source| EmulatorError::Download {
      url: url.to_string(),
      source,
    })?;

  fs::write(dest, &bytes).await?;
  debug!(bytes = bytes.len(), dest = %dest.display(), "downloaded archive");
  Ok(())
}

async fn extract(archive: &Path, dest: &Path) -> Result<(), EmulatorError> {
  let archive = archive.to_path_buf();
  let dest = dest.to_path_buf();
  tokio::task::spawn_blocking(move || unzip(&archive, &dest))
    .await
    .map_err(std::io::Error::other)?
}

fn unzip(archive: &Path, dest: &Path) -> Result<(), EmulatorError> {
  let extract_error = |err: zip::result::ZipError| EmulatorError::Extract {
    archive: archive.to_path_buf(),
    message: err.to_string(),
  };

  let file = std::fs::File::open(archive)?;
  let mut zip = zip::ZipArchive::new(file).map_err(extract_error)?;
  zip.extract(dest).map_err(extract_error)?;
  debug!(entries = zip.len(), dest = %dest.display(), "extracted archive");
  Ok(())
}
