//! Installing the Step Functions Local distribution.

use std::io::Write;

use sfn_local_emulator::{EmulatorConfig, EmulatorError, JAR_NAME, install};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_existing_jar_skips_download() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(dir.path().join(JAR_NAME), b"jar").unwrap();

  let mut config = EmulatorConfig::new(dir.path(), "us-east-1");
  config.download_url = "http://127.0.0.1:1/unreachable.zip".to_string();

  assert!(!install(&config).await.unwrap());
}

#[tokio::test]
async fn test_download_failure_is_reported() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/StepFunctionsLocal.zip"))
    .respond_with(ResponseTemplate::new(404))
    .expect(1)
    .mount(&server)
    .await;

  let dir = tempfile::tempdir().unwrap();
  let mut config = EmulatorConfig::new(dir.path().join("sfn"), "us-east-1");
  config.download_url = format!("{}/StepFunctionsLocal.zip", server.uri());

  let err = install(&config).await.unwrap_err();
  assert!(matches!(err, EmulatorError::DownloadStatus { status: 404, .. }));
  assert!(!config.jar_path().exists());
}

#[tokio::test]
async fn test_corrupt_archive_fails_extraction() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a zip".to_vec()))
    .mount(&server)
    .await;

  let dir = tempfile::tempdir().unwrap();
  let mut config = EmulatorConfig::new(dir.path(), "us-east-1");
  config.download_url = format!("{}/StepFunctionsLocal.zip", server.uri());

  let err = install(&config).await.unwrap_err();
  assert!(matches!(err, EmulatorError::Extract { .. }));
  assert!(!config.jar_path().exists());
}

fn distribution() -> Vec<u8> {
  let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
  let options = zip::write::SimpleFileOptions::default();
  writer.start_file(JAR_NAME, options).unwrap();
  writer.write_all(b"jar").unwrap();
  writer.start_file("README.txt", options).unwrap();
  writer.write_all(b"Step Functions Local").unwrap();
  writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_downloads_and_extracts_distribution() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/StepFunctionsLocal.zip"))
    .respond_with(ResponseTemplate::new(200).set_body_bytes(distribution()))
    .expect(1)
    .mount(&server)
    .await;

  let dir = tempfile::tempdir().unwrap();
  let mut config = EmulatorConfig::new(dir.path().join("sfn"), "us-east-1");
  config.download_url = format!("{}/StepFunctionsLocal.zip", server.uri());

  assert!(install(&config).await.unwrap());
  assert_eq!(std::fs::read(config.jar_path()).unwrap(), b"jar");
  assert!(config.install_dir.join("README.txt").exists());
  assert!(!config.install_dir.join("StepFunctionsLocal.zip").exists());

  // second run finds the jar and skips the download
  assert!(!install(&config).await.unwrap());
}

#[tokio::test]
async fn test_archive_without_jar_is_rejected() {
  let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
  writer
    .start_file("other.txt", zip::write::SimpleFileOptions::default())
    .unwrap();
  writer.write_all(b"nothing").unwrap();
  let archive = writer.finish().unwrap().into_inner();

  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
    .mount(&server)
    .await;

  let dir = tempfile::tempdir().unwrap();
  let mut config = EmulatorConfig::new(dir.path(), "us-east-1");
  config.download_url = format!("{}/StepFunctionsLocal.zip", server.uri());

  let err = install(&config).await.unwrap_err();
  assert!(matches!(err, EmulatorError::Extract { message, .. } if message.contains(JAR_NAME)));
}
