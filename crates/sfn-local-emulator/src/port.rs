use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::EmulatorError;

/// Poll `127.0.0.1:port` until a TCP connection succeeds.
pub async fn wait_for_port(
  port: u16,
  poll_interval: Duration,
  timeout: Duration,
) -> Result<(), EmulatorError> {
  let deadline = Instant::now() + timeout;

  loop {
    if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
      debug!(port, "port is accepting connections");
      return Ok(());
    }
    if Instant::now() + poll_interval > deadline {
      return Err(EmulatorError::StartupTimeout { port, timeout });
    }
    sleep(poll_interval).await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::net::TcpListener;

  #[tokio::test]
  async fn test_open_port_is_ready() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    wait_for_port(port, Duration::from_millis(10), Duration::from_secs(1))
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn test_port_opened_later() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let opener = tokio::spawn(async move {
      sleep(Duration::from_millis(100)).await;
      TcpListener::bind(("127.0.0.1", port)).await.unwrap()
    });

    wait_for_port(port, Duration::from_millis(20), Duration::from_secs(5))
      .await
      .unwrap();
    drop(opener.await.unwrap());
  }

  #[tokio::test]
  async fn test_closed_port_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = wait_for_port(port, Duration::from_millis(20), Duration::from_millis(150)).await;
    assert!(matches!(result, Err(EmulatorError::StartupTimeout { port: p, .. }) if p == port));
  }
}
