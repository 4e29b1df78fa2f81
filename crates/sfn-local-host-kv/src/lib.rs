use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

/// Trait for the store that receives published state machine identifiers.
///
/// The synchronizer writes one entry per registered state machine and the
/// shutdown hook deletes them again. Hosts read the entries back to hand them to
/// local functions, e.g. as environment variables.
///
/// This trait is async to support networked backends.
pub trait KvStore: Send + Sync {
  /// Get a value by key.
  fn get(&self, key: &str) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>>;

  /// Set a value.
  fn set(&mut self, key: &str, value: String) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

  /// Delete a value.
  fn delete(&mut self, key: &str) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

  /// All entries, ordered by key.
  fn entries(&self) -> Pin<Box<dyn Future<Output = Vec<(String, String)>> + Send + '_>>;
}

/// In-memory KV store implementation.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKvStore {
  data: BTreeMap<String, String>,
}

impl InMemoryKvStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Render the entries as `KEY=VALUE` lines.
  pub fn to_env_lines(&self) -> String {
    self
      .data
      .iter()
      .map(|(key, value)| format!("{}={}\n", key, value))
      .collect()
  }
}

impl KvStore for InMemoryKvStore {
  fn get(&self, key: &str) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
    let value = self.data.get(key).cloned();
    Box::pin(async move { value })
  }

  fn set(&mut self, key: &str, value: String) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
    self.data.insert(key.to_string(), value);
    Box::pin(async {})
  }

  fn delete(&mut self, key: &str) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
    self.data.remove(key);
    Box::pin(async {})
  }

  fn entries(&self) -> Pin<Box<dyn Future<Output = Vec<(String, String)>> + Send + '_>> {
    let entries = self
      .data
      .iter()
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect();
    Box::pin(async move { entries })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_in_memory_kv_store() {
    let mut store = InMemoryKvStore::new();

    assert_eq!(store.get("key").await, None);

    store.set("key", "value".to_string()).await;
    assert_eq!(store.get("key").await, Some("value".to_string()));

    store.set("key", "updated".to_string()).await;
    assert_eq!(store.get("key").await, Some("updated".to_string()));

    store.delete("key").await;
    assert_eq!(store.get("key").await, None);
  }

  #[tokio::test]
  async fn test_entries_are_ordered() {
    let mut store = InMemoryKvStore::new();
    store.set("B", "2".to_string()).await;
    store.set("A", "1".to_string()).await;

    assert_eq!(
      store.entries().await,
      vec![
        ("A".to_string(), "1".to_string()),
        ("B".to_string(), "2".to_string())
      ]
    );
    assert_eq!(store.to_env_lines(), "A=1\nB=2\n");
    assert_eq!(store.len(), 2);
  }
}
