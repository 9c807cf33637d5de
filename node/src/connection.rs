use {std::time::Duration, thiserror::Error};

/// How long a client keeps trying to reach a node before giving up.
#[derive(Debug, Clone)]
pub struct RetryConfig {
  pub attempts: usize,
  pub delay: Duration,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      attempts: 100,
      delay: Duration::from_secs(1),
    }
  }
}

#[derive(Debug, Error)]
pub enum ConnectionError {
  #[error("Node {node} not reachable after {attempts} attempts")]
  RetriesExhausted { node: String, attempts: usize },
}
