use std::time::Duration;

/// Network wide configuration shared by all endpoints.
#[derive(Debug, Clone)]
pub struct Config {
  /// Maximum size of one encoded message sent over a session.
  /// Larger payloads are rejected on the sending side.
  pub max_transmit_size: usize,

  /// How long a session waits for the next message from
  /// its counterparty before giving up.
  pub session_timeout: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      max_transmit_size: 64 * 1024, // 64KB
      session_timeout: Duration::from_secs(30),
    }
  }
}
