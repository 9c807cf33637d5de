use {
  crowdfund_network::{Config, Network},
  std::time::Duration,
};

/// A network with a short session timeout so that
/// tests exercising timeouts finish quickly.
pub fn fast_network() -> Network {
  Network::new(Config {
    session_timeout: Duration::from_millis(200),
    ..Config::default()
  })
}
