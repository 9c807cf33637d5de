use {
  clap::Parser,
  crowdfund_node::RetryConfig,
  crowdfund_primitives::Amount,
  humantime::Duration,
  std::{net::SocketAddr, path::PathBuf},
};

/// Crowdfunding Local Devnode
///
/// Runs a notary, a fundraiser, a recipient, a number of donors and
/// observers in one process, starts a campaign and donates to it.
#[derive(Debug, Parser)]
pub struct SystemSettings {
  /// Network identifier
  #[clap(short, long,
    default_value = "localnet",
    value_name = "IDENTIFIER")]
  network_id: String,

  /// Number of donor nodes
  #[clap(long, short,
    default_value = "2",
    value_name = "COUNT")]
  donors: usize,

  /// Number of observer nodes that only receive broadcasts
  #[clap(long, short,
    default_value = "1",
    value_name = "COUNT")]
  observers: usize,

  /// Directory for persistent node storage, in-memory if omitted
  #[clap(long, value_name = "PATH")]
  data_dir: Option<PathBuf>,

  /// How many times to try reaching a node before giving up
  #[clap(long,
    default_value = "100",
    value_name = "COUNT")]
  connect_attempts: usize,

  /// Pause between connection attempts
  #[clap(long,
    default_value = "1s",
    value_name = "DURATION")]
  connect_delay: Duration,

  /// Name of the demo campaign
  #[clap(long, default_value = "Community garden")]
  campaign_name: String,

  /// Amount the demo campaign tries to raise
  #[clap(long,
    default_value = "1000 USD",
    value_name = "AMOUNT")]
  target: Amount,

  /// Time until the demo campaign closes
  #[clap(long,
    default_value = "1h",
    value_name = "DURATION")]
  campaign_duration: Duration,

  /// Amount every donor gives
  #[clap(long,
    default_value = "100 USD",
    value_name = "AMOUNT")]
  donation: Amount,

  /// Address for the prometheus metrics endpoint, disabled if omitted
  #[clap(long, value_name = "ADDRESS")]
  prometheus: Option<SocketAddr>,
}

impl SystemSettings {
  pub fn network_id(&self) -> &str {
    &self.network_id
  }

  pub fn donors(&self) -> usize {
    self.donors
  }

  pub fn observers(&self) -> usize {
    self.observers
  }

  pub fn data_dir(&self) -> Option<&PathBuf> {
    self.data_dir.as_ref()
  }

  pub fn retry(&self) -> RetryConfig {
    RetryConfig {
      attempts: self.connect_attempts,
      delay: self.connect_delay.into(),
    }
  }

  pub fn campaign_name(&self) -> &str {
    &self.campaign_name
  }

  pub fn target(&self) -> &Amount {
    &self.target
  }

  pub fn campaign_duration(&self) -> std::time::Duration {
    self.campaign_duration.into()
  }

  pub fn donation(&self) -> &Amount {
    &self.donation
  }

  pub fn prometheus(&self) -> Option<SocketAddr> {
    self.prometheus
  }
}
