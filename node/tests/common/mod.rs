#![allow(dead_code)]

use {
  crowdfund_network::Config,
  crowdfund_node::{
    CampaignProposal,
    Cluster,
    FlowError,
    ManualClock,
    Node,
    NodeConfig,
  },
  crowdfund_primitives::{Amount, Campaign, StateAndRef},
  std::{sync::Arc, time::Duration},
  time::{macros::datetime, OffsetDateTime},
};

pub fn now() -> OffsetDateTime {
  datetime!(2026-03-01 12:00 UTC)
}

pub fn usd(quantity: u64) -> Amount {
  Amount::new(quantity, "USD".parse().unwrap())
}

pub fn proposal(deadline: OffsetDateTime) -> CampaignProposal {
  CampaignProposal {
    name: "Community garden".to_owned(),
    target: usd(1000),
    recipient: "Recipient".to_owned(),
    deadline,
    category: "community".to_owned(),
    external_id: Some("garden-2026".to_owned()),
  }
}

/// A notary, a fundraiser, a recipient, donors and observers
/// all running on one network and sharing one manual clock.
pub struct TestNetwork {
  pub cluster: Cluster,
  pub clock: Arc<ManualClock>,
  pub notary: Node,
  pub fundraiser: Node,
  pub recipient: Node,
  pub donors: Vec<Node>,
  pub observers: Vec<Node>,
}

impl TestNetwork {
  /// Must be called from within a tokio runtime.
  pub fn start(donors: usize, observers: usize) -> anyhow::Result<Self> {
    let cluster = Cluster::new(Config {
      session_timeout: Duration::from_secs(2),
      ..Config::default()
    });
    let clock = Arc::new(ManualClock::new(now()));
    let start = |name: String| {
      cluster.start_node(NodeConfig::new(name).with_clock(clock.clone()))
    };

    Ok(Self {
      notary: cluster
        .start_node(NodeConfig::new("Notary").notary().with_clock(clock.clone()))?,
      fundraiser: start("Fundraiser".to_owned())?,
      recipient: start("Recipient".to_owned())?,
      donors: (1..=donors)
        .map(|i| start(format!("Donor{i}")))
        .collect::<Result<_, _>>()?,
      observers: (1..=observers)
        .map(|i| start(format!("Observer{i}")))
        .collect::<Result<_, _>>()?,
      clock,
      cluster,
    })
  }

  /// Starts a campaign with a deadline one day from now.
  pub async fn start_campaign(&self) -> Result<StateAndRef<Campaign>, FlowError> {
    self
      .fundraiser
      .rpc()
      .propose_campaign(proposal(now() + time::Duration::days(1)))
      .await
  }

  pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
    [&self.notary, &self.fundraiser, &self.recipient]
      .into_iter()
      .chain(self.donors.iter())
      .chain(self.observers.iter())
  }
}
