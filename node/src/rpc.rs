use {
  crate::{
    connection::{ConnectionError, RetryConfig},
    flows::{MakeDonation, StartCampaign},
    network_map::NodeInfo,
    node::NodeRegistry,
    FlowError,
    ServiceHub,
  },
  crowdfund_primitives::{
    Amount,
    Campaign,
    Donation,
    SignedTransaction,
    StateAndRef,
    StateKind,
    ToBase58String,
    UniqueIdentifier,
  },
  serde::{Deserialize, Serialize},
  std::sync::Arc,
  time::OffsetDateTime,
  tracing::{debug, info},
};

/// A request to start a new campaign.
///
/// The fundraiser is always the node the proposal is sent to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignProposal {
  pub name: String,
  pub target: Amount,
  pub recipient: String,
  pub deadline: OffsetDateTime,
  pub category: String,
  pub external_id: Option<String>,
}

/// A request to donate to an existing campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationProposal {
  pub campaign_id: UniqueIdentifier,
  pub amount: Amount,
  pub broadcast: bool,
}

/// Client handle to a running node.
#[derive(Clone)]
pub struct CrowdfundRpc {
  hub: Arc<ServiceHub>,
}

impl CrowdfundRpc {
  pub(crate) fn new(hub: Arc<ServiceHub>) -> Self {
    Self { hub }
  }

  /// Waits for a node to come up, polling the registry
  /// at most `retry.attempts` times.
  pub async fn connect(
    registry: &NodeRegistry,
    node: &str,
    retry: &RetryConfig,
  ) -> Result<Self, ConnectionError> {
    for attempt in 1..=retry.attempts {
      if let Some(hub) = registry.get(node) {
        info!("connected to {node} after {attempt} attempt(s)");
        return Ok(Self::new(hub));
      }
      debug!("{node} is not up yet, attempt {attempt} of {}", retry.attempts);
      if attempt < retry.attempts {
        tokio::time::sleep(retry.delay).await;
      }
    }
    Err(ConnectionError::RetriesExhausted {
      node: node.to_owned(),
      attempts: retry.attempts,
    })
  }

  pub fn hub(&self) -> &Arc<ServiceHub> {
    &self.hub
  }

  pub async fn propose_campaign(
    &self,
    proposal: CampaignProposal,
  ) -> Result<StateAndRef<Campaign>, FlowError> {
    let recipient = self
      .hub
      .network_map
      .party_by_name(&proposal.recipient)
      .ok_or(FlowError::UnknownParty(proposal.recipient))?;

    let campaign = Campaign::new(
      proposal.name,
      proposal.target,
      self.hub.party().clone(),
      recipient,
      proposal.deadline,
      proposal.category,
      proposal.external_id,
    );

    let stx = StartCampaign::new(campaign).run(&self.hub).await?;
    committed_output(&stx)
  }

  pub async fn propose_donation(
    &self,
    proposal: DonationProposal,
  ) -> Result<StateAndRef<Donation>, FlowError> {
    let stx =
      MakeDonation::new(proposal.campaign_id, proposal.amount, proposal.broadcast)
        .run(&self.hub)
        .await?;
    committed_output(&stx)
  }

  pub fn campaigns(&self) -> Vec<StateAndRef<Campaign>> {
    self.hub.vault.campaigns()
  }

  pub fn campaign(&self, id: &UniqueIdentifier) -> Option<StateAndRef<Campaign>> {
    self.hub.vault.campaign(id)
  }

  pub fn campaign_by_external_id(
    &self,
    external_id: &str,
  ) -> Option<StateAndRef<Campaign>> {
    self.hub.vault.campaign_by_external_id(external_id)
  }

  pub fn donations(&self) -> Vec<StateAndRef<Donation>> {
    self.hub.vault.donations()
  }

  pub fn network_snapshot(&self) -> Vec<NodeInfo> {
    self.hub.network_map.all_nodes()
  }
}

/// First output of type `T` of a committed transaction.
fn committed_output<T: StateKind>(
  stx: &SignedTransaction,
) -> Result<StateAndRef<T>, FlowError> {
  (0..stx.tx.outputs.len())
    .filter_map(|index| stx.tx.out_ref(index))
    .find_map(|output| output.downcast::<T>())
    .ok_or_else(|| FlowError::MissingOutput(stx.id().to_b58()))
}
