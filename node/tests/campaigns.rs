mod common;

use {
  common::{now, proposal, usd, TestNetwork},
  crowdfund_node::FlowError,
  time::Duration,
};

#[tokio::test]
async fn started_campaign_reaches_every_node() -> anyhow::Result<()> {
  let net = TestNetwork::start(2, 2)?;
  let campaign = net.start_campaign().await?;

  assert_eq!(campaign.state.raised, usd(0));
  assert_eq!(campaign.state.fundraiser, *net.fundraiser.party());
  assert_eq!(campaign.state.recipient, *net.recipient.party());

  for node in net.all_nodes().filter(|n| n.party() != net.notary.party()) {
    let seen = node
      .rpc()
      .campaign(&campaign.state.linear_id)
      .ok_or_else(|| anyhow::anyhow!("{} has no campaign", node.party()))?;
    assert_eq!(seen, campaign);
  }

  // the notary is neither a participant nor an observer
  assert!(net.notary.rpc().campaigns().is_empty());
  Ok(())
}

#[tokio::test]
async fn campaigns_are_found_by_external_id() -> anyhow::Result<()> {
  let net = TestNetwork::start(1, 0)?;
  let campaign = net.start_campaign().await?;

  let found = net.donors[0].rpc().campaign_by_external_id("garden-2026");
  assert_eq!(found, Some(campaign));
  assert!(net.donors[0]
    .rpc()
    .campaign_by_external_id("unknown")
    .is_none());
  Ok(())
}

#[tokio::test]
async fn campaign_with_past_deadline_is_rejected() -> anyhow::Result<()> {
  let net = TestNetwork::start(1, 1)?;
  let result = net
    .fundraiser
    .rpc()
    .propose_campaign(proposal(now() - Duration::hours(1)))
    .await;

  let error = result.expect_err("campaign should be rejected");
  assert!(error.is_rejection());
  assert!(!error.is_conflict());
  for node in net.all_nodes() {
    assert!(node.rpc().campaigns().is_empty());
  }
  Ok(())
}

#[tokio::test]
async fn recipient_must_be_on_the_network() -> anyhow::Result<()> {
  let net = TestNetwork::start(0, 0)?;
  let mut request = proposal(now() + Duration::days(1));
  request.recipient = "Nobody".to_owned();

  let result = net.fundraiser.rpc().propose_campaign(request).await;
  assert!(matches!(result, Err(FlowError::UnknownParty(name)) if name == "Nobody"));
  Ok(())
}

#[tokio::test]
async fn network_snapshot_lists_all_nodes() -> anyhow::Result<()> {
  let net = TestNetwork::start(2, 1)?;
  let snapshot = net.observers[0].rpc().network_snapshot();

  assert_eq!(snapshot.len(), 6);
  let notaries: Vec<_> = snapshot.iter().filter(|n| n.notary).collect();
  assert_eq!(notaries.len(), 1);
  assert_eq!(notaries[0].party, *net.notary.party());
  Ok(())
}
