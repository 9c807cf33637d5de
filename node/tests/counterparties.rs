mod common;

use {
  common::{now, usd, TestNetwork},
  crowdfund_node::{
    flows::{
      collect_signatures,
      identity_sync,
      messages::{Committed, Delivery, BROADCAST, DONATION},
      TIME_TOLERANCE,
    },
    FlowError,
    Node,
  },
  crowdfund_primitives::{
    Address,
    Campaign,
    CampaignCommand,
    Command,
    Donation,
    DonationCommand,
    SignedTransaction,
    StateAndRef,
    TimeWindow,
    TransactionBuilder,
  },
  std::collections::BTreeSet,
  time::{Duration, OffsetDateTime},
};

/// A donation proposed by `donor` with its legal key, with the
/// campaign's `raised` set to `raised_by` more than before and the
/// time window centered on `at`.
fn proposal(
  donor: &Node,
  prior: &StateAndRef<Campaign>,
  raised_by: u64,
  at: OffsetDateTime,
) -> anyhow::Result<SignedTransaction> {
  let hub = donor.hub();
  let campaign = &prior.state;
  let fundraiser = campaign.fundraiser.owning_key;
  let mut builder = TransactionBuilder::new(hub.notary_party()?);
  builder
    .add_input_state(prior)
    .add_output_state(campaign.with_raised(campaign.raised.checked_add(&usd(raised_by))?))
    .add_output_state(Donation::new(
      campaign.linear_id.clone(),
      campaign.fundraiser.clone(),
      hub.keys.legal_key(),
      usd(100),
    ))
    .add_command(Command::new(CampaignCommand::AcceptDonation, [fundraiser]))
    .add_command(Command::new(DonationCommand::Create, [
      hub.keys.legal_key(),
      fundraiser,
    ]))
    .set_time_window(TimeWindow::with_tolerance(at, TIME_TOLERANCE));

  let tx = builder.to_wire_transaction();
  let signature = hub.keys.sign_as_party(tx.id());
  Ok(SignedTransaction::new(tx, vec![signature]))
}

/// Sends a candidate to the fundraiser the way a donor would,
/// without checking it locally first.
async fn ask_fundraiser(
  net: &TestNetwork,
  stx: SignedTransaction,
  expected: BTreeSet<Address>,
) -> Result<SignedTransaction, FlowError> {
  let donor = net.donors[0].hub();
  let mut session = donor.initiate(net.fundraiser.party(), DONATION)?;
  identity_sync::send(donor, &mut session, &stx.tx).await?;
  let dependencies = donor.dependencies(&stx.tx)?;
  collect_signatures(&mut session, stx, dependencies, &expected).await
}

fn assert_untouched(net: &TestNetwork, campaign: &StateAndRef<Campaign>) {
  for node in [&net.fundraiser, &net.donors[0]] {
    let rpc = node.rpc();
    assert_eq!(rpc.campaign(&campaign.state.linear_id).as_ref(), Some(campaign));
    assert!(rpc.donations().is_empty());
  }
}

#[tokio::test]
async fn fundraiser_rejects_wrong_raised_amount() -> anyhow::Result<()> {
  let net = TestNetwork::start(1, 0)?;
  let campaign = net.start_campaign().await?;
  let stx = proposal(&net.donors[0], &campaign, 150, now())?;
  let fundraiser = BTreeSet::from([net.fundraiser.party().owning_key]);

  match ask_fundraiser(&net, stx, fundraiser).await {
    Err(FlowError::CounterpartyRejected { party, reason }) => {
      assert_eq!(party, "Fundraiser");
      assert!(reason.contains("raised must grow by exactly the donated amount"));
    }
    other => anyhow::bail!("expected a rejection, got {other:?}"),
  }
  assert_untouched(&net, &campaign);
  Ok(())
}

#[tokio::test]
async fn fundraiser_rejects_donations_past_the_deadline() -> anyhow::Result<()> {
  let net = TestNetwork::start(1, 0)?;
  let campaign = net.start_campaign().await?;
  let late = campaign.state.deadline + Duration::hours(1);
  let stx = proposal(&net.donors[0], &campaign, 100, late)?;
  let fundraiser = BTreeSet::from([net.fundraiser.party().owning_key]);

  let error = ask_fundraiser(&net, stx, fundraiser)
    .await
    .expect_err("late donation signed");
  assert!(error.is_rejection());
  assert!(error.to_string().contains("deadline exceeded"));
  assert_untouched(&net, &campaign);
  Ok(())
}

#[tokio::test]
async fn signatures_by_unexpected_keys_are_refused() -> anyhow::Result<()> {
  let net = TestNetwork::start(1, 0)?;
  let campaign = net.start_campaign().await?;
  let stx = proposal(&net.donors[0], &campaign, 100, now())?;

  // a valid candidate, but the fundraiser is not who we expect to sign
  let expected = BTreeSet::from([net.recipient.party().owning_key]);
  let result = ask_fundraiser(&net, stx, expected).await;

  assert!(matches!(
    result,
    Err(FlowError::Protocol { ref details, .. }) if details.contains("unexpected signature")
  ));
  assert_untouched(&net, &campaign);
  Ok(())
}

#[tokio::test]
async fn observers_refuse_unsigned_transactions() -> anyhow::Result<()> {
  let net = TestNetwork::start(1, 1)?;
  let campaign = net.start_campaign().await?;
  let signed = proposal(&net.donors[0], &campaign, 100, now())?;
  let unsigned = SignedTransaction::new(signed.tx, vec![]);

  let donor = net.donors[0].hub();
  let observer = &net.observers[0];
  let mut session = donor.initiate(observer.party(), BROADCAST)?;
  let reply: Delivery = session
    .send_and_receive(&Committed {
      stx: unsigned,
      dependencies: vec![],
    })
    .await?;

  assert!(matches!(reply, Delivery::Rejected(_)));
  let rpc = observer.rpc();
  assert_eq!(rpc.campaign(&campaign.state.linear_id).as_ref(), Some(&campaign));
  assert!(rpc.donations().is_empty());
  Ok(())
}
