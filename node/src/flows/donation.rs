use {
  super::{
    broadcast::broadcast_transaction,
    collect::{collect_signatures, sign_transaction},
    finality::finalise,
    identity_sync,
    messages::{Ack, BroadcastRequest, DONATION},
    Progress,
    Step,
    TIME_TOLERANCE,
  },
  crate::{FlowError, ServiceHub},
  crowdfund_network::Session,
  crowdfund_primitives::{
    Amount,
    CampaignCommand,
    Command,
    Donation,
    DonationCommand,
    SignedTransaction,
    TimeWindow,
    ToBase58String,
    TransactionBuilder,
    UniqueIdentifier,
  },
  std::collections::BTreeSet,
  tracing::{info, warn},
};

/// Donates to a campaign found in this node's vault.
///
/// The donor consumes the latest campaign version it knows of and
/// produces the updated campaign along with a new donation. The
/// fundraiser counter-signs after running the same validation.
/// Donating against a stale version fails at the notary with a
/// conflict, the flow never retries on its own.
pub struct MakeDonation {
  campaign: UniqueIdentifier,
  amount: Amount,
  broadcast: bool,
  anonymous: bool,
}

impl MakeDonation {
  pub const NAME: &'static str = "MakeDonation";

  pub fn new(campaign: UniqueIdentifier, amount: Amount, broadcast: bool) -> Self {
    Self {
      campaign,
      amount,
      broadcast,
      anonymous: true,
    }
  }

  /// Sign with the node's legal key instead of a fresh key.
  pub fn with_anonymous_donor(mut self, anonymous: bool) -> Self {
    self.anonymous = anonymous;
    self
  }

  pub async fn run(self, hub: &ServiceHub) -> Result<SignedTransaction, FlowError> {
    let mut progress = Progress::new(Self::NAME);
    let result = self.execute(hub, &mut progress).await;
    if let Err(e) = &result {
      progress.abort(e);
    }
    result
  }

  async fn execute(
    self,
    hub: &ServiceHub,
    progress: &mut Progress,
  ) -> Result<SignedTransaction, FlowError> {
    let prior = hub
      .vault
      .campaign(&self.campaign)
      .ok_or_else(|| FlowError::CampaignNotFound(self.campaign.clone()))?;
    let campaign = &prior.state;
    let fundraiser = campaign.fundraiser.clone();
    let notary = hub.notary_party()?;

    let donor = match self.anonymous {
      true => hub.keys.fresh_key(),
      false => hub.keys.legal_key(),
    };

    let raised = campaign.raised.checked_add(&self.amount)?;
    let mut builder = TransactionBuilder::new(notary.clone());
    builder
      .add_input_state(&prior)
      .add_output_state(campaign.with_raised(raised))
      .add_output_state(Donation::new(
        campaign.linear_id.clone(),
        fundraiser.clone(),
        donor,
        self.amount.clone(),
      ))
      .add_command(Command::new(CampaignCommand::AcceptDonation, [
        fundraiser.owning_key,
      ]))
      .add_command(Command::new(DonationCommand::Create, [
        donor,
        fundraiser.owning_key,
      ]))
      .set_time_window(TimeWindow::with_tolerance(hub.now(), TIME_TOLERANCE));

    let tx = builder.to_wire_transaction();
    hub.verify(&tx)?;

    let signature = hub.keys.sign(tx.id(), &donor)?;
    let stx = SignedTransaction::new(tx, vec![signature]);
    progress.advance(Step::LocallySigned)?;

    let mut session = hub.initiate(&fundraiser, DONATION)?;
    identity_sync::send(hub, &mut session, &stx.tx).await?;
    progress.advance(Step::IdentitiesSynced)?;

    progress.advance(Step::AwaitingCounterSignatures)?;
    let dependencies = hub.dependencies(&stx.tx)?;
    let stx = collect_signatures(
      &mut session,
      stx,
      dependencies.clone(),
      &BTreeSet::from([fundraiser.owning_key]),
    )
    .await?;

    stx.verify_signatures_except(&BTreeSet::from([notary.owning_key]))?;
    progress.advance(Step::FullySigned)?;

    let stx = finalise(hub, stx, &dependencies).await?;
    progress.advance(Step::Finalized)?;

    if self.broadcast {
      progress.advance(Step::Broadcast)?;
    }

    // the transaction is final at this point, the fundraiser failing
    // to relay it to observers is reported but does not fail the flow.
    let relayed = session
      .send_and_receive::<_, Ack>(&BroadcastRequest(self.broadcast))
      .await;
    if let Err(e) = relayed {
      warn!(
        "{} did not confirm the end of donation {}: {e}",
        fundraiser,
        stx.id().to_b58()
      );
    }

    progress.advance(Step::Done)?;
    info!(
      tx = %stx.id().to_b58(),
      "donated {} to campaign {}",
      self.amount,
      self.campaign
    );
    Ok(stx)
  }
}

/// Fundraiser side of a donation.
///
/// Learns the donor's identity, counter-signs after validating the
/// candidate and, if the donor asks for it, relays the committed
/// transaction to observers once it shows up in the vault.
pub async fn respond_to_donation(
  hub: &ServiceHub,
  mut session: Session,
) -> Result<(), FlowError> {
  identity_sync::receive(hub, &mut session).await?;
  let stx = sign_transaction(hub, &mut session).await?;
  let id = *stx.id();

  let BroadcastRequest(broadcast) = session.receive().await?;
  if broadcast {
    let committed =
      tokio::time::timeout(hub.session_timeout, hub.vault.await_transaction(id))
        .await
        .map_err(|_| FlowError::CommitTimeout(id.to_b58()))?
        .map_err(|_| FlowError::CommitTimeout(id.to_b58()))?;
    broadcast_transaction(hub, &committed).await?;
  }

  session.send(&Ack)?;
  Ok(())
}
