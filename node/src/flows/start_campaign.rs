use {
  super::{
    broadcast::broadcast_transaction,
    finality::finalise,
    Progress,
    Step,
    TIME_TOLERANCE,
  },
  crate::{FlowError, ServiceHub},
  crowdfund_primitives::{
    Campaign,
    CampaignCommand,
    Command,
    SignedTransaction,
    TimeWindow,
    ToBase58String,
    TransactionBuilder,
  },
  std::collections::BTreeSet,
  tracing::{info, warn},
};

/// Starts a new campaign with this node as the fundraiser.
///
/// The campaign is committed with the fundraiser's signature alone,
/// then sent to every other node on the network so that donors can
/// find it in their vaults.
pub struct StartCampaign {
  campaign: Campaign,
}

impl StartCampaign {
  pub const NAME: &'static str = "StartCampaign";

  pub fn new(campaign: Campaign) -> Self {
    Self { campaign }
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
    let notary = hub.notary_party()?;
    let mut builder = TransactionBuilder::new(notary.clone());
    builder
      .add_output_state(self.campaign)
      .add_command(Command::new(CampaignCommand::Start, [hub.keys.legal_key()]))
      .set_time_window(TimeWindow::with_tolerance(hub.now(), TIME_TOLERANCE));

    let tx = builder.to_wire_transaction();
    hub.verify(&tx)?;

    let signature = hub.keys.sign_as_party(tx.id());
    let stx = SignedTransaction::new(tx, vec![signature]);
    progress.advance(Step::LocallySigned)?;

    stx.verify_signatures_except(&BTreeSet::from([notary.owning_key]))?;
    progress.advance(Step::FullySigned)?;

    let stx = finalise(hub, stx, &[]).await?;
    progress.advance(Step::Finalized)?;

    // committed, observers that miss the campaign do not undo it
    progress.advance(Step::Broadcast)?;
    match broadcast_transaction(hub, &stx).await {
      Ok(outcomes) => info!(
        tx = %stx.id().to_b58(),
        "campaign delivered to {} of {} observers",
        outcomes.iter().filter(|o| o.result.is_ok()).count(),
        outcomes.len()
      ),
      Err(e) => warn!(
        tx = %stx.id().to_b58(),
        "campaign committed but not broadcast: {e}"
      ),
    }

    progress.advance(Step::Done)?;
    Ok(stx)
  }
}
