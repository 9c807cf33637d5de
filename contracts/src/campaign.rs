use {
  crate::{require_single_command, require_that, Contract, Violation},
  crowdfund_primitives::{
    Address,
    Amount,
    Campaign,
    CampaignCommand,
    CommandData,
    ContractId,
    Donation,
    LedgerTransaction,
  },
  std::collections::BTreeSet,
  time::OffsetDateTime,
};

/// Governs the lifecycle of [`Campaign`] states.
#[derive(Debug, Default, Clone, Copy)]
pub struct CampaignContract;

impl Contract for CampaignContract {
  const ID: ContractId = ContractId::Campaign;

  fn verify(
    &self,
    tx: &LedgerTransaction,
    now: OffsetDateTime,
  ) -> Result<(), Violation> {
    let command = require_single_command(tx, Self::ID)?;
    let signers = command.signer_set();

    match command.value {
      CommandData::Campaign(CampaignCommand::Start) => {
        verify_start(tx, &signers, now)
      }
      CommandData::Campaign(CampaignCommand::AcceptDonation) => {
        verify_donation(tx, &signers)
      }
      CommandData::Campaign(CampaignCommand::End) => {
        Err(Violation::UnrecognizedCommand)
      }
      CommandData::Donation(_) => Err(Violation::UnrecognizedCommand),
    }
  }
}

fn verify_start(
  tx: &LedgerTransaction,
  signers: &BTreeSet<Address>,
  now: OffsetDateTime,
) -> Result<(), Violation> {
  require_that(&[
    (Violation::CreationConsumesInputs, tx.inputs.is_empty()),
    (Violation::CreationOutputCount, tx.outputs.len() == 1),
  ])?;

  let campaign = match tx.outputs_of::<Campaign>().as_slice() {
    [campaign] => *campaign,
    _ => return Err(Violation::CreationOutputCount),
  };

  // all parties that see the same time window agree on this instant
  let reference = tx
    .time_window
    .and_then(|window| window.midpoint())
    .unwrap_or(now);

  require_that(&[
    (Violation::TargetNotPositive, campaign.target.is_positive()),
    (
      Violation::RaisedNotZero,
      campaign.raised == Amount::zero(campaign.target.token.clone()),
    ),
    (Violation::DeadlineNotFuture, campaign.deadline > reference),
    (Violation::NameEmpty, !campaign.name.is_empty()),
    (
      Violation::WrongSignerSet,
      *signers == BTreeSet::from([campaign.fundraiser.owning_key]),
    ),
    (Violation::CategoryEmpty, !campaign.category.is_empty()),
  ])
}

fn verify_donation(
  tx: &LedgerTransaction,
  signers: &BTreeSet<Address>,
) -> Result<(), Violation> {
  require_that(&[
    (Violation::DonationInputCount, tx.inputs.len() == 1),
    (Violation::DonationOutputCount, tx.outputs.len() == 2),
  ])?;

  let (input, output, donation) = match (
    tx.inputs_of::<Campaign>().as_slice(),
    tx.outputs_of::<Campaign>().as_slice(),
    tx.outputs_of::<Donation>().as_slice(),
  ) {
    ([input], [output], [donation]) => (*input, *output, *donation),
    _ => return Err(Violation::DonationShape),
  };

  let change_in_raised = output.raised.checked_sub(&input.raised);

  require_that(&[
    (Violation::AmountNotPositive, donation.amount.is_positive()),
    (
      Violation::CampaignReferenceMismatch,
      donation.campaign_reference == output.linear_id,
    ),
    (
      Violation::BeneficiaryNotFundraiser,
      donation.beneficiary == output.fundraiser,
    ),
    (Violation::CampaignIdChanged, input.linear_id == output.linear_id),
    (
      Violation::RaisedNotUpdated,
      matches!(change_in_raised, Ok(ref delta) if *delta == donation.amount),
    ),
    (Violation::NameChanged, input.name == output.name),
    (Violation::TargetChanged, input.target == output.target),
    (Violation::FundraiserChanged, input.fundraiser == output.fundraiser),
    (Violation::RecipientChanged, input.recipient == output.recipient),
    (Violation::DeadlineChanged, input.deadline == output.deadline),
    (Violation::CategoryChanged, input.category == output.category),
  ])?;

  // donations past the deadline are rejected by every verifier
  // that sees the same time window, there is no separate timer.
  let reference = match tx.time_window.and_then(|window| window.midpoint()) {
    Some(reference) => reference,
    None => return Err(Violation::TimeWindowRequired),
  };

  require_that(&[
    (Violation::DeadlineExceeded, reference < output.deadline),
    (
      Violation::WrongSignerSet,
      *signers == BTreeSet::from([output.fundraiser.owning_key]),
    ),
  ])
}
