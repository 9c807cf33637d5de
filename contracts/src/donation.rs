use {
  crate::{require_single_command, require_that, Contract, Violation},
  crowdfund_primitives::{
    Address,
    Campaign,
    CommandData,
    ContractId,
    Donation,
    DonationCommand,
    LedgerTransaction,
    LinearState,
  },
  std::collections::BTreeSet,
  time::OffsetDateTime,
};

/// Governs [`Donation`] states.
///
/// It only checks the donation itself, the consistency between the
/// donated amount and the campaign's raised amount is enforced by
/// the campaign contract that sees both outputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DonationContract;

impl Contract for DonationContract {
  const ID: ContractId = ContractId::Donation;

  fn verify(
    &self,
    tx: &LedgerTransaction,
    _: OffsetDateTime,
  ) -> Result<(), Violation> {
    let command = require_single_command(tx, Self::ID)?;
    match command.value {
      CommandData::Donation(DonationCommand::Create) => {
        verify_create(tx, &command.signer_set())
      }
      CommandData::Campaign(_) => Err(Violation::UnrecognizedCommand),
    }
  }
}

fn verify_create(
  tx: &LedgerTransaction,
  signers: &BTreeSet<Address>,
) -> Result<(), Violation> {
  let donations = tx.group_states::<Donation>();
  let campaigns = tx.group_states::<Campaign>();

  require_that(&[
    (Violation::MultipleDonations, donations.len() == 1),
    (Violation::MissingCampaign, !campaigns.is_empty()),
  ])?;

  let group = &donations[0];
  let donation = match (group.inputs.as_slice(), group.outputs.as_slice()) {
    ([], [donation]) => *donation,
    _ => return Err(Violation::DonationNotCreatedOnce),
  };

  require_that(&[
    (Violation::AmountNotPositive, donation.amount.is_positive()),
    (
      Violation::WrongSignerSet,
      *signers == donation.participants().into_iter().collect(),
    ),
  ])
}
