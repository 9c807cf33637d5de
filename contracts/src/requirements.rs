use {
  crowdfund_primitives::{Command, ContractId, LedgerTransaction},
  thiserror::Error,
};

/// Every rule a transition can break.
///
/// The message of each variant is the reason reported to callers, so
/// a rejected transition always names the rule it violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Violation {
  #[error("missing command")]
  MissingCommand,

  #[error("more than one command for the same contract")]
  MultipleCommands,

  #[error("unrecognized command")]
  UnrecognizedCommand,

  #[error("campaign creation must not consume inputs")]
  CreationConsumesInputs,

  #[error("campaign creation must produce exactly one campaign")]
  CreationOutputCount,

  #[error("target not positive")]
  TargetNotPositive,

  #[error("raised not zero")]
  RaisedNotZero,

  #[error("deadline not future")]
  DeadlineNotFuture,

  #[error("name empty")]
  NameEmpty,

  #[error("category empty")]
  CategoryEmpty,

  #[error("wrong signer set")]
  WrongSignerSet,

  #[error("accepting a donation must consume exactly one state")]
  DonationInputCount,

  #[error("accepting a donation must produce exactly two states")]
  DonationOutputCount,

  #[error(
    "accepting a donation must consume one campaign and produce one campaign \
     and one donation"
  )]
  DonationShape,

  #[error("amount not positive")]
  AmountNotPositive,

  #[error("donation does not reference the updated campaign")]
  CampaignReferenceMismatch,

  #[error("donation beneficiary is not the fundraiser")]
  BeneficiaryNotFundraiser,

  #[error("campaign id cannot change")]
  CampaignIdChanged,

  #[error("raised must grow by exactly the donated amount")]
  RaisedNotUpdated,

  #[error("name cannot change")]
  NameChanged,

  #[error("target cannot change")]
  TargetChanged,

  #[error("fundraiser cannot change")]
  FundraiserChanged,

  #[error("recipient cannot change")]
  RecipientChanged,

  #[error("deadline cannot change")]
  DeadlineChanged,

  #[error("category cannot change")]
  CategoryChanged,

  #[error("time window required")]
  TimeWindowRequired,

  #[error("deadline exceeded")]
  DeadlineExceeded,

  #[error("only one donation can be made at a time")]
  MultipleDonations,

  #[error("a donation requires a campaign in the same transaction")]
  MissingCampaign,

  #[error("donations cannot be consumed or produced more than once")]
  DonationNotCreatedOnce,
}

/// Evaluates an ordered list of named checks.
///
/// The first check that does not hold determines the reported
/// violation, later checks are ignored.
pub fn require_that(checks: &[(Violation, bool)]) -> Result<(), Violation> {
  match checks.iter().find(|(_, holds)| !holds) {
    Some((violation, _)) => Err(*violation),
    None => Ok(()),
  }
}

/// Finds the only command addressed to a contract.
pub fn require_single_command(
  tx: &LedgerTransaction,
  contract: ContractId,
) -> Result<&Command, Violation> {
  let mut commands = tx.commands_of(contract).into_iter();
  match (commands.next(), commands.next()) {
    (Some(command), None) => Ok(command),
    (None, _) => Err(Violation::MissingCommand),
    (Some(_), Some(_)) => Err(Violation::MultipleCommands),
  }
}

#[cfg(test)]
mod tests {
  use super::{require_that, Violation};

  #[test]
  fn first_failing_check_is_reported() {
    assert_eq!(
      require_that(&[
        (Violation::NameEmpty, true),
        (Violation::TargetNotPositive, false),
        (Violation::DeadlineNotFuture, false),
      ]),
      Err(Violation::TargetNotPositive)
    );
    assert_eq!(require_that(&[(Violation::NameEmpty, true)]), Ok(()));
    assert_eq!(require_that(&[]), Ok(()));
  }
}
