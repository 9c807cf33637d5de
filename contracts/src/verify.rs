use {
  crate::{CampaignContract, DonationContract, Violation},
  crowdfund_primitives::{ContractId, LedgerTransaction},
  thiserror::Error,
  time::OffsetDateTime,
  tracing::debug,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{contract} rejected the transaction: {violation}")]
pub struct Error {
  pub contract: ContractId,
  pub violation: Violation,
}

/// Rules of one state type.
///
/// Implementations are pure: the same transaction and the same `now`
/// always produce the same verdict, so every party that evaluates a
/// proposed transition independently reaches the same conclusion.
pub trait Contract {
  const ID: ContractId;

  /// `now` is the verifier's clock. Rules that need a point in time
  /// prefer the transaction's time window and fall back to it only
  /// when the transaction does not carry one.
  fn verify(
    &self,
    tx: &LedgerTransaction,
    now: OffsetDateTime,
  ) -> Result<(), Violation>;
}

/// Verifies a transaction against the contracts of all states it
/// consumes or produces.
///
/// Contracts run in a fixed order (campaign, then donation) and the
/// first rejection is returned. The transaction is valid only if all
/// of them accept it.
pub fn verify(tx: &LedgerTransaction, now: OffsetDateTime) -> Result<(), Error> {
  for contract in tx.contracts() {
    let result = match contract {
      ContractId::Campaign => CampaignContract.verify(tx, now),
      ContractId::Donation => DonationContract.verify(tx, now),
    };
    result.map_err(|violation| {
      debug!("{contract} contract rejected a transition: {violation}");
      Error {
        contract,
        violation,
      }
    })?;
  }
  Ok(())
}
