use {
  crate::{
    flows::ProgressError,
    identity::IdentityError,
    keys::KeyError,
    notary::NotaryError,
    storage::StorageError,
  },
  crowdfund_primitives::{
    AmountError,
    ResolutionError,
    SignatureError,
    UniqueIdentifier,
  },
  thiserror::Error,
};

/// Everything that can go wrong while running a flow.
///
/// Any error before a transaction is notarised leaves no trace on
/// the ledger of any party involved.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Transaction rejected: {0}")]
  Contract(#[from] crowdfund_contracts::Error),

  #[error("{party} rejected the transaction: {reason}")]
  CounterpartyRejected { party: String, reason: String },

  #[error("Notarisation failed: {0}")]
  Notary(#[from] NotaryError),

  #[error("Session failure: {0}")]
  Network(#[from] crowdfund_network::Error),

  #[error(transparent)]
  Signature(#[from] SignatureError),

  #[error(transparent)]
  Resolution(#[from] ResolutionError),

  #[error(transparent)]
  Storage(#[from] StorageError),

  #[error(transparent)]
  Amount(#[from] AmountError),

  #[error(transparent)]
  Identity(#[from] IdentityError),

  #[error(transparent)]
  Key(#[from] KeyError),

  #[error(transparent)]
  Progress(#[from] ProgressError),

  #[error("Campaign {0} is not in the vault")]
  CampaignNotFound(UniqueIdentifier),

  #[error("Party {0} is not on the network map")]
  UnknownParty(String),

  #[error("No notary is available on the network")]
  NoNotary,

  #[error("Protocol violation by {peer}: {details}")]
  Protocol { peer: String, details: String },

  #[error("Transaction {0} was not committed in time")]
  CommitTimeout(String),

  #[error("Transaction {0} has no output of the expected kind")]
  MissingOutput(String),
}

impl FlowError {
  /// The transaction lost the race for one of its inputs.
  ///
  /// The caller should read the latest version of the
  /// consumed states and start over with a new flow.
  pub fn is_conflict(&self) -> bool {
    matches!(self, FlowError::Notary(NotaryError::Conflict { .. }))
  }

  /// The transaction breaks a business rule, either in the local
  /// validator or in the validator of a counterparty.
  pub fn is_rejection(&self) -> bool {
    matches!(
      self,
      FlowError::Contract(_)
        | FlowError::CounterpartyRejected { .. }
        | FlowError::Amount(_)
    )
  }

  pub(crate) fn protocol(
    peer: &crowdfund_network::PeerId,
    details: impl Into<String>,
  ) -> Self {
    FlowError::Protocol {
      peer: peer.to_string(),
      details: details.into(),
    }
  }
}
