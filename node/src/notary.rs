use {
  crate::{clock::Clock, keys::KeyManagementService},
  crowdfund_primitives::{
    Party,
    SignatureError,
    SignedTransaction,
    StateRef,
    ToBase58String,
    TransactionSignature,
    TxHash,
  },
  metrics::increment_counter,
  parking_lot::Mutex,
  serde::{Deserialize, Serialize},
  std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
  },
  thiserror::Error,
  tracing::{info, warn},
};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum NotaryError {
  #[error(
    "Input {state_ref} was already consumed by transaction {}",
    .consumed_by.to_b58()
  )]
  Conflict {
    state_ref: StateRef,
    consumed_by: TxHash,
  },

  #[error("Transaction time window does not contain the notary time")]
  TimeWindowInvalid,

  #[error("{0}")]
  MissingSignatures(String),

  #[error("{0}")]
  InvalidSignature(String),

  #[error("Transaction must be notarised by {0}")]
  WrongNotary(String),
}

impl From<SignatureError> for NotaryError {
  fn from(value: SignatureError) -> Self {
    match value {
      SignatureError::Missing(..) => {
        NotaryError::MissingSignatures(value.to_string())
      }
      SignatureError::Invalid(..) => {
        NotaryError::InvalidSignature(value.to_string())
      }
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotariseRequest {
  pub stx: SignedTransaction,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum NotariseResponse {
  Signed(TransactionSignature),
  Rejected(NotaryError),
}

#[derive(Default)]
struct Commitments {
  consumed: HashMap<StateRef, TxHash>,
  signatures: HashMap<TxHash, TransactionSignature>,
}

/// Guarantees that every state is consumed at most once.
///
/// The notary does not look at the contents of states and does not
/// run contracts, it only checks that none of the inputs of a
/// transaction was consumed by another transaction, that the
/// transaction is within its time window and that everyone but
/// the notary has already signed.
pub struct NotaryService {
  clock: Arc<dyn Clock>,
  commitments: Mutex<Commitments>,
}

impl NotaryService {
  pub fn new(clock: Arc<dyn Clock>) -> Self {
    Self {
      clock,
      commitments: Mutex::new(Commitments::default()),
    }
  }

  /// Commits the inputs of a transaction and signs it.
  ///
  /// Notarising the same transaction again returns
  /// the signature given the first time.
  pub fn notarise(
    &self,
    stx: &SignedTransaction,
    keys: &KeyManagementService,
  ) -> Result<TransactionSignature, NotaryError> {
    let notary: &Party = keys.party();
    if stx.tx.notary.as_ref() != Some(notary) {
      return Err(NotaryError::WrongNotary(notary.name.clone()));
    }

    let id = *stx.id();
    let mut commitments = self.commitments.lock();
    if let Some(signature) = commitments.signatures.get(&id) {
      info!("transaction {} was already notarised", id.to_b58());
      return Ok(signature.clone());
    }

    if let Some(window) = stx.tx.time_window {
      if !window.contains(self.clock.now()) {
        return Err(NotaryError::TimeWindowInvalid);
      }
    }

    stx.verify_signatures_except(&BTreeSet::from([notary.owning_key]))?;

    for input in &stx.tx.inputs {
      if let Some(consumed_by) = commitments.consumed.get(input) {
        increment_counter!("notary_conflicts");
        warn!(
          "transaction {} tries to consume {input} already consumed by {}",
          id.to_b58(),
          consumed_by.to_b58()
        );
        return Err(NotaryError::Conflict {
          state_ref: *input,
          consumed_by: *consumed_by,
        });
      }
    }

    for input in &stx.tx.inputs {
      commitments.consumed.insert(*input, id);
    }

    let signature = keys.sign_as_party(&id);
    commitments.signatures.insert(id, signature.clone());

    increment_counter!("notarised_transactions");
    info!(
      "notarised transaction {} consuming {} states",
      id.to_b58(),
      stx.tx.inputs.len()
    );
    Ok(signature)
  }
}
