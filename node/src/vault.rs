use {
  crate::storage::{Storage, StorageError},
  crowdfund_primitives::{
    Campaign,
    ContractState,
    Donation,
    SignedTransaction,
    StateAndRef,
    StateKind,
    StateRef,
    ToBase58String,
    TransactionState,
    TxHash,
    UniqueIdentifier,
  },
  dashmap::DashMap,
  parking_lot::RwLock,
  std::collections::{BTreeMap, HashSet},
  tokio::sync::oneshot::{self, error::RecvError, Sender},
  tracing::{debug, error},
};

#[derive(Default)]
struct Index {
  unconsumed: BTreeMap<StateRef, TransactionState>,
  consumed: HashSet<StateRef>,
}

impl Index {
  fn apply(&mut self, stx: &SignedTransaction) {
    for input in &stx.tx.inputs {
      self.unconsumed.remove(input);
      self.consumed.insert(*input);
    }

    for (index, output) in stx.tx.outputs.iter().enumerate() {
      let reference = stx.tx.output_ref(index);
      // a consumer of this output may have been recorded first
      if !self.consumed.contains(&reference) {
        self.unconsumed.insert(reference, output.clone());
      }
    }
  }
}

/// The node's view of the ledger.
///
/// Stores every transaction the node was party to or observed and
/// keeps an index of states that are not consumed yet. Entity versions
/// are never changed in place, recording a transaction only moves its
/// inputs from the unconsumed to the consumed set and adds its outputs.
pub struct Vault {
  storage: Box<dyn Storage>,
  index: RwLock<Index>,
  watchlist: DashMap<TxHash, Vec<Sender<SignedTransaction>>>,
}

impl Vault {
  /// Opens a vault on top of a storage, rebuilding the
  /// index of unconsumed states from all stored transactions.
  pub fn new(storage: Box<dyn Storage>) -> Result<Self, StorageError> {
    let mut index = Index::default();
    for stx in storage.transactions()? {
      index.apply(&stx);
    }

    Ok(Self {
      storage,
      index: RwLock::new(index),
      watchlist: DashMap::new(),
    })
  }

  /// Records a committed transaction.
  ///
  /// Returns false if the transaction was already recorded. Everyone
  /// waiting on this transaction through [`Vault::await_transaction`]
  /// is notified.
  pub fn record(&self, stx: &SignedTransaction) -> Result<bool, StorageError> {
    let mut index = self.index.write();
    if !self.storage.insert(stx)? {
      return Ok(false);
    }
    index.apply(stx);
    drop(index);

    debug!(
      "recorded transaction {} with {} inputs and {} outputs",
      stx.id().to_b58(),
      stx.tx.inputs.len(),
      stx.tx.outputs.len()
    );

    if let Some((_, signals)) = self.watchlist.remove(stx.id()) {
      for signal in signals {
        if signal.send(stx.clone()).is_err() {
          error!("Failed signalling awaited transaction {}", stx.id().to_b58());
        }
      }
    }
    Ok(true)
  }

  pub fn transaction(
    &self,
    id: &TxHash,
  ) -> Result<Option<SignedTransaction>, StorageError> {
    self.storage.transaction(id)
  }

  pub fn transactions(&self) -> Result<Vec<SignedTransaction>, StorageError> {
    self.storage.transactions()
  }

  /// Finds the state a reference points to, consumed or not.
  pub fn resolve(
    &self,
    reference: &StateRef,
  ) -> Result<Option<TransactionState>, StorageError> {
    if let Some(state) = self.index.read().unconsumed.get(reference) {
      return Ok(Some(state.clone()));
    }
    Ok(
      self
        .storage
        .transaction(&reference.txhash)?
        .and_then(|stx| stx.tx.outputs.get(reference.index as usize).cloned()),
    )
  }

  pub fn is_consumed(&self, reference: &StateRef) -> bool {
    self.index.read().consumed.contains(reference)
  }

  /// All unconsumed states of one kind.
  pub fn unconsumed<T: StateKind + Clone>(&self) -> Vec<StateAndRef<T>> {
    self
      .index
      .read()
      .unconsumed
      .iter()
      .filter_map(|(reference, state)| {
        T::from_state(&state.data).map(|state| StateAndRef {
          state: state.clone(),
          reference: *reference,
        })
      })
      .collect()
  }

  /// Latest version of a campaign.
  pub fn campaign(&self, id: &UniqueIdentifier) -> Option<StateAndRef<Campaign>> {
    self
      .unconsumed::<Campaign>()
      .into_iter()
      .find(|campaign| campaign.state.linear_id == *id)
  }

  /// Latest version of the campaign with the given external id.
  pub fn campaign_by_external_id(
    &self,
    external_id: &str,
  ) -> Option<StateAndRef<Campaign>> {
    self.unconsumed::<Campaign>().into_iter().find(|campaign| {
      campaign.state.linear_id.external_id.as_deref() == Some(external_id)
    })
  }

  pub fn campaigns(&self) -> Vec<StateAndRef<Campaign>> {
    self.unconsumed()
  }

  pub fn donations(&self) -> Vec<StateAndRef<Donation>> {
    self.unconsumed()
  }

  /// All unconsumed states regardless of their kind.
  pub fn states(&self) -> Vec<StateAndRef<ContractState>> {
    self
      .index
      .read()
      .unconsumed
      .iter()
      .map(|(reference, state)| StateAndRef {
        state: state.data.clone(),
        reference: *reference,
      })
      .collect()
  }

  /// Resolves once a transaction with the given id is recorded,
  /// or immediately if it already is.
  pub async fn await_transaction(
    &self,
    id: TxHash,
  ) -> Result<SignedTransaction, RecvError> {
    let (tx, rx) = oneshot::channel();

    // register before looking into storage, so a transaction
    // recorded in between is not missed.
    self.watchlist.entry(id).or_default().push(tx);

    if let Ok(Some(stx)) = self.storage.transaction(&id) {
      drop(rx);
      if let Some(mut signals) = self.watchlist.get_mut(&id) {
        signals.retain(|signal| !signal.is_closed());
      }
      self.watchlist.remove_if(&id, |_, signals| signals.is_empty());
      return Ok(stx);
    }

    rx.await
  }
}
