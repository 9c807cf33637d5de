mod common;

use {
  common::TestNetwork,
  crowdfund_node::{FlowError, InMemoryStorage, NodeConfig, Storage, StorageError},
  crowdfund_primitives::{
    ResolutionError,
    SignedTransaction,
    StateRef,
    TxHash,
    WireTransaction,
  },
  std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

/// In-memory storage whose reads can be switched off.
struct FlakyReads {
  inner: InMemoryStorage,
  failing: Arc<AtomicBool>,
}

impl FlakyReads {
  fn check(&self) -> Result<(), StorageError> {
    match self.failing.load(Ordering::SeqCst) {
      true => Err(sled::Error::Unsupported("disk unavailable".into()).into()),
      false => Ok(()),
    }
  }
}

impl Storage for FlakyReads {
  fn insert(&self, stx: &SignedTransaction) -> Result<bool, StorageError> {
    self.inner.insert(stx)
  }

  fn transaction(
    &self,
    id: &TxHash,
  ) -> Result<Option<SignedTransaction>, StorageError> {
    self.check()?;
    self.inner.transaction(id)
  }

  fn transactions(&self) -> Result<Vec<SignedTransaction>, StorageError> {
    self.check()?;
    self.inner.transactions()
  }
}

#[tokio::test]
async fn storage_failures_are_not_reported_as_unknown_states(
) -> anyhow::Result<()> {
  let net = TestNetwork::start(0, 0)?;
  let failing = Arc::new(AtomicBool::new(false));
  let auditor = net.cluster.start_node(
    NodeConfig::new("Auditor")
      .with_clock(net.clock.clone())
      .with_storage(Box::new(FlakyReads {
        inner: InMemoryStorage::default(),
        failing: Arc::clone(&failing),
      })),
  )?;
  let campaign = net.start_campaign().await?;
  assert!(auditor.rpc().campaign(&campaign.state.linear_id).is_some());

  // not in the index of unconsumed states, so it is looked up in storage
  let missing = StateRef {
    txhash: campaign.reference.txhash,
    index: 7,
  };
  let tx = WireTransaction::new(
    vec![missing],
    vec![],
    vec![],
    Some(net.notary.party().clone()),
    None,
  );

  assert!(matches!(
    auditor.hub().verify(&tx),
    Err(FlowError::Resolution(ResolutionError::UnknownState(r))) if r == missing
  ));

  failing.store(true, Ordering::SeqCst);
  assert!(matches!(
    auditor.hub().verify(&tx),
    Err(FlowError::Storage(StorageError::Database(_)))
  ));
  Ok(())
}
