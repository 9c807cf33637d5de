use {
  crowdfund_primitives::{SignedTransaction, ToBase58String, TxHash},
  once_cell::sync::OnceCell,
  parking_lot::RwLock,
  rmp_serde::{from_slice, to_vec},
  sled::{
    transaction::{
      ConflictableTransactionResult,
      TransactionError,
      Transactional,
    },
    Db,
    Tree,
  },
  std::{collections::HashMap, path::Path},
  thiserror::Error,
  tracing::warn,
};

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("Database error: {0}")]
  Database(#[from] sled::Error),

  #[error("Failed to encode transaction: {0}")]
  Encode(#[from] rmp_serde::encode::Error),

  #[error("Stored transaction is corrupt: {0}")]
  Corrupt(#[from] rmp_serde::decode::Error),
}

/// Durable log of all transactions recorded by a node.
///
/// Transactions are never removed or modified once stored, the
/// set of consumed and unconsumed states is derived from this log.
pub trait Storage: Send + Sync {
  /// Appends a transaction to the log.
  ///
  /// Returns false if a transaction with the same id
  /// was already stored, in which case nothing changes.
  fn insert(&self, stx: &SignedTransaction) -> Result<bool, StorageError>;

  fn transaction(
    &self,
    id: &TxHash,
  ) -> Result<Option<SignedTransaction>, StorageError>;

  /// All stored transactions in the order they were inserted.
  fn transactions(&self) -> Result<Vec<SignedTransaction>, StorageError>;
}

#[derive(Default)]
struct MemoryLog {
  positions: HashMap<TxHash, usize>,
  log: Vec<SignedTransaction>,
}

/// Ephemeral storage, used when no data directory is configured.
#[derive(Default)]
pub struct InMemoryStorage {
  inner: RwLock<MemoryLog>,
}

impl Storage for InMemoryStorage {
  fn insert(&self, stx: &SignedTransaction) -> Result<bool, StorageError> {
    let mut inner = self.inner.write();
    if inner.positions.contains_key(stx.id()) {
      return Ok(false);
    }
    let position = inner.log.len();
    inner.positions.insert(*stx.id(), position);
    inner.log.push(stx.clone());
    Ok(true)
  }

  fn transaction(
    &self,
    id: &TxHash,
  ) -> Result<Option<SignedTransaction>, StorageError> {
    let inner = self.inner.read();
    Ok(inner.positions.get(id).map(|pos| inner.log[*pos].clone()))
  }

  fn transactions(&self) -> Result<Vec<SignedTransaction>, StorageError> {
    Ok(self.inner.read().log.clone())
  }
}

/// Persistent storage backed by sled.
///
/// All nodes in one process share a single database, each node
/// keeps its transactions in its own pair of trees.
pub struct OnDiskStorage {
  db: Db,
  /// sequence number -> transaction
  log: Tree,
  /// transaction id -> sequence number
  ids: Tree,
}

impl OnDiskStorage {
  pub fn new(path: &Path, name: &str) -> Result<Self, StorageError> {
    static DB: OnceCell<Db> = OnceCell::new();
    let db = DB.get_or_try_init(|| sled::open(path))?.clone();
    Ok(Self {
      log: db.open_tree(format!("{name}/log"))?,
      ids: db.open_tree(format!("{name}/ids"))?,
      db,
    })
  }
}

impl Storage for OnDiskStorage {
  fn insert(&self, stx: &SignedTransaction) -> Result<bool, StorageError> {
    let key = stx.id().to_bytes();
    let bytes = to_vec(stx)?;
    let sequence = self.db.generate_id()?.to_be_bytes();

    // the id and its log entry are written together or not at all,
    // concurrent inserts of the same transaction append it once.
    let inserted = (&self.log, &self.ids)
      .transaction(
        |(log, ids)| -> ConflictableTransactionResult<bool, StorageError> {
          if ids.get(&key)?.is_some() {
            return Ok(false);
          }
          ids.insert(key.as_slice(), &sequence[..])?;
          log.insert(&sequence[..], bytes.as_slice())?;
          Ok(true)
        },
      )
      .map_err(|error| match error {
        TransactionError::Abort(error) => error,
        TransactionError::Storage(error) => StorageError::Database(error),
      })?;

    if inserted {
      self.log.flush()?;
      self.ids.flush()?;
    }
    Ok(inserted)
  }

  fn transaction(
    &self,
    id: &TxHash,
  ) -> Result<Option<SignedTransaction>, StorageError> {
    let Some(sequence) = self.ids.get(id.to_bytes())? else {
      return Ok(None);
    };
    match self.log.get(sequence)? {
      Some(bytes) => Ok(Some(from_slice(&bytes)?)),
      None => {
        warn!("transaction {} has no log entry", id.to_b58());
        Ok(None)
      }
    }
  }

  fn transactions(&self) -> Result<Vec<SignedTransaction>, StorageError> {
    self
      .log
      .iter()
      .values()
      .map(|bytes| -> Result<SignedTransaction, StorageError> {
        Ok(from_slice(&bytes?)?)
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{InMemoryStorage, OnDiskStorage, Storage},
    crowdfund_primitives::{
      CampaignCommand,
      Command,
      Keypair,
      Party,
      SignedTransaction,
      WireTransaction,
    },
  };

  fn transaction() -> SignedTransaction {
    let key = Keypair::generate(&mut rand::thread_rng());
    let notary = Party::new("Notary", key.public);
    SignedTransaction::new(
      WireTransaction::new(
        vec![],
        vec![],
        vec![Command::new(CampaignCommand::Start, vec![key.public.into()])],
        Some(notary),
        None,
      ),
      vec![],
    )
  }

  fn exercise(storage: &dyn Storage) -> anyhow::Result<()> {
    let first = transaction();
    let second = transaction();

    assert!(storage.insert(&first)?);
    assert!(storage.insert(&second)?);
    assert!(!storage.insert(&first)?);

    assert_eq!(
      storage.transaction(first.id())?.map(|stx| *stx.id()),
      Some(*first.id())
    );
    assert!(storage.transaction(transaction().id())?.is_none());

    let ids: Vec<_> = storage
      .transactions()?
      .iter()
      .map(|stx| *stx.id())
      .collect();
    assert_eq!(ids, vec![*first.id(), *second.id()]);
    Ok(())
  }

  #[test]
  fn in_memory_storage_keeps_insertion_order() -> anyhow::Result<()> {
    exercise(&InMemoryStorage::default())
  }

  #[test]
  fn on_disk_storage_keeps_insertion_order() -> anyhow::Result<()> {
    let dir = std::env::temp_dir()
      .join(format!("crowdfund-storage-{}", rand::random::<u64>()));
    let storage = OnDiskStorage::new(&dir, "test-node")?;
    exercise(&storage)?;

    // reopening the same trees sees the same log
    let reopened = OnDiskStorage::new(&dir, "test-node")?;
    assert_eq!(reopened.transactions()?.len(), 2);
    Ok(())
  }

  #[test]
  fn racing_inserts_store_a_transaction_once() -> anyhow::Result<()> {
    let dir = std::env::temp_dir()
      .join(format!("crowdfund-storage-{}", rand::random::<u64>()));
    let storage = OnDiskStorage::new(&dir, "racing-node")?;
    let stx = transaction();

    let inserted = std::thread::scope(|scope| {
      let handles: Vec<_> = (0..8)
        .map(|_| scope.spawn(|| storage.insert(&stx)))
        .collect();
      handles
        .into_iter()
        .map(|handle| handle.join().expect("insert panicked"))
        .collect::<Result<Vec<_>, _>>()
    })?;

    assert_eq!(inserted.iter().filter(|inserted| **inserted).count(), 1);
    assert_eq!(storage.transactions()?.len(), 1);

    // every claimed id points at a log entry
    assert_eq!(
      storage.transaction(stx.id())?.map(|found| *found.id()),
      Some(*stx.id())
    );
    Ok(())
  }
}
