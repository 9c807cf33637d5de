use {
  crate::{
    clock::Clock,
    identity::IdentityService,
    keys::KeyManagementService,
    network_map::{peer_id, NetworkMap},
    notary::NotaryService,
    vault::Vault,
    FlowError,
  },
  crowdfund_network::{Dialer, Session},
  crowdfund_primitives::{
    LedgerTransaction,
    Party,
    ResolutionError,
    SignedTransaction,
    ToBase58String,
    WireTransaction,
  },
  std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::Duration,
  },
  time::OffsetDateTime,
  tracing::{debug, warn},
};

/// All services of one node, shared by every flow running on it.
pub struct ServiceHub {
  pub keys: KeyManagementService,
  pub identities: IdentityService,
  pub vault: Vault,
  pub network_map: NetworkMap,
  pub notary: Option<NotaryService>,
  pub(crate) clock: Arc<dyn Clock>,
  pub(crate) dialer: Dialer,
  pub(crate) session_timeout: Duration,
}

impl ServiceHub {
  pub fn party(&self) -> &Party {
    self.keys.party()
  }

  pub fn now(&self) -> OffsetDateTime {
    self.clock.now()
  }

  /// Opens a session with the node of a well-known party.
  pub fn initiate(
    &self,
    party: &Party,
    protocol: &str,
  ) -> Result<Session, FlowError> {
    Ok(self.dialer.initiate(&peer_id(party), protocol)?)
  }

  /// The notary all transactions of this node are notarised by.
  pub fn notary_party(&self) -> Result<Party, FlowError> {
    self
      .network_map
      .notary_identities()
      .into_iter()
      .next()
      .ok_or(FlowError::NoNotary)
  }

  /// Resolves the inputs of a transaction against the vault.
  pub fn resolve(
    &self,
    tx: &WireTransaction,
  ) -> Result<LedgerTransaction, FlowError> {
    // storage failures surface as they are, only states this
    // node has never seen become resolution errors.
    let mut known = BTreeMap::new();
    for reference in &tx.inputs {
      if let Some(state) = self.vault.resolve(reference)? {
        known.insert(*reference, state);
      }
    }
    Ok(LedgerTransaction::resolve(tx, |reference| {
      known.get(reference).cloned()
    })?)
  }

  /// Resolves a transaction and runs all contracts of its states.
  pub fn verify(
    &self,
    tx: &WireTransaction,
  ) -> Result<LedgerTransaction, FlowError> {
    let ltx = self.resolve(tx)?;
    crowdfund_contracts::verify(&ltx, self.now())?;
    Ok(ltx)
  }

  /// Well-known parties behind the participants of all
  /// consumed and produced states.
  pub fn participants(
    &self,
    tx: &WireTransaction,
  ) -> Result<BTreeSet<Party>, FlowError> {
    let ltx = self.resolve(tx)?;
    let mut parties = BTreeSet::new();
    for key in ltx
      .input_states()
      .chain(ltx.output_states())
      .flat_map(|state| state.participants())
    {
      if self.keys.owns(&key) {
        parties.insert(self.party().clone());
        continue;
      }
      match self.identities.well_known_party(&key) {
        Some(party) => {
          parties.insert(party);
        }
        None => warn!("participant {key} cannot be linked to a known party"),
      }
    }
    Ok(parties)
  }

  /// Transactions that produced the inputs of a transaction.
  pub fn dependencies(
    &self,
    tx: &WireTransaction,
  ) -> Result<Vec<SignedTransaction>, FlowError> {
    let mut seen = BTreeSet::new();
    let mut dependencies = vec![];
    for input in &tx.inputs {
      if !seen.insert(input.txhash) {
        continue;
      }
      match self.vault.transaction(&input.txhash)? {
        Some(stx) => dependencies.push(stx),
        None => return Err(ResolutionError::UnknownState(*input).into()),
      }
    }
    Ok(dependencies)
  }

  /// Checks and records dependencies received from a counterparty
  /// so that the inputs of the transaction they came with resolve.
  pub fn record_dependencies(
    &self,
    dependencies: &[SignedTransaction],
  ) -> Result<(), FlowError> {
    for dependency in dependencies {
      if self.vault.transaction(dependency.id())?.is_some() {
        continue;
      }
      dependency.verify_required_signatures()?;
      self.vault.record(dependency)?;
      debug!("recorded dependency {}", dependency.id().to_b58());
    }
    Ok(())
  }
}
