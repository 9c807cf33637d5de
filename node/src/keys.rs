use {
  crowdfund_primitives::{
    Address,
    IdentityCertificate,
    Keypair,
    Party,
    TransactionSignature,
    TxHash,
  },
  parking_lot::RwLock,
  std::collections::{BTreeSet, HashMap},
  thiserror::Error,
  tracing::debug,
};

#[derive(Debug, Error)]
pub enum KeyError {
  #[error("Key {0} is not owned by this node")]
  UnknownKey(Address),
}

/// Holds the private keys of a node.
///
/// Besides the legal identity key that backs the node's well-known
/// party, it generates fresh single-use keys that are not linkable to
/// the node by anyone who was not given their certificate.
pub struct KeyManagementService {
  party: Party,
  legal: Keypair,
  fresh: RwLock<HashMap<Address, Keypair>>,
}

impl KeyManagementService {
  pub fn new(name: &str, legal: Keypair) -> Self {
    Self {
      party: Party::new(name, legal.public),
      legal,
      fresh: RwLock::new(HashMap::new()),
    }
  }

  /// The well-known party of this node.
  pub fn party(&self) -> &Party {
    &self.party
  }

  pub fn legal_key(&self) -> Address {
    self.party.owning_key
  }

  pub fn fresh_key(&self) -> Address {
    let keypair = Keypair::generate(&mut rand::thread_rng());
    let address = keypair.public.into();
    self.fresh.write().insert(address, keypair);
    debug!("generated fresh key {address}");
    address
  }

  /// Generates a fresh key along with a certificate that
  /// links it to the legal identity of this node.
  pub fn fresh_key_and_cert(&self) -> IdentityCertificate {
    let anonymous = self.fresh_key();
    IdentityCertificate::issue(self.party.clone(), &self.legal, anonymous)
  }

  /// Certificate for a fresh key owned by this node.
  pub fn certificate(&self, key: &Address) -> Option<IdentityCertificate> {
    self
      .fresh
      .read()
      .contains_key(key)
      .then(|| IdentityCertificate::issue(self.party.clone(), &self.legal, *key))
  }

  pub fn is_fresh(&self, key: &Address) -> bool {
    self.fresh.read().contains_key(key)
  }

  pub fn owns(&self, key: &Address) -> bool {
    *key == self.party.owning_key || self.fresh.read().contains_key(key)
  }

  /// Keys from the given set that this node can sign with.
  pub fn filter_owned<'a>(
    &self,
    keys: impl IntoIterator<Item = &'a Address>,
  ) -> BTreeSet<Address> {
    keys.into_iter().filter(|k| self.owns(k)).copied().collect()
  }

  /// Signs with the legal identity key.
  pub fn sign_as_party(&self, id: &TxHash) -> TransactionSignature {
    TransactionSignature::sign(&self.legal, id)
  }

  pub fn sign(
    &self,
    id: &TxHash,
    key: &Address,
  ) -> Result<TransactionSignature, KeyError> {
    if *key == self.party.owning_key {
      return Ok(self.sign_as_party(id));
    }
    match self.fresh.read().get(key) {
      Some(keypair) => Ok(TransactionSignature::sign(keypair, id)),
      None => Err(KeyError::UnknownKey(*key)),
    }
  }
}
