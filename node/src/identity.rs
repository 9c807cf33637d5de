use {
  crate::network_map::NetworkMap,
  crowdfund_primitives::{Address, IdentityCertificate, Party},
  parking_lot::RwLock,
  std::collections::HashMap,
  thiserror::Error,
  tracing::debug,
};

#[derive(Debug, Error)]
pub enum IdentityError {
  #[error("Certificate for {0} is not signed by {1}")]
  InvalidCertificate(Address, Party),

  #[error("Key {0} cannot be linked to any known party")]
  UnknownKey(Address),
}

/// Maps keys seen in transactions to the well-known parties owning them.
///
/// Legal identity keys are resolved through the network map, fresh
/// anonymous keys only if their certificate was disclosed to this node.
pub struct IdentityService {
  network_map: NetworkMap,
  confidential: RwLock<HashMap<Address, Party>>,
}

impl IdentityService {
  pub fn new(network_map: NetworkMap) -> Self {
    Self {
      network_map,
      confidential: RwLock::new(HashMap::new()),
    }
  }

  /// Verifies and stores a certificate linking an anonymous key
  /// to a well-known party.
  pub fn register(&self, cert: &IdentityCertificate) -> Result<(), IdentityError> {
    if !cert.verify() {
      return Err(IdentityError::InvalidCertificate(
        cert.anonymous,
        cert.party.clone(),
      ));
    }
    debug!("{} is now known to belong to {}", cert.anonymous, cert.party);
    self
      .confidential
      .write()
      .insert(cert.anonymous, cert.party.clone());
    Ok(())
  }

  pub fn well_known_party(&self, key: &Address) -> Option<Party> {
    self
      .network_map
      .party_for_key(key)
      .or_else(|| self.confidential.read().get(key).cloned())
  }

  pub fn require_well_known_party(
    &self,
    key: &Address,
  ) -> Result<Party, IdentityError> {
    self
      .well_known_party(key)
      .ok_or(IdentityError::UnknownKey(*key))
  }

  pub fn is_known(&self, key: &Address) -> bool {
    self.well_known_party(key).is_some()
  }
}
