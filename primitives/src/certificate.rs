use {
  crate::{Address, Party},
  ed25519_dalek::{Keypair, Signature, Signer},
  serde::{Deserialize, Serialize},
};

const DOMAIN: &[u8] = b"crowdfund/confidential-identity";

/// Links a freshly generated anonymous key to the well-known party
/// that owns it.
///
/// Certificates are only handed to counterparties that need to know
/// who is behind an anonymous key in order to validate a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCertificate {
  pub party: Party,
  pub anonymous: Address,
  pub signature: Signature,
}

impl IdentityCertificate {
  /// Issues a certificate, `legal` must be the keypair of `party`.
  pub fn issue(party: Party, legal: &Keypair, anonymous: Address) -> Self {
    Self {
      signature: legal.sign(&Self::message(&anonymous)),
      party,
      anonymous,
    }
  }

  pub fn verify(&self) -> bool {
    self
      .party
      .owning_key
      .verify(&Self::message(&self.anonymous), &self.signature)
  }

  fn message(anonymous: &Address) -> Vec<u8> {
    [DOMAIN, anonymous.as_ref()].concat()
  }
}
