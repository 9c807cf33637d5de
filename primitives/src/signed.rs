use {
  crate::{Address, ToBase58String, TxHash, WireTransaction},
  ed25519_dalek::{Keypair, Signature, Signer},
  serde::{Deserialize, Serialize},
  std::collections::BTreeSet,
  thiserror::Error,
};

#[derive(Debug, Clone, Error)]
pub enum SignatureError {
  #[error("Invalid signature by {0} on transaction {1}")]
  Invalid(Address, String),

  #[error("Transaction {0} is missing signatures from {1:?}")]
  Missing(String, BTreeSet<Address>),
}

/// A signature over a transaction id together with the key that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
  pub by: Address,
  pub signature: Signature,
}

impl TransactionSignature {
  pub fn sign(keypair: &Keypair, id: &TxHash) -> Self {
    Self {
      by: keypair.public.into(),
      signature: keypair.sign(&id.to_bytes()),
    }
  }

  pub fn is_valid_for(&self, id: &TxHash) -> bool {
    self.by.verify(&id.to_bytes(), &self.signature)
  }
}

/// A transaction with the signatures collected so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
  pub tx: WireTransaction,
  pub sigs: Vec<TransactionSignature>,
}

impl SignedTransaction {
  pub fn new(tx: WireTransaction, sigs: Vec<TransactionSignature>) -> Self {
    Self { tx, sigs }
  }

  pub fn id(&self) -> &TxHash {
    self.tx.id()
  }

  pub fn with_additional_signature(mut self, sig: TransactionSignature) -> Self {
    if !self.sigs.iter().any(|s| s.by == sig.by) {
      self.sigs.push(sig);
    }
    self
  }

  pub fn with_additional_signatures(
    self,
    sigs: impl IntoIterator<Item = TransactionSignature>,
  ) -> Self {
    sigs
      .into_iter()
      .fold(self, |stx, sig| stx.with_additional_signature(sig))
  }

  /// Keys that have signed this transaction so far.
  pub fn signers(&self) -> BTreeSet<Address> {
    self.sigs.iter().map(|s| s.by).collect()
  }

  /// Required keys that have not signed yet.
  pub fn missing_signatures(&self) -> BTreeSet<Address> {
    let signed = self.signers();
    self
      .tx
      .required_signing_keys()
      .into_iter()
      .filter(|key| !signed.contains(key))
      .collect()
  }

  /// Checks that all attached signatures are valid and that every
  /// required key outside of `allowed_missing` has signed.
  pub fn verify_signatures_except(
    &self,
    allowed_missing: &BTreeSet<Address>,
  ) -> Result<(), SignatureError> {
    let id = self.id();
    if let Some(invalid) = self.sigs.iter().find(|s| !s.is_valid_for(id)) {
      return Err(SignatureError::Invalid(invalid.by, id.to_b58()));
    }

    let missing: BTreeSet<_> = self
      .missing_signatures()
      .into_iter()
      .filter(|key| !allowed_missing.contains(key))
      .collect();

    if !missing.is_empty() {
      return Err(SignatureError::Missing(id.to_b58(), missing));
    }
    Ok(())
  }

  pub fn verify_required_signatures(&self) -> Result<(), SignatureError> {
    self.verify_signatures_except(&BTreeSet::new())
  }
}
