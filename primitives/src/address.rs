use {
  ed25519_dalek::{PublicKey, Signature, Verifier},
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
  },
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("Invalid base58 encoding: {0}")]
  Base58(#[from] bs58::decode::Error),

  #[error("Unexpected decoded length of {0} bytes")]
  InvalidLength(usize),
}

/// Represents the public signing key of a ledger identity.
///
/// The same type is used for well-known legal identities and for
/// freshly generated anonymous keys that are unlinkable to anyone
/// unless a certificate is disclosed. Any address is also a valid
/// ed25519 public key that can verify signatures over transactions.
#[derive(
  Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Address([u8; 32]);

impl Address {
  /// Verifies an ed25519 signature over a message made by the
  /// private key that corresponds to this address.
  ///
  /// Returns false if the address is not a valid point on the curve.
  pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
    match PublicKey::from_bytes(&self.0) {
      Ok(pk) => pk.verify(message, signature).is_ok(),
      Err(_) => false,
    }
  }
}

impl AsRef<[u8]> for Address {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Deref for Address {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.0).into_string())
  }
}

impl Debug for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "address({})", bs58::encode(self.0).into_string())
  }
}

impl From<Address> for String {
  fn from(pk: Address) -> Self {
    bs58::encode(pk.0).into_string()
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = bs58::decode(s).into_vec()?;
    let bytes: [u8; 32] = bytes
      .try_into()
      .map_err(|b: Vec<u8>| Error::InvalidLength(b.len()))?;
    Ok(Self(bytes))
  }
}

impl TryFrom<&str> for Address {
  type Error = Error;

  fn try_from(value: &str) -> Result<Self, Self::Error> {
    FromStr::from_str(value)
  }
}

impl From<PublicKey> for Address {
  fn from(p: PublicKey) -> Self {
    Self(*p.as_bytes())
  }
}

impl From<&PublicKey> for Address {
  fn from(p: &PublicKey) -> Self {
    Self(*p.as_bytes())
  }
}

/// A well-known identity on the network.
///
/// Parties are listed in the network map under their legal name and
/// are the only identities that sessions can be opened with.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Party {
  pub name: String,
  pub owning_key: Address,
}

impl Party {
  pub fn new(name: impl Into<String>, owning_key: impl Into<Address>) -> Self {
    Self {
      name: name.into(),
      owning_key: owning_key.into(),
    }
  }
}

impl Display for Party {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name)
  }
}

impl Debug for Party {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("Party")
      .field(&self.name)
      .field(&self.owning_key)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use {
    super::Address,
    ed25519_dalek::{Keypair, Signer},
  };

  #[test]
  fn address_base58_roundtrip_and_verify() -> anyhow::Result<()> {
    let keypair = Keypair::generate(&mut rand::thread_rng());
    let address = Address::from(keypair.public);

    let parsed: Address = address.to_string().parse()?;
    assert_eq!(parsed, address);

    let signature = keypair.sign(b"campaign");
    assert!(address.verify(b"campaign", &signature));
    assert!(!address.verify(b"donation", &signature));
    Ok(())
  }

  #[test]
  fn address_rejects_short_input() {
    let short = bs58::encode([1u8; 16]).into_string();
    assert!(short.parse::<Address>().is_err());
  }
}
