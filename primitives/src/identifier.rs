use {
  serde::{Deserialize, Serialize},
  std::{
    cmp::Ordering,
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
    str::FromStr,
  },
};

/// Stable identifier of a versioned entity.
///
/// It stays constant across all versions of the same entity, so it is
/// used to find the latest version of a campaign and to link donations
/// to the campaign they fund. An optional external id can be attached
/// by callers that track entities in their own systems, it does not
/// take part in equality.
#[derive(Clone, Serialize, Deserialize)]
pub struct UniqueIdentifier {
  pub external_id: Option<String>,
  id: [u8; 16],
}

impl UniqueIdentifier {
  pub fn new(external_id: Option<String>) -> Self {
    Self {
      external_id,
      id: rand::random(),
    }
  }

  pub fn from_bytes(id: [u8; 16]) -> Self {
    Self {
      external_id: None,
      id,
    }
  }

  pub fn as_bytes(&self) -> &[u8; 16] {
    &self.id
  }
}

impl Default for UniqueIdentifier {
  fn default() -> Self {
    Self::new(None)
  }
}

impl PartialEq for UniqueIdentifier {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for UniqueIdentifier {}

impl Hash for UniqueIdentifier {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl PartialOrd for UniqueIdentifier {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for UniqueIdentifier {
  fn cmp(&self, other: &Self) -> Ordering {
    self.id.cmp(&other.id)
  }
}

impl Display for UniqueIdentifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.id).into_string())
  }
}

impl Debug for UniqueIdentifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.external_id {
      Some(ext) => write!(f, "{ext}_{self}"),
      None => write!(f, "{self}"),
    }
  }
}

impl FromStr for UniqueIdentifier {
  type Err = crate::AddressError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = bs58::decode(s).into_vec()?;
    let id: [u8; 16] = bytes
      .try_into()
      .map_err(|b: Vec<u8>| crate::AddressError::InvalidLength(b.len()))?;
    Ok(Self::from_bytes(id))
  }
}
