use {
  crate::{Address, Campaign, Donation, Party, ToBase58String, TxHash, UniqueIdentifier},
  serde::{Deserialize, Serialize},
  std::fmt::{Debug, Display},
};

/// Identifies the contract that governs a state type.
///
/// Every state on the ledger is validated by exactly one contract and
/// a transaction is valid only if the contracts of all its input and
/// output states accept it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ContractId {
  Campaign,
  Donation,
}

impl Display for ContractId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ContractId::Campaign => write!(f, "CampaignContract"),
      ContractId::Donation => write!(f, "DonationContract"),
    }
  }
}

/// All state types known to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractState {
  Campaign(Campaign),
  Donation(Donation),
}

impl ContractState {
  pub fn contract(&self) -> ContractId {
    match self {
      ContractState::Campaign(_) => ContractId::Campaign,
      ContractState::Donation(_) => ContractId::Donation,
    }
  }

  pub fn linear_id(&self) -> &UniqueIdentifier {
    match self {
      ContractState::Campaign(c) => c.linear_id(),
      ContractState::Donation(d) => d.linear_id(),
    }
  }

  pub fn participants(&self) -> Vec<Address> {
    match self {
      ContractState::Campaign(c) => c.participants(),
      ContractState::Donation(d) => d.participants(),
    }
  }
}

/// A state that evolves over time as a chain of versions sharing
/// the same linear id. Each version is consumed by the transaction
/// that produces its successor.
pub trait LinearState {
  fn linear_id(&self) -> &UniqueIdentifier;

  /// Keys of the parties that hold this state in their vaults.
  fn participants(&self) -> Vec<Address>;
}

/// Typed access to the variants of [`ContractState`].
pub trait StateKind: LinearState + Clone + Sized {
  fn from_state(state: &ContractState) -> Option<&Self>;
  fn into_state(self) -> ContractState;
}

impl StateKind for Campaign {
  fn from_state(state: &ContractState) -> Option<&Self> {
    match state {
      ContractState::Campaign(c) => Some(c),
      _ => None,
    }
  }

  fn into_state(self) -> ContractState {
    ContractState::Campaign(self)
  }
}

impl StateKind for Donation {
  fn from_state(state: &ContractState) -> Option<&Self> {
    match state {
      ContractState::Donation(d) => Some(d),
      _ => None,
    }
  }

  fn into_state(self) -> ContractState {
    ContractState::Donation(self)
  }
}

impl From<Campaign> for ContractState {
  fn from(value: Campaign) -> Self {
    ContractState::Campaign(value)
  }
}

impl From<Donation> for ContractState {
  fn from(value: Donation) -> Self {
    ContractState::Donation(value)
  }
}

/// Points to one output of a committed transaction.
///
/// This is the version pointer of the entity model: consuming a state
/// means listing its [`StateRef`] as an input of a later transaction.
#[derive(
  Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StateRef {
  pub txhash: TxHash,
  pub index: u32,
}

impl Display for StateRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}({})", self.txhash.to_b58(), self.index)
  }
}

impl Debug for StateRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "StateRef({self})")
  }
}

/// An output state together with the notary that controls its
/// consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
  pub data: ContractState,
  pub notary: Party,
}

/// A state paired with the reference that locates it on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef<T = ContractState> {
  pub state: T,
  pub reference: StateRef,
}

impl StateAndRef<ContractState> {
  /// Narrows an untyped state to one of the known state kinds.
  pub fn downcast<T: StateKind>(&self) -> Option<StateAndRef<T>> {
    T::from_state(&self.state).map(|state| StateAndRef {
      state: state.clone(),
      reference: self.reference,
    })
  }
}
