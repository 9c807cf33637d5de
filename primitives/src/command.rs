use {
  crate::{Address, ContractId},
  serde::{Deserialize, Serialize},
  std::collections::BTreeSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignCommand {
  Start,
  AcceptDonation,

  /// Reserved for closing a campaign once its deadline passed.
  /// No transition with this command is valid yet.
  End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonationCommand {
  Create,
}

/// Declares the intent of a transaction towards one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandData {
  Campaign(CampaignCommand),
  Donation(DonationCommand),
}

impl CommandData {
  pub fn contract(&self) -> ContractId {
    match self {
      CommandData::Campaign(_) => ContractId::Campaign,
      CommandData::Donation(_) => ContractId::Donation,
    }
  }
}

impl From<CampaignCommand> for CommandData {
  fn from(value: CampaignCommand) -> Self {
    CommandData::Campaign(value)
  }
}

impl From<DonationCommand> for CommandData {
  fn from(value: DonationCommand) -> Self {
    CommandData::Donation(value)
  }
}

/// A command together with the keys that must sign any transaction
/// carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
  pub value: CommandData,
  pub signers: Vec<Address>,
}

impl Command {
  pub fn new(
    value: impl Into<CommandData>,
    signers: impl IntoIterator<Item = Address>,
  ) -> Self {
    Self {
      value: value.into(),
      signers: signers.into_iter().collect(),
    }
  }

  pub fn signer_set(&self) -> BTreeSet<Address> {
    self.signers.iter().copied().collect()
  }
}
