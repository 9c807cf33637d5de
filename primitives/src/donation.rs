use {
  crate::{Address, Amount, LinearState, Party, UniqueIdentifier},
  serde::{Deserialize, Serialize},
};

/// A single donation to a campaign. Created once and never consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
  pub campaign_reference: UniqueIdentifier,
  pub beneficiary: Party,

  /// Usually a fresh key that nobody but the counterparties of the
  /// donation transaction can link to the donor's legal identity.
  pub donor: Address,
  pub amount: Amount,
  pub linear_id: UniqueIdentifier,
}

impl Donation {
  pub fn new(
    campaign_reference: UniqueIdentifier,
    beneficiary: Party,
    donor: Address,
    amount: Amount,
  ) -> Self {
    Self {
      campaign_reference,
      beneficiary,
      donor,
      amount,
      linear_id: UniqueIdentifier::new(None),
    }
  }
}

impl LinearState for Donation {
  fn linear_id(&self) -> &UniqueIdentifier {
    &self.linear_id
  }

  fn participants(&self) -> Vec<Address> {
    vec![self.donor, self.beneficiary.owning_key]
  }
}
