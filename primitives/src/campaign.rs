use {
  crate::{Address, Amount, LinearState, Party, UniqueIdentifier},
  serde::{Deserialize, Serialize},
  time::OffsetDateTime,
};

/// A fundraising campaign.
///
/// Everything except `raised` is fixed when the campaign is created.
/// Accepting a donation produces a new version of the campaign with
/// a larger `raised` value and consumes the previous version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
  pub name: String,
  pub target: Amount,
  pub raised: Amount,
  pub fundraiser: Party,
  pub recipient: Party,
  pub deadline: OffsetDateTime,
  pub category: String,
  pub linear_id: UniqueIdentifier,
}

impl Campaign {
  /// Creates the first version of a campaign, nothing is raised yet.
  pub fn new(
    name: impl Into<String>,
    target: Amount,
    fundraiser: Party,
    recipient: Party,
    deadline: OffsetDateTime,
    category: impl Into<String>,
    external_id: Option<String>,
  ) -> Self {
    Self {
      name: name.into(),
      raised: Amount::zero(target.token.clone()),
      target,
      fundraiser,
      recipient,
      deadline,
      category: category.into(),
      linear_id: UniqueIdentifier::new(external_id),
    }
  }

  /// Next version of this campaign with a different raised amount.
  pub fn with_raised(&self, raised: Amount) -> Self {
    Self {
      raised,
      ..self.clone()
    }
  }

  pub fn participant_parties(&self) -> [&Party; 2] {
    [&self.fundraiser, &self.recipient]
  }
}

impl LinearState for Campaign {
  fn linear_id(&self) -> &UniqueIdentifier {
    &self.linear_id
  }

  fn participants(&self) -> Vec<Address> {
    vec![self.fundraiser.owning_key, self.recipient.owning_key]
  }
}
