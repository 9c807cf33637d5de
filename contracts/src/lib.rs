mod campaign;
mod donation;
mod requirements;
mod verify;

pub use {
  campaign::CampaignContract,
  donation::DonationContract,
  requirements::{require_single_command, require_that, Violation},
  verify::{verify, Contract, Error},
};
