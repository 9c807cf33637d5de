#![allow(dead_code)]

use {
  crowdfund_primitives::{
    Address,
    Amount,
    Campaign,
    CampaignCommand,
    Command,
    Donation,
    DonationCommand,
    Keypair,
    LedgerTransaction,
    Party,
    StateAndRef,
    TimeWindow,
    TransactionBuilder,
    TransactionState,
  },
  time::{macros::datetime, Duration, OffsetDateTime},
};

pub struct Parties {
  pub notary: Party,
  pub fundraiser: Party,
  pub recipient: Party,
  pub donor: Address,
}

fn random_party(name: &str) -> Party {
  Party::new(name, Keypair::generate(&mut rand::thread_rng()).public)
}

pub fn parties() -> Parties {
  Parties {
    notary: random_party("Notary"),
    fundraiser: random_party("Fundraiser"),
    recipient: random_party("Recipient"),
    donor: random_party("Donor").owning_key,
  }
}

/// Fixed clock used by all contract tests.
pub fn now() -> OffsetDateTime {
  datetime!(2023-03-01 12:00 UTC)
}

pub fn window_at(instant: OffsetDateTime) -> TimeWindow {
  TimeWindow::with_tolerance(instant, Duration::seconds(30))
}

pub fn usd(quantity: u64) -> Amount {
  Amount::new(quantity, "USD".parse().expect("valid currency"))
}

/// A fresh campaign: target 1000 USD, deadline in 7 days.
pub fn campaign(parties: &Parties) -> Campaign {
  Campaign::new(
    "Clean water",
    usd(1000),
    parties.fundraiser.clone(),
    parties.recipient.clone(),
    now() + Duration::days(7),
    "water",
    Some("clean-water-2023".into()),
  )
}

pub fn creation(
  parties: &Parties,
  campaign: Campaign,
  signers: Vec<Address>,
) -> LedgerTransaction {
  let mut builder = TransactionBuilder::new(parties.notary.clone());
  builder
    .add_output_state(campaign)
    .add_command(Command::new(CampaignCommand::Start, signers))
    .set_time_window(window_at(now()));
  resolve(&builder, None)
}

/// All components of a donation acceptance transition, valid as
/// constructed and meant to be tampered with by tests.
pub struct DonationParts {
  pub prior: StateAndRef<Campaign>,
  pub updated: Campaign,
  pub donation: Donation,
  pub accept_signers: Vec<Address>,
  pub create_signers: Vec<Address>,
  pub time_window: Option<TimeWindow>,
}

pub fn donation_parts(parties: &Parties, amount: Amount) -> DonationParts {
  let campaign = campaign(parties);
  let mut genesis = TransactionBuilder::new(parties.notary.clone());
  genesis.add_output_state(campaign.clone());
  let prior = StateAndRef {
    state: campaign.clone(),
    reference: genesis.to_wire_transaction().output_ref(0),
  };

  let raised = campaign
    .raised
    .checked_add(&amount)
    .expect("same currency");

  DonationParts {
    updated: campaign.with_raised(raised),
    donation: Donation::new(
      campaign.linear_id.clone(),
      campaign.fundraiser.clone(),
      parties.donor,
      amount,
    ),
    accept_signers: vec![campaign.fundraiser.owning_key],
    create_signers: vec![parties.donor, campaign.fundraiser.owning_key],
    time_window: Some(window_at(now())),
    prior,
  }
}

impl DonationParts {
  pub fn ledger(&self, notary: &Party) -> LedgerTransaction {
    let mut builder = TransactionBuilder::new(notary.clone());
    builder
      .add_input_state(&self.prior)
      .add_output_state(self.updated.clone())
      .add_output_state(self.donation.clone())
      .add_command(Command::new(
        CampaignCommand::AcceptDonation,
        self.accept_signers.clone(),
      ))
      .add_command(Command::new(
        DonationCommand::Create,
        self.create_signers.clone(),
      ));
    if let Some(window) = self.time_window {
      builder.set_time_window(window);
    }
    resolve(&builder, Some((&self.prior, notary)))
  }
}

fn resolve(
  builder: &TransactionBuilder,
  prior: Option<(&StateAndRef<Campaign>, &Party)>,
) -> LedgerTransaction {
  LedgerTransaction::resolve(&builder.to_wire_transaction(), |reference| {
    prior
      .filter(|(prior, _)| prior.reference == *reference)
      .map(|(prior, notary)| TransactionState {
        data: prior.state.clone().into(),
        notary: notary.clone(),
      })
  })
  .expect("all inputs are known")
}
