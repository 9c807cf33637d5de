use {
  common::{
    donation_parts,
    now,
    parties,
    usd,
    window_at,
    DonationParts,
    Parties,
  },
  crowdfund_contracts::{verify, Error, Violation},
  crowdfund_primitives::{Campaign, ContractId, Donation, Party, TimeWindow},
  time::Duration,
};

mod common;

type Tamper = Box<dyn Fn(&mut Campaign)>;

fn tamper(f: impl Fn(&mut Campaign) + 'static) -> Tamper {
  Box::new(f)
}

fn check(parties: &Parties, parts: &DonationParts) -> Result<(), Error> {
  verify(&parts.ledger(&parties.notary), now())
}

fn violation(parties: &Parties, parts: &DonationParts) -> Option<Violation> {
  check(parties, parts).err().map(|e| e.violation)
}

#[test]
fn donating_hundred_raises_hundred() -> anyhow::Result<()> {
  let parties = parties();
  let parts = donation_parts(&parties, usd(100));
  let tx = parts.ledger(&parties.notary);

  verify(&tx, now())?;

  let prior = tx.inputs_of::<Campaign>()[0];
  let updated = tx.outputs_of::<Campaign>()[0];
  let donation = tx.outputs_of::<Donation>()[0];
  assert_eq!(updated.raised, usd(100));
  assert_eq!(donation.amount, usd(100));
  assert_eq!(updated.raised.checked_sub(&prior.raised)?, donation.amount);
  assert_eq!(*updated, prior.with_raised(usd(100)));
  Ok(())
}

#[test]
fn verdict_is_deterministic() {
  let parties = parties();
  let parts = donation_parts(&parties, usd(100));
  let tx = parts.ledger(&parties.notary);
  assert_eq!(verify(&tx, now()), verify(&tx, now()));

  let mut late = donation_parts(&parties, usd(100));
  late.time_window = Some(window_at(now() + Duration::days(8)));
  let tx = late.ledger(&parties.notary);
  assert_eq!(verify(&tx, now()), verify(&tx, now() + Duration::days(30)));
}

#[test]
fn zero_donation_is_rejected() {
  let parties = parties();
  let parts = donation_parts(&parties, usd(0));
  assert_eq!(
    violation(&parties, &parts),
    Some(Violation::AmountNotPositive)
  );
}

#[test]
fn donation_after_deadline_is_rejected() {
  let parties = parties();
  let deadline = now() + Duration::days(7);

  for reference in [deadline, deadline + Duration::seconds(1)] {
    let mut parts = donation_parts(&parties, usd(100));
    parts.time_window = Some(window_at(reference));
    assert_eq!(
      violation(&parties, &parts),
      Some(Violation::DeadlineExceeded)
    );
  }

  let mut parts = donation_parts(&parties, usd(100));
  parts.time_window = Some(window_at(deadline - Duration::seconds(1)));
  assert_eq!(violation(&parties, &parts), None);
}

#[test]
fn donation_requires_closed_time_window() {
  let parties = parties();

  let mut parts = donation_parts(&parties, usd(100));
  parts.time_window = None;
  assert_eq!(
    violation(&parties, &parts),
    Some(Violation::TimeWindowRequired)
  );

  let mut parts = donation_parts(&parties, usd(100));
  parts.time_window = Some(TimeWindow::from_only(now()));
  assert_eq!(
    violation(&parties, &parts),
    Some(Violation::TimeWindowRequired)
  );
}

#[test]
fn raised_must_grow_by_donated_amount() -> anyhow::Result<()> {
  let parties = parties();

  let mut parts = donation_parts(&parties, usd(100));
  parts.updated.raised = usd(150);
  assert_eq!(
    violation(&parties, &parts),
    Some(Violation::RaisedNotUpdated)
  );

  let mut parts = donation_parts(&parties, usd(100));
  parts.updated.raised = "100 EUR".parse()?;
  assert_eq!(
    violation(&parties, &parts),
    Some(Violation::RaisedNotUpdated)
  );
  Ok(())
}

#[test]
fn campaign_fields_are_immutable() {
  let parties = parties();
  let other = Party::new("Mallory", parties.donor);

  let other_fundraiser = other.clone();
  let tampering: Vec<(Violation, Tamper)> = vec![
    (Violation::NameChanged, tamper(|c| c.name = "Other".into())),
    (Violation::TargetChanged, tamper(|c| c.target = usd(5000))),
    (
      Violation::FundraiserChanged,
      tamper(move |c| c.fundraiser = other_fundraiser.clone()),
    ),
    (
      Violation::RecipientChanged,
      tamper(move |c| c.recipient = other.clone()),
    ),
    (
      Violation::DeadlineChanged,
      tamper(|c| c.deadline += Duration::days(30)),
    ),
    (Violation::CategoryChanged, tamper(|c| c.category = "art".into())),
  ];

  for (expected, change) in tampering {
    let mut parts = donation_parts(&parties, usd(100));
    change(&mut parts.updated);
    let err = check(&parties, &parts).expect_err("tampered campaign");
    assert_eq!(err.contract, ContractId::Campaign);
    assert_eq!(err.violation, expected);
  }
}

#[test]
fn donation_must_reference_updated_campaign() {
  let parties = parties();
  let mut parts = donation_parts(&parties, usd(100));
  parts.donation.campaign_reference = Default::default();
  assert_eq!(
    violation(&parties, &parts),
    Some(Violation::CampaignReferenceMismatch)
  );
}

#[test]
fn donation_must_benefit_the_fundraiser() {
  let parties = parties();
  let mut parts = donation_parts(&parties, usd(100));
  parts.donation.beneficiary = parties.recipient.clone();
  parts.create_signers = vec![parties.donor, parties.recipient.owning_key];

  let error = check(&parties, &parts).expect_err("wrong beneficiary accepted");
  assert_eq!(error.contract, ContractId::Campaign);
  assert_eq!(error.violation, Violation::BeneficiaryNotFundraiser);
}

#[test]
fn campaign_id_cannot_change() {
  let parties = parties();
  let mut parts = donation_parts(&parties, usd(100));
  parts.updated.linear_id = Default::default();
  parts.donation.campaign_reference = parts.updated.linear_id.clone();
  assert_eq!(
    violation(&parties, &parts),
    Some(Violation::CampaignIdChanged)
  );
}

#[test]
fn only_the_fundraiser_accepts_donations() {
  let parties = parties();
  let signer_sets = [
    vec![parties.donor],
    vec![parties.fundraiser.owning_key, parties.donor],
    vec![parties.recipient.owning_key],
  ];

  for signers in signer_sets {
    let mut parts = donation_parts(&parties, usd(100));
    parts.accept_signers = signers;
    let err = check(&parties, &parts).expect_err("wrong signers");
    assert_eq!(err.contract, ContractId::Campaign);
    assert_eq!(err.violation, Violation::WrongSignerSet);
  }
}

#[test]
fn donation_needs_donor_and_fundraiser_signatures() {
  let parties = parties();
  let signer_sets = [
    vec![parties.donor],
    vec![parties.fundraiser.owning_key],
    vec![
      parties.donor,
      parties.fundraiser.owning_key,
      parties.recipient.owning_key,
    ],
  ];

  for signers in signer_sets {
    let mut parts = donation_parts(&parties, usd(100));
    parts.create_signers = signers;
    let err = check(&parties, &parts).expect_err("wrong signers");
    assert_eq!(err.contract, ContractId::Donation);
    assert_eq!(err.violation, Violation::WrongSignerSet);
  }
}

#[test]
fn structure_is_one_input_two_outputs() {
  let parties = parties();
  let parts = donation_parts(&parties, usd(100));
  let valid = parts.ledger(&parties.notary);

  let mut extra_output = valid.clone();
  extra_output.outputs.push(valid.outputs[1].clone());
  assert_eq!(
    verify(&extra_output, now()).map_err(|e| e.violation),
    Err(Violation::DonationOutputCount)
  );

  let mut no_input = valid.clone();
  no_input.inputs.clear();
  assert_eq!(
    verify(&no_input, now()).map_err(|e| e.violation),
    Err(Violation::DonationInputCount)
  );

  // two campaigns and no donation
  let mut wrong_kinds = valid.clone();
  wrong_kinds.outputs[1] = valid.outputs[0].clone();
  assert_eq!(
    verify(&wrong_kinds, now()).map_err(|e| e.violation),
    Err(Violation::DonationShape)
  );
}
