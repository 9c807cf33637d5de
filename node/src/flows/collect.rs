use {
  super::messages::{SignRequest, SignResponse},
  crate::{FlowError, ServiceHub},
  crowdfund_network::{PeerId, Session},
  crowdfund_primitives::{
    Address,
    SignatureError,
    SignedTransaction,
    ToBase58String,
    TransactionSignature,
  },
  std::collections::BTreeSet,
  tracing::{info, warn},
};

/// Sends a candidate to a counter-signer and appends the signatures
/// it returns.
///
/// Only signatures by `expected` keys that are valid for the candidate
/// are accepted, anything else fails the whole collection.
pub async fn collect_signatures(
  session: &mut Session,
  stx: SignedTransaction,
  dependencies: Vec<SignedTransaction>,
  expected: &BTreeSet<Address>,
) -> Result<SignedTransaction, FlowError> {
  let request = SignRequest {
    stx: stx.clone(),
    dependencies,
  };

  match session.send_and_receive(&request).await? {
    SignResponse::Rejected(reason) => Err(FlowError::CounterpartyRejected {
      party: session.remote().to_string(),
      reason,
    }),
    SignResponse::Signed(signatures) => {
      for signature in &signatures {
        if !expected.contains(&signature.by) {
          return Err(FlowError::protocol(
            session.remote(),
            format!("unexpected signature by {}", signature.by),
          ));
        }
        if !signature.is_valid_for(stx.id()) {
          return Err(
            SignatureError::Invalid(signature.by, stx.id().to_b58()).into(),
          );
        }
      }
      info!(
        "collected {} signatures from {} on {}",
        signatures.len(),
        session.remote(),
        stx.id().to_b58()
      );
      Ok(stx.with_additional_signatures(signatures))
    }
  }
}

/// Counter-signer side of signature collection.
///
/// Runs the same checks the proposer ran on the exact candidate it
/// received and signs it with every required key this node owns.
/// A rejection is reported back to the proposer before returning.
pub async fn sign_transaction(
  hub: &ServiceHub,
  session: &mut Session,
) -> Result<SignedTransaction, FlowError> {
  let request: SignRequest = session.receive().await?;
  match check_and_sign(hub, session.remote(), request) {
    Ok((stx, signatures)) => {
      session.send(&SignResponse::Signed(signatures))?;
      Ok(stx)
    }
    Err(error) => {
      warn!("refusing to sign for {}: {error}", session.remote());
      if let Err(e) = session.send(&SignResponse::Rejected(error.to_string())) {
        warn!("could not deliver rejection to {}: {e}", session.remote());
      }
      Err(error)
    }
  }
}

fn check_and_sign(
  hub: &ServiceHub,
  proposer: &PeerId,
  request: SignRequest,
) -> Result<(SignedTransaction, Vec<TransactionSignature>), FlowError> {
  let SignRequest { stx, dependencies } = request;
  hub.record_dependencies(&dependencies)?;

  let required = stx.tx.required_signing_keys();
  let notary = stx.tx.notary.as_ref().map(|notary| notary.owning_key);
  let ours = hub.keys.filter_owned(&required);
  if ours.is_empty() {
    return Err(FlowError::protocol(
      proposer,
      "asked for a signature by a key this node does not own",
    ));
  }

  // the proposer signs before asking anyone else
  let mut allowed_missing = ours.clone();
  allowed_missing.extend(notary);
  stx.verify_signatures_except(&allowed_missing)?;

  for key in required.iter().filter(|key| Some(**key) != notary) {
    hub.identities.require_well_known_party(key)?;
  }

  hub.verify(&stx.tx)?;

  let signatures = ours
    .iter()
    .map(|key| hub.keys.sign(stx.id(), key))
    .collect::<Result<Vec<_>, _>>()?;

  Ok((stx.with_additional_signatures(signatures.clone()), signatures))
}
