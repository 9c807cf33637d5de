use {
  super::messages::{Committed, Delivery, FINALITY, NOTARISE},
  crate::{
    notary::{NotariseRequest, NotariseResponse},
    FlowError,
    ServiceHub,
  },
  crowdfund_network::Session,
  crowdfund_primitives::{
    Party,
    SignatureError,
    SignedTransaction,
    ToBase58String,
    TransactionSignature,
  },
  futures::future::join_all,
  tracing::{info, warn},
};

/// Commits a fully signed transaction.
///
/// The transaction is notarised if it consumes states or carries a
/// time window, then recorded in the local vault and delivered to all
/// other participants. Once this returns the transaction is final,
/// a participant that cannot be reached does not undo it.
pub async fn finalise(
  hub: &ServiceHub,
  stx: SignedTransaction,
  dependencies: &[SignedTransaction],
) -> Result<SignedTransaction, FlowError> {
  let notary = stx.tx.notary.clone().ok_or(FlowError::NoNotary)?;
  let stx = if stx.tx.required_signing_keys().contains(&notary.owning_key) {
    let signature = notarise(hub, &notary, &stx).await?;
    stx.with_additional_signature(signature)
  } else {
    stx
  };

  stx.verify_required_signatures()?;
  hub.vault.record(&stx)?;
  info!(tx = %stx.id().to_b58(), "transaction committed");

  let participants = hub.participants(&stx.tx)?;
  let committed = &stx;
  let deliveries = participants
    .iter()
    .filter(|party| *party != hub.party())
    .map(|party| async move {
      (party, deliver(hub, party, committed, dependencies).await)
    });

  for (party, result) in join_all(deliveries).await {
    if let Err(e) = result {
      warn!(
        "failed to deliver committed transaction {} to {party}: {e}",
        stx.id().to_b58()
      );
    }
  }

  Ok(stx)
}

async fn notarise(
  hub: &ServiceHub,
  notary: &Party,
  stx: &SignedTransaction,
) -> Result<TransactionSignature, FlowError> {
  let mut session = hub.initiate(notary, NOTARISE)?;
  let request = NotariseRequest { stx: stx.clone() };
  match session.send_and_receive(&request).await? {
    NotariseResponse::Signed(signature) => {
      if signature.by != notary.owning_key || !signature.is_valid_for(stx.id())
      {
        return Err(
          SignatureError::Invalid(signature.by, stx.id().to_b58()).into(),
        );
      }
      Ok(signature)
    }
    NotariseResponse::Rejected(error) => Err(error.into()),
  }
}

async fn deliver(
  hub: &ServiceHub,
  party: &Party,
  stx: &SignedTransaction,
  dependencies: &[SignedTransaction],
) -> Result<(), FlowError> {
  let mut session = hub.initiate(party, FINALITY)?;
  let message = Committed {
    stx: stx.clone(),
    dependencies: dependencies.to_vec(),
  };
  match session.send_and_receive(&message).await? {
    Delivery::Recorded => Ok(()),
    Delivery::Rejected(reason) => Err(FlowError::CounterpartyRejected {
      party: party.name.clone(),
      reason,
    }),
  }
}

/// Participant side of finality: checks and records a transaction
/// committed by another participant.
pub async fn receive_committed(
  hub: &ServiceHub,
  mut session: Session,
) -> Result<(), FlowError> {
  let Committed { stx, dependencies } = session.receive().await?;
  let outcome = record_committed(hub, &stx, &dependencies);
  session.send(&match &outcome {
    Ok(()) => Delivery::Recorded,
    Err(e) => Delivery::Rejected(e.to_string()),
  })?;
  outcome
}

fn record_committed(
  hub: &ServiceHub,
  stx: &SignedTransaction,
  dependencies: &[SignedTransaction],
) -> Result<(), FlowError> {
  hub.record_dependencies(dependencies)?;
  stx.verify_required_signatures()?;
  hub.verify(&stx.tx)?;
  if hub.vault.record(stx)? {
    info!(tx = %stx.id().to_b58(), "recorded transaction as participant");
  }
  Ok(())
}
