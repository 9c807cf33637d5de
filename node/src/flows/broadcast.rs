use {
  super::messages::{Committed, Delivery, BROADCAST},
  crate::{FlowError, ServiceHub},
  crowdfund_network::Session,
  crowdfund_primitives::{Party, SignedTransaction, ToBase58String},
  futures::future::join_all,
  tracing::{info, warn},
};

/// Result of delivering a transaction to one observer.
#[derive(Debug)]
pub struct BroadcastOutcome {
  pub recipient: Party,
  pub result: Result<(), FlowError>,
}

/// Nodes that should observe a transaction: everyone on the network
/// except notaries, participants of the transaction and this node.
pub fn observers(
  hub: &ServiceHub,
  stx: &SignedTransaction,
) -> Result<Vec<Party>, FlowError> {
  let participants = hub.participants(&stx.tx)?;
  Ok(
    hub
      .network_map
      .all_nodes()
      .into_iter()
      .filter(|node| !node.notary)
      .map(|node| node.party)
      .filter(|party| party != hub.party() && !participants.contains(party))
      .collect(),
  )
}

/// Sends a committed transaction to all observers.
///
/// Delivery is best-effort and independent per recipient, a failure
/// to reach one observer affects neither the others nor the
/// transaction itself.
pub async fn broadcast_transaction(
  hub: &ServiceHub,
  stx: &SignedTransaction,
) -> Result<Vec<BroadcastOutcome>, FlowError> {
  let recipients = observers(hub, stx)?;
  info!(
    tx = %stx.id().to_b58(),
    "broadcasting to {} observers",
    recipients.len()
  );

  let outcomes = join_all(recipients.into_iter().map(|recipient| async move {
    let result = send_to_observer(hub, &recipient, stx).await;
    if let Err(e) = &result {
      warn!("broadcast to {recipient} failed: {e}");
    }
    BroadcastOutcome { recipient, result }
  }))
  .await;

  Ok(outcomes)
}

async fn send_to_observer(
  hub: &ServiceHub,
  recipient: &Party,
  stx: &SignedTransaction,
) -> Result<(), FlowError> {
  let mut session = hub.initiate(recipient, BROADCAST)?;
  let message = Committed {
    stx: stx.clone(),
    dependencies: vec![],
  };
  match session.send_and_receive(&message).await? {
    Delivery::Recorded => Ok(()),
    Delivery::Rejected(reason) => Err(FlowError::CounterpartyRejected {
      party: recipient.name.clone(),
      reason,
    }),
  }
}

/// Observer side of a broadcast.
///
/// Observers only check that the transaction carries every required
/// signature, they do not run contracts and never become participants.
pub async fn record_as_observer(
  hub: &ServiceHub,
  mut session: Session,
) -> Result<(), FlowError> {
  let Committed { stx, .. } = session.receive().await?;
  let outcome = stx
    .verify_required_signatures()
    .map_err(FlowError::from)
    .and_then(|()| Ok(hub.vault.record(&stx)?));

  session.send(&match &outcome {
    Ok(_) => Delivery::Recorded,
    Err(e) => Delivery::Rejected(e.to_string()),
  })?;

  if outcome? {
    info!(
      tx = %stx.id().to_b58(),
      "recorded transaction as observer of {}",
      session.remote()
    );
  }
  Ok(())
}
