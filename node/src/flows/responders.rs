use {
  super::{
    broadcast::record_as_observer,
    donation::respond_to_donation,
    finality::receive_committed,
    messages::{BROADCAST, DONATION, FINALITY, NOTARISE},
  },
  crate::{
    notary::{NotariseRequest, NotariseResponse},
    FlowError,
    ServiceHub,
  },
  crowdfund_network::{Endpoint, Session},
  futures::StreamExt,
  std::sync::Arc,
  tracing::{debug, warn},
};

/// Runs a responder for every session other nodes open with this one.
///
/// Each session is handled on its own task so that a slow
/// counterparty never blocks the others.
pub async fn dispatch(hub: Arc<ServiceHub>, mut endpoint: Endpoint) {
  while let Some(session) = endpoint.next().await {
    let hub = Arc::clone(&hub);
    tokio::spawn(async move {
      let protocol = session.protocol().to_owned();
      let remote = session.remote().clone();
      debug!("{} accepted {protocol} from {remote}", hub.party());
      if let Err(e) = respond(&hub, session).await {
        warn!("{protocol} responder for {remote} failed: {e}");
      }
    });
  }
}

async fn respond(hub: &ServiceHub, session: Session) -> Result<(), FlowError> {
  match session.protocol() {
    DONATION => respond_to_donation(hub, session).await,
    FINALITY => receive_committed(hub, session).await,
    BROADCAST => record_as_observer(hub, session).await,
    NOTARISE => notarise(hub, session).await,
    other => Err(FlowError::protocol(
      session.remote(),
      format!("unsupported protocol {other}"),
    )),
  }
}

async fn notarise(hub: &ServiceHub, mut session: Session) -> Result<(), FlowError> {
  let Some(notary) = &hub.notary else {
    return Err(FlowError::protocol(session.remote(), "this node is not a notary"));
  };

  let NotariseRequest { stx } = session.receive().await?;
  let response = match notary.notarise(&stx, &hub.keys) {
    Ok(signature) => NotariseResponse::Signed(signature),
    Err(error) => {
      warn!("notarisation request from {} rejected: {error}", session.remote());
      NotariseResponse::Rejected(error)
    }
  };
  session.send(&response)?;
  Ok(())
}
