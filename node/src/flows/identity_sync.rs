//! Disclosure of anonymous keys to counterparties.
//!
//! A proposer that signs with a fresh key tells the counter-signer
//! which well-known party is behind it, so the counter-signer can
//! tell who it is dealing with. The certificates never leave this
//! exchange, other nodes only ever see the anonymous key.

use {
  super::messages::IdentitySync,
  crate::{FlowError, ServiceHub},
  crowdfund_network::Session,
  crowdfund_primitives::{Address, WireTransaction},
  std::collections::BTreeSet,
  tracing::debug,
};

/// Anonymous keys of this node that appear in a transaction.
fn anonymous_keys(hub: &ServiceHub, tx: &WireTransaction) -> Vec<Address> {
  let signers = tx.commands.iter().flat_map(|cmd| cmd.signers.iter());
  let participants: Vec<_> = tx
    .outputs
    .iter()
    .flat_map(|output| output.data.participants())
    .collect();

  signers
    .chain(participants.iter())
    .filter(|key| hub.keys.is_fresh(key))
    .copied()
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Proposer side: offers certificates for the anonymous keys used
/// in the transaction to the counterparty.
pub async fn send(
  hub: &ServiceHub,
  session: &mut Session,
  tx: &WireTransaction,
) -> Result<(), FlowError> {
  let offered = anonymous_keys(hub, tx);
  session.send(&IdentitySync::Offer(offered.clone()))?;

  let requested = match session.receive().await? {
    IdentitySync::Request(keys) => keys,
    other => {
      return Err(FlowError::protocol(
        session.remote(),
        format!("expected identity request, got {other:?}"),
      ))
    }
  };

  let certificates: Vec<_> = requested
    .iter()
    .filter(|key| offered.contains(key))
    .filter_map(|key| hub.keys.certificate(key))
    .collect();
  debug!(
    "disclosing {} of {} anonymous keys to {}",
    certificates.len(),
    offered.len(),
    session.remote()
  );
  session.send(&IdentitySync::Certificates(certificates))?;

  match session.receive().await? {
    IdentitySync::Ack => Ok(()),
    other => Err(FlowError::protocol(
      session.remote(),
      format!("expected identity ack, got {other:?}"),
    )),
  }
}

/// Counter-signer side: learns who is behind the offered keys.
pub async fn receive(
  hub: &ServiceHub,
  session: &mut Session,
) -> Result<(), FlowError> {
  let offered = match session.receive().await? {
    IdentitySync::Offer(keys) => keys,
    other => {
      return Err(FlowError::protocol(
        session.remote(),
        format!("expected identity offer, got {other:?}"),
      ))
    }
  };

  let unknown: Vec<_> = offered
    .into_iter()
    .filter(|key| !hub.identities.is_known(key))
    .collect();
  session.send(&IdentitySync::Request(unknown.clone()))?;

  let certificates = match session.receive().await? {
    IdentitySync::Certificates(certificates) => certificates,
    other => {
      return Err(FlowError::protocol(
        session.remote(),
        format!("expected certificates, got {other:?}"),
      ))
    }
  };

  for certificate in &certificates {
    if !unknown.contains(&certificate.anonymous) {
      return Err(FlowError::protocol(
        session.remote(),
        format!("unsolicited certificate for {}", certificate.anonymous),
      ));
    }
    hub.identities.register(certificate)?;
  }

  session.send(&IdentitySync::Ack)?;
  Ok(())
}
