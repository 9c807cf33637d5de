use {
  crate::{channel::Channel, network::Error, wire, Config, PeerId},
  bytes::Bytes,
  metrics::increment_counter,
  serde::{de::DeserializeOwned, Serialize},
  std::{fmt::Debug, time::Duration},
  tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender},
  tracing::trace,
};

/// A reliable, ordered, bidirectional conversation between two peers.
///
/// Sessions are created in pairs, one half is returned to the peer
/// that called [`crate::Endpoint::initiate`], the other is delivered
/// to the counterparty's endpoint stream. Dropping one half closes
/// the session, pending receives on the other half then fail with
/// [`Error::SessionClosed`] once all buffered messages are consumed.
pub struct Session {
  local: PeerId,
  remote: PeerId,
  protocol: String,
  timeout: Duration,
  max_transmit_size: usize,
  tx: UnboundedSender<Bytes>,
  rx: UnboundedReceiver<Bytes>,
}

impl Session {
  pub(crate) fn pair(
    initiator: PeerId,
    responder: PeerId,
    protocol: &str,
    config: &Config,
  ) -> (Self, Self) {
    let (to_responder, from_initiator) = Channel::new().split();
    let (to_initiator, from_responder) = Channel::new().split();

    let make = |local: &PeerId,
                remote: &PeerId,
                tx: UnboundedSender<Bytes>,
                rx: UnboundedReceiver<Bytes>| Self {
      local: local.clone(),
      remote: remote.clone(),
      protocol: protocol.to_owned(),
      timeout: config.session_timeout,
      max_transmit_size: config.max_transmit_size,
      tx,
      rx,
    };

    (
      make(&initiator, &responder, to_responder, from_responder),
      make(&responder, &initiator, to_initiator, from_initiator),
    )
  }

  pub fn local(&self) -> &PeerId {
    &self.local
  }

  pub fn remote(&self) -> &PeerId {
    &self.remote
  }

  pub fn protocol(&self) -> &str {
    &self.protocol
  }

  /// Sends one message to the counterparty.
  pub fn send<T: Serialize>(&self, message: &T) -> Result<(), Error> {
    let bytes = wire::encode(message, self.max_transmit_size)?;
    trace!(
      "{} -> {} [{}]: {} bytes",
      self.local,
      self.remote,
      self.protocol,
      bytes.len()
    );
    self
      .tx
      .send(bytes)
      .map_err(|_| Error::SessionClosed(self.remote.clone()))?;
    increment_counter!("session_messages_sent");
    Ok(())
  }

  /// Waits for the next message from the counterparty.
  ///
  /// Fails if the counterparty closes the session or does not send
  /// anything within the configured session timeout.
  pub async fn receive<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
    match tokio::time::timeout(self.timeout, self.rx.recv()).await {
      Ok(Some(bytes)) => {
        increment_counter!("session_messages_received");
        wire::decode(&bytes)
      }
      Ok(None) => Err(Error::SessionClosed(self.remote.clone())),
      Err(_) => Err(Error::Timeout(self.remote.clone())),
    }
  }

  pub async fn send_and_receive<T, R>(&mut self, message: &T) -> Result<R, Error>
  where
    T: Serialize,
    R: DeserializeOwned,
  {
    self.send(message)?;
    self.receive().await
  }
}

impl Debug for Session {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Session")
      .field("local", &self.local)
      .field("remote", &self.remote)
      .field("protocol", &self.protocol)
      .finish()
  }
}

impl Drop for Session {
  fn drop(&mut self) {
    increment_counter!("sessions_closed");
  }
}
