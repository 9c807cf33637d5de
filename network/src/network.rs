use {
  crate::{channel::Channel, session::Session, Config},
  futures::Stream,
  metrics::increment_counter,
  parking_lot::RwLock,
  serde::{Deserialize, Serialize},
  std::{
    collections::HashMap,
    fmt::Display,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
  },
  thiserror::Error,
  tokio::sync::mpsc::UnboundedSender,
  tracing::{debug, info, warn},
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("Peer {0} already joined the network")]
  PeerAlreadyJoined(PeerId),

  #[error("Peer {0} is not reachable")]
  Unreachable(PeerId),

  #[error("Session with {0} was closed by the counterparty")]
  SessionClosed(PeerId),

  #[error("Timed out waiting for a message from {0}")]
  Timeout(PeerId),

  #[error("Message of {0} bytes exceeds the max transmit size of {1} bytes")]
  MessageTooLarge(usize, usize),

  #[error("Serialization error: {0}")]
  Encode(#[from] rmp_serde::encode::Error),

  #[error("Deserialization error: {0}")]
  Decode(#[from] rmp_serde::decode::Error),
}

/// Name under which a node is reachable on the network.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PeerId(String);

impl PeerId {
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Display for PeerId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for PeerId {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

impl From<String> for PeerId {
  fn from(value: String) -> Self {
    Self(value)
  }
}

struct Shared {
  config: Config,
  peers: RwLock<HashMap<PeerId, UnboundedSender<Session>>>,
}

/// This type is the entrypoint to using the network API.
///
/// It holds network-wide configuration and the registry of all
/// peers that have joined. Cloning it is cheap, all clones refer
/// to the same network.
///
/// Peers interact with each other through [`Endpoint`]s acquired
/// by calling [`Network::join`]. All communication happens over
/// point-to-point [`Session`]s that are reliable and ordered.
#[derive(Clone)]
pub struct Network {
  shared: Arc<Shared>,
}

impl Default for Network {
  fn default() -> Self {
    Self::new(Config::default())
  }
}

impl Network {
  pub fn new(config: Config) -> Self {
    Self {
      shared: Arc::new(Shared {
        config,
        peers: RwLock::new(HashMap::new()),
      }),
    }
  }

  pub fn config(&self) -> &Config {
    &self.shared.config
  }

  /// Joins the network under the given name.
  ///
  /// The returned endpoint is used to open sessions with other peers
  /// and yields sessions opened by them. The peer stays on the network
  /// until its endpoint is dropped.
  pub fn join(&self, peer: impl Into<PeerId>) -> Result<Endpoint, Error> {
    let peer = peer.into();
    let inbound = Channel::new();

    let mut peers = self.shared.peers.write();
    if peers.contains_key(&peer) {
      return Err(Error::PeerAlreadyJoined(peer));
    }
    peers.insert(peer.clone(), inbound.sender());
    drop(peers);

    info!("{peer} joined the network");
    Ok(Endpoint {
      dialer: Dialer {
        peer,
        network: self.clone(),
      },
      inbound,
    })
  }

  /// Names of all peers currently on the network.
  pub fn peers(&self) -> Vec<PeerId> {
    let mut peers: Vec<_> = self.shared.peers.read().keys().cloned().collect();
    peers.sort();
    peers
  }

  pub fn is_joined(&self, peer: &PeerId) -> bool {
    self.shared.peers.read().contains_key(peer)
  }

  fn leave(&self, peer: &PeerId, inbound: &UnboundedSender<Session>) {
    let mut peers = self.shared.peers.write();
    // a newer endpoint might have rejoined under the same name
    if let Some(registered) = peers.get(peer) {
      if registered.same_channel(inbound) {
        peers.remove(peer);
        info!("{peer} left the network");
      }
    }
  }
}

/// A peer's presence on the network.
///
/// Inbound sessions opened by other peers are consumed by polling this
/// type as a [`Stream`].
pub struct Endpoint {
  dialer: Dialer,
  inbound: Channel<Session>,
}

impl Endpoint {
  pub fn peer(&self) -> &PeerId {
    &self.dialer.peer
  }

  pub fn network(&self) -> &Network {
    &self.dialer.network
  }

  /// A handle for opening sessions on behalf of this endpoint
  /// that can be used while the endpoint itself is being polled
  /// for inbound sessions.
  pub fn dialer(&self) -> Dialer {
    self.dialer.clone()
  }

  pub fn initiate(
    &self,
    peer: &PeerId,
    protocol: &str,
  ) -> Result<Session, Error> {
    self.dialer.initiate(peer, protocol)
  }
}

impl Drop for Endpoint {
  fn drop(&mut self) {
    self
      .dialer
      .network
      .leave(&self.dialer.peer, &self.inbound.sender());
  }
}

/// Opens outbound sessions in the name of one peer.
#[derive(Clone)]
pub struct Dialer {
  peer: PeerId,
  network: Network,
}

impl Dialer {
  pub fn peer(&self) -> &PeerId {
    &self.peer
  }

  /// Opens a new session with a peer for the given protocol.
  ///
  /// Fails immediately when the peer is not on the network.
  pub fn initiate(
    &self,
    peer: &PeerId,
    protocol: &str,
  ) -> Result<Session, Error> {
    let remote_inbound = self.network.shared.peers.read().get(peer).cloned();
    let Some(remote_inbound) = remote_inbound else {
      warn!("{} failed to open {protocol} with {peer}", self.peer);
      return Err(Error::Unreachable(peer.clone()));
    };

    let (local, remote) = Session::pair(
      self.peer.clone(),
      peer.clone(),
      protocol,
      self.network.config(),
    );

    if remote_inbound.send(remote).is_err() {
      warn!("{peer} went away before accepting {protocol}");
      return Err(Error::Unreachable(peer.clone()));
    }

    increment_counter!("sessions_opened", "protocol" => protocol.to_owned());
    debug!("{} opened {protocol} session with {peer}", self.peer);
    Ok(local)
  }
}

impl Stream for Endpoint {
  type Item = Session;

  fn poll_next(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    self.inbound.poll_recv(cx)
  }
}
