mod channel;
mod config;
mod network;
mod session;
mod wire;

pub use {
  bytes::Bytes,
  config::Config,
  network::{Dialer, Endpoint, Error, Network, PeerId},
  session::Session,
};
