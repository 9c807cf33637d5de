//! Encoding of session payloads on the wire.
//!
//! Every message exchanged on a session is a self-contained msgpack
//! document. Framing is provided by the underlying channel, so there
//! is no length prefix.

use {
  crate::network::Error,
  bytes::Bytes,
  serde::{de::DeserializeOwned, Serialize},
};

pub(crate) fn encode<T: Serialize>(
  value: &T,
  max_transmit_size: usize,
) -> Result<Bytes, Error> {
  let bytes = rmp_serde::to_vec(value)?;
  if bytes.len() > max_transmit_size {
    return Err(Error::MessageTooLarge(bytes.len(), max_transmit_size));
  }
  Ok(bytes.into())
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &Bytes) -> Result<T, Error> {
  Ok(rmp_serde::from_slice(bytes)?)
}
