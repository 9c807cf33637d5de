//! Protocols spoken between nodes and the messages they exchange.

use {
  crowdfund_primitives::{
    Address,
    IdentityCertificate,
    SignedTransaction,
    TransactionSignature,
  },
  serde::{Deserialize, Serialize},
};

/// Donor asks the fundraiser to counter-sign a donation.
pub const DONATION: &str = "crowdfund/donation/1";

/// A participant delivers a notarised transaction to other participants.
pub const FINALITY: &str = "crowdfund/finality/1";

/// A committed transaction is sent to observers for passive recording.
pub const BROADCAST: &str = "crowdfund/broadcast/1";

/// A fully signed transaction is submitted to the notary.
pub const NOTARISE: &str = "crowdfund/notarise/1";

#[derive(Debug, Serialize, Deserialize)]
pub enum IdentitySync {
  /// Anonymous keys used in the transaction that the sender can vouch for.
  Offer(Vec<Address>),

  /// Offered keys the receiver cannot link to a well-known party.
  Request(Vec<Address>),

  Certificates(Vec<IdentityCertificate>),

  Ack,
}

/// A candidate transaction together with the transactions
/// that produced its inputs.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignRequest {
  pub stx: SignedTransaction,
  pub dependencies: Vec<SignedTransaction>,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum SignResponse {
  Signed(Vec<TransactionSignature>),
  Rejected(String),
}

/// A notarised transaction sent to a participant or an observer.
#[derive(Debug, Serialize, Deserialize)]
pub struct Committed {
  pub stx: SignedTransaction,
  pub dependencies: Vec<SignedTransaction>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delivery {
  Recorded,
  Rejected(String),
}

/// Whether the fundraiser should relay a donation to observers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BroadcastRequest(pub bool);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack;
