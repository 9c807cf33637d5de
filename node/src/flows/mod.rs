//! Protocols that move transactions between nodes.
//!
//! Initiating flows ([`StartCampaign`], [`MakeDonation`]) run on the
//! node that proposes a transaction, responders run on nodes that are
//! asked to sign, record or observe it.

mod broadcast;
mod collect;
mod donation;
mod finality;
pub mod identity_sync;
pub mod messages;
mod progress;
mod responders;
mod start_campaign;

pub use {
  broadcast::{broadcast_transaction, observers, BroadcastOutcome},
  collect::collect_signatures,
  donation::MakeDonation,
  progress::{Progress, ProgressError, Step},
  start_campaign::StartCampaign,
};

pub(crate) use responders::dispatch;

/// How far the time window of a proposed transaction
/// reaches before and after the proposer's clock.
pub const TIME_TOLERANCE: time::Duration = time::Duration::seconds(30);
