//! A crowdfunding node.
//!
//! Nodes keep the campaigns and donations they take part in or observe
//! in a vault, agree on new versions of them by collecting signatures
//! from every required party, and rely on a notary to make sure no
//! campaign version is consumed twice.

mod clock;
mod connection;
mod error;
pub mod flows;
mod hub;
mod identity;
mod keys;
mod network_map;
mod node;
mod notary;
mod rpc;
mod storage;
mod vault;

pub use {
  clock::{Clock, ManualClock, SystemClock},
  connection::{ConnectionError, RetryConfig},
  error::FlowError,
  hub::ServiceHub,
  identity::{IdentityError, IdentityService},
  keys::{KeyError, KeyManagementService},
  network_map::{NetworkMap, NodeInfo},
  node::{Cluster, Node, NodeConfig, NodeError, NodeRegistry},
  notary::{NotaryError, NotaryService},
  rpc::{CampaignProposal, CrowdfundRpc, DonationProposal},
  storage::{InMemoryStorage, OnDiskStorage, Storage, StorageError},
  vault::Vault,
};
