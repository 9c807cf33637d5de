mod address;
mod amount;
mod b58;
mod campaign;
mod certificate;
mod command;
mod donation;
mod identifier;
mod ledger;
mod signed;
mod state;
mod transaction;
mod window;

pub use {
  address::{Address, Error as AddressError, Party},
  amount::{Amount, AmountError, Currency},
  b58::ToBase58String,
  campaign::Campaign,
  certificate::IdentityCertificate,
  command::{CampaignCommand, Command, CommandData, DonationCommand},
  donation::Donation,
  identifier::UniqueIdentifier,
  ledger::{InOutGroup, LedgerTransaction, ResolutionError},
  signed::{SignatureError, SignedTransaction, TransactionSignature},
  state::{
    ContractId,
    ContractState,
    LinearState,
    StateAndRef,
    StateKind,
    StateRef,
    TransactionState,
  },
  transaction::{TransactionBuilder, TxHash, WireTransaction},
  window::TimeWindow,
};

/// Re-exported so downstream crates sign and verify with the same
/// version of the curve implementation.
pub use ed25519_dalek::{Keypair, PublicKey, Signature};
