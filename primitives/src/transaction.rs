use {
  crate::{
    b58::ToBase58String,
    Address,
    Command,
    ContractState,
    Party,
    StateAndRef,
    StateRef,
    TimeWindow,
    TransactionState,
  },
  multihash::{Hasher, Multihash, MultihashDigest, Sha3_256},
  once_cell::sync::OnceCell,
  serde::{Deserialize, Serialize},
  std::collections::BTreeSet,
};

/// Hash that uniquely identifies a transaction.
pub type TxHash = Multihash;

/// The unsigned content of a transaction as it travels on the wire.
///
/// Inputs are only references to outputs of earlier transactions, so
/// they need to be resolved against a vault before contracts can be
/// evaluated (see [`crate::LedgerTransaction`]).
#[derive(Clone, Serialize, Deserialize)]
pub struct WireTransaction {
  pub inputs: Vec<StateRef>,
  pub outputs: Vec<TransactionState>,
  pub commands: Vec<Command>,
  pub notary: Option<Party>,
  pub time_window: Option<TimeWindow>,

  /// Makes the id of two transactions with identical
  /// content different.
  pub salt: [u8; 16],

  #[serde(skip)]
  hash_cache: OnceCell<TxHash>,
}

impl WireTransaction {
  pub fn new(
    inputs: Vec<StateRef>,
    outputs: Vec<TransactionState>,
    commands: Vec<Command>,
    notary: Option<Party>,
    time_window: Option<TimeWindow>,
  ) -> Self {
    Self {
      inputs,
      outputs,
      commands,
      notary,
      time_window,
      salt: rand::random(),
      hash_cache: OnceCell::new(),
    }
  }

  /// Hash of the transaction contents, this is the message that
  /// all signers sign.
  pub fn id(&self) -> &TxHash {
    self.hash_cache.get_or_init(|| {
      let mut hasher = Sha3_256::default();
      hasher.update(
        &rmp_serde::to_vec(self).expect("in-memory transaction serializes"),
      );
      multihash::Code::Sha3_256
        .wrap(hasher.finalize())
        .expect("sha3-256 digest fits in a multihash")
    })
  }

  /// All keys that must sign this transaction before it can be
  /// committed.
  ///
  /// Those are the signers of every command, and the notary whenever
  /// there are inputs to consume or a time window to attest.
  pub fn required_signing_keys(&self) -> BTreeSet<Address> {
    let mut keys: BTreeSet<_> = self
      .commands
      .iter()
      .flat_map(|cmd| cmd.signers.iter().copied())
      .collect();

    if !self.inputs.is_empty() || self.time_window.is_some() {
      if let Some(notary) = &self.notary {
        keys.insert(notary.owning_key);
      }
    }
    keys
  }

  /// Reference to the output at the given position.
  pub fn output_ref(&self, index: usize) -> StateRef {
    StateRef {
      txhash: *self.id(),
      index: index as u32,
    }
  }

  pub fn out_ref(&self, index: usize) -> Option<StateAndRef> {
    self.outputs.get(index).map(|output| StateAndRef {
      state: output.data.clone(),
      reference: self.output_ref(index),
    })
  }
}

impl core::fmt::Debug for WireTransaction {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("WireTransaction")
      .field("id", &self.id().to_b58())
      .field("inputs", &self.inputs)
      .field("outputs", &self.outputs)
      .field("commands", &self.commands)
      .field("notary", &self.notary)
      .field("time_window", &self.time_window)
      .finish()
  }
}

/// Accumulates the components of a transaction.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
  notary: Party,
  inputs: Vec<StateRef>,
  outputs: Vec<TransactionState>,
  commands: Vec<Command>,
  time_window: Option<TimeWindow>,
}

impl TransactionBuilder {
  pub fn new(notary: Party) -> Self {
    Self {
      notary,
      inputs: vec![],
      outputs: vec![],
      commands: vec![],
      time_window: None,
    }
  }

  pub fn add_input_state<T>(&mut self, input: &StateAndRef<T>) -> &mut Self {
    self.inputs.push(input.reference);
    self
  }

  pub fn add_output_state(
    &mut self,
    state: impl Into<ContractState>,
  ) -> &mut Self {
    self.outputs.push(TransactionState {
      data: state.into(),
      notary: self.notary.clone(),
    });
    self
  }

  pub fn add_command(&mut self, command: Command) -> &mut Self {
    self.commands.push(command);
    self
  }

  pub fn set_time_window(&mut self, window: TimeWindow) -> &mut Self {
    self.time_window = Some(window);
    self
  }

  pub fn to_wire_transaction(&self) -> WireTransaction {
    WireTransaction::new(
      self.inputs.clone(),
      self.outputs.clone(),
      self.commands.clone(),
      Some(self.notary.clone()),
      self.time_window,
    )
  }
}
