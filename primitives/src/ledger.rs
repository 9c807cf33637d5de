use {
  crate::{
    Command,
    ContractId,
    ContractState,
    Party,
    StateAndRef,
    StateKind,
    StateRef,
    TimeWindow,
    TransactionState,
    TxHash,
    UniqueIdentifier,
    WireTransaction,
  },
  std::collections::{BTreeMap, BTreeSet},
  thiserror::Error,
};

#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
  #[error("Input state {0} is unknown to this node")]
  UnknownState(StateRef),
}

/// A transaction with all its inputs resolved to the states they
/// point to. This is the form contracts are evaluated against.
#[derive(Debug, Clone)]
pub struct LedgerTransaction {
  pub id: TxHash,
  pub inputs: Vec<StateAndRef>,
  pub outputs: Vec<TransactionState>,
  pub commands: Vec<Command>,
  pub notary: Option<Party>,
  pub time_window: Option<TimeWindow>,
}

/// Versions of one linear entity that are consumed and produced
/// by a transaction.
#[derive(Debug)]
pub struct InOutGroup<'a, T> {
  pub grouping_key: UniqueIdentifier,
  pub inputs: Vec<&'a T>,
  pub outputs: Vec<&'a T>,
}

impl LedgerTransaction {
  /// Resolves all input references of a wire transaction using
  /// the given lookup function.
  pub fn resolve(
    tx: &WireTransaction,
    lookup: impl Fn(&StateRef) -> Option<TransactionState>,
  ) -> Result<Self, ResolutionError> {
    let mut inputs = Vec::with_capacity(tx.inputs.len());
    for reference in &tx.inputs {
      match lookup(reference) {
        Some(state) => inputs.push(StateAndRef {
          state: state.data,
          reference: *reference,
        }),
        None => return Err(ResolutionError::UnknownState(*reference)),
      }
    }

    Ok(Self {
      id: *tx.id(),
      inputs,
      outputs: tx.outputs.clone(),
      commands: tx.commands.clone(),
      notary: tx.notary.clone(),
      time_window: tx.time_window,
    })
  }

  pub fn input_states(&self) -> impl Iterator<Item = &ContractState> {
    self.inputs.iter().map(|i| &i.state)
  }

  pub fn output_states(&self) -> impl Iterator<Item = &ContractState> {
    self.outputs.iter().map(|o| &o.data)
  }

  pub fn inputs_of<T: StateKind>(&self) -> Vec<&T> {
    self.input_states().filter_map(T::from_state).collect()
  }

  pub fn outputs_of<T: StateKind>(&self) -> Vec<&T> {
    self.output_states().filter_map(T::from_state).collect()
  }

  /// Groups consumed and produced states of one kind by their linear id.
  pub fn group_states<T: StateKind>(&self) -> Vec<InOutGroup<'_, T>> {
    let mut groups = BTreeMap::<UniqueIdentifier, (Vec<&T>, Vec<&T>)>::new();
    for input in self.inputs_of::<T>() {
      groups
        .entry(input.linear_id().clone())
        .or_default()
        .0
        .push(input);
    }
    for output in self.outputs_of::<T>() {
      groups
        .entry(output.linear_id().clone())
        .or_default()
        .1
        .push(output);
    }

    groups
      .into_iter()
      .map(|(grouping_key, (inputs, outputs))| InOutGroup {
        grouping_key,
        inputs,
        outputs,
      })
      .collect()
  }

  pub fn commands_of(&self, contract: ContractId) -> Vec<&Command> {
    self
      .commands
      .iter()
      .filter(|cmd| cmd.value.contract() == contract)
      .collect()
  }

  /// Contracts governing any of the consumed or produced states.
  pub fn contracts(&self) -> BTreeSet<ContractId> {
    self
      .input_states()
      .chain(self.output_states())
      .map(ContractState::contract)
      .collect()
  }
}
