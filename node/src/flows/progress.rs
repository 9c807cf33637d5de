use {
  metrics::increment_counter,
  std::fmt::Display,
  thiserror::Error,
  tracing::{info, warn},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{flow} cannot move from {from:?} to {to:?}")]
pub struct ProgressError {
  pub flow: &'static str,
  pub from: Step,
  pub to: Step,
}

/// Steps of a flow that proposes a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
  /// The candidate transaction was assembled and verified locally.
  Built,

  /// The proposer signed the candidate with its own keys.
  LocallySigned,

  /// Anonymous keys were disclosed to the counter-signers.
  IdentitiesSynced,

  /// Waiting for counter-signers to sign.
  AwaitingCounterSignatures,

  /// Every required key other than the notary has signed.
  FullySigned,

  /// The notary committed the transaction.
  Finalized,

  /// The transaction is being sent to observers.
  Broadcast,

  Done,
  Aborted,
}

impl Step {
  pub fn is_terminal(self) -> bool {
    matches!(self, Step::Done | Step::Aborted)
  }

  /// The transaction is final from this step on, whatever
  /// happens to the rest of the flow.
  pub fn is_committed(self) -> bool {
    matches!(self, Step::Finalized | Step::Broadcast | Step::Done)
  }

  pub fn can_advance_to(self, next: Step) -> bool {
    use Step::*;
    match (self, next) {
      (from, Aborted) => !from.is_terminal() && !from.is_committed(),
      (Built, LocallySigned) => true,
      (LocallySigned, IdentitiesSynced) => true,
      // no counterparty to sync with or collect from
      (LocallySigned, FullySigned) => true,
      (IdentitiesSynced, AwaitingCounterSignatures) => true,
      (AwaitingCounterSignatures, FullySigned) => true,
      (FullySigned, Finalized) => true,
      (Finalized, Broadcast) => true,
      (Finalized, Done) => true,
      (Broadcast, Done) => true,
      _ => false,
    }
  }
}

impl Display for Step {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{self:?}")
  }
}

/// Tracks the current step of one flow instance.
///
/// Steps only move along the legal transitions given by
/// [`Step::can_advance_to`], every change is logged.
#[derive(Debug)]
pub struct Progress {
  flow: &'static str,
  step: Step,
  history: Vec<Step>,
}

impl Progress {
  pub fn new(flow: &'static str) -> Self {
    info!(flow, step = %Step::Built, "flow started");
    Self {
      flow,
      step: Step::Built,
      history: vec![Step::Built],
    }
  }

  pub fn step(&self) -> Step {
    self.step
  }

  /// All steps visited so far, in order.
  pub fn history(&self) -> &[Step] {
    &self.history
  }

  pub fn advance(&mut self, next: Step) -> Result<(), ProgressError> {
    if !self.step.can_advance_to(next) {
      return Err(ProgressError {
        flow: self.flow,
        from: self.step,
        to: next,
      });
    }

    info!(flow = self.flow, from = %self.step, to = %next, "flow progress");
    self.step = next;
    self.history.push(next);

    match next {
      Step::Finalized => {
        increment_counter!("flows_finalised", "flow" => self.flow);
      }
      Step::Done => {
        increment_counter!("flows_completed", "flow" => self.flow);
      }
      _ => {}
    }
    Ok(())
  }

  /// Moves the flow to [`Step::Aborted`] unless it already ended.
  ///
  /// A flow whose transaction is committed cannot abort, failures
  /// after that point are only reported.
  pub fn abort(&mut self, reason: &impl Display) {
    if self.step.is_committed() && !self.step.is_terminal() {
      warn!(flow = self.flow, step = %self.step, "failure after commit: {reason}");
      return;
    }
    if self.step.is_terminal() {
      return;
    }
    warn!(flow = self.flow, step = %self.step, "flow aborted: {reason}");
    increment_counter!("flows_aborted", "flow" => self.flow);
    self.step = Step::Aborted;
    self.history.push(Step::Aborted);
  }
}

#[cfg(test)]
mod tests {
  use super::{Progress, Step};

  #[test]
  fn donation_path_is_legal() -> anyhow::Result<()> {
    let mut progress = Progress::new("test");
    for step in [
      Step::LocallySigned,
      Step::IdentitiesSynced,
      Step::AwaitingCounterSignatures,
      Step::FullySigned,
      Step::Finalized,
      Step::Broadcast,
      Step::Done,
    ] {
      progress.advance(step)?;
    }
    assert_eq!(progress.history().len(), 8);
    assert_eq!(progress.step(), Step::Done);
    Ok(())
  }

  #[test]
  fn campaign_path_skips_counterparties() -> anyhow::Result<()> {
    let mut progress = Progress::new("test");
    progress.advance(Step::LocallySigned)?;
    progress.advance(Step::FullySigned)?;
    progress.advance(Step::Finalized)?;
    progress.advance(Step::Done)?;
    Ok(())
  }

  #[test]
  fn skipping_signatures_is_illegal() -> anyhow::Result<()> {
    let mut progress = Progress::new("test");
    let err = progress.advance(Step::Finalized).expect_err("unsigned");
    assert_eq!((err.from, err.to), (Step::Built, Step::Finalized));

    progress.advance(Step::LocallySigned)?;
    progress.advance(Step::IdentitiesSynced)?;
    assert!(progress.advance(Step::FullySigned).is_err());
    assert_eq!(progress.step(), Step::IdentitiesSynced);
    Ok(())
  }

  #[test]
  fn aborting_ends_the_flow() -> anyhow::Result<()> {
    let mut progress = Progress::new("test");
    progress.advance(Step::LocallySigned)?;
    progress.abort(&"counterparty went away");
    assert_eq!(progress.step(), Step::Aborted);
    assert!(progress.advance(Step::FullySigned).is_err());

    // aborting twice or after completion has no effect
    progress.abort(&"again");
    assert_eq!(progress.history().last(), Some(&Step::Aborted));
    assert_eq!(progress.history().len(), 3);
    Ok(())
  }

  #[test]
  fn committed_flows_cannot_abort() -> anyhow::Result<()> {
    let mut progress = Progress::new("test");
    progress.advance(Step::LocallySigned)?;
    progress.advance(Step::FullySigned)?;
    progress.advance(Step::Finalized)?;
    assert!(!Step::Finalized.can_advance_to(Step::Aborted));
    assert!(!Step::Broadcast.can_advance_to(Step::Aborted));

    progress.abort(&"observer unreachable");
    assert_eq!(progress.step(), Step::Finalized);
    progress.advance(Step::Broadcast)?;
    progress.abort(&"observer unreachable");
    assert_eq!(progress.step(), Step::Broadcast);
    assert!(!progress.history().contains(&Step::Aborted));

    progress.advance(Step::Done)?;
    Ok(())
  }

  #[test]
  fn terminal_steps_go_nowhere() {
    for from in [Step::Done, Step::Aborted] {
      for to in [Step::Built, Step::Aborted, Step::Done, Step::Finalized] {
        assert!(!from.can_advance_to(to));
      }
    }
  }
}
