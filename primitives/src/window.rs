use {
  serde::{Deserialize, Serialize},
  time::{Duration, OffsetDateTime},
};

/// Validity interval of a transaction.
///
/// `from` is inclusive and `until` exclusive. The notary only signs
/// transactions whose window contains its current time, so the
/// midpoint of a closed window is a point in time every verifier
/// agrees on when evaluating time sensitive rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
  pub from: Option<OffsetDateTime>,
  pub until: Option<OffsetDateTime>,
}

impl TimeWindow {
  pub fn between(from: OffsetDateTime, until: OffsetDateTime) -> Self {
    Self {
      from: Some(from),
      until: Some(until),
    }
  }

  /// Window centered on `time` that stretches `tolerance` to each side.
  pub fn with_tolerance(time: OffsetDateTime, tolerance: Duration) -> Self {
    Self::between(time - tolerance, time + tolerance)
  }

  pub fn from_only(from: OffsetDateTime) -> Self {
    Self {
      from: Some(from),
      until: None,
    }
  }

  pub fn until_only(until: OffsetDateTime) -> Self {
    Self {
      from: None,
      until: Some(until),
    }
  }

  /// The reference point of the window, `None` for open windows.
  pub fn midpoint(&self) -> Option<OffsetDateTime> {
    match (self.from, self.until) {
      (Some(from), Some(until)) => Some(from + (until - from) / 2),
      _ => None,
    }
  }

  pub fn contains(&self, instant: OffsetDateTime) -> bool {
    self.from.map_or(true, |from| from <= instant)
      && self.until.map_or(true, |until| instant < until)
  }
}
