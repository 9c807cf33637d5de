use {
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
  },
  thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
  #[error("Currency code '{0}' is not three upper-case letters")]
  InvalidCurrency(String),

  #[error("Cannot parse amount '{0}', expected '<quantity> <currency>'")]
  InvalidFormat(String),

  #[error("Currency mismatch: {0} and {1}")]
  CurrencyMismatch(Currency, Currency),

  #[error("Amount overflow")]
  Overflow,

  #[error("Amount underflow")]
  Underflow,
}

/// ISO-4217 shaped currency code, e.g. "USD".
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
  pub fn code(&self) -> &str {
    &self.0
  }
}

impl FromStr for Currency {
  type Err = AmountError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.len() == 3 && s.bytes().all(|b| b.is_ascii_uppercase()) {
      Ok(Self(s.to_owned()))
    } else {
      Err(AmountError::InvalidCurrency(s.to_owned()))
    }
  }
}

impl Display for Currency {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Debug for Currency {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A monetary amount expressed as a number of the smallest
/// indivisible units of its currency.
///
/// Arithmetic between amounts is only defined for the same
/// currency, all operations are checked.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
  pub quantity: u64,
  pub token: Currency,
}

impl Amount {
  pub fn new(quantity: u64, token: Currency) -> Self {
    Self { quantity, token }
  }

  pub fn zero(token: Currency) -> Self {
    Self { quantity: 0, token }
  }

  pub fn is_positive(&self) -> bool {
    self.quantity > 0
  }

  pub fn checked_add(&self, other: &Amount) -> Result<Amount, AmountError> {
    self.same_token(other)?;
    Ok(Amount {
      quantity: self
        .quantity
        .checked_add(other.quantity)
        .ok_or(AmountError::Overflow)?,
      token: self.token.clone(),
    })
  }

  pub fn checked_sub(&self, other: &Amount) -> Result<Amount, AmountError> {
    self.same_token(other)?;
    Ok(Amount {
      quantity: self
        .quantity
        .checked_sub(other.quantity)
        .ok_or(AmountError::Underflow)?,
      token: self.token.clone(),
    })
  }

  fn same_token(&self, other: &Amount) -> Result<(), AmountError> {
    if self.token != other.token {
      return Err(AmountError::CurrencyMismatch(
        self.token.clone(),
        other.token.clone(),
      ));
    }
    Ok(())
  }
}

impl Display for Amount {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.quantity, self.token)
  }
}

impl Debug for Amount {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.quantity, self.token)
  }
}

impl FromStr for Amount {
  type Err = AmountError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut parts = s.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
      (Some(quantity), Some(token), None) => Ok(Amount {
        quantity: quantity
          .parse()
          .map_err(|_| AmountError::InvalidFormat(s.to_owned()))?,
        token: token.parse()?,
      }),
      _ => Err(AmountError::InvalidFormat(s.to_owned())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{Amount, AmountError};

  #[test]
  fn amount_arithmetic_is_currency_checked() -> anyhow::Result<()> {
    let hundred: Amount = "100 USD".parse()?;
    let thirty: Amount = "30 USD".parse()?;
    let euros: Amount = "30 EUR".parse()?;

    assert_eq!(hundred.checked_add(&thirty)?, "130 USD".parse()?);
    assert_eq!(hundred.checked_sub(&thirty)?, "70 USD".parse()?);
    assert_eq!(thirty.checked_sub(&hundred), Err(AmountError::Underflow));
    assert!(matches!(
      hundred.checked_add(&euros),
      Err(AmountError::CurrencyMismatch(..))
    ));
    Ok(())
  }

  #[test]
  fn amount_parsing_rejects_garbage() {
    assert!("100".parse::<Amount>().is_err());
    assert!("100 usd".parse::<Amount>().is_err());
    assert!("-5 USD".parse::<Amount>().is_err());
    assert!("5 USD extra".parse::<Amount>().is_err());
    assert_eq!("0 GBP".parse::<Amount>().map(|a| a.is_positive()), Ok(false));
  }
}
