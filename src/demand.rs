//! Demand: how many values a consumer currently allows a producer to emit.

use std::{
  fmt::{Display, Formatter},
  ops::{Add, AddAssign},
};

/// The number of values a [`Consumer`](crate::consumer::Consumer) is ready to
/// receive.
///
/// Demand accumulates additively and never goes negative. Any addition that
/// would overflow saturates to [`Demand::Unbounded`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Demand {
  /// At most this many values.
  Bounded(usize),
  /// As many values as the producer has.
  Unbounded,
}

impl Demand {
  #[inline]
  pub const fn none() -> Self { Demand::Bounded(0) }

  #[inline]
  pub const fn max(n: usize) -> Self { Demand::Bounded(n) }

  #[inline]
  pub const fn unbounded() -> Self { Demand::Unbounded }

  #[inline]
  pub fn is_none(&self) -> bool { matches!(self, Demand::Bounded(0)) }

  #[inline]
  pub fn is_unbounded(&self) -> bool { matches!(self, Demand::Unbounded) }

  /// Demand left after `n` values were emitted. Unbounded stays unbounded.
  pub fn saturating_sub(self, n: usize) -> Self {
    match self {
      Demand::Bounded(m) => Demand::Bounded(m.saturating_sub(n)),
      Demand::Unbounded => Demand::Unbounded,
    }
  }
}

impl Default for Demand {
  #[inline]
  fn default() -> Self { Demand::none() }
}

impl From<usize> for Demand {
  #[inline]
  fn from(n: usize) -> Self { Demand::Bounded(n) }
}

impl Add for Demand {
  type Output = Demand;

  fn add(self, rhs: Demand) -> Demand {
    match (self, rhs) {
      (Demand::Bounded(a), Demand::Bounded(b)) => {
        a.checked_add(b).map_or(Demand::Unbounded, Demand::Bounded)
      }
      _ => Demand::Unbounded,
    }
  }
}

impl Add<usize> for Demand {
  type Output = Demand;

  #[inline]
  fn add(self, rhs: usize) -> Demand { self + Demand::Bounded(rhs) }
}

impl AddAssign for Demand {
  #[inline]
  fn add_assign(&mut self, rhs: Demand) { *self = *self + rhs; }
}

impl PartialEq<usize> for Demand {
  fn eq(&self, other: &usize) -> bool { matches!(self, Demand::Bounded(n) if n == other) }
}

impl Display for Demand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Demand::Bounded(n) => write!(f, "max({n})"),
      Demand::Unbounded => f.write_str("unbounded"),
    }
  }
}
