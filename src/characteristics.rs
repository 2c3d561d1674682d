//! Structural properties known about a stream before it is evaluated.
//!
//! Each node in a plan carries the [`Characteristics`] of the sequence it
//! produces. Sources seed them and every stage derives its own from its
//! upstream, so the terminal node always knows whether the stream is ordered,
//! sorted, distinct, or of exactly known size.
//!
//! `SIZED` is not stored as a bit: a stream is sized exactly when its exact
//! element count is known.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// A single characteristic flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Characteristic(u8);

impl Characteristic {
    /// Elements have a defined encounter order.
    pub const ORDERED: Self = Self(0b0001);
    /// No two elements are equal.
    pub const DISTINCT: Self = Self(0b0010);
    /// Elements are in ascending order (natural or by comparator).
    pub const SORTED: Self = Self(0b0100);
    /// The exact element count is known without traversal.
    pub const SIZED: Self = Self(0b1000);

    const ALL: [(Self, &'static str); 4] = [
        (Self::ORDERED, "ORDERED"),
        (Self::DISTINCT, "DISTINCT"),
        (Self::SORTED, "SORTED"),
        (Self::SIZED, "SIZED"),
    ];
}

/// The set of characteristics of a stream plus its exact size, when known.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Characteristics {
    bits: u8,
    size: Option<u64>,
}

impl Characteristics {
    /// Ordered and sized, as produced by an in-memory sequence of `len` elements.
    #[must_use]
    pub const fn sized_ordered(len: u64) -> Self {
        Self {
            bits: Characteristic::ORDERED.0,
            size: Some(len),
        }
    }

    /// No known properties, unknown size.
    #[must_use]
    pub const fn unknown() -> Self {
        Self { bits: 0, size: None }
    }

    /// Whether `flag` holds for this stream.
    #[must_use]
    pub const fn contains(&self, flag: Characteristic) -> bool {
        if flag.0 == Characteristic::SIZED.0 {
            self.size.is_some()
        } else {
            self.bits & flag.0 != 0
        }
    }

    /// The exact number of elements, when `SIZED`.
    #[must_use]
    pub const fn exact_size(&self) -> Option<u64> {
        self.size
    }

    #[must_use]
    pub(crate) const fn with(mut self, flag: Characteristic) -> Self {
        if flag.0 != Characteristic::SIZED.0 {
            self.bits |= flag.0;
        }
        self
    }

    #[must_use]
    pub(crate) const fn without(mut self, flag: Characteristic) -> Self {
        if flag.0 == Characteristic::SIZED.0 {
            self.size = None;
        } else {
            self.bits &= !flag.0;
        }
        self
    }

    #[must_use]
    pub(crate) const fn with_size(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    /// Characteristics of `left` followed by `right`.
    #[must_use]
    pub(crate) fn concat(left: Self, right: Self) -> Self {
        let mut out = Self::unknown();
        if left.contains(Characteristic::ORDERED) && right.contains(Characteristic::ORDERED) {
            out = out.with(Characteristic::ORDERED);
        }
        let size = match (left.size, right.size) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        out.with_size(size)
    }
}

impl Display for Characteristics {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        let names: Vec<&str> = Characteristic::ALL
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "-")?;
        } else {
            write!(f, "{}", names.join("|"))?;
        }
        if let Some(n) = self.size {
            write!(f, " (size={n})")?;
        }
        Ok(())
    }
}
