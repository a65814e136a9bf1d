//! Amount Parsing
//!
//! Free-form currency text to integer cents. This is the single source of
//! truth for "is this amount valid": everything else in the widget asks the
//! parser instead of re-implementing the grammar.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Accepted shape: optional dollar sign, a leading digit group with no
/// leading zero, zero or more comma-separated groups of exactly three
/// digits, an optional fractional part of exactly two digits, and
/// surrounding whitespace.
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\$?([1-9]\d*)((?:,\d{3})*)(?:\.(\d{2}))?\s*$")
        .expect("amount pattern is valid")
});

/// A validated donation amount in whole cents.
///
/// Money never touches a float: parsing, arithmetic, and the wire format
/// all use the integer cent count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmountCents(u64);

impl AmountCents {
    /// Wrap a raw cent count
    pub const fn new(cents: u64) -> Self {
        Self(cents)
    }

    /// The raw cent count
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parse free-form currency text into cents.
    ///
    /// Returns `None` whenever the text does not carry a meaningful
    /// amount. `None` is not an error condition: an empty field, a
    /// half-typed value, and garbage all land here and the caller treats
    /// them identically.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = AMOUNT_PATTERN.captures(input)?;

        // Leading digits plus thousands groups with the commas stripped.
        let mut digits = caps[1].to_owned();
        digits.extend(caps[2].chars().filter(|&c| c != ','));

        let dollars: u64 = digits.parse().ok()?;
        let cents: u64 = match caps.get(3) {
            Some(frac) => frac.as_str().parse().ok()?,
            None => 0,
        };

        // Checked: absurdly large inputs fall back to "no amount" rather
        // than wrapping.
        dollars.checked_mul(100)?.checked_add(cents).map(Self)
    }
}

impl fmt::Display for AmountCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}
