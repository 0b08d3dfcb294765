//! Order keys for ranking tasks within a column.

use super::ids::TaskId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Fixed-point scale: one key unit = one millionth.
const SCALE: i64 = 1_000_000;

/// Dense ordering key for tasks within a status column.
///
/// Stored as a fixed-point count of millionths so midpoint insertion is exact
/// and running out of room is detectable: two keys one millionth apart have no
/// representable value strictly between them. Keys serialize as the raw
/// millionths count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(i64);

impl OrderKey {
    /// Key assigned to the first task dropped into an empty column.
    pub const BASELINE: OrderKey = OrderKey::from_int(1000);

    /// Gap between consecutive keys after a renumbering pass; also the step
    /// used for head and append insertions.
    pub const SPACING: OrderKey = OrderKey::from_int(1000);

    /// Key for a whole number, e.g. `from_int(15)` ranks as 15.0
    pub const fn from_int(n: i64) -> Self {
        Self(n * SCALE)
    }

    /// Key from a raw millionths count
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw millionths count
    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// One spacing step below this key, or `None` on numeric underflow
    pub fn step_below(&self) -> Option<OrderKey> {
        self.0.checked_sub(Self::SPACING.0).map(Self)
    }

    /// One spacing step above this key, or `None` on numeric overflow
    pub fn step_above(&self) -> Option<OrderKey> {
        self.0.checked_add(Self::SPACING.0).map(Self)
    }

    /// The midpoint strictly between two keys.
    ///
    /// Returns `None` when no representable value lies strictly between them,
    /// which is the signal that the column needs a renumbering pass.
    pub fn between(prev: OrderKey, next: OrderKey) -> Option<OrderKey> {
        let (a, b) = (prev.0 as i128, next.0 as i128);
        if b - a < 2 {
            return None;
        }
        Some(Self(((a + b) / 2) as i64))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = (self.0 % SCALE).abs();
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:06}", frac);
        let digits = digits.trim_end_matches('0');
        if self.0 < 0 && whole == 0 {
            write!(f, "-0.{}", digits)
        } else {
            write!(f, "{}.{}", whole, digits)
        }
    }
}

/// One entry of a renumbered column batch, as handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub id: TaskId,
    pub order: OrderKey,
}
