//! Unexpected-value aggregation into a deterministic value histogram.

use super::value::{NormalizedValue, UnexpectedValue};
use crate::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// One histogram entry: a normalized unexpected value and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    /// The normalized value; composite rows appear as tuples.
    pub value: NormalizedValue,
    /// Number of occurrences in the scanned prefix of the unexpected list.
    pub count: usize,
}

/// Groups unexpected values into a histogram ordered by descending count.
///
/// When `limit` is given only the first `limit` raw entries are scanned, so
/// truncation happens before deduplication. Ties are broken by the position
/// where a value was first seen, never by hash order.
///
/// # Errors
///
/// Returns [`TermError::Normalization`] if a value cannot be projected into a
/// hashable key. No partial histogram is returned.
///
/// # Examples
///
/// ```rust
/// use term_expectations::core::{aggregate_unexpected, UnexpectedValue, Value};
///
/// let values: Vec<UnexpectedValue> = ["b", "a", "a"]
///     .into_iter()
///     .map(|s| Value::from(s).into())
///     .collect();
/// let histogram = aggregate_unexpected(&values, None).unwrap();
/// assert_eq!(histogram[0].count, 2);
/// assert_eq!(histogram[1].count, 1);
/// ```
pub fn aggregate_unexpected(
    values: &[UnexpectedValue],
    limit: Option<usize>,
) -> Result<Vec<ValueCount>> {
    let scanned = match limit {
        Some(n) => &values[..n.min(values.len())],
        None => values,
    };

    // Slots are in first-seen order; the map only points into them.
    let mut slots: Vec<ValueCount> = Vec::new();
    let mut positions: HashMap<NormalizedValue, usize> = HashMap::with_capacity(scanned.len());

    for value in scanned {
        let key = value.normalize()?;
        match positions.get(&key) {
            Some(&slot) => slots[slot].count += 1,
            None => {
                positions.insert(key.clone(), slots.len());
                slots.push(ValueCount {
                    value: key,
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    slots.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(slots)
}
