//! Cell values, composite rows and their hashable projections.
//!
//! Unexpected evidence is carried as [`UnexpectedValue`]s: either a scalar
//! [`Value`] for single-column expectations or a [`RowValue`] for expectations
//! spanning several columns. Histogram aggregation needs a hashable, total view
//! of those values, which [`NormalizedValue`] provides.

use crate::prelude::*;
use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single cell value.
///
/// Temporal values keep their declared granularity: a `Date` renders as
/// `2021-01-02` while a `Timestamp` renders as `2021-01-02T00:00:00`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    /// Nested list cell. Lists cannot be used as histogram keys.
    List(Vec<Value>),
}

impl Value {
    /// Returns true if this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for values treated as missing: nulls and float NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Returns a short name for the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
        }
    }

    /// Returns the string slice if this is a `Value::Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values when they belong to comparable domains.
    ///
    /// Integers and floats compare numerically with each other, dates compare
    /// with timestamps at midnight. Everything else only compares within its
    /// own type; `None` means the pair is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Timestamp(b)) => Some(midnight(a).cmp(b)),
            (Value::Timestamp(a), Value::Date(b)) => Some(a.cmp(&midnight(b))),
            _ => None,
        }
    }
}

fn midnight(date: &NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            Value::Timestamp(ts) => serializer.collect_str(&ts.format(TIMESTAMP_FORMAT)),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Hashable, totally comparable projection of a scalar [`Value`].
///
/// Floats are stored by their bit pattern after folding `-0.0` into `0.0` and
/// every NaN into a single canonical NaN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl ScalarKey {
    /// Projects a scalar value into its key form.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Normalization`] for nested list values.
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(match value {
            Value::Null => ScalarKey::Null,
            Value::Bool(b) => ScalarKey::Bool(*b),
            Value::Int(i) => ScalarKey::Int(*i),
            Value::Float(v) => ScalarKey::Float(canonical_float_bits(*v)),
            Value::Str(s) => ScalarKey::Str(s.clone()),
            Value::Date(d) => ScalarKey::Date(*d),
            Value::Timestamp(ts) => ScalarKey::Timestamp(*ts),
            Value::List(items) => {
                return Err(TermError::normalization(format!(
                    "list value with {} element(s) cannot be used as a histogram key",
                    items.len()
                )))
            }
        })
    }

    /// Converts the key back into the value it was projected from.
    pub fn to_value(&self) -> Value {
        match self {
            ScalarKey::Null => Value::Null,
            ScalarKey::Bool(b) => Value::Bool(*b),
            ScalarKey::Int(i) => Value::Int(*i),
            ScalarKey::Float(bits) => Value::Float(f64::from_bits(*bits)),
            ScalarKey::Str(s) => Value::Str(s.clone()),
            ScalarKey::Date(d) => Value::Date(*d),
            ScalarKey::Timestamp(ts) => Value::Timestamp(*ts),
        }
    }
}

fn canonical_float_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl Serialize for ScalarKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// An ordered, fixed-schema record of column values.
///
/// Equality is structural: same columns in the same order with equal values.
/// Serializes as a JSON object whose keys keep the declared column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RowValue {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl RowValue {
    /// Creates a row from parallel column and value lists.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::InvariantViolation`] when the lists differ in length
    /// or a column name repeats.
    pub fn try_new(columns: Vec<String>, values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(TermError::invariant_violation(format!(
                "row has {} column(s) but {} value(s)",
                columns.len(),
                values.len()
            )));
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(TermError::invariant_violation(format!(
                    "column '{column}' appears more than once in row"
                )));
            }
        }
        Ok(Self { columns, values })
    }

    /// Creates a row from `(column, value)` pairs, preserving their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::try_new(columns, values)
    }

    /// Returns the column names in declared order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in declared column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Looks up the value of a column by name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(column, value)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (column, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{column}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// One entry of an unexpected-value list.
#[derive(Debug, Clone, PartialEq)]
pub enum UnexpectedValue {
    /// A single cell, for single-column expectations.
    Scalar(Value),
    /// A composite row, for expectations spanning several columns.
    Row(RowValue),
}

impl UnexpectedValue {
    /// Projects the value into its hashable histogram key.
    ///
    /// Rows become tuples of their values in declared column order; scalars
    /// stay scalars.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Normalization`] if any component is a nested list.
    pub fn normalize(&self) -> Result<NormalizedValue> {
        match self {
            UnexpectedValue::Scalar(value) => {
                ScalarKey::from_value(value).map(NormalizedValue::Scalar)
            }
            UnexpectedValue::Row(row) => row
                .values()
                .iter()
                .map(ScalarKey::from_value)
                .collect::<Result<Vec<_>>>()
                .map(NormalizedValue::Tuple),
        }
    }
}

impl Serialize for UnexpectedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            UnexpectedValue::Scalar(value) => value.serialize(serializer),
            UnexpectedValue::Row(row) => row.serialize(serializer),
        }
    }
}

impl fmt::Display for UnexpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnexpectedValue::Scalar(value) => write!(f, "{value}"),
            UnexpectedValue::Row(row) => write!(f, "{row}"),
        }
    }
}

impl From<Value> for UnexpectedValue {
    fn from(v: Value) -> Self {
        UnexpectedValue::Scalar(v)
    }
}

impl From<RowValue> for UnexpectedValue {
    fn from(v: RowValue) -> Self {
        UnexpectedValue::Row(v)
    }
}

/// Hashable histogram key for an [`UnexpectedValue`].
///
/// Serializes as the bare scalar, or as an array of bare values for tuples
/// (no column names).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedValue {
    Scalar(ScalarKey),
    Tuple(Vec<ScalarKey>),
}

impl Serialize for NormalizedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NormalizedValue::Scalar(key) => key.serialize(serializer),
            NormalizedValue::Tuple(keys) => {
                let mut seq = serializer.serialize_seq(Some(keys.len()))?;
                for key in keys {
                    seq.serialize_element(key)?;
                }
                seq.end()
            }
        }
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Scalar(key) => write!(f, "{}", key.to_value()),
            NormalizedValue::Tuple(keys) => {
                write!(f, "(")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", key.to_value())?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Identifier of a row in the caller's identifier scheme.
///
/// Passed through untransformed: positional integers for datasets without an
/// index column, otherwise the index column's label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowIndex(pub Value);

impl RowIndex {
    /// Returns the wrapped label.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Returns the hashable form of the label.
    pub fn key(&self) -> Result<ScalarKey> {
        ScalarKey::from_value(&self.0)
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RowIndex {
    fn from(v: i64) -> Self {
        RowIndex(Value::Int(v))
    }
}

impl From<i32> for RowIndex {
    fn from(v: i32) -> Self {
        RowIndex(Value::Int(v as i64))
    }
}

impl From<usize> for RowIndex {
    fn from(v: usize) -> Self {
        RowIndex(Value::Int(v as i64))
    }
}

impl From<&str> for RowIndex {
    fn from(v: &str) -> Self {
        RowIndex(Value::Str(v.to_string()))
    }
}

impl From<Value> for RowIndex {
    fn from(v: Value) -> Self {
        RowIndex(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_temporal_rendering_tracks_granularity() {
        let d = Value::Date(date(2021, 1, 2));
        let ts = Value::Timestamp(date(2021, 1, 2).and_hms_opt(0, 0, 0).unwrap());

        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2021-01-02\"");
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2021-01-02T00:00:00\""
        );
    }

    #[test]
    fn test_timestamp_fraction_only_when_present() {
        let ts = date(2021, 1, 2).and_hms_milli_opt(3, 4, 5, 250).unwrap();
        assert_eq!(
            serde_json::to_string(&Value::Timestamp(ts)).unwrap(),
            "\"2021-01-02T03:04:05.250\""
        );
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = RowValue::from_pairs([("zeta", Value::from(1)), ("alpha", Value::from("a"))])
            .unwrap();
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"zeta":1,"alpha":"a"}"#
        );
    }

    #[test]
    fn test_row_rejects_mismatched_lengths() {
        let err = RowValue::try_new(vec!["a".to_string()], vec![]).unwrap_err();
        assert!(matches!(err, TermError::InvariantViolation { .. }));
    }

    #[test]
    fn test_row_rejects_duplicate_columns() {
        let err = RowValue::from_pairs([("a", 1), ("a", 2)]).unwrap_err();
        assert!(err.to_string().contains("appears more than once"));
    }

    #[test]
    fn test_row_normalizes_to_tuple() {
        let row = RowValue::from_pairs([
            ("foreign_key_1", Value::from("a")),
            ("foreign_key_2", Value::from(2)),
        ])
        .unwrap();
        let key = UnexpectedValue::Row(row).normalize().unwrap();
        assert_eq!(
            key,
            NormalizedValue::Tuple(vec![ScalarKey::Str("a".to_string()), ScalarKey::Int(2)])
        );
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"["a",2]"#);
    }

    #[test]
    fn test_list_value_fails_normalization() {
        let value = UnexpectedValue::Scalar(Value::List(vec![Value::Int(1)]));
        let err = value.normalize().unwrap_err();
        assert!(matches!(err, TermError::Normalization { .. }));

        let row = RowValue::from_pairs([("tags", Value::List(vec![]))]).unwrap();
        assert!(UnexpectedValue::Row(row).normalize().is_err());
    }

    #[test]
    fn test_float_keys_are_canonical() {
        let pos = ScalarKey::from_value(&Value::Float(0.0)).unwrap();
        let neg = ScalarKey::from_value(&Value::Float(-0.0)).unwrap();
        assert_eq!(pos, neg);

        let nan1 = ScalarKey::from_value(&Value::Float(f64::NAN)).unwrap();
        let nan2 = ScalarKey::from_value(&Value::Float(-f64::NAN)).unwrap();
        assert_eq!(nan1, nan2);
    }

    #[test]
    fn test_int_and_float_keys_stay_distinct() {
        let int_key = ScalarKey::from_value(&Value::Int(1)).unwrap();
        let float_key = ScalarKey::from_value(&Value::Float(1.0)).unwrap();
        assert_ne!(int_key, float_key);
    }

    #[test]
    fn test_compare_across_numeric_and_temporal_types() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
        assert_eq!(
            Value::Date(date(2021, 1, 2))
                .compare(&Value::Timestamp(date(2021, 1, 2).and_hms_opt(0, 0, 0).unwrap())),
            Some(Ordering::Equal)
        );
        assert_eq!(Value::Str("a".into()).compare(&Value::Int(1)), None);
    }

    #[test]
    fn test_row_index_passes_labels_through() {
        assert_eq!(serde_json::to_string(&RowIndex::from(7i64)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&RowIndex::from("order-17")).unwrap(),
            "\"order-17\""
        );
    }
}
