//! In-memory tabular data backed by an Arrow `RecordBatch`.
//!
//! A [`Dataset`] gives expectations typed cell access ([`Value`]) and row
//! identifiers ([`RowIndex`]). Temporal columns keep their declared
//! granularity: `Date32`/`Date64` cells become [`Value::Date`], timestamp cells
//! become [`Value::Timestamp`].

use crate::core::{RowIndex, RowRenderer, RowValue, ScalarKey, Value};
use crate::prelude::*;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Field, Float16Type, Float32Type, Float64Type, Int16Type,
    Int32Type, Int64Type, Int8Type, Schema, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use std::sync::Arc;

/// A record batch plus an optional index column used for row labels.
///
/// # Examples
///
/// ```rust
/// use arrow::array::{ArrayRef, Int64Array, StringArray};
/// use std::sync::Arc;
/// use term_expectations::dataset::Dataset;
/// use term_expectations::core::Value;
///
/// let dataset = Dataset::from_columns(vec![
///     ("id", Arc::new(Int64Array::from(vec![10, 20])) as ArrayRef),
///     ("name", Arc::new(StringArray::from(vec![Some("a"), None])) as ArrayRef),
/// ])
/// .unwrap()
/// .with_index_column("id")
/// .unwrap();
///
/// assert_eq!(dataset.value("name", 1).unwrap(), Value::Null);
/// assert_eq!(dataset.row_index(1).unwrap().to_string(), "20");
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
    index_column: Option<String>,
    index_lookup: HashMap<ScalarKey, usize>,
}

impl Dataset {
    /// Wraps a record batch; rows are identified by position.
    pub fn new(batch: RecordBatch) -> Self {
        Self {
            batch,
            index_column: None,
            index_lookup: HashMap::new(),
        }
    }

    /// Builds a dataset from named columns.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        Ok(Self::new(RecordBatch::try_from_iter(columns)?))
    }

    /// Uses the values of `column` as row labels.
    ///
    /// Duplicate labels resolve to their first row when a row is looked up by
    /// label alone.
    ///
    /// # Errors
    ///
    /// Fails if the column is missing or holds non-scalar values.
    pub fn with_index_column(mut self, column: impl Into<String>) -> Result<Self> {
        let column = column.into();
        let array = self.column(&column)?;

        let mut lookup = HashMap::with_capacity(array.len());
        for row in 0..array.len() {
            let key = ScalarKey::from_value(&cell_value(array.as_ref(), row)?).map_err(|e| {
                TermError::Configuration(format!(
                    "index column '{column}' must hold scalar labels: {e}"
                ))
            })?;
            lookup.entry(key).or_insert(row);
        }

        self.index_lookup = lookup;
        self.index_column = Some(column);
        Ok(self)
    }

    /// The underlying record batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Name of the index column, if any.
    pub fn index_column(&self) -> Option<&str> {
        self.index_column.as_deref()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Returns the array for a column.
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| TermError::column_not_found(name))
    }

    /// Declared Arrow type of a column.
    pub fn data_type(&self, name: &str) -> Result<DataType> {
        Ok(self.column(name)?.data_type().clone())
    }

    /// Reads one cell.
    pub fn value(&self, column: &str, row: usize) -> Result<Value> {
        let array = self.column(column)?;
        self.check_row(row)?;
        cell_value(array.as_ref(), row)
    }

    /// Reads every value of a column, in row order.
    pub fn column_values(&self, column: &str) -> Result<Vec<Value>> {
        let array = self.column(column)?;
        (0..array.len())
            .map(|row| cell_value(array.as_ref(), row))
            .collect()
    }

    /// Reads the given columns of one row as a composite row value.
    pub fn row_values(&self, columns: &[String], row: usize) -> Result<RowValue> {
        let values = columns
            .iter()
            .map(|column| self.value(column, row))
            .collect::<Result<Vec<_>>>()?;
        RowValue::try_new(columns.to_vec(), values)
    }

    /// Identifier of a row: its index-column label or its position.
    pub fn row_index(&self, row: usize) -> Result<RowIndex> {
        self.check_row(row)?;
        match &self.index_column {
            Some(column) => self.value(column, row).map(RowIndex),
            None => Ok(RowIndex::from(row)),
        }
    }

    /// Returns a copy of the dataset with one column cast to another type.
    ///
    /// Casting a `Date32` column to `Timestamp(Nanosecond, None)` changes how
    /// its values render in results from `2021-01-02` to `2021-01-02T00:00:00`.
    pub fn with_column_cast(&self, column: &str, to_type: &DataType) -> Result<Self> {
        let schema = self.batch.schema();
        let idx = schema
            .index_of(column)
            .map_err(|_| TermError::column_not_found(column))?;

        let casted = arrow::compute::cast(self.batch.column(idx), to_type)?;

        let mut fields: Vec<Field> = schema.fields().iter().map(|f| (**f).clone()).collect();
        let nullable = fields[idx].is_nullable();
        fields[idx] = Field::new(column, to_type.clone(), nullable);
        let mut columns = self.batch.columns().to_vec();
        columns[idx] = casted;

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        let dataset = Dataset::new(batch);
        match &self.index_column {
            Some(index) => dataset.with_index_column(index.clone()),
            None => Ok(dataset),
        }
    }

    /// Resolves a row identifier back to a row position.
    pub fn position_of(&self, index: &RowIndex) -> Result<usize> {
        let position = match &self.index_column {
            Some(_) => self.index_lookup.get(&index.key()?).copied(),
            None => match index.value() {
                Value::Int(i) => usize::try_from(*i)
                    .ok()
                    .filter(|row| *row < self.num_rows()),
                _ => None,
            },
        };
        position.ok_or_else(|| {
            TermError::invariant_violation(format!("row index {index} does not exist in dataset"))
        })
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.num_rows() {
            return Err(TermError::invariant_violation(format!(
                "row {row} is out of bounds for dataset with {} rows",
                self.num_rows()
            )));
        }
        Ok(())
    }
}

impl RowRenderer for Dataset {
    fn render_row(&self, index: &RowIndex) -> Result<RowValue> {
        let row = self.position_of(index)?;
        self.row_values(&self.column_names(), row)
    }

    fn render_row_at(&self, position: usize) -> Result<RowValue> {
        self.check_row(position)?;
        self.row_values(&self.column_names(), position)
    }
}

/// Converts one Arrow cell into a [`Value`].
///
/// # Errors
///
/// `TypeMismatch` for unsigned values beyond `i64::MAX`, `NotSupported` for
/// Arrow types without a value mapping.
pub fn cell_value(array: &dyn Array, row: usize) -> Result<Value> {
    if matches!(array.data_type(), DataType::Null) || array.is_null(row) {
        return Ok(Value::Null);
    }

    let value = match array.data_type() {
        DataType::Boolean => Value::Bool(array.as_boolean().value(row)),
        DataType::Int8 => Value::Int(array.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Int(array.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Int(array.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Int(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Int(array.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Value::Int(array.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Value::Int(array.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let raw = array.as_primitive::<UInt64Type>().value(row);
            let v = i64::try_from(raw).map_err(|_| {
                TermError::type_mismatch("UInt64 within Int64 range", raw.to_string())
            })?;
            Value::Int(v)
        }
        DataType::Float16 => Value::Float(array.as_primitive::<Float16Type>().value(row).to_f64()),
        DataType::Float32 => Value::Float(array.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(array.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => Value::Str(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::Str(array.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => Value::Str(array.as_string_view().value(row).to_string()),
        DataType::Date32 => temporal(
            array.as_primitive::<Date32Type>().value_as_date(row),
            "Date32",
        )
        .map(Value::Date)?,
        DataType::Date64 => temporal(
            array.as_primitive::<Date64Type>().value_as_date(row),
            "Date64",
        )
        .map(Value::Date)?,
        DataType::Timestamp(unit, _) => {
            let ts = match unit {
                TimeUnit::Second => array
                    .as_primitive::<TimestampSecondType>()
                    .value_as_datetime(row),
                TimeUnit::Millisecond => array
                    .as_primitive::<TimestampMillisecondType>()
                    .value_as_datetime(row),
                TimeUnit::Microsecond => array
                    .as_primitive::<TimestampMicrosecondType>()
                    .value_as_datetime(row),
                TimeUnit::Nanosecond => array
                    .as_primitive::<TimestampNanosecondType>()
                    .value_as_datetime(row),
            };
            temporal(ts, "Timestamp").map(Value::Timestamp)?
        }
        DataType::List(_) => list_value(array.as_list::<i32>().value(row))?,
        DataType::LargeList(_) => list_value(array.as_list::<i64>().value(row))?,
        other => {
            return Err(TermError::NotSupported(format!(
                "reading values of Arrow type {other}"
            )))
        }
    };
    Ok(value)
}

fn temporal<T>(value: Option<T>, type_name: &str) -> Result<T> {
    value.ok_or_else(|| {
        TermError::type_mismatch(format!("representable {type_name}"), "out-of-range value")
    })
}

fn list_value(items: ArrayRef) -> Result<Value> {
    (0..items.len())
        .map(|i| cell_value(items.as_ref(), i))
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}
