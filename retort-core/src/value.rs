//! # Leaf Values
//!
//! The closed set of value types that terminate path recursion and that the
//! storage backend knows how to encode. Everything a record exposes through
//! its storable members is either another record, a collection, or one of
//! the variants here.
//!
//! ## Variants
//!
//! | Variant | Encoded as |
//! |---------|-----------|
//! | `Scalar` | atomic dataset (bool/int/float/text) |
//! | `Timestamp` | RFC 3339 text dataset |
//! | `Quantity` | `magnitude` + `unit` sibling datasets |
//! | `FilePath` | canonical text dataset |
//! | `Ints`/`Floats`/`Texts` | fixed-shape 1-D array dataset |
//! | `Table` | `columns`/`index`/`data` sibling datasets |
//! | `Map` | one slot per key, recursively |
//! | `Absent` | no slot; reads fall back to the caller default |

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An atomic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view, widening integers. `None` for bools and text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text rendering used when a mixed-type table column is stringified.
    pub fn render(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// A physical quantity: a magnitude paired with an uninterpreted unit
/// string. Unit parsing and conversion happen upstream; the archive only
/// carries the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: impl Into<String>) -> Self {
        Self {
            magnitude,
            unit: unit.into(),
        }
    }
}

/// A tabular value: rows of cells under named columns, with row index
/// labels. The storage layout is three sibling datasets (`columns`,
/// `index`, `data`), so a reloaded table arrives through the same three
/// well-known keys it was stored under.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub index: Vec<String>,
    pub data: Vec<Vec<Scalar>>,
}

impl Table {
    pub fn new(columns: Vec<String>, index: Vec<String>, data: Vec<Vec<Scalar>>) -> Self {
        Self {
            columns,
            index,
            data,
        }
    }

    /// Every row has exactly one cell per column, and one index label per
    /// row. Ragged tables are rejected by the store as unencodable.
    pub fn is_rectangular(&self) -> bool {
        self.index.len() == self.data.len()
            && self.data.iter().all(|row| row.len() == self.columns.len())
    }

    /// True when every cell is numeric, allowing a compact float matrix
    /// encoding instead of stringified cells.
    pub fn is_numeric(&self) -> bool {
        self.data
            .iter()
            .all(|row| row.iter().all(|c| c.as_f64().is_some()))
    }
}

/// A leaf value bound to one path by the flattener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A member that was not set. Bound as-is by the flattener; the store
    /// creates no slot for it.
    Absent,
    Scalar(Scalar),
    Timestamp(DateTime<Utc>),
    Quantity(Quantity),
    /// A filesystem location, archived in its canonical string form.
    FilePath(PathBuf),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Texts(Vec<String>),
    Table(Table),
    /// An opaque nested key→value mapping, decomposed into one slot per
    /// key by the store.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Observed type name, for error reports and batch failure listings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Scalar(Scalar::Bool(_)) => "bool",
            Self::Scalar(Scalar::Int(_)) => "int",
            Self::Scalar(Scalar::Float(_)) => "float",
            Self::Scalar(Scalar::Text(_)) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::Quantity(_) => "quantity",
            Self::FilePath(_) => "file path",
            Self::Ints(_) => "int array",
            Self::Floats(_) => "float array",
            Self::Texts(_) => "text array",
            Self::Table(_) => "table",
            Self::Map(_) => "mapping",
        }
    }

    pub fn quantity(magnitude: f64, unit: impl Into<String>) -> Self {
        Self::Quantity(Quantity::new(magnitude, unit))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Scalar(Scalar::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::Text(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::Text(s))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl From<Quantity> for Value {
    fn from(q: Quantity) -> Self {
        Self::Quantity(q)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Self::FilePath(p)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Self::Ints(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Floats(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::Texts(v)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Self::Table(t)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Self::Map(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => Self::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape_checks() {
        let t = Table::new(
            vec!["mass".into(), "temp".into()],
            vec!["0".into(), "1".into()],
            vec![
                vec![Scalar::Float(1.0), Scalar::Float(20.0)],
                vec![Scalar::Float(2.0), Scalar::Float(21.0)],
            ],
        );
        assert!(t.is_rectangular());
        assert!(t.is_numeric());

        let ragged = Table::new(
            vec!["a".into()],
            vec!["0".into()],
            vec![vec![Scalar::Int(1), Scalar::Int(2)]],
        );
        assert!(!ragged.is_rectangular());
    }

    #[test]
    fn test_from_option() {
        let none: Option<f64> = None;
        assert!(Value::from(none).is_absent());
        assert_eq!(Value::from(Some(1.5)), Value::Scalar(Scalar::Float(1.5)));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(true).type_name(), "bool");
        assert_eq!(Value::quantity(0.9426, "g/cc").type_name(), "quantity");
        assert_eq!(Value::from(vec![1.0, 2.0]).type_name(), "float array");
    }
}
