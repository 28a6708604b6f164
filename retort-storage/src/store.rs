//! # Archive Store
//!
//! The type-adaptive bridge between leaf values and the container's
//! native type system. Classifies each value on write and encodes it at
//! its path; reads run the inverse, directed by the expected kind.
//!
//! ## Write classification
//!
//! 1. Nested mapping → one slot per key, recursively
//! 2. Table → `columns` / `index` / `data` sibling datasets
//! 3. Scalar sequence → fixed-shape 1-D array
//! 4. Filesystem path → canonical string form
//! 5. Scalar / timestamp → atomic dataset (timestamps as RFC 3339 text)
//! 6. Quantity → `magnitude` + `unit` sibling datasets
//! 7. Absent → skipped; no slot is created
//!
//! A slot that already exists with an incompatible shape or type is
//! deleted and recreated (self-healing, logged as a warning, never
//! fatal). Reads of missing paths return the caller-supplied default so
//! partially-written or schema-evolved archives stay loadable.
//!
//! Every call opens the container file, applies its mutation or query,
//! and closes it again; no handle is held across calls.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use retort_core::config::Config;
use retort_core::error::{Error, Result};
use retort_core::metrics::{Metrics, Timer};
use retort_core::path::TreePath;
use retort_core::value::{Quantity, Scalar, Table, Value};

use crate::container::{Container, Entry, Group, Payload, PutOutcome};

/// What shape of value a load expects at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// A single dataset: scalar or array.
    Atom,
    /// A key→value mapping assembled from the children of a group,
    /// unpacking nested groups one level at a time into sub-mappings.
    Mapping,
    /// A table recomposed from the `columns`/`index`/`data` sub-paths.
    Table,
}

/// Per-path failure inside a batch store, attributable to one record.
#[derive(Debug)]
pub struct StoreFailure {
    pub path: TreePath,
    pub type_name: &'static str,
    pub message: String,
}

/// Outcome of a batch store: how many slots were written, how many absent
/// values skipped, and which paths failed to encode.
#[derive(Debug, Default)]
pub struct StoreReport {
    pub stored: usize,
    pub skipped: usize,
    pub failures: Vec<StoreFailure>,
}

impl StoreReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Stateful adapter around one container file.
pub struct ArchiveStore {
    file: PathBuf,
    config: Config,
    metrics: Metrics,
}

impl ArchiveStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self::with_config(file, Config::default())
    }

    pub fn with_config(file: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            file: file.into(),
            config,
            metrics: Metrics::new(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Store one value at one path. Idempotent: a second store to the
    /// same path overwrites it.
    pub fn store(&self, path: &TreePath, value: &Value) -> Result<()> {
        let mut container = Container::open(&self.file)?;
        self.write_value(&mut container, path, value)?;
        container.save(&self.file, self.config.store.sync_writes)
    }

    /// Store many path/value pairs in one open/save scope, preserving
    /// one-slot-per-path overwrite semantics. Encoding failures do not
    /// abort the batch; each is reported with its path and the value's
    /// observed type. I/O failures propagate unchanged.
    pub fn store_all<'a, I>(&self, entries: I) -> Result<StoreReport>
    where
        I: IntoIterator<Item = (&'a TreePath, &'a Value)>,
    {
        let timer = Timer::new("store_all");
        let mut container = Container::open(&self.file)?;
        let mut report = StoreReport::default();
        for (path, value) in entries {
            if value.is_absent() {
                self.metrics.record_skip();
                report.skipped += 1;
                continue;
            }
            match self.write_value(&mut container, path, value) {
                Ok(()) => report.stored += 1,
                Err(err) => {
                    self.metrics.record_write_error();
                    error!(
                        path = %path,
                        value_type = value.type_name(),
                        %err,
                        "failed to encode value"
                    );
                    report.failures.push(StoreFailure {
                        path: path.clone(),
                        type_name: value.type_name(),
                        message: err.to_string(),
                    });
                }
            }
        }
        container.save(&self.file, self.config.store.sync_writes)?;
        info!(
            file = %self.file.display(),
            stored = report.stored,
            skipped = report.skipped,
            failed = report.failures.len(),
            "archive batch written"
        );
        timer.stop();
        Ok(report)
    }

    /// Load the value at `path`, or `default` when the path (or the whole
    /// container file) is missing. Missing paths are never an error.
    pub fn load(&self, path: &TreePath, kind: LoadKind, default: Value) -> Result<Value> {
        let container = Container::open(&self.file)?;
        let loaded = match kind {
            LoadKind::Atom => container.dataset(path).map(payload_to_value),
            LoadKind::Mapping => container.group(path).map(|g| Value::Map(group_to_map(g))),
            LoadKind::Table => load_table(&container, path).map(Value::Table),
        };
        match loaded {
            Some(value) => {
                self.metrics.record_load();
                Ok(value)
            }
            None => {
                self.metrics.record_default();
                debug!(path = %path, kind = ?kind, "missing path, returning default");
                Ok(default)
            }
        }
    }

    fn write_value(&self, container: &mut Container, path: &TreePath, value: &Value) -> Result<()> {
        match value {
            Value::Absent => {
                self.metrics.record_skip();
                Ok(())
            }
            Value::Map(map) => {
                for (key, sub) in map {
                    self.write_value(container, &path.child(key), sub)?;
                }
                Ok(())
            }
            Value::Table(table) => self.write_table(container, path, table),
            Value::Ints(data) => self.put(
                container,
                path,
                Payload::IntArray {
                    shape: vec![data.len() as u32],
                    data: data.clone(),
                },
            ),
            Value::Floats(data) => self.put(
                container,
                path,
                Payload::FloatArray {
                    shape: vec![data.len() as u32],
                    data: data.clone(),
                },
            ),
            Value::Texts(data) => self.put(
                container,
                path,
                Payload::StrArray {
                    shape: vec![data.len() as u32],
                    data: data.clone(),
                },
            ),
            Value::FilePath(p) => self.put(
                container,
                path,
                Payload::Str(p.to_string_lossy().into_owned()),
            ),
            Value::Timestamp(t) => self.put(container, path, Payload::Str(t.to_rfc3339())),
            Value::Scalar(s) => self.put(container, path, scalar_payload(s)),
            Value::Quantity(Quantity { magnitude, unit }) => {
                self.put(container, &path.child("magnitude"), Payload::Float(*magnitude))?;
                self.put(container, &path.child("unit"), Payload::Str(unit.clone()))
            }
        }
    }

    fn write_table(&self, container: &mut Container, path: &TreePath, table: &Table) -> Result<()> {
        if !table.is_rectangular() {
            return Err(Error::Encoding {
                path: path.to_string(),
                type_name: "table",
                message: format!(
                    "ragged table: {} columns, {} index labels, {} rows",
                    table.columns.len(),
                    table.index.len(),
                    table.data.len()
                ),
            });
        }
        self.put(
            container,
            &path.child("columns"),
            Payload::StrArray {
                shape: vec![table.columns.len() as u32],
                data: table.columns.clone(),
            },
        )?;
        self.put(
            container,
            &path.child("index"),
            Payload::StrArray {
                shape: vec![table.index.len() as u32],
                data: table.index.clone(),
            },
        )?;
        let shape = vec![table.data.len() as u32, table.columns.len() as u32];
        let data = if table.is_numeric() {
            Payload::FloatArray {
                shape,
                data: table
                    .data
                    .iter()
                    .flatten()
                    .map(|c| c.as_f64().unwrap_or_default())
                    .collect(),
            }
        } else {
            // Mixed-type cells cannot share a numeric dtype; stringify.
            Payload::StrArray {
                shape,
                data: table.data.iter().flatten().map(Scalar::render).collect(),
            }
        };
        self.put(container, &path.child("data"), data)
    }

    fn put(&self, container: &mut Container, path: &TreePath, payload: Payload) -> Result<()> {
        match container.put(path, payload)? {
            PutOutcome::Recreated => {
                self.metrics.record_recreate();
                self.metrics.record_write();
                warn!(path = %path, "replaced slot with incompatible shape or type");
            }
            PutOutcome::Created | PutOutcome::Updated => self.metrics.record_write(),
        }
        Ok(())
    }
}

fn scalar_payload(scalar: &Scalar) -> Payload {
    match scalar {
        Scalar::Bool(b) => Payload::Bool(*b),
        Scalar::Int(i) => Payload::Int(*i),
        Scalar::Float(f) => Payload::Float(*f),
        Scalar::Text(s) => Payload::Str(s.clone()),
    }
}

/// Dataset → leaf value. Multi-dimensional arrays outside a table context
/// come back row-major flattened; tables keep their shape through
/// [`LoadKind::Table`].
fn payload_to_value(payload: &Payload) -> Value {
    match payload {
        Payload::Bool(b) => Value::Scalar(Scalar::Bool(*b)),
        Payload::Int(i) => Value::Scalar(Scalar::Int(*i)),
        Payload::Float(f) => Value::Scalar(Scalar::Float(*f)),
        Payload::Str(s) => Value::Scalar(Scalar::Text(s.clone())),
        Payload::IntArray { data, .. } => Value::Ints(data.clone()),
        Payload::FloatArray { data, .. } => Value::Floats(data.clone()),
        Payload::StrArray { data, .. } => Value::Texts(data.clone()),
    }
}

fn group_to_map(group: &Group) -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    for (name, entry) in group.children() {
        let value = match entry {
            Entry::Dataset(p) => payload_to_value(p),
            Entry::Group(g) => Value::Map(group_to_map(g)),
        };
        map.insert(name.to_string(), value);
    }
    map
}

fn load_table(container: &Container, path: &TreePath) -> Option<Table> {
    let columns = match container.dataset(&path.child("columns"))? {
        Payload::StrArray { data, .. } => data.clone(),
        _ => return None,
    };
    let index = match container.dataset(&path.child("index"))? {
        Payload::StrArray { data, .. } => data.clone(),
        _ => return None,
    };
    let cols = columns.len();
    let rows = index.len();
    let cells: Vec<Scalar> = match container.dataset(&path.child("data"))? {
        Payload::FloatArray { data, .. } => data.iter().map(|f| Scalar::Float(*f)).collect(),
        Payload::IntArray { data, .. } => data.iter().map(|i| Scalar::Int(*i)).collect(),
        Payload::StrArray { data, .. } => data.iter().map(|s| Scalar::Text(s.clone())).collect(),
        _ => return None,
    };
    if cells.len() != rows * cols {
        return None;
    }
    let data = if cols == 0 {
        vec![Vec::new(); rows]
    } else {
        cells.chunks(cols).map(<[Scalar]>::to_vec).collect()
    };
    Some(Table {
        columns,
        index,
        data,
    })
}
