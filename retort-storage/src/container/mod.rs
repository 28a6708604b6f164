//! Self-describing hierarchical binary container: a tree of named groups
//! with typed datasets at the leaves, persisted as a single checksummed
//! file. The archive's only persistent entity.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Container File Structure                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header:  [magic: 8B][version: u32]                         │
//! │                                                             │
//! │  Body (root group, recursive):                              │
//! │    Group:   [child_count: u32]                              │
//! │             per child: [name_len: u16][name]                │
//! │                        [kind: u8]  0 = group, 1 = dataset   │
//! │                        [group body | dataset payload]       │
//! │    Dataset: [type_tag: u8][payload]                         │
//! │             scalars:  bool/i64/f64/[len:u32][utf-8]         │
//! │             arrays:   [ndim: u8][dim: u32 ...][elements]    │
//! │                       (strings always length-prefixed)      │
//! │                                                             │
//! │  Trailer: [crc32(body): u32]                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Access follows a scoped-resource model: callers open, mutate or query
//! the in-memory tree, save, and drop. No file handle outlives a call, and
//! concurrent writers to the same file are not coordinated.

mod reader;
mod types;
mod writer;

pub use types::{
    Entry, Group, Payload, PayloadKind, PutOutcome, CONTAINER_MAGIC, CONTAINER_VERSION,
    HEADER_SIZE, MAX_GROUP_DEPTH, TRAILER_SIZE,
};

use std::collections::btree_map::Entry as MapEntry;
use std::path::Path;

use retort_core::error::{Error, Result};
use retort_core::path::TreePath;

/// An open hierarchical container: the decoded tree of one archive file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    root: Group,
}

impl Container {
    /// An empty container with no slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a container from disk. A missing file yields an empty
    /// container so partially-initialized archives stay loadable; any
    /// other I/O or format problem is fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        match reader::read_container(path.as_ref()) {
            Ok(root) => Ok(Self { root }),
            Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Write the tree to disk, replacing any previous file content.
    pub fn save(&self, path: impl AsRef<Path>, sync: bool) -> Result<()> {
        writer::write_container(&self.root, path.as_ref(), sync)
    }

    /// Create or overwrite the dataset at `path`, creating intermediate
    /// groups as needed.
    ///
    /// A layout-compatible existing dataset is overwritten in place. An
    /// incompatible dataset — or any entry blocking an intermediate
    /// segment — is deleted and recreated; the returned [`PutOutcome`]
    /// tells the caller which case occurred.
    pub fn put(&mut self, path: &TreePath, payload: Payload) -> Result<PutOutcome> {
        let mut segments: Vec<&str> = path.segments().collect();
        let last = segments.pop().ok_or_else(|| Error::Container {
            message: "cannot put a dataset at the empty path".to_string(),
        })?;

        let mut healed = false;
        let mut group = &mut self.root;
        for segment in segments {
            let entry = group
                .children
                .entry(segment.to_string())
                .or_insert_with(Entry::group);
            if !entry.is_group() {
                *entry = Entry::group();
                healed = true;
            }
            group = match entry {
                Entry::Group(g) => g,
                Entry::Dataset(_) => unreachable!("entry was just made a group"),
            };
        }

        let outcome = match group.children.entry(last.to_string()) {
            MapEntry::Vacant(slot) => {
                slot.insert(Entry::Dataset(payload));
                PutOutcome::Created
            }
            MapEntry::Occupied(mut slot) => match slot.get_mut() {
                Entry::Dataset(existing) if existing.same_layout(&payload) => {
                    *existing = payload;
                    PutOutcome::Updated
                }
                blocking => {
                    *blocking = Entry::Dataset(payload);
                    PutOutcome::Recreated
                }
            },
        };
        if healed {
            Ok(PutOutcome::Recreated)
        } else {
            Ok(outcome)
        }
    }

    /// The entry at `path`, if any.
    pub fn entry(&self, path: &TreePath) -> Option<&Entry> {
        let mut segments = path.segments();
        let mut current = self.root.children.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Entry::Group(g) => g.children.get(segment)?,
                Entry::Dataset(_) => return None,
            };
        }
        Some(current)
    }

    /// The dataset at `path`, if the entry exists and is not a group.
    pub fn dataset(&self, path: &TreePath) -> Option<&Payload> {
        match self.entry(path)? {
            Entry::Dataset(p) => Some(p),
            Entry::Group(_) => None,
        }
    }

    /// The group at `path`; the empty path addresses the root group.
    pub fn group(&self, path: &TreePath) -> Option<&Group> {
        if path.is_empty() {
            return Some(&self.root);
        }
        match self.entry(path)? {
            Entry::Group(g) => Some(g),
            Entry::Dataset(_) => None,
        }
    }

    pub fn contains(&self, path: &TreePath) -> bool {
        self.entry(path).is_some()
    }

    /// Remove the entry at `path` and everything beneath it. Returns
    /// whether anything was removed.
    pub fn delete(&mut self, path: &TreePath) -> bool {
        let Some(leaf) = path.leaf() else {
            return false;
        };
        let parent = match path.parent() {
            Some(p) => p,
            None => TreePath::empty(),
        };
        let group = match self.group_mut(&parent) {
            Some(g) => g,
            None => return false,
        };
        group.children.remove(leaf).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Total number of datasets in the container.
    pub fn dataset_count(&self) -> usize {
        self.root.dataset_count()
    }

    fn group_mut(&mut self, path: &TreePath) -> Option<&mut Group> {
        let mut group = &mut self.root;
        for segment in path.segments() {
            group = match group.children.get_mut(segment)? {
                Entry::Group(g) => g,
                Entry::Dataset(_) => return None,
            };
        }
        Some(group)
    }
}
