//! # Path Flattening
//!
//! Depth-first, pre-order traversal of a record graph into an ordered
//! mapping of hierarchical path → leaf value. Pure: no I/O, no state
//! beyond the output map.
//!
//! ## Path rules
//!
//! - A record member contributes its member name as a segment.
//! - A collection element contributes the element's identifier when it has
//!   a non-empty one, otherwise its positional index. Paths are therefore
//!   only stable across re-ordering when every element is identified.
//! - A collection with exactly one element contributes no segment for that
//!   element (singleton collapsing, see [`LayoutConfig`]). Appending a
//!   second element renames the first element's paths.
//!
//! The graph is assumed to be a tree: each record reachable from exactly
//! one path. Cycles are a precondition violation and are not detected.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::path::{TreePath, SEPARATOR};
use crate::record::Node;
use crate::value::Value;

/// Ordered path → leaf value mapping produced by one flattening call.
pub type FlatMap = IndexMap<TreePath, Value>;

/// Flatten a record graph with the default layout.
pub fn flatten(prefix: &TreePath, node: &Node<'_>) -> Result<FlatMap> {
    flatten_with_layout(prefix, node, &LayoutConfig::default())
}

/// Flatten a record graph with an explicit layout configuration.
pub fn flatten_with_layout(
    prefix: &TreePath,
    node: &Node<'_>,
    layout: &LayoutConfig,
) -> Result<FlatMap> {
    let mut out = FlatMap::new();
    visit(prefix, node, layout, &mut out)?;
    Ok(out)
}

fn visit(
    prefix: &TreePath,
    node: &Node<'_>,
    layout: &LayoutConfig,
    out: &mut FlatMap,
) -> Result<()> {
    match node {
        Node::Leaf(value) => {
            // Absent leaves are bound as-is; the store decides how to
            // represent absence. Never silently dropped here.
            out.insert(prefix.clone(), value.clone());
        }
        Node::Record(record) => {
            let members = record.storable_members();
            if members.is_empty() {
                out.insert(prefix.clone(), Value::Map(BTreeMap::new()));
                return Ok(());
            }
            for name in members {
                check_segment(prefix, name, "member name")?;
                visit(&prefix.child(name), &record.member(name), layout, out)?;
            }
        }
        Node::Collection(items) => {
            if items.is_empty() {
                return Ok(());
            }
            if items.len() == 1 && layout.collapse_singletons {
                return visit(prefix, &items[0], layout, out);
            }
            let mut seen = HashSet::new();
            for (index, item) in items.iter().enumerate() {
                let segment = match item.identifier() {
                    Some(id) => {
                        check_segment(prefix, id, "identifier")?;
                        id.to_string()
                    }
                    None => index.to_string(),
                };
                if !seen.insert(segment.clone()) {
                    return Err(Error::DuplicateIdentifier {
                        path: prefix.child(&segment).to_string(),
                        identifier: segment,
                    });
                }
                visit(&prefix.child(&segment), item, layout, out)?;
            }
        }
    }
    Ok(())
}

/// A segment that embeds the separator would silently splice extra levels
/// into the hierarchy; reject it with the failing prefix for diagnosis.
fn check_segment(prefix: &TreePath, segment: &str, what: &str) -> Result<()> {
    if segment.contains(SEPARATOR) {
        return Err(Error::Identifier {
            path: prefix.to_string(),
            message: format!("{what} '{segment}' contains '{SEPARATOR}'"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Storable;
    use crate::value::Quantity;

    struct Mixture {
        id: String,
        component_masses: Vec<f64>,
        density: Option<Quantity>,
    }

    impl Mixture {
        fn new(id: &str, masses: Vec<f64>) -> Self {
            Self {
                id: id.to_string(),
                component_masses: masses,
                density: None,
            }
        }
    }

    impl Storable for Mixture {
        fn identifier(&self) -> Option<&str> {
            Some(&self.id)
        }

        fn storable_members(&self) -> &[&str] {
            &["ComponentMasses", "Density"]
        }

        fn member(&self, name: &str) -> Node<'_> {
            match name {
                "ComponentMasses" => Node::leaf(self.component_masses.clone()),
                "Density" => Node::leaf(self.density.clone()),
                _ => Node::absent(),
            }
        }
    }

    struct Experiment {
        mixtures: Vec<Mixture>,
    }

    impl Storable for Experiment {
        fn storable_members(&self) -> &[&str] {
            &["mixtures"]
        }

        fn member(&self, name: &str) -> Node<'_> {
            match name {
                "mixtures" => Node::records(&self.mixtures),
                _ => Node::absent(),
            }
        }
    }

    fn root() -> TreePath {
        TreePath::new("Exp")
    }

    #[test]
    fn test_scalar_list_is_one_binding() {
        // Two masses in a plain scalar list are a single array leaf, not a
        // collection of records.
        let exp = Experiment {
            mixtures: vec![Mixture::new("Mix1", vec![12.5, 7.3])],
        };
        let flat = flatten(&root(), &Node::record(&exp)).unwrap();
        assert_eq!(
            flat.get(&TreePath::new("Exp/mixtures/ComponentMasses")),
            Some(&Value::Floats(vec![12.5, 7.3]))
        );
    }

    #[test]
    fn test_identifier_segments_over_indices() {
        let exp = Experiment {
            mixtures: vec![
                Mixture::new("Solution0", vec![1.0]),
                Mixture::new("Solution1", vec![2.0]),
            ],
        };
        let flat = flatten(&root(), &Node::record(&exp)).unwrap();
        assert!(flat.contains_key(&TreePath::new("Exp/mixtures/Solution0/ComponentMasses")));
        assert!(flat.contains_key(&TreePath::new("Exp/mixtures/Solution1/ComponentMasses")));
        assert!(!flat.keys().any(|p| p.as_str().contains("mixtures/0")));
    }

    #[test]
    fn test_singleton_collapsing_boundary() {
        let one = Experiment {
            mixtures: vec![Mixture::new("A", vec![1.0])],
        };
        let flat = flatten(&root(), &Node::record(&one)).unwrap();
        assert!(flat.contains_key(&TreePath::new("Exp/mixtures/ComponentMasses")));
        assert!(!flat.keys().any(|p| p.as_str().contains("mixtures/A")));

        // Appending a second element forces segments for both.
        let two = Experiment {
            mixtures: vec![Mixture::new("A", vec![1.0]), Mixture::new("B", vec![2.0])],
        };
        let flat = flatten(&root(), &Node::record(&two)).unwrap();
        assert!(flat.contains_key(&TreePath::new("Exp/mixtures/A/ComponentMasses")));
        assert!(flat.contains_key(&TreePath::new("Exp/mixtures/B/ComponentMasses")));
    }

    #[test]
    fn test_collapsing_disabled() {
        let layout = LayoutConfig {
            collapse_singletons: false,
        };
        let one = Experiment {
            mixtures: vec![Mixture::new("A", vec![1.0])],
        };
        let flat = flatten_with_layout(&root(), &Node::record(&one), &layout).unwrap();
        assert!(flat.contains_key(&TreePath::new("Exp/mixtures/A/ComponentMasses")));
    }

    #[test]
    fn test_determinism() {
        let exp = Experiment {
            mixtures: vec![
                Mixture::new("Solution0", vec![1.0, 2.0]),
                Mixture::new("Solution1", vec![3.0]),
            ],
        };
        let a = flatten(&root(), &Node::record(&exp)).unwrap();
        let b = flatten(&root(), &Node::record(&exp)).unwrap();
        assert_eq!(a, b);
        let keys_a: Vec<_> = a.keys().collect();
        let keys_b: Vec<_> = b.keys().collect();
        assert_eq!(keys_a, keys_b);
    }

    #[test]
    fn test_empty_collection_contributes_nothing() {
        let exp = Experiment { mixtures: vec![] };
        let flat = flatten(&root(), &Node::record(&exp)).unwrap();
        assert!(flat.is_empty());
    }

    #[test]
    fn test_absent_member_is_bound() {
        let exp = Experiment {
            mixtures: vec![Mixture::new("M", vec![1.0])],
        };
        let flat = flatten(&root(), &Node::record(&exp)).unwrap();
        assert_eq!(
            flat.get(&TreePath::new("Exp/mixtures/Density")),
            Some(&Value::Absent)
        );
    }

    #[test]
    fn test_duplicate_identifier_fails_fast() {
        let exp = Experiment {
            mixtures: vec![Mixture::new("Dup", vec![1.0]), Mixture::new("Dup", vec![2.0])],
        };
        let err = flatten(&root(), &Node::record(&exp)).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_IDENTIFIER");
        assert!(err.to_string().contains("Exp/mixtures/Dup"));
    }

    #[test]
    fn test_identifier_with_separator_fails() {
        let exp = Experiment {
            mixtures: vec![
                Mixture::new("bad/name", vec![1.0]),
                Mixture::new("ok", vec![2.0]),
            ],
        };
        let err = flatten(&root(), &Node::record(&exp)).unwrap_err();
        assert_eq!(err.error_code(), "IDENTIFIER_ERROR");
        assert!(err.to_string().contains("Exp/mixtures"));
    }

    #[test]
    fn test_index_segments_without_identifiers() {
        // Unidentified leaf elements fall back to positional indices.
        let node = Node::Collection(vec![Node::leaf(1.0), Node::leaf(2.0)]);
        let flat = flatten(&TreePath::new("Exp/raw"), &node).unwrap();
        assert_eq!(flat.get(&TreePath::new("Exp/raw/0")), Some(&Value::from(1.0)));
        assert_eq!(flat.get(&TreePath::new("Exp/raw/1")), Some(&Value::from(2.0)));
    }
}
