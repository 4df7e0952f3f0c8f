// hierarchy.rs — Subsumption and context-compatibility queries.
//
// The HierarchyIndex is a read-only union of the vocabulary's tree edges
// (parent pointers) and the compatibility rules' extra edges
// (cross-branch generalizations like purpose:advertising subsuming
// purpose:marketing). Built once per run; no lifecycle beyond the run.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::loader::{CompatibilityRules, ContextRule, Vocabulary};

/// Precomputed subsumption structure over the loaded ontology.
#[derive(Debug, Clone)]
pub struct HierarchyIndex {
    /// URI → parent URI from the vocabulary's tree.
    parent_map: HashMap<String, String>,
    /// Explicit `(parent, child)` rule edges.
    derived_edges: HashSet<(String, String)>,
    /// Facet-keyed symmetric context-compatibility overrides.
    context_rules: BTreeMap<String, Vec<ContextRule>>,
}

impl HierarchyIndex {
    /// Combine the vocabulary's parent chains with the rules' explicit
    /// subsumption edges and context overrides.
    pub fn build(vocab: &Vocabulary, rules: &CompatibilityRules) -> Self {
        let mut derived_edges = HashSet::new();
        for (parent, child) in &rules.purpose_subsumption {
            derived_edges.insert((parent.clone(), child.clone()));
        }
        for (parent, child) in &rules.subject_subsumption {
            derived_edges.insert((parent.clone(), child.clone()));
        }

        Self {
            parent_map: vocab.parent_map(),
            derived_edges,
            context_rules: rules.context_compatibility.clone(),
        }
    }

    /// Does `parent` subsume `child`?
    ///
    /// Equal URIs always subsume (reflexive). An explicit rule edge
    /// subsumes directly. Otherwise walk the child's parent chain
    /// upward. The walk tracks visited nodes and stops on revisit so a
    /// cycle in the vocabulary data terminates instead of spinning —
    /// cycles are a data-quality bug, not a crash.
    pub fn is_subsumed(&self, parent: &str, child: &str) -> bool {
        if parent == child {
            return true;
        }
        if self
            .derived_edges
            .contains(&(parent.to_string(), child.to_string()))
        {
            return true;
        }

        let mut current = child;
        let mut visited: HashSet<&str> = HashSet::new();
        while let Some(next) = self.parent_map.get(current) {
            if !visited.insert(current) {
                break;
            }
            current = next;
            if current == parent {
                return true;
            }
        }
        false
    }

    /// Is `target` within the scope the allowed set permits? True iff any
    /// allowed URI subsumes `target`; the allowed set may contain broader
    /// categories than the target.
    pub fn purpose_in_closure<'a, I>(&self, target: &str, allowed: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        allowed
            .into_iter()
            .any(|allowed_uri| self.is_subsumed(allowed_uri, target))
    }

    /// Context-term compatibility. Absence on either side is compatible
    /// (an unstated context imposes no constraint); equal URIs are
    /// compatible; otherwise the symmetric override table decides,
    /// defaulting to compatible when no explicit rule exists — absence
    /// of a conflict rule is not evidence of conflict.
    pub fn is_context_compatible(&self, a: Option<&str>, b: Option<&str>) -> bool {
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            _ => return true,
        };
        if a == b {
            return true;
        }

        for entries in self.context_rules.values() {
            for rule in entries {
                if (rule.a == a && rule.b == b) || (rule.a == b && rule.b == a) {
                    return rule.compatible;
                }
            }
        }
        true
    }
}
