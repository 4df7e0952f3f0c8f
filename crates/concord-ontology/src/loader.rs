// loader.rs — Vocabulary and compatibility-rules loading.
//
// Two vocab shapes are supported:
//
// 1. A single `vocab.json` document with nested facet arrays, where
//    "subjects" doubles as "data_categories".
// 2. A directory with one file per facet (actions.json, purposes.json,
//    data_categories.json, recipients.json, legal_bases.json,
//    views.json), enabling independently versioned facets.
//
// Loading is tolerant at the term level: vocab files are maintained by
// humans and may be malformed. A term missing a URI is dropped rather
// than failing the whole load; a missing label falls back to the tail
// segment of the URI. Anything else (unreadable file, wrong extension,
// invalid JSON) is a fatal ConfigError.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Terms ──

/// One canonical ontology term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabTerm {
    /// Canonical identifier, `facet:term` (e.g., "subject:device_id").
    pub uri: String,
    /// Preferred label for the term.
    pub label: String,
    /// Parent term URI; absent for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Alternate labels that also resolve to this term.
    #[serde(default)]
    pub alt_labels: Vec<String>,
}

/// The full loaded vocabulary, one ordered term list per facet plus the
/// open context facet set. Order matters: downstream "first match wins"
/// rules are defined over vocabulary iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub actions: Vec<VocabTerm>,
    pub subjects: Vec<VocabTerm>,
    /// Same terms as `subjects` — the single-document shape declares one
    /// list that serves both roles.
    pub data_categories: Vec<VocabTerm>,
    pub purposes: Vec<VocabTerm>,
    pub views: Vec<VocabTerm>,
    pub recipients: Vec<VocabTerm>,
    pub legal_bases: Vec<VocabTerm>,
    /// Open facet set keyed by facet name, deterministically ordered.
    pub context: BTreeMap<String, Vec<VocabTerm>>,
}

impl Vocabulary {
    /// All terms in vocabulary iteration order: the six closed facets,
    /// then context facets in key order. `data_categories` is the same
    /// list as `subjects` and is not visited a second time.
    pub fn iter_terms(&self) -> impl Iterator<Item = &VocabTerm> {
        self.actions
            .iter()
            .chain(self.subjects.iter())
            .chain(self.purposes.iter())
            .chain(self.views.iter())
            .chain(self.recipients.iter())
            .chain(self.legal_bases.iter())
            .chain(self.context.values().flatten())
    }

    /// Exact label/alt-label → URI lookup. Collisions resolve
    /// last-write-wins in load order.
    pub fn label_to_uri(&self) -> HashMap<String, String> {
        let mut mapping = HashMap::new();
        for term in self.iter_terms() {
            mapping.insert(term.label.clone(), term.uri.clone());
            for alt in &term.alt_labels {
                mapping.insert(alt.clone(), term.uri.clone());
            }
        }
        mapping
    }

    /// URI → parent URI; roots are absent.
    pub fn parent_map(&self) -> HashMap<String, String> {
        let mut mapping = HashMap::new();
        for term in self.iter_terms() {
            if let Some(parent) = &term.parent {
                mapping.insert(term.uri.clone(), parent.clone());
            }
        }
        mapping
    }
}

// ── Compatibility rules ──

/// A symmetric pairwise context-compatibility override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextRule {
    pub a: String,
    pub b: String,
    #[serde(default)]
    pub compatible: bool,
}

/// Explicit subsumption edges and context overrides that are not
/// expressible as simple parent pointers (cross-branch generalization).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityRules {
    /// `(parent, child)` purpose edges.
    pub purpose_subsumption: Vec<(String, String)>,
    /// `(parent, child)` subject edges.
    pub subject_subsumption: Vec<(String, String)>,
    /// Facet-keyed pairwise overrides, deterministically ordered.
    pub context_compatibility: BTreeMap<String, Vec<ContextRule>>,
}

// ── Raw wire shapes ──

/// A term as it appears on disk. Accepts the field-name variants seen in
/// mixed vocab formats (`uri`/`id`, `label`/`preferred_label`,
/// `parent`/`parent_id`).
#[derive(Debug, Deserialize)]
struct RawTerm {
    uri: Option<String>,
    id: Option<String>,
    label: Option<String>,
    preferred_label: Option<String>,
    parent: Option<String>,
    parent_id: Option<String>,
    #[serde(default)]
    alt_labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawVocabDoc {
    #[serde(default)]
    actions: Vec<RawTerm>,
    #[serde(default)]
    subjects: Vec<RawTerm>,
    #[serde(default)]
    purposes: Vec<RawTerm>,
    #[serde(default)]
    views: Vec<RawTerm>,
    #[serde(default)]
    context: BTreeMap<String, Vec<RawTerm>>,
}

#[derive(Debug, Deserialize)]
struct RawFacetFile {
    #[serde(default)]
    terms: Vec<RawTerm>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    parent: String,
    child: String,
}

#[derive(Debug, Deserialize)]
struct RawRulesDoc {
    #[serde(default)]
    purpose_subsumption: Vec<RawEdge>,
    #[serde(default)]
    subject_subsumption: Vec<RawEdge>,
    #[serde(default)]
    context_compatibility: BTreeMap<String, Vec<ContextRule>>,
}

/// The tail segment of a URI — text after the last `:`.
fn uri_tail(uri: &str) -> &str {
    uri.rsplit(':').next().unwrap_or(uri)
}

fn to_terms(items: Vec<RawTerm>) -> Vec<VocabTerm> {
    let mut terms = Vec::with_capacity(items.len());
    for item in items {
        // Skip malformed terms but keep the loader tolerant of mixed
        // vocab formats.
        let uri = match item.uri.or(item.id) {
            Some(uri) => uri,
            None => {
                tracing::debug!("dropping vocab term without uri");
                continue;
            }
        };
        let label = item
            .label
            .or(item.preferred_label)
            .unwrap_or_else(|| uri_tail(&uri).to_string());
        terms.push(VocabTerm {
            label,
            parent: item.parent.or(item.parent_id),
            alt_labels: item.alt_labels,
            uri,
        });
    }
    terms
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

// ── Loaders ──

/// Load a vocabulary from a single `vocab.json` document or a vocab
/// directory with one file per facet.
pub fn load_vocab(path: impl AsRef<Path>) -> Result<Vocabulary, ConfigError> {
    let path = path.as_ref();
    if path.is_dir() {
        return load_vocab_dir(path);
    }
    if !has_json_extension(path) {
        return Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    load_vocab_json(path)
}

fn load_vocab_json(path: &Path) -> Result<Vocabulary, ConfigError> {
    let doc: RawVocabDoc = read_json(path)?;
    let subjects = to_terms(doc.subjects);
    let context = doc
        .context
        .into_iter()
        .map(|(facet, terms)| (facet, to_terms(terms)))
        .collect();
    Ok(Vocabulary {
        actions: to_terms(doc.actions),
        data_categories: subjects.clone(),
        subjects,
        purposes: to_terms(doc.purposes),
        views: to_terms(doc.views),
        recipients: Vec::new(),
        legal_bases: Vec::new(),
        context,
    })
}

fn load_vocab_dir(path: &Path) -> Result<Vocabulary, ConfigError> {
    let load_facet = |file_name: &str| -> Result<Vec<VocabTerm>, ConfigError> {
        let doc: RawFacetFile = read_json(&path.join(file_name))?;
        Ok(to_terms(doc.terms))
    };

    let data_categories = load_facet("data_categories.json")?;
    Ok(Vocabulary {
        actions: load_facet("actions.json")?,
        subjects: data_categories.clone(),
        data_categories,
        purposes: load_facet("purposes.json")?,
        views: load_facet("views.json")?,
        recipients: load_facet("recipients.json")?,
        legal_bases: load_facet("legal_bases.json")?,
        context: BTreeMap::new(),
    })
}

/// Load compatibility rules from `compatibility_rules.json`.
pub fn load_rules(path: impl AsRef<Path>) -> Result<CompatibilityRules, ConfigError> {
    let path = path.as_ref();
    if !has_json_extension(path) {
        return Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    let doc: RawRulesDoc = read_json(path)?;
    Ok(CompatibilityRules {
        purpose_subsumption: doc
            .purpose_subsumption
            .into_iter()
            .map(|edge| (edge.parent, edge.child))
            .collect(),
        subject_subsumption: doc
            .subject_subsumption
            .into_iter()
            .map(|edge| (edge.parent, edge.child))
            .collect(),
        context_compatibility: doc.context_compatibility,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const VOCAB_DOC: &str = r#"{
        "actions": [
            {"uri": "action:share", "label": "share", "alt_labels": ["disclose to"]},
            {"uri": "action:collect", "label": "collect"}
        ],
        "subjects": [
            {"uri": "subject:identifier", "label": "identifier"},
            {"uri": "subject:device_id", "label": "device identifier", "parent": "subject:identifier"}
        ],
        "purposes": [
            {"uri": "purpose:advertising", "label": "advertising"},
            {"uri": "purpose:analytics", "label": "analytics"}
        ],
        "views": [
            {"uri": "view:may", "label": "may"},
            {"uri": "view:do_not", "label": "do not"}
        ],
        "context": {
            "localisation": [
                {"uri": "context:eu", "label": "european union"}
            ]
        }
    }"#;

    #[test]
    fn single_document_loads_with_subjects_doubling_as_data_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "vocab.json", VOCAB_DOC);

        let vocab = load_vocab(&path).unwrap();
        assert_eq!(vocab.actions.len(), 2);
        assert_eq!(vocab.subjects.len(), 2);
        assert_eq!(vocab.data_categories, vocab.subjects);
        assert!(vocab.recipients.is_empty());
        assert!(vocab.legal_bases.is_empty());
        assert_eq!(vocab.context["localisation"][0].uri, "context:eu");
    }

    #[test]
    fn directory_shape_loads_per_facet_files() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "actions.json",
            r#"{"terms": [{"uri": "action:share", "label": "share"}]}"#,
        );
        write_file(
            dir.path(),
            "purposes.json",
            r#"{"terms": [{"uri": "purpose:analytics", "label": "analytics"}]}"#,
        );
        write_file(
            dir.path(),
            "data_categories.json",
            r#"{"terms": [{"uri": "subject:device_id", "label": "device identifier"}]}"#,
        );
        write_file(
            dir.path(),
            "recipients.json",
            r#"{"terms": [{"uri": "recipient:partner", "label": "partner"}]}"#,
        );
        write_file(
            dir.path(),
            "legal_bases.json",
            r#"{"terms": [{"uri": "basis:consent", "label": "consent"}]}"#,
        );
        write_file(dir.path(), "views.json", r#"{"terms": []}"#);

        let vocab = load_vocab(dir.path()).unwrap();
        assert!(vocab.recipients.iter().any(|t| t.uri == "recipient:partner"));
        assert!(vocab.legal_bases.iter().any(|t| t.uri == "basis:consent"));
        assert_eq!(vocab.subjects, vocab.data_categories);
        assert!(vocab.context.is_empty());
    }

    #[test]
    fn unsupported_extension_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "vocab.yaml", "actions: []");

        match load_vocab(&path) {
            Err(ConfigError::UnsupportedFormat { .. }) => {}
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn term_without_uri_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "vocab.json",
            r#"{"actions": [{"label": "orphan"}, {"uri": "action:share", "label": "share"}]}"#,
        );

        let vocab = load_vocab(&path).unwrap();
        assert_eq!(vocab.actions.len(), 1);
        assert_eq!(vocab.actions[0].uri, "action:share");
    }

    #[test]
    fn missing_label_falls_back_to_uri_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "vocab.json",
            r#"{"purposes": [{"uri": "purpose:service_provision"}]}"#,
        );

        let vocab = load_vocab(&path).unwrap();
        assert_eq!(vocab.purposes[0].label, "service_provision");
    }

    #[test]
    fn id_and_parent_id_variants_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "vocab.json",
            r#"{"subjects": [{"id": "subject:cookie_id", "preferred_label": "cookie identifier", "parent_id": "subject:device_id"}]}"#,
        );

        let vocab = load_vocab(&path).unwrap();
        let term = &vocab.subjects[0];
        assert_eq!(term.uri, "subject:cookie_id");
        assert_eq!(term.label, "cookie identifier");
        assert_eq!(term.parent.as_deref(), Some("subject:device_id"));
    }

    #[test]
    fn label_collisions_resolve_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "vocab.json",
            r#"{
                "actions": [{"uri": "action:use", "label": "process"}],
                "purposes": [{"uri": "purpose:processing", "label": "process"}]
            }"#,
        );

        let vocab = load_vocab(&path).unwrap();
        let mapping = vocab.label_to_uri();
        // Purposes load after actions, so the purpose term wins.
        assert_eq!(mapping["process"], "purpose:processing");
    }

    #[test]
    fn parent_map_only_lists_non_roots() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "vocab.json", VOCAB_DOC);

        let vocab = load_vocab(&path).unwrap();
        let parents = vocab.parent_map();
        assert_eq!(parents["subject:device_id"], "subject:identifier");
        assert!(!parents.contains_key("subject:identifier"));
    }

    #[test]
    fn rules_load_edges_and_context_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "compatibility_rules.json",
            r#"{
                "purpose_subsumption": [{"parent": "purpose:advertising", "child": "purpose:marketing"}],
                "subject_subsumption": [{"parent": "subject:identifier", "child": "subject:cookie_id"}],
                "context_compatibility": {
                    "localisation": [{"a": "context:eu", "b": "context:us", "compatible": false}]
                }
            }"#,
        );

        let rules = load_rules(&path).unwrap();
        assert_eq!(
            rules.purpose_subsumption,
            vec![("purpose:advertising".to_string(), "purpose:marketing".to_string())]
        );
        assert_eq!(rules.subject_subsumption.len(), 1);
        assert!(!rules.context_compatibility["localisation"][0].compatible);
    }

    #[test]
    fn rules_reject_non_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "rules.toml", "");

        match load_rules(&path) {
            Err(ConfigError::UnsupportedFormat { .. }) => {}
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }
}
