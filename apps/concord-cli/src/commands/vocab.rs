// vocab.rs — Vocabulary subcommands: lint.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use clap::Subcommand;

use concord_ontology::{load_vocab, Vocabulary};

#[derive(Subcommand)]
pub enum VocabCommands {
    /// Check a vocabulary for dangling parents, cycles, and shadowed
    /// labels before using it in a run.
    Lint {
        /// Vocabulary: vocab.json or a vocab directory.
        path: PathBuf,
    },
}

pub fn execute(cmd: &VocabCommands) -> anyhow::Result<()> {
    match cmd {
        VocabCommands::Lint { path } => {
            let vocab = load_vocab(path)?;
            let problems = lint(&vocab);

            println!(
                "Loaded {} terms ({} actions, {} subjects, {} purposes, {} views, {} recipients, {} legal bases, {} context facets)",
                vocab.iter_terms().count(),
                vocab.actions.len(),
                vocab.subjects.len(),
                vocab.purposes.len(),
                vocab.views.len(),
                vocab.recipients.len(),
                vocab.legal_bases.len(),
                vocab.context.len(),
            );

            if problems.is_empty() {
                println!("No problems found.");
                return Ok(());
            }
            for problem in &problems {
                println!("  {problem}");
            }
            anyhow::bail!("vocabulary lint found {} problem(s)", problems.len());
        }
    }
}

fn lint(vocab: &Vocabulary) -> Vec<String> {
    let mut problems = Vec::new();
    let known: HashSet<&str> = vocab.iter_terms().map(|t| t.uri.as_str()).collect();
    let parent_map = vocab.parent_map();

    // Dangling parents.
    for term in vocab.iter_terms() {
        if let Some(parent) = &term.parent {
            if !known.contains(parent.as_str()) {
                problems.push(format!("{} has unknown parent {}", term.uri, parent));
            }
        }
    }

    // Parent-chain cycles.
    for term in vocab.iter_terms() {
        let mut visited = HashSet::new();
        let mut current = term.uri.as_str();
        while let Some(parent) = parent_map.get(current) {
            if !visited.insert(current) {
                problems.push(format!("parent cycle through {}", term.uri));
                break;
            }
            current = parent;
        }
    }

    // Labels shadowed by last-write-wins collisions.
    let mut label_owners: HashMap<&str, Vec<&str>> = HashMap::new();
    for term in vocab.iter_terms() {
        label_owners.entry(&term.label).or_default().push(&term.uri);
        for alt in &term.alt_labels {
            label_owners.entry(alt).or_default().push(&term.uri);
        }
    }
    let mut shadowed: Vec<String> = label_owners
        .into_iter()
        .filter(|(_, owners)| owners.iter().collect::<HashSet<_>>().len() > 1)
        .map(|(label, owners)| format!("label \"{}\" claimed by {}", label, owners.join(", ")))
        .collect();
    shadowed.sort();
    problems.extend(shadowed);

    problems
}
