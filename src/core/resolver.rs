use std::collections::{BTreeSet, HashMap};

use super::registry::{DefinitionRegistry, ImportMap};

/// Index from a definition's trailing name segment to every qualified name
/// sharing that segment. Built once over the finished registry, before
/// resolution begins.
pub struct ReverseIndex {
    by_simple_name: HashMap<String, BTreeSet<String>>,
}

impl ReverseIndex {
    pub fn build(registry: &DefinitionRegistry) -> Self {
        let mut by_simple_name: HashMap<String, BTreeSet<String>> = HashMap::new();
        for qualified_name in registry.qualified_names() {
            by_simple_name
                .entry(simple_name(qualified_name).to_string())
                .or_default()
                .insert(qualified_name.clone());
        }
        Self { by_simple_name }
    }

    pub fn get(&self, simple_name: &str) -> Option<&BTreeSet<String>> {
        self.by_simple_name.get(simple_name)
    }
}

/// Resolve a bare name referenced inside `calling_module` to the set of
/// plausible fully-qualified definitions. Empty set means unresolved.
///
/// Resolution is heuristic, not sound: method calls resolve on name alone,
/// so the result is a candidate set rather than a single answer. Precedence,
/// first non-empty step wins:
///
/// 1. Local scope: registered definitions under `calling_module` whose
///    trailing segment matches.
/// 2. Symbol imports: the name was brought in by `from m import s`; match
///    registry entries ending in `.s` under the recorded origin. An
///    unresolvable origin is the empty string, which prefix-matches
///    everything; an accepted imprecision.
/// 3. Calls through a module alias (`alias.func()`) are not resolved; the
///    alias table is carried in `imports` but receiver names are discarded
///    before resolution ever sees them.
/// 4. Global fallback: any definition anywhere with this trailing segment.
pub fn resolve(
    bare_name: &str,
    calling_module: &str,
    imports: &ImportMap,
    registry: &DefinitionRegistry,
    reverse_index: &ReverseIndex,
) -> BTreeSet<String> {
    // 1. Same module
    let local_prefix = format!("{}.", calling_module);
    let local: BTreeSet<String> = registry
        .qualified_names()
        .filter(|q| q.starts_with(&local_prefix) && simple_name(q) == bare_name)
        .cloned()
        .collect();
    if !local.is_empty() {
        return local;
    }

    // 2. Symbol imports
    if let Some(origin) = imports.symbol(calling_module, bare_name) {
        let suffix = format!(".{}", origin.name);
        let imported: BTreeSet<String> = registry
            .qualified_names()
            .filter(|q| q.ends_with(&suffix) && q.starts_with(origin.module.as_str()))
            .cloned()
            .collect();
        if !imported.is_empty() {
            return imported;
        }
    }

    // 4. Any definition with a matching trailing segment
    if let Some(matches) = reverse_index.get(bare_name) {
        return matches.clone();
    }

    BTreeSet::new()
}

fn simple_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit('.')
        .next()
        .unwrap_or(qualified_name)
}
