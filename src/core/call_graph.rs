// src/core/call_graph.rs - second pass over the collected registry
use std::collections::{BTreeMap, BTreeSet};

use super::registry::{DefinitionRegistry, ImportMap};
use super::resolver::{resolve, ReverseIndex};

/// Resolves every definition's extracted callee names and attaches the
/// surviving project-local edges.
///
/// Edges are a deduplicated set: calling the same target twice yields one
/// edge. Targets that resolve outside the registry are dropped, never
/// recorded as unknown, so the edge sets stay closed over the registry keys.
pub struct CallGraphBuilder;

impl CallGraphBuilder {
    pub fn build(registry: &mut DefinitionRegistry, imports: &ImportMap) {
        let reverse_index = ReverseIndex::build(registry);

        // Resolve against the immutable registry first, then apply
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for definition in registry.iter() {
            let mut targets = BTreeSet::new();
            for bare_name in &definition.called_names {
                let resolved = resolve(
                    bare_name,
                    &definition.module,
                    imports,
                    registry,
                    &reverse_index,
                );
                // Keep only targets that are actually registered definitions
                targets.extend(resolved.into_iter().filter(|q| registry.contains(q)));
            }
            edges.insert(definition.qualified_name.clone(), targets);
        }

        for (qualified_name, targets) in edges {
            if let Some(definition) = registry.get_mut(&qualified_name) {
                definition.call_edges = targets;
            }
        }
    }
}
