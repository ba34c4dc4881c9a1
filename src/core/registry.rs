use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::CollisionPolicy;

/// A single parameter of a collected definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name as written in the source
    pub name: String,

    /// Declared annotation text, or the `Any` sentinel when unannotated
    pub type_hint: String,
}

/// A collected function or method definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    /// Globally unique dotted identifier: `module.name` or `module.Class.name`
    pub qualified_name: String,

    /// File the definition lives in
    pub file: PathBuf,

    /// Dotted module name of the defining file
    pub module: String,

    /// Enclosing class name, for methods
    pub class_name: Option<String>,

    /// Ordered parameter list with annotation text
    pub parameters: Vec<Parameter>,

    /// Declared return annotation text, or the `Any` sentinel
    pub return_type: String,

    /// Bare callee names extracted from the definition's body, in source order
    pub called_names: Vec<String>,

    /// Qualified names of project-local definitions this one may invoke.
    /// Filled by the call graph builder; always a subset of the registry keys.
    pub call_edges: BTreeSet<String>,
}

/// Where a locally visible symbol was imported from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolOrigin {
    /// Origin module as written in the import (empty when unresolvable)
    pub module: String,

    /// The symbol's original exported name
    pub name: String,
}

/// Import visibility of a single module: what `import` and `from ... import`
/// statements brought into its namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportTable {
    /// Local alias -> real dotted module name, from direct imports
    pub module_aliases: HashMap<String, String>,

    /// Local name -> origin, from symbol imports
    pub symbols: HashMap<String, SymbolOrigin>,
}

/// Per-module import tables for the whole project
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    tables: HashMap<String, ImportTable>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the table for a module
    pub fn table_mut(&mut self, module: &str) -> &mut ImportTable {
        self.tables.entry(module.to_string()).or_default()
    }

    pub fn table(&self, module: &str) -> Option<&ImportTable> {
        self.tables.get(module)
    }

    /// Look up a symbol import visible in `module` under `local_name`
    pub fn symbol(&self, module: &str, local_name: &str) -> Option<&SymbolOrigin> {
        self.tables.get(module).and_then(|t| t.symbols.get(local_name))
    }
}

/// Project-wide definition registry keyed by qualified name.
///
/// Iteration order is ascending qualified name, which downstream consumers
/// rely on for deterministic output.
#[derive(Debug, Clone)]
pub struct DefinitionRegistry {
    policy: CollisionPolicy,
    definitions: BTreeMap<String, Definition>,
}

impl DefinitionRegistry {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            definitions: BTreeMap::new(),
        }
    }

    /// Insert a definition, applying the collision policy when the qualified
    /// name is already registered. Collisions are logged either way.
    pub fn insert(&mut self, definition: Definition) {
        match self.definitions.entry(definition.qualified_name.clone()) {
            Entry::Occupied(mut existing) => {
                warn!(
                    "Duplicate definition {}: {} and {}",
                    definition.qualified_name,
                    existing.get().file.display(),
                    definition.file.display()
                );
                if self.policy == CollisionPolicy::KeepLast {
                    existing.insert(definition);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(definition);
            }
        }
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.definitions.contains_key(qualified_name)
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Definition> {
        self.definitions.get(qualified_name)
    }

    pub fn get_mut(&mut self, qualified_name: &str) -> Option<&mut Definition> {
        self.definitions.get_mut(qualified_name)
    }

    /// All definitions in ascending qualified-name order
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    /// All registered qualified names in ascending order
    pub fn qualified_names(&self) -> impl Iterator<Item = &String> {
        self.definitions.keys()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
