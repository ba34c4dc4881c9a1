use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::error;

use crate::config::AnalysisConfig;
use crate::error::Result;
use super::languages::{FunctionItem, LanguageParser, PythonParser, SourceItem};
use super::module_name::module_name;
use super::registry::{Definition, DefinitionRegistry, ImportMap, SymbolOrigin};

/// Output of the collection pass: the definition registry and the per-module
/// import tables, both read-only from here on
pub struct CollectionResult {
    pub registry: DefinitionRegistry,
    pub imports: ImportMap,
}

/// First analysis pass: walk every source file's top level and register
/// definitions and import tables
pub struct Collector {
    config: AnalysisConfig,
    parser: Box<dyn LanguageParser>,
}

impl Collector {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            parser: Box::new(PythonParser::new()?),
        })
    }

    /// File extension of the language front-end in use
    pub fn file_extension(&self) -> &str {
        self.parser.file_extension()
    }

    /// Collect definitions and imports across the given files.
    ///
    /// A file that cannot be read or parsed is logged and excluded from all
    /// further analysis; one bad file never aborts the run.
    pub fn collect(&mut self, files: &[PathBuf], root: &Path) -> CollectionResult {
        let mut registry = DefinitionRegistry::new(self.config.collision_policy);
        let mut imports = ImportMap::new();

        for file_path in files {
            let module = module_name(file_path, root);
            imports.table_mut(&module);

            let source = match std::fs::read_to_string(file_path) {
                Ok(source) => source,
                Err(e) => {
                    error!("Failed to parse {}: {}", file_path.display(), e);
                    continue;
                }
            };

            if source.len() > self.config.max_file_size {
                error!(
                    "Failed to parse {}: exceeds maximum size limit",
                    file_path.display()
                );
                continue;
            }

            let items = match self.parser.parse_module(&source) {
                Ok(items) => items,
                Err(e) => {
                    error!("Failed to parse {}: {}", file_path.display(), e);
                    continue;
                }
            };

            for item in items {
                match item {
                    SourceItem::Function(function) => {
                        registry.insert(self.definition(&module, None, file_path, function));
                    }
                    SourceItem::Class(class) => {
                        for method in class.methods {
                            registry.insert(self.definition(
                                &module,
                                Some(&class.name),
                                file_path,
                                method,
                            ));
                        }
                    }
                    SourceItem::ModuleImport(import) => {
                        imports
                            .table_mut(&module)
                            .module_aliases
                            .insert(import.alias, import.module);
                    }
                    SourceItem::SymbolImport(import) => {
                        imports.table_mut(&module).symbols.insert(
                            import.local_name,
                            SymbolOrigin {
                                module: import.origin_module,
                                name: import.original_name,
                            },
                        );
                    }
                }
            }
        }

        CollectionResult { registry, imports }
    }

    fn definition(
        &self,
        module: &str,
        class_name: Option<&str>,
        file: &Path,
        function: FunctionItem,
    ) -> Definition {
        let qualified_name = match class_name {
            Some(class) => format!("{}.{}.{}", module, class, function.name),
            None => format!("{}.{}", module, function.name),
        };

        Definition {
            qualified_name,
            file: file.to_path_buf(),
            module: module.to_string(),
            class_name: class_name.map(String::from),
            parameters: function.parameters,
            return_type: function.return_type,
            called_names: function.called_names,
            call_edges: BTreeSet::new(),
        }
    }
}
