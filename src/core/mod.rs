// src/core/mod.rs
mod engine;
mod discovery;
mod module_name;
mod registry;
mod collector;
mod resolver;
mod call_graph;
mod renderer;

// Language-specific parsers
mod languages;

pub use registry::{
    Definition, DefinitionRegistry, ImportMap, ImportTable, Parameter, SymbolOrigin,
};
pub use collector::{CollectionResult, Collector};
pub use resolver::{resolve, ReverseIndex};
pub use call_graph::CallGraphBuilder;
pub use renderer::ReportRenderer;
pub use module_name::module_name;
pub use languages::{LanguageParser, PythonParser, SourceItem};

// Export the main engine
pub use engine::Engine;
