use tree_sitter::{Node, Parser};

use crate::error::{CallmapError, Result};
use super::super::registry::Parameter;
use super::{
    ClassItem, FunctionItem, LanguageParser, ModuleImportItem, SourceItem, SymbolImportItem,
    UNTYPED,
};

/// Python front-end using Tree-sitter
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser
            .set_language(&python_language)
            .map_err(|e| CallmapError::Parser(format!("Failed to set Python language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl LanguageParser for PythonParser {
    fn parse_module(&mut self, content: &str) -> Result<Vec<SourceItem>> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| CallmapError::Parser("Failed to parse Python code".to_string()))?;

        let root_node = tree.root_node();
        // Tree-sitter recovers from broken input instead of failing; a tree
        // carrying error nodes counts as a parse failure for the whole file
        if root_node.has_error() {
            return Err(CallmapError::Parser("syntax error".to_string()));
        }

        let mut items = Vec::new();
        let mut cursor = root_node.walk();
        for child in root_node.named_children(&mut cursor) {
            self.extract_top_level_item(child, content, &mut items);
        }

        Ok(items)
    }

    fn file_extension(&self) -> &str {
        "py"
    }

    fn language_name(&self) -> &str {
        "python"
    }
}

impl PythonParser {
    /// Extract one top-level statement's worth of items.
    ///
    /// Only direct children of the module are considered; definitions nested
    /// in conditionals or function bodies are not registered.
    fn extract_top_level_item(&self, node: Node, source: &str, items: &mut Vec<SourceItem>) {
        match node.kind() {
            "function_definition" => {
                if let Some(function) = self.parse_function(node, node, source) {
                    items.push(SourceItem::Function(function));
                }
            }
            "class_definition" => {
                if let Some(class) = self.parse_class(node, source) {
                    items.push(SourceItem::Class(class));
                }
            }
            "decorated_definition" => {
                if let Some(definition) = node.child_by_field_name("definition") {
                    match definition.kind() {
                        // Decorator expressions are part of the subtree the
                        // call walk sees, so walk from the decorated node
                        "function_definition" => {
                            if let Some(function) = self.parse_function(definition, node, source) {
                                items.push(SourceItem::Function(function));
                            }
                        }
                        "class_definition" => {
                            if let Some(class) = self.parse_class(definition, source) {
                                items.push(SourceItem::Class(class));
                            }
                        }
                        _ => {}
                    }
                }
            }
            "import_statement" => {
                self.parse_import(node, source, items);
            }
            "import_from_statement" => {
                self.parse_import_from(node, source, items);
            }
            _ => {}
        }
    }

    /// Parse a function definition. `walk_root` is the node whose whole
    /// subtree is searched for call expressions; it differs from
    /// `definition` when the function is decorated.
    fn parse_function(
        &self,
        definition: Node,
        walk_root: Node,
        source: &str,
    ) -> Option<FunctionItem> {
        let name = self.node_text(definition.child_by_field_name("name")?, source);

        let parameters = definition
            .child_by_field_name("parameters")
            .map(|params| self.extract_parameters(params, source))
            .unwrap_or_default();

        let return_type = definition
            .child_by_field_name("return_type")
            .map(|node| self.node_text(node, source))
            .unwrap_or_else(|| UNTYPED.to_string());

        let mut called_names = Vec::new();
        self.collect_calls(walk_root, source, &mut called_names);

        Some(FunctionItem {
            name,
            parameters,
            return_type,
            called_names,
        })
    }

    /// Parse a class definition, walking one level into the body for methods
    fn parse_class(&self, node: Node, source: &str) -> Option<ClassItem> {
        let name = self.node_text(node.child_by_field_name("name")?, source);

        let mut methods = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                match child.kind() {
                    "function_definition" => {
                        if let Some(method) = self.parse_function(child, child, source) {
                            methods.push(method);
                        }
                    }
                    "decorated_definition" => {
                        if let Some(definition) = child.child_by_field_name("definition") {
                            if definition.kind() == "function_definition" {
                                if let Some(method) =
                                    self.parse_function(definition, child, source)
                                {
                                    methods.push(method);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(ClassItem { name, methods })
    }

    /// Parse `import m`, `import m as a`, `import m, n` forms
    fn parse_import(&self, node: Node, source: &str, items: &mut Vec<SourceItem>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "dotted_name" => {
                    let module = self.node_text(child, source);
                    items.push(SourceItem::ModuleImport(ModuleImportItem {
                        alias: module.clone(),
                        module,
                    }));
                }
                "aliased_import" => {
                    if let (Some(name), Some(alias)) = (
                        child.child_by_field_name("name"),
                        child.child_by_field_name("alias"),
                    ) {
                        items.push(SourceItem::ModuleImport(ModuleImportItem {
                            alias: self.node_text(alias, source),
                            module: self.node_text(name, source),
                        }));
                    }
                }
                _ => {}
            }
        }
    }

    /// Parse `from m import s`, `from m import s as a`, `from . import s`
    /// forms. The origin is recorded with leading relative-import dots
    /// stripped, leaving it empty when the origin cannot be named.
    fn parse_import_from(&self, node: Node, source: &str, items: &mut Vec<SourceItem>) {
        let module_node = node.child_by_field_name("module_name");
        let origin_module = module_node
            .map(|m| self.node_text(m, source).trim_start_matches('.').to_string())
            .unwrap_or_default();
        let module_id = module_node.map(|m| m.id());

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if Some(child.id()) == module_id {
                continue;
            }
            match child.kind() {
                "dotted_name" => {
                    let name = self.node_text(child, source);
                    items.push(SourceItem::SymbolImport(SymbolImportItem {
                        local_name: name.clone(),
                        origin_module: origin_module.clone(),
                        original_name: name,
                    }));
                }
                "aliased_import" => {
                    if let (Some(name), Some(alias)) = (
                        child.child_by_field_name("name"),
                        child.child_by_field_name("alias"),
                    ) {
                        items.push(SourceItem::SymbolImport(SymbolImportItem {
                            local_name: self.node_text(alias, source),
                            origin_module: origin_module.clone(),
                            original_name: self.node_text(name, source),
                        }));
                    }
                }
                // `from m import *` brings in no name a call site can be
                // matched against
                "wildcard_import" => {}
                _ => {}
            }
        }
    }

    /// Collect the positional parameter list. Splats and everything after
    /// the keyword-only marker are excluded; the positional-only `/` marker
    /// is skipped without ending collection.
    fn extract_parameters(&self, params: Node, source: &str) -> Vec<Parameter> {
        let mut parameters = Vec::new();
        let mut cursor = params.walk();

        for child in params.named_children(&mut cursor) {
            match child.kind() {
                "identifier" => {
                    parameters.push(Parameter {
                        name: self.node_text(child, source),
                        type_hint: UNTYPED.to_string(),
                    });
                }
                "typed_parameter" => {
                    // The name is the first named child; a starred name means
                    // the keyword-only section has begun
                    match child.named_child(0) {
                        Some(name) if name.kind() == "identifier" => {
                            let type_hint = child
                                .child_by_field_name("type")
                                .map(|t| self.node_text(t, source))
                                .unwrap_or_else(|| UNTYPED.to_string());
                            parameters.push(Parameter {
                                name: self.node_text(name, source),
                                type_hint,
                            });
                        }
                        _ => break,
                    }
                }
                "default_parameter" | "typed_default_parameter" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        if name.kind() == "identifier" {
                            let type_hint = child
                                .child_by_field_name("type")
                                .map(|t| self.node_text(t, source))
                                .unwrap_or_else(|| UNTYPED.to_string());
                            parameters.push(Parameter {
                                name: self.node_text(name, source),
                                type_hint,
                            });
                        }
                    }
                }
                "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => break,
                _ => {}
            }
        }

        parameters
    }

    /// Walk a whole subtree collecting bare callee names from call
    /// expressions. Nested functions, lambdas, default values, and decorator
    /// expressions are all inside the subtree and therefore included.
    fn collect_calls(&self, node: Node, source: &str, calls: &mut Vec<String>) {
        if node.kind() == "call" {
            if let Some(function) = node.child_by_field_name("function") {
                if let Some(name) = self.bare_callee_name(function, source) {
                    calls.push(name);
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_calls(child, source, calls);
        }
    }

    /// Extract the bare name a call expression is made under.
    ///
    /// Exactly two shapes produce a name: `name(...)` and `receiver.attr(...)`
    /// where the receiver is itself a simple identifier; the receiver is
    /// discarded. Chained calls, calls on call results, and calls on
    /// subscripted or computed expressions yield nothing.
    fn bare_callee_name(&self, function: Node, source: &str) -> Option<String> {
        match function.kind() {
            "identifier" => Some(self.node_text(function, source)),
            "attribute" => {
                let receiver = function.child_by_field_name("object")?;
                if receiver.kind() != "identifier" {
                    return None;
                }
                function
                    .child_by_field_name("attribute")
                    .map(|attr| self.node_text(attr, source))
            }
            _ => None,
        }
    }

    /// Extract text content of a node
    fn node_text(&self, node: Node, source: &str) -> String {
        source[node.byte_range()].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<SourceItem> {
        PythonParser::new().unwrap().parse_module(source).unwrap()
    }

    fn functions(items: &[SourceItem]) -> Vec<&FunctionItem> {
        items
            .iter()
            .filter_map(|item| match item {
                SourceItem::Function(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_top_level_functions() {
        let items = parse("def foo():\n    pass\n\nasync def bar():\n    pass\n");
        let funcs = functions(&items);
        assert_eq!(funcs.len(), 2);
        assert_eq!(funcs[0].name, "foo");
        assert_eq!(funcs[1].name, "bar");
    }

    #[test]
    fn test_nested_functions_not_registered() {
        let items = parse("def outer():\n    def inner():\n        helper()\n    inner()\n");
        let funcs = functions(&items);
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name, "outer");
        // the nested body still contributes callee names to the outer def
        assert_eq!(funcs[0].called_names, vec!["helper", "inner"]);
    }

    #[test]
    fn test_parameters_and_annotations() {
        let items = parse("def f(a, b: int, c=1, d: str = \"x\") -> bool:\n    pass\n");
        let funcs = functions(&items);
        let params = &funcs[0].parameters;
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].name, "a");
        assert_eq!(params[0].type_hint, "Any");
        assert_eq!(params[1].name, "b");
        assert_eq!(params[1].type_hint, "int");
        assert_eq!(params[2].name, "c");
        assert_eq!(params[2].type_hint, "Any");
        assert_eq!(params[3].name, "d");
        assert_eq!(params[3].type_hint, "str");
        assert_eq!(funcs[0].return_type, "bool");
    }

    #[test]
    fn test_splats_and_keyword_only_excluded() {
        let items = parse("def f(a, *args, kw=1, **extra):\n    pass\n");
        let funcs = functions(&items);
        let names: Vec<&str> = funcs[0].parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_untyped_return_is_any() {
        let items = parse("def f():\n    pass\n");
        assert_eq!(functions(&items)[0].return_type, "Any");
    }

    #[test]
    fn test_class_methods_one_level() {
        let source = "\
class Widget:
    def render(self, surface):
        self.prepare()

    def prepare(self):
        pass

    class Inner:
        def hidden(self):
            pass
";
        let items = parse(source);
        let class = items
            .iter()
            .find_map(|item| match item {
                SourceItem::Class(c) => Some(c),
                _ => None,
            })
            .unwrap();
        assert_eq!(class.name, "Widget");
        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        // one level only: Inner.hidden is not picked up
        assert_eq!(names, vec!["render", "prepare"]);
        assert_eq!(class.methods[0].called_names, vec!["prepare"]);
    }

    #[test]
    fn test_decorated_function_registered() {
        let items = parse("@cached\ndef compute():\n    return fetch()\n");
        let funcs = functions(&items);
        assert_eq!(funcs[0].name, "compute");
        assert_eq!(funcs[0].called_names, vec!["fetch"]);
    }

    #[test]
    fn test_decorator_call_is_seen() {
        let items = parse("@app.route(\"/x\")\ndef handler():\n    pass\n");
        let funcs = functions(&items);
        assert_eq!(funcs[0].called_names, vec!["route"]);
    }

    #[test]
    fn test_module_imports() {
        let items = parse("import os\nimport os.path\nimport numpy as np, sys\n");
        let imports: Vec<&ModuleImportItem> = items
            .iter()
            .filter_map(|item| match item {
                SourceItem::ModuleImport(i) => Some(i),
                _ => None,
            })
            .collect();
        let pairs: Vec<(&str, &str)> = imports
            .iter()
            .map(|i| (i.alias.as_str(), i.module.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("os", "os"),
                ("os.path", "os.path"),
                ("np", "numpy"),
                ("sys", "sys"),
            ]
        );
    }

    #[test]
    fn test_symbol_imports() {
        let items = parse("from a.b import util, helper as h\nfrom . import sibling\n");
        let imports: Vec<&SymbolImportItem> = items
            .iter()
            .filter_map(|item| match item {
                SourceItem::SymbolImport(i) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(imports.len(), 3);

        assert_eq!(imports[0].local_name, "util");
        assert_eq!(imports[0].origin_module, "a.b");
        assert_eq!(imports[0].original_name, "util");

        assert_eq!(imports[1].local_name, "h");
        assert_eq!(imports[1].original_name, "helper");

        // bare relative import: origin collapses to the empty string
        assert_eq!(imports[2].local_name, "sibling");
        assert_eq!(imports[2].origin_module, "");
    }

    #[test]
    fn test_relative_import_dots_stripped() {
        let items = parse("from ..pkg.mod import thing\n");
        let import = items
            .iter()
            .find_map(|item| match item {
                SourceItem::SymbolImport(i) => Some(i),
                _ => None,
            })
            .unwrap();
        assert_eq!(import.origin_module, "pkg.mod");
    }

    #[test]
    fn test_call_shapes() {
        let source = "\
def f():
    plain()
    obj.method()
    self.own()
    a.b.c()
    get_thing()()
    items[0]()
";
        let items = parse(source);
        let funcs = functions(&items);
        // a.b.c() has a non-identifier receiver, the rest of the rejected
        // shapes produce nothing either; get_thing()() still records the
        // inner get_thing call
        assert_eq!(
            funcs[0].called_names,
            vec!["plain", "method", "own", "get_thing"]
        );
    }

    #[test]
    fn test_calls_in_lambdas_and_defaults() {
        let items = parse("def f(x=seed()):\n    g = lambda v: transform(v)\n    return g(x)\n");
        let funcs = functions(&items);
        assert_eq!(funcs[0].called_names, vec!["seed", "transform", "g"]);
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let mut parser = PythonParser::new().unwrap();
        assert!(parser.parse_module("def broken(:\n").is_err());
    }
}
