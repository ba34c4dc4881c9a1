use super::registry::DefinitionRegistry;

/// Renders the enriched registry as a single Markdown document
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the full report. Definitions are emitted in ascending
    /// qualified-name order with their call edges sorted, so repeated runs
    /// over an unchanged tree produce identical bytes.
    pub fn render(&self, registry: &DefinitionRegistry) -> String {
        let mut content = String::new();
        content.push_str("# Project-wide Function Mapping\n\n");
        content.push_str("## Functions (with cross-file call analysis)\n\n");

        for definition in registry.iter() {
            let args = definition
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, p.type_hint))
                .collect::<Vec<_>>()
                .join(", ");

            content.push_str(&format!(
                "### `{}({}) -> {}`\n",
                definition.qualified_name, args, definition.return_type
            ));

            if definition.call_edges.is_empty() {
                content.push_str("- Calls: None\n");
            } else {
                let calls = definition
                    .call_edges
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                content.push_str(&format!("- Calls: `{}`\n", calls));
            }

            content.push('\n');
        }

        content
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}
