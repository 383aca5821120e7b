//! Component catalog models.
//!
//! The catalog is produced by the component-discovery scanner (external to
//! this core) and consumed read-only by the Director and Scene Planner.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single prop accepted by a catalog component.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComponentProp {
    /// Prop name as it appears in the component source
    pub name: String,

    /// Declared type (e.g. "string", "number", "boolean", "object")
    pub prop_type: String,

    /// Whether the component requires this prop
    #[serde(default)]
    pub required: bool,

    /// Human-readable description, when the scanner extracted one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An interactive element discovered inside a component, used for cursor
/// targeting in tutorial scenes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InteractiveElement {
    /// CSS-style selector identifying the element
    pub selector: String,

    /// Short summary of what interacting with it does
    pub action: String,
}

/// An entry in the component catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComponentCatalogEntry {
    /// Opaque id assigned by the scanner
    pub id: String,

    /// Display name, matched case-insensitively against AI plan output
    pub name: String,

    /// Category (e.g. "form", "navigation", "data-display")
    pub category: String,

    /// Description, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Props accepted by the component
    #[serde(default)]
    pub props: Vec<ComponentProp>,

    /// Realistic demo props captured by the scanner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_props: Option<serde_json::Value>,

    /// Interactive elements available for cursor targeting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_elements: Option<Vec<InteractiveElement>>,

    /// Names of components this component renders internally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses_components: Option<Vec<String>>,

    /// Names of components that render this component
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_by_components: Option<Vec<String>>,

    /// Names of components commonly used alongside this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_components: Option<Vec<String>>,
}

impl ComponentCatalogEntry {
    /// Find an entry by display name, case-insensitively.
    ///
    /// The AI plan references components by name; the match must be exact
    /// apart from case. A miss leaves the scene component-less.
    pub fn find_by_name<'a>(
        catalog: &'a [ComponentCatalogEntry],
        name: &str,
    ) -> Option<&'a ComponentCatalogEntry> {
        catalog.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Find an entry by its scanner-assigned id.
    pub fn find_by_id<'a>(
        catalog: &'a [ComponentCatalogEntry],
        id: &str,
    ) -> Option<&'a ComponentCatalogEntry> {
        catalog.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> ComponentCatalogEntry {
        ComponentCatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            category: "form".to_string(),
            description: None,
            props: vec![],
            demo_props: None,
            interactive_elements: None,
            uses_components: None,
            used_by_components: None,
            related_components: None,
        }
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let catalog = vec![entry("c1", "LoginForm"), entry("c2", "NavBar")];

        let found = ComponentCatalogEntry::find_by_name(&catalog, "loginform");
        assert_eq!(found.map(|c| c.id.as_str()), Some("c1"));

        let found = ComponentCatalogEntry::find_by_name(&catalog, "NAVBAR");
        assert_eq!(found.map(|c| c.id.as_str()), Some("c2"));
    }

    #[test]
    fn test_find_by_name_requires_exact_match() {
        let catalog = vec![entry("c1", "LoginForm")];

        // Partial names do not match
        assert!(ComponentCatalogEntry::find_by_name(&catalog, "Login").is_none());
        assert!(ComponentCatalogEntry::find_by_name(&catalog, "LoginFormButton").is_none());
    }

    #[test]
    fn test_find_by_id() {
        let catalog = vec![entry("c1", "LoginForm")];

        assert!(ComponentCatalogEntry::find_by_id(&catalog, "c1").is_some());
        // Ids are matched exactly, not case-insensitively
        assert!(ComponentCatalogEntry::find_by_id(&catalog, "C1").is_none());
    }
}
