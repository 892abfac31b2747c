//! Declarations of the operations the server exposes.

use serde_json::{Map, Value, json};

/// JSON type of an operation argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Integer,
}

impl ArgType {
    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

/// One argument of an operation.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: &'static str,
    pub ty: ArgType,
    pub required: bool,
    pub description: &'static str,
}

/// Which handler serves an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    SearchFiles,
    FileInfo,
    ExplorePaths,
    ListDirectory,
}

/// Name, description and argument schema of an operation.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OperationKind,
    pub args: Vec<ArgSpec>,
}

impl OperationSpec {
    /// JSON schema of the arguments, in MCP `inputSchema` form.
    pub fn input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .args
            .iter()
            .map(|arg| {
                (
                    arg.name.to_owned(),
                    json!({ "type": arg.ty.as_str(), "description": arg.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|arg| arg.required)
            .map(|arg| arg.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), "object".into());
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }

    /// Capability-discovery form: `{name, description, inputSchema}`.
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

/// The fixed, ordered set of operations.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    specs: Vec<OperationSpec>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        let specs = vec![
            OperationSpec {
                name: "search-files",
                description: "Search a directory for files matching a glob pattern",
                kind: OperationKind::SearchFiles,
                args: vec![
                    ArgSpec {
                        name: "pattern",
                        ty: ArgType::String,
                        required: true,
                        description: "Glob pattern, e.g. *.txt",
                    },
                    ArgSpec {
                        name: "directory",
                        ty: ArgType::String,
                        required: true,
                        description: "Directory to search (must be inside an allowed root)",
                    },
                ],
            },
            OperationSpec {
                name: "file-info",
                description: "Get detailed information about a file",
                kind: OperationKind::FileInfo,
                args: vec![ArgSpec {
                    name: "path",
                    ty: ArgType::String,
                    required: true,
                    description: "Path of the file",
                }],
            },
            OperationSpec {
                name: "explore-paths",
                description: "Explore and list accessible paths",
                kind: OperationKind::ExplorePaths,
                args: vec![
                    ArgSpec {
                        name: "base_path",
                        ty: ArgType::String,
                        required: false,
                        description: "Base path (optional, defaults to the working directory; \
                                      \".\" lists the allowed roots)",
                    },
                    ArgSpec {
                        name: "depth",
                        ty: ArgType::Integer,
                        required: false,
                        description: "Exploration depth (optional, defaults to 1)",
                    },
                ],
            },
            OperationSpec {
                name: "list-directory",
                description: "List the contents of a directory",
                kind: OperationKind::ListDirectory,
                args: vec![ArgSpec {
                    name: "path",
                    ty: ArgType::String,
                    required: true,
                    description: "Directory to list",
                }],
            },
        ];
        Self { specs }
    }

    /// All operations in declaration order.
    pub fn list(&self) -> &[OperationSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::{OperationKind, OperationRegistry};
    use serde_json::json;

    #[test]
    fn lists_operations_in_order() {
        let registry = OperationRegistry::new();
        let names: Vec<_> = registry.list().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            ["search-files", "file-info", "explore-paths", "list-directory"]
        );
    }

    #[test]
    fn get_by_name() {
        let registry = OperationRegistry::new();
        assert_eq!(
            registry.get("list-directory").map(|s| s.kind),
            Some(OperationKind::ListDirectory)
        );
        assert!(registry.get("delete-files").is_none());
    }

    #[test]
    fn schema_lists_required_fields() {
        let registry = OperationRegistry::new();
        let search = registry.get("search-files").unwrap().to_json();
        assert_eq!(search["inputSchema"]["type"], "object");
        assert_eq!(search["inputSchema"]["required"], json!(["pattern", "directory"]));
        assert_eq!(
            search["inputSchema"]["properties"]["pattern"]["type"],
            "string"
        );

        let explore = registry.get("explore-paths").unwrap().input_schema();
        assert!(explore.get("required").is_none());
        assert_eq!(explore["properties"]["depth"]["type"], "integer");
    }
}
