//! Entry point that routes a named operation to its handler.

use crate::config::ExplorerConfig;
use crate::content::OperationResult;
use crate::error::Error;
use crate::handlers;
use crate::registry::{ArgType, OperationKind, OperationRegistry, OperationSpec};
use crate::resource::{Readout, ResourceResolver};
use crate::sandbox::PathSandbox;
use serde_json::{Map, Value};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Validates and executes operations against a fixed sandbox.
///
/// Holds only immutable state; one instance can serve any number of calls.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    sandbox: PathSandbox,
    registry: OperationRegistry,
}

impl Dispatcher {
    /// Build a dispatcher whose sandbox is made of the configured roots.
    pub fn new(config: &ExplorerConfig) -> Self {
        Self::with_sandbox(PathSandbox::new(config.roots.iter().cloned()))
    }

    pub fn with_sandbox(sandbox: PathSandbox) -> Self {
        Self {
            sandbox,
            registry: OperationRegistry::new(),
        }
    }

    pub fn sandbox(&self) -> &PathSandbox {
        &self.sandbox
    }

    /// All operations, for capability discovery.
    pub fn list_operations(&self) -> &[OperationSpec] {
        self.registry.list()
    }

    /// Run `name` with `arguments`. Never panics: every failure becomes a
    /// single text item flagged as an error.
    pub fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> OperationResult {
        tracing::debug!(operation = name, ?arguments, "invoking operation");
        let outcome = match self.registry.get(name) {
            None => Err(Error::UnknownOperation(name.to_owned())),
            Some(spec) => validate(spec, arguments).and_then(|()| {
                catch_unwind(AssertUnwindSafe(|| self.run(spec.kind, arguments)))
                    .unwrap_or_else(|panic| Err(Error::Internal(panic_message(panic.as_ref()))))
            }),
        };

        match outcome {
            Ok(result) if !result.content.is_empty() => result,
            Ok(_) => OperationResult::error(format!("{name} produced no output")),
            Err(e) => {
                tracing::warn!(operation = name, error = %e, "operation failed");
                OperationResult::error(e.to_string())
            }
        }
    }

    /// Read a `file://` resource. Failures are rendered into the text.
    pub fn read_resource(&self, uri: &str) -> Readout {
        ResourceResolver::new(&self.sandbox).read(uri)
    }

    fn run(&self, kind: OperationKind, args: &Map<String, Value>) -> Result<OperationResult, Error> {
        let sandbox = &self.sandbox;
        match kind {
            OperationKind::SearchFiles => handlers::search_files(
                sandbox,
                string_arg(args, "pattern").unwrap_or_default(),
                string_arg(args, "directory").unwrap_or_default(),
            ),
            OperationKind::FileInfo => {
                handlers::file_info(sandbox, string_arg(args, "path").unwrap_or_default())
            }
            OperationKind::ExplorePaths => handlers::explore_paths(
                sandbox,
                string_arg(args, "base_path"),
                integer_arg(args, "depth"),
            ),
            OperationKind::ListDirectory => {
                handlers::list_directory(sandbox, string_arg(args, "path").unwrap_or_default())
            }
        }
    }
}

/// Check required arguments are present and every declared argument has its
/// declared type. `null` counts as absent.
fn validate(spec: &OperationSpec, args: &Map<String, Value>) -> Result<(), Error> {
    for arg in &spec.args {
        let value = args.get(arg.name).filter(|v| !v.is_null());
        let Some(value) = value else {
            if arg.required {
                return Err(Error::InvalidArgument(format!(
                    "missing required argument '{}' for {}",
                    arg.name, spec.name
                )));
            }
            continue;
        };
        let well_typed = match arg.ty {
            ArgType::String => value.is_string(),
            ArgType::Integer => as_integer(value).is_some(),
        };
        if !well_typed {
            return Err(Error::InvalidArgument(format!(
                "argument '{}' for {} must be {}, got {value}",
                arg.name,
                spec.name,
                match arg.ty {
                    ArgType::String => "a string",
                    ArgType::Integer => "an integer",
                }
            )));
        }
    }
    Ok(())
}

fn string_arg<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

fn integer_arg(args: &Map<String, Value>, name: &str) -> Option<i64> {
    args.get(name).and_then(as_integer)
}

/// Integers may arrive as JSON numbers or as numeric strings.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".into())
}
