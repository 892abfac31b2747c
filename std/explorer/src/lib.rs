//! MCP server exposing sandboxed file-exploration tools.
//!
//! Four read-only operations (`search-files`, `file-info`, `explore-paths`,
//! `list-directory`) and `file://` resources, all restricted to a set of
//! allowed roots fixed at startup. [`dispatch::Dispatcher`] is the
//! transport-agnostic core; [`ExplorerServer`] serves it over MCP.

use crate::content::{ContentItem, OperationResult, file_uri};
use crate::dispatch::Dispatcher;
use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParams, CallToolResult, Content, Implementation,
        JsonObject, ListResourcesResult, ListToolsResult, PaginatedRequestParams, RawContent,
        RawResource, ReadResourceRequestParams, ReadResourceResult, Resource, ResourceContents,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use std::sync::Arc;

pub mod config;
pub mod content;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod inspect;
pub mod registry;
pub mod resource;
pub mod sandbox;

/// MCP handler backed by a shared [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct ExplorerServer {
    dispatcher: Arc<Dispatcher>,
}

impl ExplorerServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Tool declarations for every registered operation.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .list_operations()
            .iter()
            .map(|spec| Tool::new(spec.name, spec.description, Arc::new(spec.input_schema())))
            .collect()
    }

    /// One directory resource per allowed root.
    pub fn resources(&self) -> Vec<Resource> {
        self.dispatcher
            .sandbox()
            .roots()
            .iter()
            .map(|root| {
                let mut resource = RawResource::new(file_uri(root), root.display().to_string());
                resource.description = Some("allowed root directory".into());
                resource.mime_type = Some("text/plain".into());
                resource.no_annotation()
            })
            .collect()
    }

    /// Run an operation on the blocking pool and convert the reply.
    pub async fn call(&self, name: String, arguments: JsonObject) -> CallToolResult {
        let dispatcher = Arc::clone(&self.dispatcher);
        let result = tokio::task::spawn_blocking(move || dispatcher.invoke(&name, &arguments))
            .await
            .unwrap_or_else(|e| OperationResult::error(format!("internal fault: {e}")));
        to_call_result(result)
    }
}

fn to_content(item: ContentItem) -> Content {
    match item {
        ContentItem::Text { text } => Content::text(text),
        ContentItem::Resource {
            uri,
            name,
            description,
        } => {
            let mut resource = RawResource::new(uri, name);
            resource.description = Some(description);
            RawContent::ResourceLink(resource).no_annotation()
        }
    }
}

fn to_call_result(result: OperationResult) -> CallToolResult {
    let content = result.content.into_iter().map(to_content).collect();
    if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for ExplorerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "wmcp-explorer".into(),
                title: Some("Walrus MCP File Explorer".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "File explorer providing read-only search, stat and listing tools \
                 confined to the allowed directories. Call explore-paths with \
                 base_path \".\" to see them."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        Ok(self.call(request.name.into_owned(), arguments).await)
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(self.resources()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let uri = request.uri;
        let readout = tokio::task::spawn_blocking(move || dispatcher.read_resource(&uri))
            .await
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;

        let mut contents = ResourceContents::text(readout.text, readout.uri);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some(readout.mime_type);
        }
        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ExplorerServer;
    use crate::content::file_uri;
    use crate::dispatch::Dispatcher;
    use crate::sandbox::PathSandbox;
    use rmcp::model::RawContent;
    use serde_json::json;
    use std::fs;

    fn server_in(dir: &std::path::Path) -> ExplorerServer {
        ExplorerServer::new(Dispatcher::with_sandbox(PathSandbox::new(vec![
            dir.to_path_buf(),
        ])))
    }

    #[test]
    fn declares_registered_tools() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server_in(tmp.path());
        let names: Vec<_> = server.tools().iter().map(|t| t.name.to_string()).collect();
        assert_eq!(
            names,
            ["search-files", "file-info", "explore-paths", "list-directory"]
        );
        assert_eq!(server.resources().len(), 1);
    }

    #[tokio::test]
    async fn call_maps_text_and_resource_link() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        let file = root.join("notes.txt");
        fs::write(&file, "hello").unwrap();
        let server = server_in(&root);

        let args = json!({ "path": file.to_str().unwrap() });
        let result = server
            .call("file-info".into(), args.as_object().unwrap().clone())
            .await;
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.content.len(), 2);
        assert!(matches!(&result.content[0].raw, RawContent::Text(t) if t.text.contains("hello")));
        match &result.content[1].raw {
            RawContent::ResourceLink(link) => {
                assert_eq!(link.uri, file_uri(&file));
                assert_eq!(link.name, "file content: notes.txt");
            }
            other => panic!("expected resource link, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn call_flags_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server_in(tmp.path());
        let result = server.call("rm-rf".into(), Default::default()).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 1);
    }
}
