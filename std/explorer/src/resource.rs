//! Resolution of `file://` locators into directory listings or file content.

use crate::error::Error;
use crate::inspect::{is_textual, mime_type, read_prefix};
use crate::sandbox::PathSandbox;
use serde::Serialize;

/// Maximum number of characters returned for a text file.
pub const MAX_RESOURCE_CHARS: usize = 10_000;

/// Appended to text content clipped at [`MAX_RESOURCE_CHARS`].
pub const RESOURCE_TRUNCATION_MARKER: &str = "\n... (truncated)";

const SCHEME: &str = "file://";

/// Text rendering of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readout {
    pub uri: String,
    pub text: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl Readout {
    fn plain(uri: &str, text: impl Into<String>) -> Self {
        Self {
            uri: uri.to_owned(),
            text: text.into(),
            mime_type: "text/plain".into(),
        }
    }
}

/// Resolves `file://` locators through the sandbox.
#[derive(Debug, Clone)]
pub struct ResourceResolver<'a> {
    sandbox: &'a PathSandbox,
}

impl<'a> ResourceResolver<'a> {
    pub fn new(sandbox: &'a PathSandbox) -> Self {
        Self { sandbox }
    }

    pub fn resolve(&self, uri: &str) -> Result<Readout, Error> {
        let raw = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| Error::UnsupportedUri(uri.to_owned()))?;
        let decoded = urlencoding::decode(raw)
            .map_err(|_| Error::InvalidArgument(format!("malformed locator: {uri}")))?;

        let path = self.sandbox.check(&decoded)?;
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(decoded.into_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if meta.is_dir() {
            let mut names = std::fs::read_dir(&path)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect::<Vec<_>>();
            names.sort();
            return Ok(Readout::plain(uri, names.join("\n")));
        }

        let mime = mime_type(&path);
        if !is_textual(&mime) {
            return Ok(Readout::plain(
                uri,
                format!("binary file ({mime}), {} bytes", meta.len()),
            ));
        }

        let (mut text, clipped) = read_prefix(&path, MAX_RESOURCE_CHARS)?;
        if clipped {
            text.push_str(RESOURCE_TRUNCATION_MARKER);
        }
        Ok(Readout {
            uri: uri.to_owned(),
            text,
            mime_type: mime,
        })
    }

    /// Like [`Self::resolve`], but renders failures into the readout text.
    pub fn read(&self, uri: &str) -> Readout {
        match self.resolve(uri) {
            Ok(readout) => readout,
            Err(Error::UnsupportedUri(_)) => Readout::plain(uri, "unsupported URI type"),
            Err(e) => {
                tracing::warn!(uri, error = %e, "resource read failed");
                Readout::plain(uri, format!("error reading resource: {e}"))
            }
        }
    }
}
