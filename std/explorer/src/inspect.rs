//! Small filesystem helpers shared by the handlers and the resolver.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

/// MIME type reported when the extension is unknown.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess the MIME type of a path from its extension.
pub fn mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(OCTET_STREAM)
        .to_owned()
}

/// Whether content of this MIME type may be read and shown as text.
pub fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/") || mime == "application/json" || mime == "application/xml"
}

/// Read at most `max_chars` characters of a file, decoding invalid UTF-8 as
/// replacement characters. The flag is set when the file holds more.
pub fn read_prefix(path: &Path, max_chars: usize) -> std::io::Result<(String, bool)> {
    // Any char is at most four bytes, so this always covers `max_chars + 1`
    // characters when the file is long enough.
    let limit = (max_chars as u64 + 1) * 4;
    let mut bytes = Vec::new();
    File::open(path)?.take(limit).read_to_end(&mut bytes)?;

    let decoded = String::from_utf8_lossy(&bytes);
    let mut chars = decoded.chars();
    let prefix: String = chars.by_ref().take(max_chars).collect();
    let clipped = chars.next().is_some();
    Ok((prefix, clipped))
}

/// RFC 3339 rendering of a metadata timestamp.
pub fn timestamp(time: std::io::Result<SystemTime>) -> String {
    time.ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .and_then(|d| chrono::DateTime::from_timestamp(d.as_secs() as i64, d.subsec_nanos()))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "unavailable".into())
}

#[cfg(test)]
mod tests {
    use crate::inspect::{is_textual, mime_type, read_prefix, timestamp};
    use std::path::Path;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(mime_type(Path::new("a.txt")), "text/plain");
        assert_eq!(mime_type(Path::new("a.json")), "application/json");
        assert_eq!(mime_type(Path::new("no_extension")), "application/octet-stream");
        assert!(is_textual("text/markdown"));
        assert!(!is_textual("image/png"));
    }

    #[test]
    fn read_prefix_clips_long_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("long.txt");
        std::fs::write(&path, "é".repeat(30)).unwrap();

        let (prefix, clipped) = read_prefix(&path, 10).unwrap();
        assert_eq!(prefix, "é".repeat(10));
        assert!(clipped);

        let (whole, clipped) = read_prefix(&path, 30).unwrap();
        assert_eq!(whole.chars().count(), 30);
        assert!(!clipped);
    }

    #[test]
    fn read_prefix_replaces_invalid_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.txt");
        std::fs::write(&path, [b'o', b'k', 0xff, b'!']).unwrap();
        let (text, clipped) = read_prefix(&path, 100).unwrap();
        assert_eq!(text, "ok\u{fffd}!");
        assert!(!clipped);
    }

    #[test]
    fn formats_timestamps() {
        let time = UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(timestamp(Ok(time)), "1970-01-02T00:00:00+00:00");
        let missing = std::io::Error::new(std::io::ErrorKind::Unsupported, "no btime");
        assert_eq!(timestamp(Err(missing)), "unavailable");
    }
}
