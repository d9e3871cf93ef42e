// SPDX-License-Identifier: MIT OR Apache-2.0
//! Portable, MIME-typed data container used for drag and drop.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_URI_LIST: &str = "text/uri-list";
pub const TEXT_HTML: &str = "text/html";
pub const IMAGE_PNG: &str = "image/png";

/// Errors produced when storing data under a MIME type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MimeDataError {
    /// The given string is not a valid `type/subtype` MIME type.
    #[error("Invalid MIME type: {0}")]
    InvalidMimeType(String),
}

/// Data keyed by MIME type, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeData {
    formats: IndexMap<String, Vec<u8>>,
}

impl MimeData {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes for `mime_type`, replacing any previous data for it.
    pub fn set_data(&mut self, mime_type: &str, data: Vec<u8>) -> Result<(), MimeDataError> {
        let parsed: mime::Mime = mime_type
            .parse()
            .map_err(|_| MimeDataError::InvalidMimeType(mime_type.to_string()))?;
        self.formats.insert(parsed.essence_str().to_string(), data);
        Ok(())
    }

    /// Get raw bytes stored for `mime_type`.
    pub fn data(&self, mime_type: &str) -> Option<&[u8]> {
        self.formats.get(mime_type).map(Vec::as_slice)
    }

    pub fn has_format(&self, mime_type: &str) -> bool {
        self.formats.contains_key(mime_type)
    }

    /// All stored MIME types, in insertion order.
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }

    pub fn remove_format(&mut self, mime_type: &str) -> Option<Vec<u8>> {
        self.formats.shift_remove(mime_type)
    }

    pub fn clear(&mut self) {
        self.formats.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Set `text/plain` content.
    pub fn set_text(&mut self, text: &str) {
        self.formats
            .insert(TEXT_PLAIN.to_string(), text.as_bytes().to_vec());
    }

    /// Get `text/plain` content, if present and valid UTF-8.
    pub fn text(&self) -> Option<String> {
        self.data(TEXT_PLAIN)
            .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
    }

    /// Set `text/html` content.
    pub fn set_html(&mut self, html: &str) {
        self.formats
            .insert(TEXT_HTML.to_string(), html.as_bytes().to_vec());
    }

    pub fn html(&self) -> Option<String> {
        self.data(TEXT_HTML)
            .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
    }

    /// Set encoded PNG image data.
    pub fn set_image_png(&mut self, png: Vec<u8>) {
        self.formats.insert(IMAGE_PNG.to_string(), png);
    }

    pub fn image_png(&self) -> Option<&[u8]> {
        self.data(IMAGE_PNG)
    }

    /// Set the `text/uri-list` content.
    ///
    /// Entries are joined with CRLF as required by RFC 2483.
    pub fn set_urls<S: AsRef<str>>(&mut self, urls: &[S]) {
        let mut content = String::with_capacity(urls.len() * 32);
        for url in urls {
            content.push_str(url.as_ref());
            content.push_str("\r\n");
        }
        self.formats
            .insert(TEXT_URI_LIST.to_string(), content.into_bytes());
    }

    /// Get the `text/uri-list` entries, skipping comment lines.
    pub fn urls(&self) -> Vec<String> {
        let Some(bytes) = self.data(TEXT_URI_LIST) else {
            return Vec::new();
        };
        String::from_utf8_lossy(bytes)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    /// Store local file paths as `file://` URLs.
    pub fn set_file_paths(&mut self, paths: &[PathBuf]) {
        let urls: Vec<String> = paths.iter().map(|path| file_url(path)).collect();
        self.set_urls(&urls);
    }

    /// Local file paths among the stored URLs.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.urls()
            .iter()
            .filter_map(|url| url.strip_prefix("file://"))
            .filter_map(|encoded| urlencoding::decode(encoded).ok())
            .map(|decoded| PathBuf::from(decoded.into_owned()))
            .collect()
    }
}

/// Encode a path as a `file://` URL, escaping each segment.
pub fn file_url(path: &Path) -> String {
    let display = path.to_string_lossy();
    let encoded: Vec<String> = display
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("file://{}", encoded.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_html() {
        let mut data = MimeData::new();
        data.set_text("hello");
        data.set_html("<b>hello</b>");

        assert_eq!(data.text().as_deref(), Some("hello"));
        assert_eq!(data.html().as_deref(), Some("<b>hello</b>"));
        assert_eq!(data.formats().collect::<Vec<_>>(), vec![TEXT_PLAIN, TEXT_HTML]);
    }

    #[test]
    fn test_file_paths_with_spaces() {
        let mut data = MimeData::new();
        data.set_file_paths(&[PathBuf::from("/home/user/My Documents/a.txt")]);

        let urls = data.urls();
        assert_eq!(urls, vec!["file:///home/user/My%20Documents/a.txt".to_string()]);
        assert_eq!(
            data.file_paths(),
            vec![PathBuf::from("/home/user/My Documents/a.txt")]
        );
    }

    #[test]
    fn test_uri_list_ignores_comments() {
        let mut data = MimeData::new();
        data.set_data(TEXT_URI_LIST, b"# comment\r\nhttps://example.org\r\n".to_vec())
            .unwrap();
        assert_eq!(data.urls(), vec!["https://example.org".to_string()]);
        assert!(data.file_paths().is_empty());
    }

    #[test]
    fn test_invalid_mime_type_rejected() {
        let mut data = MimeData::new();
        assert_eq!(
            data.set_data("not a mime", Vec::new()),
            Err(MimeDataError::InvalidMimeType("not a mime".to_string()))
        );
        assert!(data.is_empty());
    }

    #[test]
    fn test_parameters_are_stripped_from_key() {
        let mut data = MimeData::new();
        data.set_data("text/plain;charset=utf-8", b"x".to_vec()).unwrap();
        assert!(data.has_format(TEXT_PLAIN));
    }
}
