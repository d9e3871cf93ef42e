//! Native drag payloads and their conversion to portable [MimeData].

use winbridge_services::mime_data::{self, MimeData};

const CUSTOM_PREFIX: &str = "application/x-native-";

/// Type identifier of a native pasteboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PasteboardType {
    String,
    Utf8PlainText,
    FileUrl,
    Url,
    Html,
    Png,
    /// Any other native identifier.
    Custom(String),
}

impl PasteboardType {
    /// The native identifier string.
    pub fn identifier(&self) -> &str {
        match self {
            PasteboardType::String => "public.string",
            PasteboardType::Utf8PlainText => "public.utf8-plain-text",
            PasteboardType::FileUrl => "public.file-url",
            PasteboardType::Url => "public.url",
            PasteboardType::Html => "public.html",
            PasteboardType::Png => "public.png",
            PasteboardType::Custom(id) => id,
        }
    }

    /// Parse a native identifier string.
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier {
            "public.string" => PasteboardType::String,
            "public.utf8-plain-text" => PasteboardType::Utf8PlainText,
            "public.file-url" => PasteboardType::FileUrl,
            "public.url" => PasteboardType::Url,
            "public.html" => PasteboardType::Html,
            "public.png" => PasteboardType::Png,
            other => PasteboardType::Custom(other.to_string()),
        }
    }
}

/// Ordered entries of a native drag pasteboard.
///
/// Several URL entries may be present, one per dragged item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativePasteboard {
    entries: Vec<(PasteboardType, Vec<u8>)>,
}

impl NativePasteboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: PasteboardType, data: impl Into<Vec<u8>>) {
        self.entries.push((kind, data.into()));
    }

    pub fn with(mut self, kind: PasteboardType, data: impl Into<Vec<u8>>) -> Self {
        self.push(kind, data);
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PasteboardType, &[u8])> {
        self.entries.iter().map(|(kind, data)| (kind, data.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to the portable representation.
    ///
    /// Text and HTML keep the first entry of their kind, URLs are joined into a
    /// `text/uri-list` in pasteboard order, and custom types become
    /// `application/x-native-<id>` with the id escaped so it survives the trip back.
    pub fn to_mime_data(&self) -> MimeData {
        let mut data = MimeData::new();
        let mut urls = Vec::new();

        for (kind, bytes) in &self.entries {
            match kind {
                PasteboardType::String | PasteboardType::Utf8PlainText => {
                    if !data.has_format(mime_data::TEXT_PLAIN) {
                        data.set_text(&String::from_utf8_lossy(bytes));
                    }
                },
                PasteboardType::FileUrl | PasteboardType::Url => {
                    urls.push(String::from_utf8_lossy(bytes).trim().to_string());
                },
                PasteboardType::Html => {
                    if !data.has_format(mime_data::TEXT_HTML) {
                        data.set_html(&String::from_utf8_lossy(bytes));
                    }
                },
                PasteboardType::Png => data.set_image_png(bytes.clone()),
                PasteboardType::Custom(id) => {
                    let mime_type = custom_mime_type(id);
                    if let Err(err) = data.set_data(&mime_type, bytes.clone()) {
                        log::warn!("Dropping pasteboard entry {}: {}", id, err);
                    }
                },
            }
        }

        if !urls.is_empty() {
            data.set_urls(&urls);
        }
        data
    }

    /// Build a native pasteboard from portable data.
    pub fn from_mime_data(data: &MimeData) -> Self {
        let mut pasteboard = Self::new();
        for format in data.formats() {
            match format {
                mime_data::TEXT_PLAIN => {
                    if let Some(text) = data.text() {
                        pasteboard.push(PasteboardType::Utf8PlainText, text);
                    }
                },
                mime_data::TEXT_URI_LIST => {
                    for url in data.urls() {
                        let kind = if url.starts_with("file://") {
                            PasteboardType::FileUrl
                        } else {
                            PasteboardType::Url
                        };
                        pasteboard.push(kind, url);
                    }
                },
                mime_data::TEXT_HTML => {
                    if let Some(html) = data.html() {
                        pasteboard.push(PasteboardType::Html, html);
                    }
                },
                mime_data::IMAGE_PNG => {
                    if let Some(png) = data.image_png() {
                        pasteboard.push(PasteboardType::Png, png.to_vec());
                    }
                },
                other => {
                    let id = match other.strip_prefix(CUSTOM_PREFIX) {
                        Some(subtype) => custom_identifier(subtype),
                        None => other.to_string(),
                    };
                    if let Some(bytes) = data.data(other) {
                        pasteboard.push(PasteboardType::Custom(id), bytes.to_vec());
                    }
                },
            }
        }
        pasteboard
    }
}

/// MIME type used for a custom native identifier.
///
/// MIME types compare case-insensitively, so every byte other than lowercase letters, digits,
/// `.` and `+` is written as `-xx` in hex. [custom_identifier] reverses it.
fn custom_mime_type(id: &str) -> String {
    let mut subtype = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'.' | b'+') {
            subtype.push(char::from(byte));
        } else {
            subtype.push_str(&format!("-{byte:02x}"));
        }
    }
    format!("{CUSTOM_PREFIX}{subtype}")
}

/// Native identifier for the subtype part of a custom MIME type.
fn custom_identifier(subtype: &str) -> String {
    let mut bytes = Vec::with_capacity(subtype.len());
    let mut rest = subtype.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        let escaped = (byte == b'-')
            .then(|| tail.get(..2))
            .flatten()
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(decoded) => {
                bytes.push(decoded);
                rest = &tail[2..];
            },
            None => {
                bytes.push(byte);
                rest = tail;
            },
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
