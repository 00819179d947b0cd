//! File content as seen by the differ and the applier
//!
//! Text files are held as lines that keep their terminators, so `"a\nb"` and
//! `"a\nb\n"` stay distinguishable and survive a diff/apply cycle unchanged.
//! Files that are not valid UTF-8 are held as raw bytes and exposed to the
//! line-based engine through a hex view of fixed-width rows.

use crate::artifacts::snapshot::content_id::ContentId;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Number of raw bytes rendered on one hex row of a binary line view
pub const BINARY_LINE_WIDTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Text,
    Binary,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Binary => "binary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(Vec<String>),
    Binary(Bytes),
}

impl FileContent {
    pub fn from_bytes(data: Bytes) -> Self {
        match std::str::from_utf8(&data) {
            Ok(text) => FileContent::Text(split_lines(text)),
            Err(_) => FileContent::Binary(data),
        }
    }

    pub fn from_text(text: &str) -> Self {
        FileContent::Text(split_lines(text))
    }

    /// Rebuild content from a line view produced by [`FileContent::line_view`]
    pub fn from_line_view(lines: Vec<String>, kind: ContentKind) -> Result<Self, hex::FromHexError> {
        match kind {
            ContentKind::Text => Ok(FileContent::Text(lines)),
            ContentKind::Binary => {
                let mut data = Vec::with_capacity(lines.len() * BINARY_LINE_WIDTH);
                for line in &lines {
                    data.extend(hex::decode(line.trim_end())?);
                }
                Ok(FileContent::Binary(Bytes::from(data)))
            }
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            FileContent::Text(_) => ContentKind::Text,
            FileContent::Binary(_) => ContentKind::Binary,
        }
    }

    /// Lines the engine diffs and patches
    pub fn line_view(&self) -> Cow<'_, [String]> {
        match self {
            FileContent::Text(lines) => Cow::Borrowed(lines.as_slice()),
            FileContent::Binary(data) => Cow::Owned(
                data.chunks(BINARY_LINE_WIDTH)
                    .map(|chunk| format!("{}\n", hex::encode(chunk)))
                    .collect(),
            ),
        }
    }

    /// Line view in the given encoding; a text file viewed as binary shows its bytes as hex rows
    pub fn view_as(&self, kind: ContentKind) -> Cow<'_, [String]> {
        match (self, kind) {
            (FileContent::Text(_), ContentKind::Binary) => {
                FileContent::Binary(self.to_bytes()).line_view().into_owned().into()
            }
            _ => self.line_view(),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match self {
            FileContent::Text(lines) => Bytes::from(lines.concat()),
            FileContent::Binary(data) => data.clone(),
        }
    }

    pub fn content_id(&self) -> ContentId {
        ContentId::of_bytes(&self.to_bytes())
    }

    pub fn line_count(&self) -> usize {
        match self {
            FileContent::Text(lines) => lines.len(),
            FileContent::Binary(data) => data.len().div_ceil(BINARY_LINE_WIDTH),
        }
    }
}

/// Split text into lines, each keeping its trailing `\n` (the last one may lack it)
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(String::from).collect()
}
