//! crates/scrible_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! The persisted records serialize with the same camelCase layout the browser
//! client has always written to local storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The owner id used when the deployment runs without accounts.
pub const GUEST_USER_ID: &str = "guest";

//=========================================================================================
// Notebooks
//=========================================================================================

/// A saved unit of extracted/edited text plus its presentation and ownership.
///
/// `paper_style` and `font_style` are stored verbatim; unknown keys are only
/// resolved to a default when rendering (see [`PaperStyle::from_key`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub text: String,
    pub paper_style: String,
    pub font_style: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-supplied part of a notebook; the repository assigns the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotebook {
    pub title: String,
    pub text: String,
    pub paper_style: String,
    pub font_style: String,
}

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookPatch {
    pub title: Option<String>,
    pub text: Option<String>,
    pub paper_style: Option<String>,
    pub font_style: Option<String>,
}

impl NotebookPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Merges the provided fields over `notebook`. Identity and timestamps are
    /// not part of a patch and are handled by the repository.
    pub(crate) fn apply_to(self, notebook: &mut Notebook) {
        if let Some(title) = self.title {
            notebook.title = title;
        }
        if let Some(text) = self.text {
            notebook.text = text;
        }
        if let Some(paper_style) = self.paper_style {
            notebook.paper_style = paper_style;
        }
        if let Some(font_style) = self.font_style {
            notebook.font_style = font_style;
        }
    }
}

//=========================================================================================
// Presentation Themes
//=========================================================================================

/// Paper theme of a notebook page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperStyle {
    #[default]
    Classic,
    Blue,
    Green,
    Purple,
    Grid,
    Parchment,
    Minimal,
}

impl PaperStyle {
    pub const ALL: [PaperStyle; 7] = [
        PaperStyle::Classic,
        PaperStyle::Blue,
        PaperStyle::Green,
        PaperStyle::Purple,
        PaperStyle::Grid,
        PaperStyle::Parchment,
        PaperStyle::Minimal,
    ];

    /// Resolves a stored key. Unrecognized keys render as `Classic`.
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|style| style.key() == key)
            .unwrap_or_default()
    }

    pub fn key(self) -> &'static str {
        match self {
            PaperStyle::Classic => "classic",
            PaperStyle::Blue => "blue",
            PaperStyle::Green => "green",
            PaperStyle::Purple => "purple",
            PaperStyle::Grid => "grid",
            PaperStyle::Parchment => "parchment",
            PaperStyle::Minimal => "minimal",
        }
    }

    pub fn css_class(self) -> String {
        format!("paper-{}", self.key())
    }
}

/// Font theme of a notebook page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    Handwritten,
    #[default]
    Text,
}

impl FontStyle {
    /// Resolves a stored key. Anything but `handwritten` renders as `Text`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "handwritten" => FontStyle::Handwritten,
            _ => FontStyle::Text,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            FontStyle::Handwritten => "handwritten",
            FontStyle::Text => "text",
        }
    }

    pub fn font_family(self) -> &'static str {
        match self {
            FontStyle::Handwritten => "caveat, cursive",
            FontStyle::Text => "varela round, sans-serif",
        }
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// The public profile of an account, kept in the "current user" slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Only used internally for login/registration - contains the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

impl UserCredentials {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

//=========================================================================================
// Scanned Input
//=========================================================================================

/// What kind of document a user handed in for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    Image,
    Pdf,
}

const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

impl ScanKind {
    /// Classifies by content type first, then by file extension.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        match content_type {
            Some(ct) if ct.starts_with("image/") => return Some(ScanKind::Image),
            Some("application/pdf") => return Some(ScanKind::Pdf),
            _ => {}
        }

        let name = file_name.to_lowercase();
        if name.ends_with(".pdf") {
            Some(ScanKind::Pdf)
        } else if IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            Some(ScanKind::Image)
        } else {
            None
        }
    }
}

/// A user-provided file (photo, upload or PDF) awaiting text extraction.
#[derive(Debug, Clone)]
pub struct ScanFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ScanFile {
    pub fn kind(&self) -> Option<ScanKind> {
        ScanKind::detect(self.content_type.as_deref(), &self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_paper_key_renders_classic() {
        assert_eq!(PaperStyle::from_key("neon"), PaperStyle::Classic);
        assert_eq!(PaperStyle::from_key("grid").css_class(), "paper-grid");
        assert_eq!(PaperStyle::from_key("").css_class(), "paper-classic");
    }

    #[test]
    fn unknown_font_key_renders_text() {
        assert_eq!(FontStyle::from_key("handwritten"), FontStyle::Handwritten);
        assert_eq!(FontStyle::from_key("comic"), FontStyle::Text);
        assert_eq!(FontStyle::Text.font_family(), "varela round, sans-serif");
    }

    #[test]
    fn scan_kind_falls_back_to_extension() {
        assert_eq!(ScanKind::detect(Some("image/png"), "x"), Some(ScanKind::Image));
        assert_eq!(ScanKind::detect(Some("application/pdf"), "x"), Some(ScanKind::Pdf));
        assert_eq!(
            ScanKind::detect(Some("application/octet-stream"), "Page.JPG"),
            Some(ScanKind::Image)
        );
        assert_eq!(ScanKind::detect(None, "notes.pdf"), Some(ScanKind::Pdf));
        assert_eq!(ScanKind::detect(Some("text/plain"), "notes.txt"), None);
    }

    #[test]
    fn notebook_serializes_camel_case() {
        let now = Utc::now();
        let notebook = Notebook {
            id: "1".into(),
            user_id: GUEST_USER_ID.into(),
            title: "t".into(),
            text: String::new(),
            paper_style: "classic".into(),
            font_style: "text".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&notebook).unwrap();
        assert_eq!(json["userId"], "guest");
        assert!(json.get("paperStyle").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
