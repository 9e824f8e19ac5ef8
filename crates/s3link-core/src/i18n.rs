// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Localized text
//
// English is the base language and must cover every key. The local
// language (Hindi in the built-in catalog) is optional per key.

use crate::types::{AppError, DisplayMode};
use std::collections::HashMap;

/// Built-in entries: (key, English, optional Hindi)
const BUILTIN: &[(&str, &str, Option<&str>)] = &[
    (
        "connection.success",
        "Connected to S3 bucket successfully",
        Some("S3 बकेट से सफलतापूर्वक कनेक्ट हो गया"),
    ),
    (
        "connection.error",
        "Error connecting to S3. Check credentials and CORS.",
        Some("S3 से कनेक्ट करने में त्रुटि। क्रेडेंशियल और CORS जांचें।"),
    ),
    (
        "connection.networkError",
        "Error loading directory\nNetwork error: Please check your internet connection and ensure CORS is configured properly.",
        None,
    ),
    (
        "connection.required",
        "Please connect to an S3 bucket first",
        Some("कृपया पहले S3 बकेट से कनेक्ट करें"),
    ),
    ("connection.active", "Connected to", Some("कनेक्टेड")),
    (
        "connection.cancelled",
        "Connection attempt was cancelled",
        Some("कनेक्शन का प्रयास रद्द कर दिया गया"),
    ),
    (
        "disconnect.success",
        "Disconnected from S3 bucket.",
        Some("S3 बकेट से डिस्कनेक्ट हो गया।"),
    ),
    ("disconnect.button", "Disconnect", Some("डिस्कनेक्ट करें")),
    (
        "disconnect.confirm.title",
        "Are you sure you want to disconnect?",
        Some("क्या आप वाकई डिस्कनेक्ट करना चाहते हैं?"),
    ),
    ("disconnect.confirm.yes", "Yes", Some("हाँ")),
    ("disconnect.confirm.no", "No", Some("नहीं")),
    ("disconnect.confirm.cancel", "Cancel", Some("रद्द करें")),
    (
        "validation.required",
        "All fields are required.",
        Some("सभी फ़ील्ड आवश्यक हैं।"),
    ),
    ("validation.invalidFormat", "Invalid format", Some("अमान्य प्रारूप")),
    (
        "upload.success",
        "Files uploaded successfully",
        Some("फ़ाइलें सफलतापूर्वक अपलोड हुईं"),
    ),
    ("upload.error", "Upload failed", None),
    ("field.accessKey", "Access Key ID", Some("एक्सेस की आईडी")),
    ("field.secretKey", "Secret Access Key", None),
    ("field.region", "Region", Some("क्षेत्र")),
    ("field.bucket", "Bucket Name", Some("बकेट का नाम")),
];

/// Message catalog for English plus one local language
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    english: HashMap<String, String>,
    local: HashMap<String, String>,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in English/Hindi strings
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (key, english, local) in BUILTIN {
            catalog.insert_english(*key, *english);
            if let Some(local) = local {
                catalog.insert_local(*key, *local);
            }
        }
        catalog
    }

    /// Build from two flat JSON objects mapping key to text
    pub fn from_json(english: &str, local: &str) -> Result<Self, AppError> {
        let english: HashMap<String, String> = serde_json::from_str(english)?;
        let local: HashMap<String, String> = serde_json::from_str(local)?;
        Ok(Self { english, local })
    }

    pub fn insert_english(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.english.insert(key.into(), text.into());
    }

    pub fn insert_local(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.local.insert(key.into(), text.into());
    }

    /// Resolve a key under a display mode.
    ///
    /// Dual renders `"{english} / {local}"`, LocalLanguage renders the local
    /// text alone. Without a local entry every mode renders English.
    /// A key with no English entry is a [`AppError::MissingTranslation`].
    pub fn resolve(&self, key: &str, mode: DisplayMode) -> Result<String, AppError> {
        let english = self
            .english
            .get(key)
            .ok_or_else(|| AppError::MissingTranslation(key.to_string()))?;

        let local = self.local.get(key).filter(|s| !s.is_empty());

        let text = match (mode, local) {
            (DisplayMode::Dual, Some(local)) => format!("{} / {}", english, local),
            (DisplayMode::LocalLanguage, Some(local)) => local.clone(),
            _ => english.clone(),
        };
        Ok(text)
    }

    /// Diagnostic fallback: like [`Catalog::resolve`], but a missing English
    /// entry yields the raw key (and a warning) instead of an error.
    /// Not a substitute for a complete catalog.
    pub fn resolve_or_key(&self, key: &str, mode: DisplayMode) -> String {
        self.resolve(key, mode).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            key.to_string()
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.english.contains_key(key)
    }
}
