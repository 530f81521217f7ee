use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::FieldErrors;

pub const LANGUAGE_MIN_LEN: usize = 2;
pub const LANGUAGE_MAX_LEN: usize = 20;
pub const GROUP_NAME_MAX_LEN: usize = 100;

static DANGEROUS_ELEMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["script", "style", "iframe", "object", "embed"]
        .iter()
        .filter_map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).ok())
        .collect()
});

static DANGEROUS_TAGS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)</?(script|style|iframe|object|embed)\b[^>]*>").ok());

static EVENT_HANDLERS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).ok());

static SCRIPT_URLS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)javascript\s*:").ok());

/// Attribute validation shared by the question group model
pub struct ValidationService;

impl ValidationService {
    pub fn validate_language(language: &str, errors: &mut FieldErrors) {
        let len = language.chars().count();
        if len < LANGUAGE_MIN_LEN {
            errors.add(
                "language",
                format!(
                    "Language is too short (minimum is {} characters).",
                    LANGUAGE_MIN_LEN
                ),
            );
        } else if len > LANGUAGE_MAX_LEN {
            errors.add(
                "language",
                format!(
                    "Language is too long (maximum is {} characters).",
                    LANGUAGE_MAX_LEN
                ),
            );
        }
    }

    pub fn validate_group_name(group_name: &str, errors: &mut FieldErrors) -> String {
        let filtered = Self::xss_filter(group_name);
        if filtered.chars().count() > GROUP_NAME_MAX_LEN {
            errors.add(
                "group_name",
                format!(
                    "Group name is too long (maximum is {} characters).",
                    GROUP_NAME_MAX_LEN
                ),
            );
        }
        filtered
    }

    /// Strip active content (script-like elements, event handler
    /// attributes, `javascript:` URLs) while leaving ordinary markup alone.
    pub fn xss_filter(text: &str) -> String {
        let mut filtered = text.to_string();
        for element in DANGEROUS_ELEMENTS.iter() {
            filtered = element.replace_all(&filtered, "").into_owned();
        }
        for pattern in [&*DANGEROUS_TAGS, &*EVENT_HANDLERS, &*SCRIPT_URLS]
            .into_iter()
            .flatten()
        {
            filtered = pattern.replace_all(&filtered, "").into_owned();
        }
        filtered
    }
}
