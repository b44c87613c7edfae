//! Name-based step classification.
//!
//! Category and integration tags are pure functions of the step name.
//! Nothing is stored; both are recomputed on every read. Rule order is
//! load-bearing for category: the first matching rule wins, so a name
//! like "ai-image-compress" classifies as "ai", not "documents".

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Notifications,
    Ai,
    Data,
    Storage,
    Documents,
    Integrations,
    Utilities,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Notifications => "notifications",
            Category::Ai => "ai",
            Category::Data => "data",
            Category::Storage => "storage",
            Category::Documents => "documents",
            Category::Integrations => "integrations",
            Category::Utilities => "utilities",
        }
    }
}

const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Notifications,
        &["slack", "discord", "email", "sms", "telegram"],
    ),
    (Category::Ai, &["ai", "generate"]),
    (Category::Data, &["database", "query", "validate", "parse"]),
    (Category::Storage, &["upload", "storage", "blob", "drive"]),
    (Category::Documents, &["pdf", "qr", "image", "compress"]),
    (
        Category::Integrations,
        &[
            "webhook", "api", "fetch", "vercel", "github", "shopify", "notion", "airtable",
            "sheets",
        ],
    ),
    (Category::Utilities, &["scrape", "geocode"]),
];

/// Derive the category from a step name. Unmatched names fall back to
/// utilities.
pub fn category_for(name: &str) -> Category {
    let name = name.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|keyword| name.contains(keyword)) {
            return *category;
        }
    }
    Category::Utilities
}

// Each entry: (tag, keywords). All matching tags apply, unlike category.
const INTEGRATION_RULES: &[(&str, &[&str])] = &[
    ("Slack", &["slack"]),
    ("Discord", &["discord"]),
    ("Telegram", &["telegram"]),
    ("Resend", &["email", "resend"]),
    ("Twilio", &["sms", "twilio"]),
    ("Vercel", &["vercel"]),
    ("GitHub", &["github"]),
    ("Shopify", &["shopify"]),
    ("Notion", &["notion"]),
    ("Airtable", &["airtable"]),
    ("Google Sheets", &["google-sheets", "sheets"]),
    ("Google Drive", &["google-drive", "drive"]),
    ("OpenAI", &["openai"]),
    ("Anthropic", &["anthropic", "claude"]),
];

// Generic tags only apply when no vendor tag matched.
const FALLBACK_INTEGRATION_RULES: &[(&str, &[&str])] = &[
    ("PDF", &["pdf"]),
    ("QR Code", &["qr"]),
    ("Image Processing", &["image"]),
    ("CSV", &["csv"]),
    ("Database", &["database"]),
];

/// Derive integration tags from a step name. Vendor tags accumulate;
/// generic service tags only apply when no vendor matched.
pub fn integrations_for(name: &str) -> Vec<String> {
    let name = name.to_lowercase();
    let mut tags: Vec<String> = INTEGRATION_RULES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(tag, _)| tag.to_string())
        .collect();

    if tags.is_empty() {
        tags = FALLBACK_INTEGRATION_RULES
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
            .map(|(tag, _)| tag.to_string())
            .collect();
    }

    tags
}
