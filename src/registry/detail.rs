//! Per-step detail: source code, usage example, and configuration keys.

use std::fs;
use std::path::Path;

use regex_lite::Regex;
use serde::Serialize;
use tracing::warn;

use super::classify::{category_for, integrations_for, Category};
use super::{EnvVar, StepDescriptor, StepFile};

const DEFAULT_FUNCTION_NAME: &str = "run_step";

#[derive(Debug, Clone, Serialize)]
pub struct StepDetail {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub integrations: Vec<String>,
    pub dependencies: Vec<String>,
    pub files: Vec<StepFile>,
    pub code: String,
    pub usage: String,
    pub env_vars: Vec<EnvVar>,
}

/// Assemble the detail view for a step. Read failures resolve to `None`
/// after logging, matching the catalog's treatment of unknown names.
pub(super) fn step_detail(root: &Path, step: &StepDescriptor) -> Option<StepDetail> {
    let Some(file) = step.files.first() else {
        warn!(step = %step.name, "step has no source files");
        return None;
    };

    let path = root.join(&file.path);
    let code = match fs::read_to_string(&path) {
        Ok(code) => code,
        Err(e) => {
            warn!(step = %step.name, path = %path.display(), "failed to read step source: {}", e);
            return None;
        }
    };

    let env_vars = if step.env.is_empty() {
        scan_env_vars(&code)
    } else {
        step.env.clone()
    };

    let function_name = extract_function_name(&code);

    Some(StepDetail {
        name: step.name.clone(),
        kind: step.kind.clone(),
        title: title_from_name(&step.name),
        description: step.description.clone(),
        category: category_for(&step.name),
        integrations: integrations_for(&step.name),
        dependencies: step.dependencies.clone(),
        files: step.files.clone(),
        usage: usage_example(&function_name, &step.name),
        code,
        env_vars,
    })
}

/// Scan source text for environment accesses, deduplicating while
/// preserving first-seen order.
pub fn scan_env_vars(code: &str) -> Vec<EnvVar> {
    let Ok(pattern) = Regex::new(r#"env::var\("([A-Z][A-Z0-9_]*)"\)"#) else {
        return Vec::new();
    };

    let mut vars: Vec<EnvVar> = Vec::new();
    for captures in pattern.captures_iter(code) {
        if let Some(name) = captures.get(1) {
            let name = name.as_str();
            if !vars.iter().any(|var| var.name == name) {
                vars.push(EnvVar {
                    name: name.to_string(),
                    description: describe_env_var(name),
                });
            }
        }
    }
    vars
}

/// Human description for well-known configuration keys.
pub fn describe_env_var(name: &str) -> String {
    let known = match name {
        "SLACK_BOT_TOKEN" => "Your Slack Bot User OAuth Token",
        "RESEND_API_KEY" => "Your Resend API key for sending emails",
        "RESEND_FROM_EMAIL" => "Default sender email address",
        "TELEGRAM_BOT_TOKEN" => "Your Telegram bot token from BotFather",
        "TWILIO_ACCOUNT_SID" => "Your Twilio Account SID",
        "TWILIO_AUTH_TOKEN" => "Your Twilio Auth Token",
        "TWILIO_PHONE_NUMBER" => "Your Twilio phone number",
        "OPENAI_API_KEY" => "Your OpenAI API key",
        "GITHUB_TOKEN" => "GitHub personal access token",
        "NOTION_API_KEY" => "Notion integration token",
        "AIRTABLE_API_KEY" => "Airtable personal access token",
        "SHOPIFY_ACCESS_TOKEN" => "Shopify Admin API access token",
        "GOOGLE_SHEETS_API_KEY" => "Google Sheets API key",
        "GOOGLE_DRIVE_API_KEY" => "Google Drive API key",
        "VERCEL_TOKEN" => "Vercel API token",
        "VERCEL_TEAM_ID" => "Vercel team scope for API calls",
        "EDGE_CONFIG_ID" => "Vercel Edge Config store ID",
        "BLOB_READ_WRITE_TOKEN" => "Blob storage read-write token",
        "DATABASE_URL" => "Database connection string",
        "WEBHOOK_SECRET" => "Shared secret for signing webhook payloads",
        "PDF_SERVICE_URL" => "Base URL of the HTML-to-PDF rendering service",
        "QR_SERVICE_URL" => "Base URL of the QR code rendering service",
        "IMAGE_SERVICE_URL" => "Base URL of the image processing service",
        "GOOGLE_MAPS_API_KEY" => "API key for the Google Maps geocoding API",
        "OPENCAGE_API_KEY" => "API key for the OpenCage geocoding API",
        _ => return format!("Environment variable: {}", name),
    };
    known.to_string()
}

/// Name of the first public async function in the source, or a
/// placeholder when none matches.
pub fn extract_function_name(code: &str) -> String {
    Regex::new(r"pub\s+async\s+fn\s+(\w+)")
        .ok()
        .and_then(|pattern| {
            pattern
                .captures(code)
                .and_then(|captures| captures.get(1))
                .map(|name| name.as_str().to_string())
        })
        .unwrap_or_else(|| DEFAULT_FUNCTION_NAME.to_string())
}

/// "send-slack-message" becomes "Send Slack Message".
pub fn title_from_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical calling example embedded in the detail view.
pub fn usage_example(function_name: &str, step_name: &str) -> String {
    let module = step_name.replace('-', "_");
    format!(
        "use steps::{module}::{function_name};\n\
         \n\
         async fn my_workflow() -> Result<()> {{\n\
         \x20   // Transient failures are retried by the workflow runtime.\n\
         \x20   let result = {function_name}(&config, params).await?;\n\
         \x20   Ok(())\n\
         }}\n"
    )
}
