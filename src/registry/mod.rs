//! Step catalog.
//!
//! The catalog is a static `registry.json` manifest at the registry
//! root: a list of step descriptors pointing at source files on disk.
//! Nothing here mutates; every read re-derives category and integration
//! tags from the step name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Error, Result};

pub mod classify;
pub mod detail;

pub use classify::{category_for, integrations_for, Category};
pub use detail::StepDetail;

pub const MANIFEST_FILE: &str = "registry.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub homepage: Option<String>,
    pub items: Vec<StepDescriptor>,
}

/// One catalog entry. `files` paths are relative to the registry root.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub files: Vec<StepFile>,
    /// Declared configuration keys. When present these take precedence
    /// over scanning the step source for environment accesses.
    #[serde(default)]
    pub env: Vec<EnvVar>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepFile {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub description: String,
}

/// Step summary with derived classification, as listed by the API.
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub category: Category,
    pub integrations: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
    manifest: Manifest,
    /// Raw manifest JSON, served verbatim by the catalog endpoint.
    raw: Value,
}

impl Registry {
    /// Load the manifest from `root/registry.json`.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let manifest_path = root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&manifest_path).map_err(|e| {
            Error::Registry(format!(
                "failed to read {}: {}",
                manifest_path.display(),
                e
            ))
        })?;
        let raw: Value = serde_json::from_str(&content)
            .map_err(|e| Error::Registry(format!("invalid manifest JSON: {}", e)))?;
        let manifest: Manifest = serde_json::from_value(raw.clone())
            .map_err(|e| Error::Registry(format!("invalid manifest shape: {}", e)))?;

        debug!(steps = manifest.items.len(), "loaded step catalog");
        Ok(Self {
            root,
            manifest,
            raw,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The manifest exactly as it appears on disk.
    pub fn raw_manifest(&self) -> &Value {
        &self.raw
    }

    pub fn get(&self, name: &str) -> Option<&StepDescriptor> {
        self.manifest.items.iter().find(|step| step.name == name)
    }

    /// All steps with derived category and integration tags.
    pub fn steps(&self) -> Vec<StepSummary> {
        self.manifest
            .items
            .iter()
            .map(|step| StepSummary {
                name: step.name.clone(),
                kind: step.kind.clone(),
                description: step.description.clone(),
                category: category_for(&step.name),
                integrations: integrations_for(&step.name),
                dependencies: step.dependencies.clone(),
            })
            .collect()
    }

    /// Integration tags across the catalog with step counts, most
    /// common first; ties break alphabetically.
    pub fn integrations(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for step in &self.manifest.items {
            for tag in integrations_for(&step.name) {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Installer payload for one step: the descriptor with file contents
    /// inlined, in the shape the external CLI installer consumes.
    pub fn installer_payload(&self, name: &str) -> Result<Option<Value>> {
        let Some(step) = self.get(name) else {
            return Ok(None);
        };

        let mut files = Vec::with_capacity(step.files.len());
        for file in &step.files {
            let path = self.root.join(&file.path);
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Registry(format!("failed to read {}: {}", path.display(), e))
            })?;
            files.push(json!({
                "name": file.path,
                "type": file.kind,
                "content": content,
            }));
        }

        Ok(Some(json!({
            "name": step.name,
            "type": step.kind,
            "dependencies": step.dependencies,
            "files": files,
        })))
    }

    /// Full detail for one step: code, usage example, and configuration
    /// keys. Unknown names and unreadable source files both resolve to
    /// `None`.
    pub fn detail(&self, name: &str) -> Option<StepDetail> {
        let step = self.get(name)?;
        detail::step_detail(&self.root, step)
    }
}
