//! Program snapshot loading
//!
//! A snapshot file is the entity state the data service returned for one or more
//! programs at a single point in time:
//!
//! ```json
//! {"programs": [{"id": "p1", "name": "Checkout", "risks": [], "milestones": [],
//!                "dependencies": [], "adopters": [], "missingComponents": 2}]}
//! ```
//!
//! Malformed entities are skipped, counted and logged; they never abort a load.
//! Only unreadable files and invalid JSON are errors.

use crate::adoption::summarize_adoption;
use crate::entity::{Adopter, Dependency, Milestone, Risk};
use crate::health::compute_health_at;
use crate::matrix::build_risk_matrix;
use crate::report::ProgramReport;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// One program and its child entities
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub name: Option<String>,
    pub risks: Vec<Risk>,
    pub milestones: Vec<Milestone>,
    pub dependencies: Vec<Dependency>,
    pub adopters: Vec<Adopter>,
    pub missing_components: Option<u32>,
}

impl Program {
    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Run the health scorer and matrix builder over this program.
    ///
    /// Adoption is summarized only when the program has adopters.
    pub fn evaluate(&self, now: DateTime<Utc>) -> ProgramReport {
        let health = compute_health_at(
            &self.risks,
            &self.milestones,
            &self.dependencies,
            self.missing_components,
            now,
        );
        let adoption = if self.adopters.is_empty() {
            None
        } else {
            Some(summarize_adoption(&self.adopters))
        };

        ProgramReport {
            program_id: self.id.clone(),
            program_name: self.display_name().to_string(),
            health,
            risk_matrix: build_risk_matrix(&self.risks),
            adoption,
        }
    }
}

/// Entities dropped while loading, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntities {
    pub programs: usize,
    pub risks: usize,
    pub milestones: usize,
    pub dependencies: usize,
    pub adopters: usize,
    /// `missingComponents` values that are not a non-negative whole number
    pub missing_components: usize,
}

impl SkippedEntities {
    pub fn total(&self) -> usize {
        self.programs
            + self.risks
            + self.milestones
            + self.dependencies
            + self.adopters
            + self.missing_components
    }
}

/// Loaded snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramSnapshot {
    pub programs: Vec<Program>,
    pub skipped: SkippedEntities,
}

impl ProgramSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json).context("failed to parse snapshot JSON")?;
        Ok(Self::from_value(&root))
    }

    /// Build a snapshot from an already-parsed JSON document.
    ///
    /// Accepts `{"programs": [...]}` or a bare array of programs.
    pub fn from_value(root: &Value) -> Self {
        let mut snapshot = ProgramSnapshot::default();

        let entries: &[Value] = match root {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => match map.get("programs") {
                Some(Value::Array(items)) => items.as_slice(),
                Some(other) => {
                    tracing::warn!(kind = json_kind(other), "`programs` is not an array");
                    &[]
                }
                None => {
                    tracing::warn!("snapshot has no `programs` key");
                    &[]
                }
            },
            other => {
                tracing::warn!(kind = json_kind(other), "snapshot root is not an object");
                &[]
            }
        };

        for (index, entry) in entries.iter().enumerate() {
            match parse_program(entry, &mut snapshot.skipped) {
                Some(program) => snapshot.programs.push(program),
                None => {
                    tracing::warn!(index, "skipping program: not an object");
                    snapshot.skipped.programs += 1;
                }
            }
        }

        if snapshot.skipped.total() > 0 {
            tracing::warn!(
                skipped = snapshot.skipped.total(),
                "skipped malformed entities while loading snapshot"
            );
        }
        tracing::debug!(programs = snapshot.programs.len(), "loaded snapshot");

        snapshot
    }

    /// Find a program by id
    pub fn program(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }
}

/// Load a snapshot file
pub fn load_snapshot(path: &Path) -> Result<ProgramSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file: {}", path.display()))?;

    ProgramSnapshot::from_json(&content)
        .with_context(|| format!("invalid snapshot: {}", path.display()))
}

fn parse_program(entry: &Value, skipped: &mut SkippedEntities) -> Option<Program> {
    let map = entry.as_object()?;

    let id = match map.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    Some(Program {
        name: map.get("name").and_then(Value::as_str).map(str::to_string),
        risks: parse_collection(&id, "risks", map.get("risks"), &mut skipped.risks),
        milestones: parse_collection(
            &id,
            "milestones",
            map.get("milestones"),
            &mut skipped.milestones,
        ),
        dependencies: parse_collection(
            &id,
            "dependencies",
            map.get("dependencies"),
            &mut skipped.dependencies,
        ),
        adopters: parse_collection(&id, "adopters", map.get("adopters"), &mut skipped.adopters),
        missing_components: parse_missing_components(
            &id,
            map.get("missingComponents"),
            &mut skipped.missing_components,
        ),
        id,
    })
}

/// Whole numbers only; `2.0` counts as 2, anything else is dropped
fn parse_missing_components(
    program_id: &str,
    value: Option<&Value>,
    skipped: &mut usize,
) -> Option<u32> {
    let value = match value {
        None | Some(Value::Null) => return None,
        Some(value) => value,
    };

    let whole = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .map(|n| n as u64)
    });

    match whole {
        Some(n) => Some(u32::try_from(n).unwrap_or(u32::MAX)),
        None => {
            tracing::warn!(
                program = program_id,
                kind = json_kind(value),
                value = %value,
                "ignoring missingComponents that is not a non-negative whole number"
            );
            *skipped += 1;
            None
        }
    }
}

/// Deserialize each element on its own so one bad entity cannot take the rest down
fn parse_collection<T: DeserializeOwned>(
    program_id: &str,
    key: &str,
    value: Option<&Value>,
    skipped: &mut usize,
) -> Vec<T> {
    let items = match value {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => return Vec::new(),
        Some(other) => {
            tracing::warn!(
                program = program_id,
                collection = key,
                kind = json_kind(other),
                "collection is not an array; treating as empty"
            );
            return Vec::new();
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(
                program = program_id,
                collection = key,
                index,
                "skipping non-object entity"
            );
            *skipped += 1;
            continue;
        }
        match serde_json::from_value::<T>(item.clone()) {
            Ok(entity) => parsed.push(entity),
            Err(e) => {
                tracing::warn!(
                    program = program_id,
                    collection = key,
                    index,
                    error = %e,
                    "skipping malformed entity"
                );
                *skipped += 1;
            }
        }
    }
    parsed
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
