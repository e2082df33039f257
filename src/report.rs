// fileref-check/src/report.rs

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::{fmt, fs, path::{Path, PathBuf}};
use tracing::info;

use crate::resolver::{placeholders, Placeholder, Resolver};

/// Characters of context shown on each side of a parse error.
pub const DEFAULT_CONTEXT_RADIUS: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Byte offset into the checked text.
    pub offset: usize,
    pub context: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JsonCheck {
    Valid,
    Invalid(ParseFailure),
}

impl JsonCheck {
    pub fn of(text: &str, context_radius: usize) -> Self {
        match parse(text, context_radius) {
            Ok(_) => Self::Valid,
            Err(failure) => Self::Invalid(failure),
        }
    }

    pub fn is_valid(&self) -> bool { matches!(self, Self::Valid) }
}

fn parse(text: &str, context_radius: usize) -> Result<Value, ParseFailure> {
    serde_json::from_str::<Value>(text).map_err(|e| {
        let offset = byte_offset(text, e.line(), e.column());
        ParseFailure {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
            offset,
            context: context_window(text, offset, context_radius),
        }
    })
}

/// serde_json reports 1-based line/column; turn that back into a byte offset.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start = match line {
        0 | 1 => 0,
        n => text.match_indices('\n').nth(n - 2).map(|(i, _)| i + 1).unwrap_or(text.len()),
    };
    let mut offset = (line_start + column.saturating_sub(1)).min(text.len());
    while !text.is_char_boundary(offset) { offset -= 1; }
    offset
}

fn context_window(text: &str, offset: usize, radius: usize) -> String {
    let before: usize = text[..offset].chars().rev().take(radius).map(char::len_utf8).sum();
    let after: usize = text[offset..].chars().take(radius).map(char::len_utf8).sum();
    text[offset - before..offset + after].to_string()
}

/// Outcome of one diagnostic pass over a config file.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub source: PathBuf,
    pub original_size: usize,
    pub original: JsonCheck,
    pub resolved_size: usize,
    pub resolved: JsonCheck,
    /// Tokens still present after resolution (their files were missing, or depth ran out).
    pub unresolved: Vec<Placeholder>,
    /// `None` when no schema was given or the resolved text did not parse.
    pub schema_violations: Option<Vec<String>>,
    #[serde(skip)]
    pub resolved_text: String,
}

impl Report {
    /// Read `source` and check it. A missing or unreadable top-level file is fatal.
    pub fn load(source: &Path, resolver: &Resolver, context_radius: usize, schema: Option<&Value>) -> Result<Self> {
        let original = fs::read_to_string(source)
            .with_context(|| format!("read {}", source.display()))?;
        Self::build(source, &original, resolver, context_radius, schema)
    }

    pub fn build(
        source: &Path,
        original: &str,
        resolver: &Resolver,
        context_radius: usize,
        schema: Option<&Value>,
    ) -> Result<Self> {
        let original_check = JsonCheck::of(original, context_radius);
        let resolved_text = resolver
            .resolve(original, 0)
            .with_context(|| format!("resolve file references in {}", source.display()))?;

        let (resolved, schema_violations) = match parse(&resolved_text, context_radius) {
            Ok(value) => {
                let violations = schema.map(|s| schema_violations(s, &value)).transpose()?;
                (JsonCheck::Valid, violations)
            }
            Err(failure) => (JsonCheck::Invalid(failure), None),
        };
        let unresolved = placeholders(&resolved_text);
        info!(
            source = %source.display(),
            original_valid = original_check.is_valid(),
            resolved_valid = resolved.is_valid(),
            unresolved = unresolved.len(),
            "checked config"
        );

        Ok(Self {
            source: source.to_path_buf(),
            original_size: original.len(),
            original: original_check,
            resolved_size: resolved_text.len(),
            resolved,
            unresolved,
            schema_violations,
            resolved_text,
        })
    }

    /// True when the resolved document parses, has no leftover tokens, and satisfies the schema.
    pub fn is_clean(&self) -> bool {
        self.resolved.is_valid()
            && self.unresolved.is_empty()
            && self.schema_violations.as_ref().is_none_or(|v| v.is_empty())
    }
}

fn schema_violations(schema: &Value, instance: &Value) -> Result<Vec<String>> {
    let validator = jsonschema::validator_for(schema).map_err(|e| anyhow!("invalid JSON schema: {e}"))?;
    Ok(validator.iter_errors(instance).map(|e| e.to_string()).collect())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source.display())?;
        writeln!(f, "Original JSON size: {}", self.original_size)?;
        match &self.original {
            JsonCheck::Valid => writeln!(f, "Original JSON valid: YES")?,
            JsonCheck::Invalid(e) => writeln!(f, "Original JSON valid: NO - {}", e.message)?,
        }

        writeln!(f)?;
        writeln!(f, "Resolved size: {}", self.resolved_size)?;
        match &self.resolved {
            JsonCheck::Valid => writeln!(f, "Resolved JSON valid: YES")?,
            JsonCheck::Invalid(e) => {
                writeln!(f, "Resolved JSON valid: NO")?;
                writeln!(f, "Error: {}", e.message)?;
                writeln!(f, "Position: {} (line {}, column {})", e.offset, e.line, e.column)?;
                writeln!(f, "Context: {:?}", e.context)?;
            }
        }

        if !self.unresolved.is_empty() {
            writeln!(f, "Unresolved references: {}", self.unresolved.len())?;
            for p in &self.unresolved {
                writeln!(f, "  - {} (byte {})", p.token, p.start)?;
            }
        }
        match &self.schema_violations {
            Some(v) if v.is_empty() => writeln!(f, "Schema: OK")?,
            Some(v) => {
                writeln!(f, "Schema: {} violation(s)", v.len())?;
                for e in v { writeln!(f, "  - {e}")?; }
            }
            None => {}
        }
        Ok(())
    }
}
