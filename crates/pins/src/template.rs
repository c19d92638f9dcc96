//! Minimal `<: $name :>` template substitution.
//!
//! Single-pass variable interpolation only — no control flow, no loops, no
//! nesting — so the renderer's contract stays auditable. A general-purpose
//! templating language is deliberately not pulled in; anything satisfying
//! "replace every `<: $name :>` slot with a string" could stand in for
//! this engine.

use std::collections::BTreeMap;

use quill_core::error::RenderError;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Var(String),
}

/// A parsed template: literal runs interleaved with variable slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text. Fails on an unterminated tag or a malformed
    /// variable reference; plain text with no tags parses as one literal.
    pub fn parse(input: &str) -> Result<Self, RenderError> {
        let mut segments = Vec::new();
        let mut rest = input;

        while let Some(start) = rest.find("<:") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let tag_rest = &rest[start + 2..];
            let end = tag_rest
                .find(":>")
                .ok_or_else(|| RenderError::Template("unterminated <: tag".into()))?;
            let name = parse_var_name(&tag_rest[..end])?;
            segments.push(Segment::Var(name));
            rest = &tag_rest[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Whether any slot references `name`.
    pub fn contains_var(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Var(n) if n == name))
    }

    /// Substitute every slot from `vars`. A slot with no binding is
    /// [`RenderError::UnknownVariable`] — producing output with a hole in
    /// it is worse than failing loudly.
    pub fn render(&self, vars: &BTreeMap<&str, String>) -> Result<String, RenderError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(name) => match vars.get(name.as_str()) {
                    Some(value) => out.push_str(value),
                    None => return Err(RenderError::UnknownVariable(name.clone())),
                },
            }
        }
        Ok(out)
    }
}

/// Inside of a tag: optional whitespace, `$`, an identifier, optional
/// whitespace. Anything else is malformed.
fn parse_var_name(inner: &str) -> Result<String, RenderError> {
    let trimmed = inner.trim();
    let name = trimmed
        .strip_prefix('$')
        .ok_or_else(|| RenderError::Template(format!("expected $variable in tag, got {trimmed:?}")))?;
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(RenderError::Template(format!(
            "malformed variable name {name:?}"
        )));
    }
    Ok(name.to_string())
}
