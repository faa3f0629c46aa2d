//! Model template parsing and substitution.
//!
//! Syntax: `{NAME}` is a placeholder, `{{` and `}}` are literal braces. Anything
//! else containing an unpaired brace is rejected when the template is parsed,
//! so the set of recognised parameter names is known before any rendering.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ParamSet;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone)]
pub struct Template {
    origin: PathBuf,
    segments: Vec<Segment>,
    placeholders: BTreeSet<String>,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::io(format!("Failed to read template '{}': {e}", path.display())))?;
        let mut template = Self::parse(&text)?;
        template.origin = path.to_path_buf();
        Ok(template)
    }

    pub fn parse(text: &str) -> Result<Self, AppError> {
        let mut segments = Vec::new();
        let mut placeholders = BTreeSet::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed || !is_identifier(&name) {
                        let (line, col) = line_col(text, pos);
                        return Err(AppError::config(format!(
                            "Malformed placeholder at line {line}, column {col} (use '{{{{' for a literal brace)."
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    placeholders.insert(name.clone());
                    segments.push(Segment::Placeholder(name));
                }
                '}' => {
                    let (line, col) = line_col(text, pos);
                    return Err(AppError::config(format!(
                        "Unmatched '}}' at line {line}, column {col} (use '}}}}' for a literal brace)."
                    )));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            origin: PathBuf::from("<inline>"),
            segments,
            placeholders,
        })
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Parameter names the template refers to.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(String::as_str)
    }

    /// Fails with every placeholder that `params` does not provide.
    pub fn check_keys(&self, params: &ParamSet) -> Result<(), AppError> {
        let missing: Vec<&str> = self
            .placeholders()
            .filter(|name| !params.contains(name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(AppError::config(format!(
            "Template '{}' needs parameter(s) with no value: {}.",
            self.origin.display(),
            missing.join(", ")
        )))
    }

    /// Keys in `params` the template never refers to.
    pub fn unused_keys<'a>(&self, params: &'a ParamSet) -> Vec<&'a str> {
        params
            .keys()
            .filter(|k| !self.placeholders.contains(*k))
            .collect()
    }

    pub fn render(&self, params: &ParamSet) -> Result<String, AppError> {
        self.check_keys(params)?;
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    // check_keys guarantees presence.
                    if let Some(value) = params.get(name) {
                        out.push_str(&value.to_string());
                    }
                }
            }
        }
        Ok(out)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn line_col(text: &str, pos: usize) -> (usize, usize) {
    let before = &text[..pos];
    let line = before.matches('\n').count() + 1;
    let col = before.rfind('\n').map(|i| pos - i).unwrap_or(pos + 1);
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParamValue;

    #[test]
    fn substitutes_placeholders_and_unescapes_braces() {
        let t = Template::parse("int N = {N_BOTS}; void f() {{ x = {RATE}; }}").unwrap();
        let params = ParamSet::new()
            .with("N_BOTS", 5)
            .with("RATE", ParamValue::Float(0.5));
        assert_eq!(t.render(&params).unwrap(), "int N = 5; void f() { x = 0.5; }");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let t = Template::parse("{A} {B}").unwrap();
        let err = t.render(&ParamSet::new().with("A", 1)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
        assert!(err.message().contains('B'));
    }

    #[test]
    fn unused_keys_are_reported() {
        let t = Template::parse("{A}").unwrap();
        let params = ParamSet::new().with("A", 1).with("EXTRA", 2);
        assert_eq!(t.unused_keys(&params), vec!["EXTRA"]);
    }

    #[test]
    fn malformed_braces_rejected_at_parse_time() {
        assert!(Template::parse("{not closed").is_err());
        assert!(Template::parse("{1abc}").is_err());
        assert!(Template::parse("stray } here").is_err());
    }

    #[test]
    fn placeholders_are_collected_once() {
        let t = Template::parse("{A}{B}{A}").unwrap();
        assert_eq!(t.placeholders().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
