//! `{{field}}` interpolation for overlay text.
//!
//! Overlay text is user input typed into a live form, so rendering never
//! fails: a template that does not compile is drawn as written.

use crate::exif::ExifFieldMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),
    #[error("invalid placeholder name {0:?}")]
    InvalidName(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part<'a> {
    Text(&'a str),
    Field(&'a str),
}

/// A template split into literal text and field references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate<'a> {
    parts: Vec<Part<'a>>,
}

impl CompiledTemplate<'_> {
    /// Substitute every field; unknown fields render as empty strings.
    pub fn render(&self, fields: &ExifFieldMap) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Field(name) => out.push_str(fields.lookup(name).unwrap_or("")),
            }
        }
        out
    }

    /// Field names referenced by the template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            Part::Field(name) => Some(*name),
            Part::Text(_) => None,
        })
    }
}

/// Split `template` into text and `{{name}}` parts.
///
/// Names are trimmed; `{{{name}}}` is accepted as an unescaped reference.
pub fn compile(template: &str) -> Result<CompiledTemplate<'_>, TemplateError> {
    let mut parts = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            parts.push(Part::Text(&rest[..open]));
        }
        let triple = rest[open..].starts_with("{{{");
        let (opener, closer) = if triple { (3, "}}}") } else { (2, "}}") };
        let body_start = open + opener;
        let close = rest[body_start..]
            .find(closer)
            .ok_or(TemplateError::Unclosed(offset + open))?;
        let name = rest[body_start..body_start + close].trim();
        if !is_valid_name(name) {
            return Err(TemplateError::InvalidName(name.to_string()));
        }
        parts.push(Part::Field(name));

        let consumed = body_start + close + closer.len();
        offset += consumed;
        rest = &rest[consumed..];
    }
    if !rest.is_empty() {
        parts.push(Part::Text(rest));
    }
    Ok(CompiledTemplate { parts })
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '#' | '/' | '!' | '>'))
}

/// Render `template` against `fields`, falling back to the raw template.
pub fn render(template: &str, fields: &ExifFieldMap) -> String {
    match compile(template) {
        Ok(compiled) => compiled.render(fields),
        Err(e) => {
            log::debug!("Template {template:?} drawn verbatim: {e}");
            template.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sony() -> ExifFieldMap {
        ExifFieldMap {
            brand: "SONY".into(),
            model: "ILCE-7RM3A".into(),
            copyright: "houkunlin".into(),
            iso: "1000".into(),
            ..ExifFieldMap::default()
        }
    }

    #[test]
    fn substitutes_canonical_names() {
        assert_eq!(render("{{brand}} {{model}}", &sony()), "SONY ILCE-7RM3A");
    }

    #[test]
    fn substitutes_locale_aliases() {
        assert_eq!(render("©{{版权}}", &sony()), "©houkunlin");
        assert_eq!(render("{{相机品牌}} {{相机型号}}", &sony()), "SONY ILCE-7RM3A");
    }

    #[test]
    fn trims_whitespace_inside_braces() {
        assert_eq!(render("ISO{{ iso }}", &sony()), "ISO1000");
    }

    #[test]
    fn triple_braces_are_plain_references() {
        assert_eq!(render("{{{brand}}}", &sony()), "SONY");
    }

    #[test]
    fn unknown_and_empty_fields_render_empty() {
        assert_eq!(render("[{{nope}}][{{lens}}]", &sony()), "[][]");
    }

    #[test]
    fn unclosed_placeholder_falls_back_to_raw_text() {
        assert_eq!(render("{{unclosed", &sony()), "{{unclosed");
    }

    #[test]
    fn empty_placeholder_falls_back_to_raw_text() {
        assert_eq!(render("a {{}} b", &sony()), "a {{}} b");
    }

    #[test]
    fn nested_braces_fall_back_to_raw_text() {
        assert_eq!(render("{{a{{b}}", &sony()), "{{a{{b}}");
    }

    #[test]
    fn stray_closing_braces_are_text() {
        assert_eq!(render("}} {{brand}}", &sony()), "}} SONY");
    }

    #[test]
    fn compile_reports_offset_of_unclosed_placeholder() {
        assert_eq!(compile("ab {{x}} {{y").unwrap_err(), TemplateError::Unclosed(9));
    }

    #[test]
    fn compile_lists_fields() {
        let t = compile("{{光圈}} {{快门}} ISO{{iso}}").unwrap();
        assert_eq!(t.fields().collect::<Vec<_>>(), vec!["光圈", "快门", "iso"]);
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        assert_eq!(render("plain", &ExifFieldMap::EMPTY), "plain");
    }
}
