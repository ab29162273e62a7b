//! Text-level splicing of the entry-set section into JSON documents.
//!
//! The section value is located with a small byte scanner and replaced in
//! place, so every byte outside it (key order, spacing, trailing newline)
//! stays exactly as it was. The replacement is rendered in the file's own
//! indentation unit, or compactly when the file is a single line.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

const DEFAULT_INDENT: &str = "  ";

#[derive(Debug)]
struct Member {
    key: String,
    key_start: usize,
    value_start: usize,
    value_end: usize,
}

/// Indentation unit of a file, or `None` for compact single-line JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Style {
    unit: Option<String>,
}

impl Style {
    fn detect(text: &str) -> Self {
        if !text.trim().contains('\n') {
            return Self { unit: None };
        }
        let unit = text
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| &line[..line.len() - line.trim_start().len()])
            .find(|indent| !indent.is_empty())
            .unwrap_or(DEFAULT_INDENT);
        Self {
            unit: Some(unit.to_string()),
        }
    }

    fn pretty() -> Self {
        Self {
            unit: Some(DEFAULT_INDENT.to_string()),
        }
    }

    /// Render `value` so that continuation lines start with `base`.
    fn render(&self, value: &Value, base: &str) -> Option<String> {
        let Some(unit) = &self.unit else {
            return serde_json::to_string(value).ok();
        };
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(unit.as_bytes()));
        value.serialize(&mut ser).ok()?;
        let text = String::from_utf8(buf).ok()?;
        Some(text.replace('\n', &format!("\n{base}")))
    }

    fn member(&self, key: &str, rendered: &str) -> Option<String> {
        let key = serde_json::to_string(key).ok()?;
        Some(match self.unit {
            Some(_) => format!("{key}: {rendered}"),
            None => format!("{key}:{rendered}"),
        })
    }
}

/// Replace (or add) the value at `section` inside `text`.
///
/// Returns `None` when the text cannot be spliced safely, for example when an
/// intermediate key holds a non-object; callers then re-render the document.
pub fn splice(text: &str, section: &[String], value: &Value) -> Option<String> {
    let style = Style::detect(text);
    let bytes = text.as_bytes();
    let mut open = skip_ws(bytes, 0);
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    for (depth, segment) in section.iter().enumerate() {
        let (members, close) = object_members(text, open)?;
        let rest = &section[depth + 1..];
        // Duplicate keys resolve to the last occurrence, as the parser does.
        match members.iter().rev().find(|m| &m.key == segment) {
            Some(member) if rest.is_empty() => {
                let indent = line_indent(text, member.key_start);
                let rendered = style.render(value, indent)?;
                return Some(format!(
                    "{}{}{}",
                    &text[..member.value_start],
                    rendered,
                    &text[member.value_end..]
                ));
            }
            Some(member) if bytes[member.value_start] == b'{' => open = member.value_start,
            Some(_) => return None,
            None => {
                let nested = wrap(rest, value.clone());
                return insert_member(text, &style, open, close, members.last(), segment, &nested);
            }
        }
    }
    None
}

/// Render a new document holding only the section.
pub fn fresh(section: &[String], value: &Value) -> Option<String> {
    let document = wrap(section, value.clone());
    Style::pretty().render(&document, "").map(|text| text + "\n")
}

/// Set the section on a parsed tree and pretty-print the whole document.
pub fn rerender(mut root: Value, section: &[String], value: &Value) -> Option<String> {
    let mut node = &mut root;
    for segment in section {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let object = node.as_object_mut()?;
        node = object.entry(segment.clone()).or_insert(Value::Null);
    }
    *node = value.clone();
    serde_json::to_string_pretty(&root).ok().map(|text| text + "\n")
}

/// Navigate to the section object.
///
/// `Ok(None)` when any key on the path is absent or the section is `null`;
/// `Err` carries the JSON kind found where an object was required.
pub fn section<'a>(
    root: &'a Value,
    section: &[String],
) -> Result<Option<&'a Map<String, Value>>, &'static str> {
    let mut node = root;
    for segment in section {
        let Value::Object(object) = node else {
            return Err(kind_of(node));
        };
        match object.get(segment) {
            Some(next) => node = next,
            None => return Ok(None),
        }
    }
    match node {
        Value::Object(object) => Ok(Some(object)),
        Value::Null => Ok(None),
        other => Err(kind_of(other)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrap(path: &[String], value: Value) -> Value {
    path.iter().rev().fold(value, |inner, key| {
        let mut object = Map::new();
        object.insert(key.clone(), inner);
        Value::Object(object)
    })
}

fn insert_member(
    text: &str,
    style: &Style,
    open: usize,
    close: usize,
    last: Option<&Member>,
    key: &str,
    value: &Value,
) -> Option<String> {
    match (last, &style.unit) {
        (Some(last), unit) => {
            let indent = line_indent(text, last.key_start);
            let member = style.member(key, &style.render(value, indent)?)?;
            let inserted = match unit {
                Some(_) => format!(",\n{indent}{member}"),
                None => format!(",{member}"),
            };
            Some(format!(
                "{}{}{}",
                &text[..last.value_end],
                inserted,
                &text[last.value_end..]
            ))
        }
        (None, Some(unit)) => {
            let outer = line_indent(text, open);
            let inner = format!("{outer}{unit}");
            let member = style.member(key, &style.render(value, &inner)?)?;
            Some(format!(
                "{}{{\n{inner}{member}\n{outer}}}{}",
                &text[..open],
                &text[close + 1..]
            ))
        }
        (None, None) => {
            let member = style.member(key, &style.render(value, "")?)?;
            Some(format!(
                "{}{{{member}}}{}",
                &text[..open],
                &text[close + 1..]
            ))
        }
    }
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(text: &str, pos: usize) -> &str {
    let start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line = &text[start..pos];
    &line[..line.len() - line.trim_start().len()]
}

// ---------------------------------------------------------------------------
// Scanner. Input has already been validated by serde_json.
// ---------------------------------------------------------------------------

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn skip_value(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes.get(start)? {
        b'"' => skip_string(bytes, start),
        b'{' | b'[' => {
            let mut depth = 0usize;
            let mut i = start;
            while i < bytes.len() {
                match bytes[i] {
                    b'"' => {
                        i = skip_string(bytes, i)?;
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(i + 1);
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            None
        }
        _ => {
            let mut i = start;
            while i < bytes.len()
                && !matches!(bytes[i], b',' | b'}' | b']')
                && !bytes[i].is_ascii_whitespace()
            {
                i += 1;
            }
            Some(i)
        }
    }
}

/// Members of the object opening at `open`, plus the index of its `}`.
fn object_members(text: &str, open: usize) -> Option<(Vec<Member>, usize)> {
    let bytes = text.as_bytes();
    let mut members = Vec::new();
    let mut i = skip_ws(bytes, open + 1);
    if bytes.get(i) == Some(&b'}') {
        return Some((members, i));
    }
    loop {
        if bytes.get(i) != Some(&b'"') {
            return None;
        }
        let key_end = skip_string(bytes, i)?;
        let key: String = serde_json::from_str(&text[i..key_end]).ok()?;
        let colon = skip_ws(bytes, key_end);
        if bytes.get(colon) != Some(&b':') {
            return None;
        }
        let value_start = skip_ws(bytes, colon + 1);
        let value_end = skip_value(bytes, value_start)?;
        members.push(Member {
            key,
            key_start: i,
            value_start,
            value_end,
        });
        let next = skip_ws(bytes, value_end);
        match bytes.get(next)? {
            b',' => i = skip_ws(bytes, next + 1),
            b'}' => return Some((members, next)),
            _ => return None,
        }
    }
}
