//! Hand-rolled scanner for the restricted YAML-like front-matter subset:
//! scalars, flat sequences, one-level maps, and (for `relationships` only)
//! a second level of map nesting. A full YAML parser is not pulled in for a
//! format this constrained — a purpose-built scanner suffices.

use indexmap::IndexMap;

use crate::entities::{FrontMatter, FrontMatterValue};
use crate::error::{LokoError, Result};

/// Splits `text` into the parsed front-matter map and the remaining body.
/// Missing front-matter (no leading `---` fence) is tolerated: returns an
/// empty map and the entire text as body.
pub fn parse(text: &str, path: &std::path::Path) -> Result<(FrontMatter, String)> {
    let mut lines = text.lines();
    let Some(first) = lines.next() else {
        return Ok((FrontMatter::new(), String::new()));
    };
    if first.trim_end() != "---" {
        return Ok((FrontMatter::new(), text.to_string()));
    }

    let mut fm_lines = Vec::new();
    let mut closed = false;
    let mut consumed = 1; // the opening fence
    for line in lines.clone() {
        consumed += 1;
        if line.trim_end() == "---" {
            closed = true;
            break;
        }
        fm_lines.push(line);
    }
    if !closed {
        return Err(LokoError::parse(
            path,
            Some(1),
            "unterminated front-matter block (missing closing `---`)",
        ));
    }

    let body: String = text
        .lines()
        .skip(consumed)
        .collect::<Vec<_>>()
        .join("\n");

    let tokens = tokenize(&fm_lines, path)?;
    let mut pos = 0;
    let map = parse_level(&tokens, &mut pos, 0);
    Ok((FrontMatter(map), body))
}

/// Serializes front-matter back into a fenced block, followed by `body`.
pub fn serialize(fm: &FrontMatter, body: &str) -> String {
    let mut out = String::from("---\n");
    for (key, value) in fm.iter() {
        write_value(&mut out, key, value, 0);
    }
    out.push_str("---\n");
    if !body.is_empty() {
        // body already carries its own leading newline semantics from the
        // original file; normalize to exactly one blank line after the
        // fence for files we write ourselves.
        if !body.starts_with('\n') {
            out.push('\n');
        }
        out.push_str(body);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

fn write_value(out: &mut String, key: &str, value: &FrontMatterValue, indent: usize) {
    let pad = " ".repeat(indent);
    match value {
        FrontMatterValue::Scalar(s) => {
            out.push_str(&format!("{pad}{key}: {}\n", quote_if_needed(s)));
        }
        FrontMatterValue::List(items) => {
            if items.is_empty() {
                out.push_str(&format!("{pad}{key}: []\n"));
                return;
            }
            out.push_str(&format!("{pad}{key}:\n"));
            for item in items {
                out.push_str(&format!("{pad}  - {}\n", quote_if_needed(item)));
            }
        }
        FrontMatterValue::Map(map) => {
            if map.is_empty() {
                out.push_str(&format!("{pad}{key}: {{}}\n"));
                return;
            }
            out.push_str(&format!("{pad}{key}:\n"));
            for (k, v) in map {
                out.push_str(&format!("{pad}  {k}: {}\n", quote_if_needed(v)));
            }
        }
        FrontMatterValue::NestedMap(groups) => {
            out.push_str(&format!("{pad}{key}:\n"));
            for (group, targets) in groups {
                out.push_str(&format!("{pad}  {group}:\n"));
                for (k, v) in targets {
                    out.push_str(&format!("{pad}    {k}: {}\n", quote_if_needed(v)));
                }
            }
        }
    }
}

fn quote_if_needed(s: &str) -> String {
    if s.is_empty()
        || s.contains(':')
        || s.starts_with(['"', '\'', '-', '[', '{'])
        || s.trim() != s
    {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone)]
struct Token {
    indent: usize,
    key: String,
    value: Option<String>,
}

fn tokenize(lines: &[&str], path: &std::path::Path) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    for (i, raw) in lines.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        if raw.contains('\t') {
            return Err(LokoError::parse(
                path,
                Some(i + 2),
                "tabs are not allowed in front-matter indentation",
            ));
        }
        let indent = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim_start();
        if let Some(rest) = trimmed.strip_prefix("- ") {
            tokens.push(Token {
                indent,
                key: "-".to_string(),
                value: Some(unquote(rest.trim())),
            });
            continue;
        }
        if trimmed == "-" {
            tokens.push(Token {
                indent,
                key: "-".to_string(),
                value: Some(String::new()),
            });
            continue;
        }
        let Some(colon) = find_unquoted_colon(trimmed) else {
            return Err(LokoError::parse(
                path,
                Some(i + 2),
                format!("expected `key: value` in front-matter, got: {trimmed}"),
            ));
        };
        let key = trimmed[..colon].trim().to_string();
        let rest = trimmed[colon + 1..].trim();
        let value = if rest.is_empty() {
            None
        } else {
            Some(unquote(rest))
        };
        tokens.push(Token { indent, key, value });
    }
    Ok(tokens)
}

fn find_unquoted_colon(s: &str) -> Option<usize> {
    let mut in_quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => in_quote = Some(c),
            None if c == ':' => return Some(i),
            None => {}
        }
    }
    None
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if (bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'')
        {
            return s[1..s.len() - 1].replace("\\\"", "\"");
        }
    }
    if s == "[]" || s == "{}" {
        return String::new();
    }
    s.to_string()
}

fn parse_level(tokens: &[Token], pos: &mut usize, indent: usize) -> IndexMap<String, FrontMatterValue> {
    let mut map = IndexMap::new();
    while *pos < tokens.len() && tokens[*pos].indent == indent && tokens[*pos].key != "-" {
        let tok = &tokens[*pos];
        let key = tok.key.clone();
        if let Some(v) = &tok.value {
            map.insert(key, FrontMatterValue::Scalar(v.clone()));
            *pos += 1;
            continue;
        }
        *pos += 1;
        // Gather children strictly deeper than `indent`.
        let child_indent = tokens.get(*pos).map(|t| t.indent);
        match child_indent {
            Some(ci) if ci > indent => {
                if tokens[*pos].key == "-" {
                    let mut items = Vec::new();
                    while *pos < tokens.len() && tokens[*pos].indent == ci && tokens[*pos].key == "-" {
                        items.push(tokens[*pos].value.clone().unwrap_or_default());
                        *pos += 1;
                    }
                    map.insert(key, FrontMatterValue::List(items));
                } else {
                    // Look ahead one token: does it have its own children
                    // (=> nested map) or an inline scalar (=> flat map)?
                    let has_grandchildren = tokens[*pos].value.is_none()
                        && tokens
                            .get(*pos + 1)
                            .map(|t| t.indent > ci)
                            .unwrap_or(false);
                    if has_grandchildren {
                        let mut groups: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
                        while *pos < tokens.len() && tokens[*pos].indent == ci {
                            let group_key = tokens[*pos].key.clone();
                            *pos += 1;
                            let mut inner = IndexMap::new();
                            while *pos < tokens.len() && tokens[*pos].indent > ci {
                                let ik = tokens[*pos].key.clone();
                                let iv = tokens[*pos].value.clone().unwrap_or_default();
                                inner.insert(ik, iv);
                                *pos += 1;
                            }
                            groups.insert(group_key, inner);
                        }
                        map.insert(key, FrontMatterValue::NestedMap(groups));
                    } else {
                        let mut flat = IndexMap::new();
                        while *pos < tokens.len() && tokens[*pos].indent == ci {
                            let ik = tokens[*pos].key.clone();
                            let iv = tokens[*pos].value.clone().unwrap_or_default();
                            flat.insert(ik, iv);
                            *pos += 1;
                        }
                        map.insert(key, FrontMatterValue::Map(flat));
                    }
                }
            }
            _ => {
                map.insert(key, FrontMatterValue::Scalar(String::new()));
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn p(text: &str) -> (FrontMatter, String) {
        parse(text, Path::new("test.md")).unwrap()
    }

    #[test]
    fn missing_front_matter_is_tolerated() {
        let (fm, body) = p("just a body\nwith no fence");
        assert!(fm.is_empty());
        assert_eq!(body, "just a body\nwith no fence");
    }

    #[test]
    fn scalar_and_quoted_values() {
        let (fm, body) = p("---\nname: Payments\ndescription: \"Handles money: carefully\"\n---\nBody here.\n");
        assert_eq!(fm.get("name").unwrap().as_scalar(), Some("Payments"));
        assert_eq!(
            fm.get("description").unwrap().as_scalar(),
            Some("Handles money: carefully")
        );
        assert_eq!(body.trim(), "Body here.");
    }

    #[test]
    fn list_value() {
        let (fm, _) = p("---\ntags:\n  - payments\n  - core\n---\n");
        assert_eq!(
            fm.get("tags").unwrap().as_list(),
            Some(&["payments".to_string(), "core".to_string()][..])
        );
    }

    #[test]
    fn flat_map_value() {
        let (fm, _) = p("---\nrelationships:\n  b: reads\n  c: writes\n---\n");
        let map = fm.get("relationships").unwrap().as_map().unwrap();
        assert_eq!(map.get("b").unwrap(), "reads");
        assert_eq!(map.get("c").unwrap(), "writes");
    }

    #[test]
    fn nested_map_value() {
        let (fm, _) = p("---\nrelationships:\n  uses:\n    b: reads\n  triggered_by:\n    c: starts\n---\n");
        let FrontMatterValue::NestedMap(groups) = fm.get("relationships").unwrap() else {
            panic!("expected nested map");
        };
        assert_eq!(groups["uses"]["b"], "reads");
        assert_eq!(groups["triggered_by"]["c"], "starts");
    }

    #[test]
    fn unterminated_fence_is_parse_error() {
        let err = parse("---\nname: x\n", Path::new("test.md")).unwrap_err();
        assert!(matches!(err, LokoError::ParseError { .. }));
    }

    #[test]
    fn roundtrip_preserves_unknown_keys() {
        let (mut fm, body) = p("---\nname: Payments\nmystery: kept\n---\nBody.\n");
        let name = fm.take("name").unwrap();
        fm.insert("name", name);
        let out = serialize(&fm, &body);
        let (fm2, _) = p(&out);
        assert_eq!(fm2.get("mystery").unwrap().as_scalar(), Some("kept"));
    }
}
