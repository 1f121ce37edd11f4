//! Hand-rolled parser for the diagram source dialect described in the
//! glossary: one node or one arrow per statement, nesting by braces, edges
//! written `A -> B: "label"`.
//!
//! The parser only extracts what the graph builder and drift detector need:
//! edges and `tooltip:` attributes attached to a brace-nested node.
//! Everything else (shapes, styles, colors) is skipped rather than modeled.

use serde::Serialize;

use crate::error::{LokoError, Result};

/// One extracted edge. Carries no `type` — the diagram dialect doesn't
/// encode one; the graph builder assigns `EdgeType::Uses` to every edge it
/// adds from a diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedEdge {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Result of parsing one diagram source: its edges plus any `tooltip:`
/// attributes found, keyed by the dotted node path they were declared
/// under.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedDiagram {
    pub edges: Vec<ParsedEdge>,
    pub tooltips: Vec<(String, String)>,
}

/// Parses `source`. Empty or comment-only input yields an empty result, not
/// an error. Unbalanced braces or an unterminated quote is a
/// parse error.
pub fn parse(source: &str) -> Result<ParsedDiagram> {
    let mut result = ParsedDiagram::default();
    let mut stack: Vec<String> = Vec::new();

    for (lineno, raw) in source.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if line == "}" {
            if stack.pop().is_none() {
                return Err(parse_err(lineno, "unmatched `}`"));
            }
            continue;
        }

        if let Some(header) = line.strip_suffix('{') {
            let header = header.trim().trim_end_matches(':').trim();
            let name = header_identifier(header);
            if name.is_empty() {
                return Err(parse_err(lineno, "node block is missing an identifier"));
            }
            stack.push(name);
            continue;
        }

        if let Some(rest) = line.strip_prefix("tooltip:") {
            if let Some(current) = stack.last() {
                let path = qualify(&stack[..stack.len() - 1], current);
                result.tooltips.push((path, unquote(rest.trim())));
            }
            continue;
        }

        if is_edge_statement(line) {
            parse_edge_statement(line, &stack, &mut result.edges)
                .map_err(|msg| parse_err(lineno, msg))?;
            continue;
        }

        // Unrecognized attribute line (label:, shape:, style blocks, ...):
        // tolerated, not modeled.
    }

    if !stack.is_empty() {
        return Err(parse_err(source.lines().count(), "unterminated `{` block"));
    }

    Ok(result)
}

fn parse_err(lineno: usize, message: impl Into<String>) -> LokoError {
    LokoError::parse(
        std::path::PathBuf::from("<diagram source>"),
        Some(lineno + 1),
        message.into(),
    )
}

/// Strips a `#` comment that starts outside of a quoted string.
fn strip_comment(line: &str) -> &str {
    let mut in_quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => in_quote = Some(c),
            None if c == '#' => return &line[..i],
            None => {}
        }
    }
    line
}

/// Extracts the leading identifier from a node-block header, which may be
/// `name` or `name: "Display Label"`.
fn header_identifier(header: &str) -> String {
    let ident = match header.split_once(':') {
        Some((id, _)) => id,
        None => header,
    };
    ident.trim().to_string()
}

fn is_edge_statement(line: &str) -> bool {
    line.contains("->") || line.contains("<-")
}

/// Arrow chains (`a -> b -> c`) yield one edge per adjacent pair;
/// bidirectional arrows (`a <-> b`) yield two edges. Missing label is empty
/// string.
fn parse_edge_statement(line: &str, stack: &[String], out: &mut Vec<ParsedEdge>) -> std::result::Result<(), &'static str> {
    let (chain_part, label) = match split_unquoted_colon(line) {
        Some((chain, rest)) => (chain, unquote(rest.trim())),
        None => (line, String::new()),
    };

    let segments = split_chain(chain_part.trim())?;
    if segments.len() < 2 {
        return Err("edge statement needs at least two endpoints");
    }

    for pair in segments.windows(2) {
        let (left, op) = &pair[0];
        let (right, _) = &pair[1];
        let from = qualify(stack, left.trim());
        let to = qualify(stack, right.trim());
        match op.as_str() {
            "->" => out.push(ParsedEdge {
                source: from,
                target: to,
                label: label.clone(),
            }),
            "<-" => out.push(ParsedEdge {
                source: to,
                target: from,
                label: label.clone(),
            }),
            "<->" => {
                out.push(ParsedEdge {
                    source: from.clone(),
                    target: to.clone(),
                    label: label.clone(),
                });
                out.push(ParsedEdge {
                    source: to,
                    target: from,
                    label: label.clone(),
                });
            }
            _ => return Err("unknown arrow operator"),
        }
    }
    Ok(())
}

/// Splits `a -> b <-> c` into `[(a, "->"), (b, "<->"), (c, "")]` — each
/// entry pairs an endpoint with the operator that follows it.
///
/// Scans left to right rather than picking the earliest `find()` hit among
/// the three operator strings: `"<->"` and `"<-"` start at the same byte
/// offset, so a naive "earliest match wins" comparison can't tell them apart
/// and risks splitting a bidirectional arrow into `<-` followed by a stray
/// `>`. Checking the longest operator first at each position resolves that
/// unambiguously.
fn split_chain(s: &str) -> std::result::Result<Vec<(String, String)>, &'static str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < s.len() {
        let rest = &s[i..];
        let op = if rest.starts_with("<->") {
            Some("<->")
        } else if rest.starts_with("->") {
            Some("->")
        } else if rest.starts_with("<-") {
            Some("<-")
        } else {
            None
        };
        match op {
            Some(op) => {
                let endpoint = s[start..i].trim().to_string();
                if endpoint.is_empty() {
                    return Err("empty edge endpoint");
                }
                out.push((endpoint, op.to_string()));
                i += op.len();
                start = i;
            }
            None => {
                i += rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            }
        }
    }
    let endpoint = s[start..].trim().to_string();
    if endpoint.is_empty() {
        return Err("empty edge endpoint");
    }
    out.push((endpoint, String::new()));
    Ok(out)
}

fn split_unquoted_colon(s: &str) -> Option<(&str, &str)> {
    let mut in_quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => in_quote = Some(c),
            None if c == ':' => return Some((&s[..i], &s[i + 1..])),
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
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

/// Reconstructs a qualified ID for an edge endpoint by walking its current
/// ancestry and joining with `.`, dropping an unnamed root.
fn qualify(stack: &[String], token: &str) -> String {
    let mut parts: Vec<String> = stack.iter().filter(|s| !s.is_empty()).cloned().collect();
    parts.extend(token.split('.').map(|s| s.trim().to_string()));
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_comment_only_are_not_errors() {
        assert_eq!(parse("").unwrap(), ParsedDiagram::default());
        assert_eq!(parse("# just a comment\n\n").unwrap(), ParsedDiagram::default());
    }

    #[test]
    fn simple_edge_with_label() {
        let parsed = parse(r#"a -> b: "calls""#).unwrap();
        assert_eq!(
            parsed.edges,
            vec![ParsedEdge {
                source: "a".into(),
                target: "b".into(),
                label: "calls".into(),
            }]
        );
    }

    #[test]
    fn missing_label_is_empty_string() {
        let parsed = parse("a -> b").unwrap();
        assert_eq!(parsed.edges[0].label, "");
    }

    #[test]
    fn bidirectional_arrow_yields_two_edges() {
        let parsed = parse(r#"a <-> b: "sync""#).unwrap();
        assert_eq!(parsed.edges.len(), 2);
        assert_eq!(parsed.edges[0].source, "a");
        assert_eq!(parsed.edges[0].target, "b");
        assert_eq!(parsed.edges[1].source, "b");
        assert_eq!(parsed.edges[1].target, "a");
    }

    #[test]
    fn bidirectional_arrow_inside_a_chain_is_not_split_into_lt_and_gt() {
        let parsed = parse("a -> b <-> c").unwrap();
        assert_eq!(parsed.edges.len(), 3);
        assert_eq!(parsed.edges[0].source, "a");
        assert_eq!(parsed.edges[0].target, "b");
        assert_eq!(parsed.edges[1].source, "b");
        assert_eq!(parsed.edges[1].target, "c");
        assert_eq!(parsed.edges[2].source, "c");
        assert_eq!(parsed.edges[2].target, "b");
    }

    #[test]
    fn chain_yields_one_edge_per_segment() {
        let parsed = parse("a -> b -> c").unwrap();
        assert_eq!(parsed.edges.len(), 2);
        assert_eq!(parsed.edges[0].source, "a");
        assert_eq!(parsed.edges[0].target, "b");
        assert_eq!(parsed.edges[1].source, "b");
        assert_eq!(parsed.edges[1].target, "c");
    }

    #[test]
    fn nested_braces_qualify_ids_by_ancestry() {
        let src = "api {\n  charge {\n    a -> b: \"reads\"\n  }\n}\n";
        let parsed = parse(src).unwrap();
        assert_eq!(parsed.edges[0].source, "api.charge.a");
        assert_eq!(parsed.edges[0].target, "api.charge.b");
    }

    #[test]
    fn tooltip_is_captured_for_enclosing_node() {
        let src = "queue {\n  tooltip: \"Standard SQS queue\"\n}\n";
        let parsed = parse(src).unwrap();
        assert_eq!(parsed.tooltips, vec![("queue".to_string(), "Standard SQS queue".to_string())]);
    }

    #[test]
    fn unmatched_closing_brace_is_parse_error() {
        assert!(parse("}\n").is_err());
    }

    #[test]
    fn unterminated_block_is_parse_error() {
        assert!(parse("a {\n  b -> c\n").is_err());
    }
}
