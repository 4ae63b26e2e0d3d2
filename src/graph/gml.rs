//! GML graph artifact
//!
//! Writes and reads the interchange form of an [`InteractionGraph`] in the
//! usual GML interchange layout: one `node` block per character (`id`, `label`)
//! and one `edge` block per relationship (`source`, `target`, `weight`,
//! `details`). GML has no nested edge attributes, so `details` is the JSON
//! encoding of the interaction detail list stored as a single string.

use super::edge::{EdgeKey, InteractionDetail, WeightedEdge};
use super::interaction::{GraphError, GraphResult, InteractionGraph};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Largest weight an edge without `details` may claim; each unit becomes a default detail.
pub const MAX_PADDED_WEIGHT: u32 = 1 << 16;

/// Serialize a graph to GML text.
pub fn write(graph: &InteractionGraph) -> GraphResult<String> {
    let ids: HashMap<&str, usize> = graph.nodes().enumerate().map(|(i, n)| (n, i)).collect();
    let mut out = String::from("graph [\n");

    for (id, name) in graph.nodes().enumerate() {
        out.push_str(&format!("  node [\n    id {}\n    label \"{}\"\n  ]\n", id, escape(name)));
    }

    for edge in graph.edges() {
        let details = serde_json::to_string(edge.details())?;
        out.push_str(&format!(
            "  edge [\n    source {}\n    target {}\n    weight {}\n    details \"{}\"\n  ]\n",
            ids[edge.key().first()],
            ids[edge.key().second()],
            edge.weight(),
            escape(&details),
        ));
    }

    out.push_str("]\n");
    Ok(out)
}

/// Parse GML text produced by [`write`] (or any GML writer using the same layout) back into a graph.
pub fn read(text: &str) -> GraphResult<InteractionGraph> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let top = parser.parse_list(false)?;

    let graph = top
        .into_iter()
        .find_map(|(key, value)| match (key.as_str(), value) {
            ("graph", Value::List(items)) => Some(items),
            _ => None,
        })
        .ok_or_else(|| gml_error(0, "missing top-level 'graph' block"))?;

    let mut labels: HashMap<i64, String> = HashMap::new();
    let mut seen_labels: HashSet<String> = HashSet::new();
    let mut raw_edges: Vec<(usize, Vec<(String, Value)>)> = Vec::new();

    for (key, value) in graph {
        match (key.as_str(), value) {
            ("directed", Value::Int(1)) => {
                return Err(gml_error(0, "directed graphs are not supported"));
            }
            ("multigraph", Value::Int(1)) => {
                return Err(gml_error(0, "multigraphs are not supported"));
            }
            ("node", Value::List(attrs)) => {
                let id = int_attr(&attrs, "id").ok_or_else(|| gml_error(0, "node without 'id'"))?;
                let label = str_attr(&attrs, "label")
                    .ok_or_else(|| gml_error(0, format!("node {} without 'label'", id)))?;
                if labels.contains_key(&id) {
                    return Err(gml_error(0, format!("node id {} is duplicated", id)));
                }
                if !seen_labels.insert(label.clone()) {
                    return Err(gml_error(0, format!("node label '{}' is duplicated", label)));
                }
                labels.insert(id, label);
            }
            ("edge", Value::List(attrs)) => raw_edges.push((raw_edges.len(), attrs)),
            _ => {}
        }
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for (position, attrs) in raw_edges {
        let endpoint = |name: &str| -> GraphResult<String> {
            let id = int_attr(&attrs, name)
                .ok_or_else(|| gml_error(0, format!("edge {} without '{}'", position, name)))?;
            labels
                .get(&id)
                .cloned()
                .ok_or_else(|| gml_error(0, format!("edge {} references unknown node {}", position, id)))
        };
        let a = endpoint("source")?;
        let b = endpoint("target")?;

        let Some(key) = EdgeKey::new(a.clone(), b.clone()) else {
            debug!(node = %a, "dropping self-loop from graph artifact");
            continue;
        };

        let weight = match attrs.iter().find(|(k, _)| k == "weight").map(|(_, v)| v) {
            Some(value) => Some(
                edge_weight(value)
                    .ok_or_else(|| gml_error(0, format!("edge {} -- {} has an invalid weight", a, b)))?,
            ),
            None => None,
        };

        let details: Vec<InteractionDetail> = match str_attr(&attrs, "details") {
            Some(json) => {
                let details: Vec<InteractionDetail> = serde_json::from_str(&json)?;
                if let Some(weight) = weight {
                    if details.len() != weight as usize {
                        return Err(GraphError::WeightMismatch {
                            a,
                            b,
                            weight,
                            details: details.len(),
                        });
                    }
                }
                details
            }
            None => {
                let weight = weight.unwrap_or(1);
                if weight > MAX_PADDED_WEIGHT {
                    return Err(gml_error(
                        0,
                        format!(
                            "edge {} -- {} claims weight {} without details (limit {})",
                            a, b, weight, MAX_PADDED_WEIGHT
                        ),
                    ));
                }
                vec![InteractionDetail::default(); weight as usize]
            }
        };

        if let Some(edge) = WeightedEdge::from_details(key, details) {
            edges.push(edge);
        }
    }

    InteractionGraph::from_weighted_edges(edges)
}

fn gml_error(line: usize, message: impl Into<String>) -> GraphError {
    GraphError::Gml {
        line,
        message: message.into(),
    }
}

/// A positive integral weight that fits in `u32`.
fn edge_weight(value: &Value) -> Option<u32> {
    match value {
        Value::Int(w) => u32::try_from(*w).ok().filter(|w| *w > 0),
        Value::Float(w) if w.fract() == 0.0 && (1.0..=f64::from(u32::MAX)).contains(w) => Some(*w as u32),
        _ => None,
    }
}

fn int_attr(attrs: &[(String, Value)], name: &str) -> Option<i64> {
    attrs.iter().find(|(k, _)| k == name).and_then(|(_, v)| match v {
        Value::Int(i) => Some(*i),
        _ => None,
    })
}

fn str_attr(attrs: &[(String, Value)], name: &str) -> Option<String> {
    attrs.iter().find(|(k, _)| k == name).and_then(|(_, v)| match v {
        Value::Str(s) => Some(s.clone()),
        _ => None,
    })
}

/// Replace `"`, `&` and anything outside printable ASCII with numeric
/// character references.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '"' || ch == '&' || !(' '..='~').contains(&ch) {
            out.push_str(&format!("&#{};", ch as u32));
        } else {
            out.push(ch);
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            let ch = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "apos" => Some('\''),
                    _ => None,
                }
            };
            ch.map(|c| (c, end + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Tokenizer and parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Float(f64),
    Str(String),
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<(String, Value)>),
}

fn tokenize(text: &str) -> GraphResult<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut line = 1;

    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&(_, c)) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '[' => {
                tokens.push((Token::Open, line));
                chars.next();
            }
            ']' => {
                tokens.push((Token::Close, line));
                chars.next();
            }
            '"' => {
                chars.next();
                let open_line = line;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, c)) => {
                            if c == '\n' {
                                line += 1;
                            }
                            value.push(c);
                        }
                        None => return Err(gml_error(open_line, "unterminated string")),
                    }
                }
                tokens.push((Token::Str(unescape(&value)), open_line));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                tokens.push((Token::Key(text[start..end].to_string()), line));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')) {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let literal = &text[start..end];
                let token = if let Ok(i) = literal.parse::<i64>() {
                    Token::Int(i)
                } else if let Ok(f) = literal.parse::<f64>() {
                    Token::Float(f)
                } else {
                    return Err(gml_error(line, format!("invalid number '{}'", literal)));
                };
                tokens.push((token, line));
            }
            other => return Err(gml_error(line, format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn last_line(&self) -> usize {
        self.tokens.last().map(|(_, l)| *l).unwrap_or(0)
    }

    /// Parse `key value` pairs until `]` (nested) or end of input (top level).
    fn parse_list(&mut self, nested: bool) -> GraphResult<Vec<(String, Value)>> {
        let mut items = Vec::new();

        loop {
            let Some((token, line)) = self.tokens.get(self.pos).cloned() else {
                if nested {
                    return Err(gml_error(self.last_line(), "unclosed '['"));
                }
                return Ok(items);
            };
            self.pos += 1;

            let key = match token {
                Token::Close if nested => return Ok(items),
                Token::Key(key) => key,
                other => return Err(gml_error(line, format!("expected a key, found {:?}", other))),
            };

            let Some((token, line)) = self.tokens.get(self.pos).cloned() else {
                return Err(gml_error(line, format!("key '{}' has no value", key)));
            };
            self.pos += 1;

            let value = match token {
                Token::Int(i) => Value::Int(i),
                Token::Float(f) => Value::Float(f),
                Token::Str(s) => Value::Str(s),
                Token::Open => Value::List(self.parse_list(true)?),
                other => {
                    return Err(gml_error(line, format!("invalid value for '{}': {:?}", key, other)));
                }
            };
            items.push((key, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> InteractionGraph {
        let dialogue = InteractionDetail::from_optional(
            Some("Direct Dialogue"),
            Some("Positive"),
            Some("Tipton Grange"),
            Some("\"Dear Celia,\" said Dorothea"),
        );
        let key = EdgeKey::new("Dorothea Brooke", "Celia Brooke").unwrap();
        let mut edge = WeightedEdge::new(key, dialogue);
        edge.record(InteractionDetail::default());

        let other = WeightedEdge::new(
            EdgeKey::new("Dorothea Brooke", "Edward Casaubon").unwrap(),
            InteractionDetail::default(),
        );
        InteractionGraph::from_weighted_edges(vec![edge, other]).unwrap()
    }

    #[test]
    fn written_artifact_reads_back_with_details() {
        let graph = sample_graph();
        let text = write(&graph).unwrap();
        let restored = read(&text).unwrap();

        assert_eq!(restored.nodes().collect::<Vec<_>>(), graph.nodes().collect::<Vec<_>>());
        assert_eq!(restored.edges(), graph.edges());
        assert_eq!(restored.weight("Celia Brooke", "Dorothea Brooke"), Some(2));
    }

    #[test]
    fn details_blob_is_escaped_as_single_string() {
        let text = write(&sample_graph()).unwrap();
        assert!(text.contains("details \"[{&#34;type&#34;:&#34;Direct Dialogue&#34;"));
        assert!(text.contains("label \"Celia Brooke\""));
        assert!(text.contains("weight 2"));
    }

    #[test]
    fn non_ascii_names_survive_escaping() {
        let graph = InteractionGraph::from_pairs(vec![("Mme. Poinçon", "Léon")]).unwrap();
        let text = write(&graph).unwrap();
        assert!(text.is_ascii());
        let restored = read(&text).unwrap();
        assert_eq!(restored.weight("Léon", "Mme. Poinçon"), Some(1));
    }

    #[test]
    fn missing_details_pad_to_weight() {
        let text = r#"
            graph [
              node [ id 0 label "A" ]
              node [ id 1 label "B" ]
              edge [ source 0 target 1 weight 3 ]
            ]
        "#;
        let graph = read(text).unwrap();
        let edge = graph.edge("A", "B").unwrap();
        assert_eq!(edge.weight(), 3);
        assert!(edge.details().iter().all(|d| *d == InteractionDetail::default()));
    }

    #[test]
    fn mismatched_details_are_rejected() {
        let text = r#"graph [
              node [ id 0 label "A" ]
              node [ id 1 label "B" ]
              edge [ source 0 target 1 weight 2 details "[]" ]
            ]"#;
        assert!(matches!(read(text), Err(GraphError::WeightMismatch { weight: 2, details: 0, .. })));
    }

    #[test]
    fn weight_beyond_u32_is_rejected() {
        let text = r#"graph [
              node [ id 0 label "A" ]
              node [ id 1 label "B" ]
              edge [ source 0 target 1 weight 4294967297 details "[{&#34;type&#34;:&#34;Letter&#34;}]" ]
            ]"#;
        assert!(matches!(read(text), Err(GraphError::Gml { .. })));

        let float = text.replace("4294967297", "4294967297.0");
        assert!(matches!(read(&float), Err(GraphError::Gml { .. })));
    }

    #[test]
    fn padding_refuses_implausible_weights() {
        let text = format!(
            "graph [ node [ id 0 label \"A\" ] node [ id 1 label \"B\" ] edge [ source 0 target 1 weight {} ] ]",
            MAX_PADDED_WEIGHT + 1
        );
        assert!(matches!(read(&text), Err(GraphError::Gml { .. })));

        let huge = "graph [ node [ id 0 label \"A\" ] node [ id 1 label \"B\" ] edge [ source 0 target 1 weight 4000000000 ] ]";
        assert!(matches!(read(huge), Err(GraphError::Gml { .. })));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let text = r#"graph [
              node [ id 0 label "A" ]
              node [ id 1 label "A" ]
              node [ id 2 label "B" ]
              edge [ source 0 target 2 ]
              edge [ source 1 target 2 ]
            ]"#;
        match read(text) {
            Err(GraphError::Gml { message, .. }) => assert!(message.contains("duplicated")),
            other => panic!("expected a duplicate label error, got {other:?}"),
        }
    }

    #[test]
    fn edgeless_artifact_is_empty_graph() {
        let text = "graph [\n  node [ id 0 label \"A\" ]\n]\n";
        assert!(matches!(read(text), Err(GraphError::Empty)));
    }

    #[test]
    fn unclosed_block_reports_error() {
        let text = "graph [\n  node [ id 0 label \"A\"\n";
        assert!(matches!(read(text), Err(GraphError::Gml { .. })));
    }

    #[test]
    fn directed_graphs_are_rejected() {
        let text = "graph [ directed 1 ]";
        assert!(matches!(read(text), Err(GraphError::Gml { .. })));
    }

    #[test]
    fn unescape_handles_named_and_numeric_references() {
        assert_eq!(unescape("a &amp; b &#34;c&#34; &#x41;"), "a & b \"c\" A");
        assert_eq!(unescape("dangling & ampersand"), "dangling & ampersand");
    }
}
