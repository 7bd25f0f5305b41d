//! A small conditional text-substitution language.
//!
//! Tags use `<% %>` so they never collide with the `${{ }}` expressions
//! GitHub Actions workflows are full of:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `<%= name %>` | insert the value of `name` |
//! | `<% if name %>` / `<% if !name %>` | open a block on the truthiness of `name` |
//! | `<% else %>` | switch to the alternative branch |
//! | `<% end %>` | close the innermost block |
//!
//! A control tag (`if`, `else`, `end`) that is alone on its line consumes the
//! whole line, so block markers leave no blank lines behind.

use domain::TemplateError;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Tag { line: usize, directive: Directive },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Print(String),
    If { name: String, negate: bool },
    Else,
    End,
}

impl Directive {
    fn is_control(&self) -> bool {
        !matches!(self, Self::Print(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Print {
        line: usize,
        name: String,
    },
    If {
        line: usize,
        name: String,
        negate: bool,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

struct Frame {
    line: usize,
    name: String,
    negate: bool,
    then: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

/// Renders `source` against the fields of `context`.
///
/// `context` must be a JSON object; anything else is treated as empty.
pub fn render_str(source: &str, context: &Value) -> Result<String, TemplateError> {
    let empty = Map::new();
    let fields = context.as_object().unwrap_or(&empty);

    let nodes = parse(source)?;
    let mut out = String::with_capacity(source.len());
    render_nodes(&nodes, fields, &mut out)?;
    Ok(out)
}

fn tokenize(source: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1;

    while let Some(start) = rest.find("<%") {
        let text = &rest[..start];
        line += text.matches('\n').count();
        if !text.is_empty() {
            tokens.push(Token::Text(text.to_owned()));
        }

        let after = &rest[start + 2..];
        let end = after.find("%>").ok_or_else(|| TemplateError::Syntax {
            line,
            message: "unterminated tag".into(),
        })?;
        let body = &after[..end];
        tokens.push(Token::Tag {
            line,
            directive: directive(body.trim(), line)?,
        });
        line += body.matches('\n').count();
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_owned()));
    }
    Ok(tokens)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn directive(body: &str, line: usize) -> Result<Directive, TemplateError> {
    let variable = |name: &str| {
        if is_identifier(name) {
            Ok(name.to_owned())
        } else {
            Err(TemplateError::Syntax {
                line,
                message: format!("invalid variable name '{name}'"),
            })
        }
    };

    if let Some(expr) = body.strip_prefix('=') {
        return Ok(Directive::Print(variable(expr.trim())?));
    }
    if let Some(cond) = body.strip_prefix("if ") {
        let cond = cond.trim();
        let (negate, name) = match cond.strip_prefix('!') {
            Some(name) => (true, name.trim()),
            None => (false, cond),
        };
        return Ok(Directive::If {
            name: variable(name)?,
            negate,
        });
    }
    match body {
        "else" => Ok(Directive::Else),
        "end" => Ok(Directive::End),
        other => Err(TemplateError::Syntax {
            line,
            message: format!("unknown directive '{other}'"),
        }),
    }
}

/// Whitespace between the last newline of `text` and its end.
fn trailing_indent(text: &str) -> &str {
    match text.rfind('\n') {
        Some(i) => &text[i + 1..],
        None => text,
    }
}

/// Text of `text` up to its first newline, or all of it.
fn leading_rest_of_line(text: &str) -> &str {
    match text.find('\n') {
        Some(i) => &text[..i],
        None => text,
    }
}

/// Strips lines that hold nothing but a control tag.
fn strip_standalone(tokens: &mut [Token]) {
    let standalone: Vec<bool> = (0..tokens.len())
        .map(|i| {
            let control = matches!(
                &tokens[i],
                Token::Tag { directive, .. } if directive.is_control()
            );
            if !control {
                return false;
            }
            let starts_line = match i.checked_sub(1).map(|p| &tokens[p]) {
                None => true,
                Some(Token::Text(prev)) => {
                    trailing_indent(prev).trim().is_empty() && (prev.contains('\n') || i == 1)
                }
                Some(Token::Tag { .. }) => false,
            };
            let ends_line = match tokens.get(i + 1) {
                None => true,
                Some(Token::Text(next)) => {
                    leading_rest_of_line(next).trim().is_empty()
                        && (next.contains('\n') || i + 2 == tokens.len())
                }
                Some(Token::Tag { .. }) => false,
            };
            starts_line && ends_line
        })
        .collect();

    for (i, is_standalone) in standalone.into_iter().enumerate() {
        if !is_standalone {
            continue;
        }
        if let Some(Token::Text(next)) = tokens.get_mut(i + 1) {
            let cut = next.find('\n').map_or(next.len(), |n| n + 1);
            next.replace_range(..cut, "");
        }
        if let Some(Token::Text(prev)) = i.checked_sub(1).and_then(|p| tokens.get_mut(p)) {
            let keep = prev.len() - trailing_indent(prev).len();
            prev.truncate(keep);
        }
    }
}

fn push(root: &mut Vec<Node>, stack: &mut [Frame], node: Node) {
    match stack.last_mut() {
        Some(frame) => match frame.otherwise.as_mut() {
            Some(otherwise) => otherwise.push(node),
            None => frame.then.push(node),
        },
        None => root.push(node),
    }
}

fn parse(source: &str) -> Result<Vec<Node>, TemplateError> {
    let mut tokens = tokenize(source)?;
    strip_standalone(&mut tokens);

    let mut root = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for token in tokens {
        let (line, directive) = match token {
            Token::Text(text) => {
                if !text.is_empty() {
                    push(&mut root, &mut stack, Node::Text(text));
                }
                continue;
            }
            Token::Tag { line, directive } => (line, directive),
        };

        match directive {
            Directive::Print(name) => push(&mut root, &mut stack, Node::Print { line, name }),
            Directive::If { name, negate } => stack.push(Frame {
                line,
                name,
                negate,
                then: Vec::new(),
                otherwise: None,
            }),
            Directive::Else => {
                let frame = stack.last_mut().ok_or_else(|| TemplateError::Syntax {
                    line,
                    message: "'else' outside of an 'if' block".into(),
                })?;
                if frame.otherwise.is_some() {
                    return Err(TemplateError::Syntax {
                        line,
                        message: "duplicate 'else'".into(),
                    });
                }
                frame.otherwise = Some(Vec::new());
            }
            Directive::End => {
                let frame = stack.pop().ok_or_else(|| TemplateError::Syntax {
                    line,
                    message: "'end' without an open block".into(),
                })?;
                let node = Node::If {
                    line: frame.line,
                    name: frame.name,
                    negate: frame.negate,
                    then: frame.then,
                    otherwise: frame.otherwise.unwrap_or_default(),
                };
                push(&mut root, &mut stack, node);
            }
        }
    }

    if let Some(frame) = stack.last() {
        return Err(TemplateError::Syntax {
            line: frame.line,
            message: format!("unclosed 'if {}' block", frame.name),
        });
    }
    Ok(root)
}

fn lookup<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
    line: usize,
) -> Result<&'a Value, TemplateError> {
    fields.get(name).ok_or_else(|| TemplateError::UnknownVariable {
        line,
        variable: name.to_owned(),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn render_nodes(
    nodes: &[Node],
    fields: &Map<String, Value>,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Print { line, name } => match lookup(fields, name, *line)? {
                Value::Null => {}
                Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            },
            Node::If {
                line,
                name,
                negate,
                then,
                otherwise,
            } => {
                let truthy = is_truthy(lookup(fields, name, *line)?);
                let branch = if truthy != *negate { then } else { otherwise };
                render_nodes(branch, fields, out)?;
            }
        }
    }
    Ok(())
}
