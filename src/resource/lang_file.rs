//! Bracket-literal language files
//!
//! Language files hold one nested array literal, usually wrapped in a
//! `<?php return ...;` envelope:
//!
//! ```text
//! <?php
//!
//! return [
//!     'title' => 'Welcome',
//!     'menu' => [
//!         0 => 'Home',
//!     ],
//! ];
//! ```
//!
//! [`render`] writes a [`ResourceTree`] in this layout and [`parse`] reads it
//! back with the tree-sitter PHP grammar. Statements before the `return`
//! (`declare(strict_types=1);`, `use` imports) are skipped. Values may be
//! literals, nested arrays and `.` concatenations of literals; anything that
//! needs a PHP runtime is rejected. Rendering only escapes what the
//! single-quote reader would otherwise misread, so every tree survives a
//! render/parse round trip unchanged.

use tree_sitter::{Node, Parser as TSParser};

use crate::resource::{Key, ResourceTree, Value};

const INDENT: &str = "    ";

/// Wrapped around files without an opening tag so the grammar reads them as
/// a statement; a doubled `;` is an empty statement
const BARE_PREFIX: &str = "<?php\n";
const BARE_SUFFIX: &str = "\n;";

/// How the array literal is wrapped on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `<?php\n\nreturn [...];\n`
    Php,
    /// The literal on its own
    Bare,
}

/// A parsed language file
#[derive(Debug, Clone, PartialEq)]
pub struct LangFile {
    pub envelope: Envelope,
    pub tree: ResourceTree,
}

impl LangFile {
    pub fn new(envelope: Envelope, tree: ResourceTree) -> Self {
        Self { envelope, tree }
    }

    /// Render the whole file, envelope included
    pub fn render(&self) -> String {
        let literal = render(&self.tree, 1);
        match self.envelope {
            Envelope::Php => format!("<?php\n\nreturn {};\n", literal),
            Envelope::Bare => format!("{}\n", literal),
        }
    }
}

/// Error raised when a language file cannot be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Render a tree as a bracket literal
///
/// Entries at nesting level `L` are indented by `4 * L` spaces, starting at
/// `base_indent`. Nested literals end with a trailing comma after their last
/// entry; the top-level literal does not.
pub fn render(tree: &ResourceTree, base_indent: usize) -> String {
    render_tree(tree, base_indent, false)
}

fn render_tree(tree: &ResourceTree, level: usize, nested: bool) -> String {
    if tree.is_empty() {
        return "[]".to_string();
    }

    let indent = INDENT.repeat(level);
    let entries: Vec<String> = tree
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Tree(child) => render_tree(child, level + 1, true),
                scalar => render_scalar(scalar),
            };
            format!("{}{} => {}", indent, render_key(key), value)
        })
        .collect();

    let body = entries.join(",\n");
    let closing = INDENT.repeat(level.saturating_sub(1));
    if nested {
        format!("[\n{},\n{}]", body, closing)
    } else {
        format!("[\n{}\n{}]", body, closing)
    }
}

fn render_key(key: &Key) -> String {
    match key {
        Key::Str(s) => quote(s),
        Key::Int(n) => n.to_string(),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Text(text) => quote(text),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Tree(tree) => render_tree(tree, 1, true),
    }
}

/// Single-quote a string, escaping only `'` and the backslashes the reader
/// would otherwise treat as escapes.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => match chars.peek() {
                None | Some('\'') | Some('\\') => out.push_str("\\\\"),
                Some(_) => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Parse a language file
///
/// The file is either PHP code returning an array literal, or the literal on
/// its own. The first `return` statement at the top level supplies the tree.
pub fn parse(input: &str) -> Result<LangFile, ParseError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let tagged = input
        .trim_start()
        .get(..5)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("<?php"));

    if tagged {
        Parser::new(input, 0).parse(Envelope::Php)
    } else {
        let source = format!("{}{}{}", BARE_PREFIX, input, BARE_SUFFIX);
        Parser::new(&source, 1).parse(Envelope::Bare)
    }
}

struct Parser<'a> {
    source: &'a str,
    /// Lines added in front of the user's text
    line_offset: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, line_offset: usize) -> Self {
        Parser {
            source,
            line_offset,
        }
    }

    fn parse(&self, envelope: Envelope) -> Result<LangFile, ParseError> {
        let mut ts_parser = TSParser::new();
        ts_parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|e| ParseError {
                line: 1,
                column: 1,
                message: format!("failed to load PHP grammar: {}", e),
            })?;

        let syntax = ts_parser.parse(self.source, None).ok_or_else(|| ParseError {
            line: 1,
            column: 1,
            message: "parser produced no syntax tree".to_string(),
        })?;
        let root = syntax.root_node();

        if let Some(node) = first_error(root) {
            let message = if node.is_missing() {
                format!("missing '{}'", node.kind())
            } else {
                format!("syntax error near '{}'", self.snippet(node))
            };
            return Err(self.error(node, message));
        }

        let literal = self.returned_literal(root)?;
        let tree = self.array(literal)?;
        Ok(LangFile { envelope, tree })
    }

    /// Find the array literal the file evaluates to
    fn returned_literal<'t>(&self, root: Node<'t>) -> Result<Node<'t>, ParseError> {
        for statement in operands(root) {
            let expression = match statement.kind() {
                "return_statement" => match operands(statement).into_iter().next() {
                    Some(expression) => expression,
                    None => return Err(self.error(statement, "return without a value")),
                },
                // A bare literal parses as an expression statement
                "expression_statement" => match operands(statement).into_iter().next() {
                    Some(expression)
                        if unwrap_parentheses(expression).kind()
                            == "array_creation_expression" =>
                    {
                        expression
                    }
                    _ => continue,
                },
                _ => continue,
            };

            let expression = unwrap_parentheses(expression);
            if expression.kind() != "array_creation_expression" {
                return Err(self.error(expression, "expected array literal"));
            }
            return Ok(expression);
        }

        Err(self.error(root, "expected array literal"))
    }

    fn array(&self, node: Node<'_>) -> Result<ResourceTree, ParseError> {
        let mut tree = ResourceTree::new();
        for element in operands(node) {
            if element.kind() != "array_element_initializer" {
                return Err(self.error(
                    element,
                    format!("unsupported array element '{}'", element.kind()),
                ));
            }

            match operands(element).as_slice() {
                [value] => {
                    let index = tree.next_index();
                    tree.insert(Key::Int(index), self.value(*value)?);
                }
                [key, value] => {
                    let key = self.key(*key)?;
                    tree.insert(key, self.value(*value)?);
                }
                _ => return Err(self.error(element, "unsupported array element")),
            }
        }
        Ok(tree)
    }

    fn key(&self, node: Node<'_>) -> Result<Key, ParseError> {
        match self.value(node)? {
            Value::Text(key) => Ok(Key::from_array_key(key)),
            Value::Number(n) => match n.as_i64() {
                Some(n) => Ok(Key::Int(n)),
                None => Err(self.error(node, "array keys must be strings or integers")),
            },
            _ => Err(self.error(node, "array keys must be strings or integers")),
        }
    }

    fn value(&self, node: Node<'_>) -> Result<Value, ParseError> {
        match node.kind() {
            "array_creation_expression" => self.array(node).map(Value::Tree),
            "string" => {
                let body = self.quoted_body(node, '\'')?;
                Ok(Value::Text(unescape_single(body)))
            }
            "encapsed_string" => self.double_quoted(node).map(Value::Text),
            "integer" => self.integer(node, false),
            "float" => self.float(node, false),
            "boolean" | "null" | "name" => match self.text(node)?.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                other => Err(self.error(node, format!("unsupported constant '{}'", other))),
            },
            "parenthesized_expression" => match operands(node).as_slice() {
                [inner] => self.value(*inner),
                _ => Err(self.error(node, "unsupported expression")),
            },
            "unary_op_expression" => self.signed_number(node),
            "binary_expression" => self.concatenation(node),
            kind => Err(self.error(node, format!("unsupported expression '{}'", kind))),
        }
    }

    /// `-12`, `+1.5`
    fn signed_number(&self, node: Node<'_>) -> Result<Value, ParseError> {
        match (operator(node), operands(node).as_slice()) {
            (Some(op @ ("-" | "+")), [operand]) => {
                let negative = op == "-";
                match operand.kind() {
                    "integer" => self.integer(*operand, negative),
                    "float" => self.float(*operand, negative),
                    _ => Err(self.error(node, "unsupported expression")),
                }
            }
            _ => Err(self.error(node, "unsupported expression")),
        }
    }

    /// `'a' . 'b'`; numbers are joined in their literal form
    fn concatenation(&self, node: Node<'_>) -> Result<Value, ParseError> {
        let parts = operands(node);
        let (left, right) = match (operator(node), parts.as_slice()) {
            (Some("."), [left, right]) => (*left, *right),
            (op, _) => {
                return Err(self.error(
                    node,
                    format!("unsupported operator '{}'", op.unwrap_or("?")),
                ));
            }
        };

        let mut text = self.concat_operand(left)?;
        text.push_str(&self.concat_operand(right)?);
        Ok(Value::Text(text))
    }

    fn concat_operand(&self, node: Node<'_>) -> Result<String, ParseError> {
        match self.value(node)? {
            Value::Text(text) => Ok(text),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(self.error(node, "only strings and numbers can be concatenated")),
        }
    }

    fn double_quoted(&self, node: Node<'_>) -> Result<String, ParseError> {
        for part in operands(node) {
            if !matches!(
                part.kind(),
                "string_content" | "string_value" | "escape_sequence"
            ) {
                return Err(self.error(part, "interpolated strings are not supported"));
            }
        }
        let body = self.quoted_body(node, '"')?;
        Ok(unescape_double(body))
    }

    fn quoted_body(&self, node: Node<'_>, quote: char) -> Result<&'a str, ParseError> {
        let text = self.text(node)?;
        let unprefixed = text
            .strip_prefix(['b', 'B'])
            .filter(|rest| rest.starts_with(quote))
            .unwrap_or(text);
        unprefixed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
            .ok_or_else(|| self.error(node, "malformed string literal"))
    }

    fn integer(&self, node: Node<'_>, negative: bool) -> Result<Value, ParseError> {
        let literal = self.text(node)?;
        let digits = literal.replace('_', "").to_ascii_lowercase();
        let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x") {
            (16, hex.to_string())
        } else if let Some(bin) = digits.strip_prefix("0b") {
            (2, bin.to_string())
        } else if let Some(oct) = digits.strip_prefix("0o") {
            (8, oct.to_string())
        } else if digits.len() > 1 && digits.starts_with('0') {
            (8, digits[1..].to_string())
        } else {
            (10, digits)
        };

        let magnitude = i128::from_str_radix(&digits, radix)
            .map_err(|_| self.error(node, format!("invalid number '{}'", literal)))?;
        let value = if negative { -magnitude } else { magnitude };

        // Out of range integers become floats, as in PHP
        let number = match i64::try_from(value) {
            Ok(n) => Some(serde_json::Number::from(n)),
            Err(_) => serde_json::Number::from_f64(value as f64),
        };
        number
            .map(Value::Number)
            .ok_or_else(|| self.error(node, format!("invalid number '{}'", literal)))
    }

    fn float(&self, node: Node<'_>, negative: bool) -> Result<Value, ParseError> {
        let literal = self.text(node)?;
        let value: f64 = literal
            .replace('_', "")
            .parse()
            .map_err(|_| self.error(node, format!("invalid number '{}'", literal)))?;
        let value = if negative { -value } else { value };
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| self.error(node, format!("invalid number '{}'", literal)))
    }

    fn text(&self, node: Node<'_>) -> Result<&'a str, ParseError> {
        node.utf8_text(self.source.as_bytes())
            .map_err(|e| self.error(node, format!("invalid UTF-8: {}", e)))
    }

    /// First line of a node's text, for error messages
    fn snippet(&self, node: Node<'_>) -> String {
        let text = self.text(node).unwrap_or_default();
        text.lines().next().unwrap_or_default().chars().take(20).collect()
    }

    fn error(&self, node: Node<'_>, message: impl Into<String>) -> ParseError {
        let position = node.start_position();
        ParseError {
            line: (position.row + 1).saturating_sub(self.line_offset).max(1),
            column: position.column + 1,
            message: message.into(),
        }
    }
}

/// Named children, without comments
fn operands<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// The anonymous operator token of an expression node
fn operator(node: Node<'_>) -> Option<&'static str> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|child| !child.is_named())
        .map(|child| child.kind())
}

fn unwrap_parentheses(node: Node<'_>) -> Node<'_> {
    if node.kind() == "parenthesized_expression" {
        if let [inner] = operands(node).as_slice() {
            return unwrap_parentheses(*inner);
        }
    }
    node
}

/// The first syntax error; a missing final `;` is tolerated
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || (node.is_missing() && node.kind() != ";") {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).find_map(first_error)
}

/// Single-quoted strings only know `\'` and `\\`
fn unescape_single(body: &str) -> String {
    let mut text = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next @ ('\'' | '\\'))) => {
                chars.next();
                text.push(next);
            }
            (c, _) => text.push(c),
        }
    }
    text
}

/// Decode double-quoted escapes; `\x` and octal escapes produce raw bytes,
/// so multi-byte UTF-8 sequences can be spelled out byte by byte.
/// Unknown escapes are kept verbatim.
fn unescape_double(body: &str) -> String {
    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut buf = [0u8; 4];

    while let Some(c) = chars.next() {
        if c != '\\' {
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let simple = match chars.peek() {
            Some('n') => Some(b'\n'),
            Some('t') => Some(b'\t'),
            Some('r') => Some(b'\r'),
            Some('v') => Some(0x0b),
            Some('e') => Some(0x1b),
            Some('f') => Some(0x0c),
            Some('\\') => Some(b'\\'),
            Some('$') => Some(b'$'),
            Some('"') => Some(b'"'),
            _ => None,
        };
        if let Some(byte) = simple {
            chars.next();
            bytes.push(byte);
            continue;
        }

        match chars.peek() {
            Some(d) if d.is_digit(8) => {
                let mut code = 0u32;
                for _ in 0..3 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push((code & 0xff) as u8);
            }
            Some('x') => {
                let mut ahead = chars.clone();
                ahead.next();
                let mut code = 0u32;
                let mut digits = 0;
                while digits < 2 {
                    match ahead.peek().and_then(|d| d.to_digit(16)) {
                        Some(digit) => {
                            code = code * 16 + digit;
                            ahead.next();
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    bytes.push(b'\\');
                } else {
                    chars = ahead;
                    bytes.push(code as u8);
                }
            }
            Some('u') => {
                let mut ahead = chars.clone();
                ahead.next();
                let decoded = if ahead.next() == Some('{') {
                    let hex: String = ahead.by_ref().take_while(|c| *c != '}').collect();
                    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(decoded) => {
                        chars = ahead;
                        bytes.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
                    }
                    None => bytes.push(b'\\'),
                }
            }
            _ => bytes.push(b'\\'),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}
