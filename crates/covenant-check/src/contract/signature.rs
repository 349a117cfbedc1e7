//! Parameter-name recovery for guarded functions.
//!
//! A [`SignatureReader`] yields a function's declared parameter names in
//! declaration order. [`Params`] (or a plain `[&str; N]`) declares them
//! explicitly; [`Declaration`] recovers them from declaration text such as
//! `fn divide(n: f64, d: f64) -> f64`, `function divide(n, d)`,
//! `(a, b = 2) => a`, `x => x` or `|a, b| a + b`.
//!
//! Recovery never guesses: text without a parameter list, unbalanced
//! delimiters and destructuring patterns are reported as [`SignatureError`]s
//! instead of silently binding fewer names.

use std::collections::HashSet;

use covenant_core::SignatureError;

/// Yields declared parameter names in left-to-right order.
pub trait SignatureReader {
    fn parameter_names(&self) -> Result<Vec<String>, SignatureError>;
}

/// Explicitly declared parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    names: Vec<String>,
}

impl Params {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Params {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl SignatureReader for Params {
    fn parameter_names(&self) -> Result<Vec<String>, SignatureError> {
        validate(&self.names)?;
        Ok(self.names.clone())
    }
}

impl<const N: usize> SignatureReader for [&str; N] {
    fn parameter_names(&self) -> Result<Vec<String>, SignatureError> {
        let names: Vec<String> = self.iter().map(|s| s.to_string()).collect();
        validate(&names)?;
        Ok(names)
    }
}

/// Parameter names recovered from declaration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    text: String,
}

impl Declaration {
    pub fn new(text: impl Into<String>) -> Self {
        Declaration { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl SignatureReader for Declaration {
    fn parameter_names(&self) -> Result<Vec<String>, SignatureError> {
        parse_parameter_names(&self.text)
    }
}

/// Whether `s` is a plain identifier (letters, digits, `_`, `$`; no leading digit).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn validate(names: &[String]) -> Result<(), SignatureError> {
    let mut seen = HashSet::new();
    for name in names {
        if !is_identifier(name) {
            return Err(SignatureError::InvalidName { name: name.clone() });
        }
        if !seen.insert(name.as_str()) {
            return Err(SignatureError::DuplicateName { name: name.clone() });
        }
    }
    Ok(())
}

/// Recovers parameter names from a declaration.
pub fn parse_parameter_names(text: &str) -> Result<Vec<String>, SignatureError> {
    let tokens = scan(text, Angles::Lenient)?;

    let list = if let Some(list) = closure_list(text, &tokens) {
        list
    } else {
        let open = tokens.iter().position(|t| t.ch == '(' && t.depth == 1);
        let arrow = text.find("=>");
        match (open, arrow) {
            (Some(open), arrow) if arrow.map_or(true, |a| tokens[open].index < a) => {
                let close = tokens[open + 1..]
                    .iter()
                    .find(|t| t.ch == ')' && t.depth == 0)
                    .ok_or_else(|| unbalanced(text))?;
                &text[tokens[open].index + 1..close.index]
            }
            (_, Some(arrow)) => return arrow_parameter(text, arrow),
            _ => {
                return Err(SignatureError::NoParameterList {
                    text: text.to_string(),
                })
            }
        }
    };

    let pieces = split_top_level(list)?;
    let last = pieces.len().saturating_sub(1);
    let mut names = Vec::new();
    for (position, piece) in pieces.iter().enumerate() {
        let piece = piece.trim();
        if piece.is_empty() {
            // Empty list or trailing comma.
            if position == last {
                continue;
            }
            return Err(SignatureError::UnsupportedParameter {
                position,
                text: piece.to_string(),
            });
        }
        if let Some(name) = parameter_name(piece, position)? {
            names.push(name);
        }
    }
    validate(&names)?;
    Ok(names)
}

/// One character outside quoted runs, with the bracket depth after it.
#[derive(Debug, Clone, Copy)]
struct Token {
    index: usize,
    ch: char,
    depth: usize,
}

fn unbalanced(text: &str) -> SignatureError {
    SignatureError::Unbalanced {
        text: text.to_string(),
    }
}

/// What a `<` still open at a closing bracket or at the end of text means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Angles {
    /// A comparison in a function body; dropped.
    Lenient,
    /// Inside a parameter list, where it would hide a separator; an error.
    Strict,
}

fn scan(text: &str, angles: Angles) -> Result<Vec<Token>, SignatureError> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut stack: Vec<char> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (index, ch) = chars[i];
        if let Some(quote) = opens_quote(&chars, i) {
            i = skip_quoted(&chars, i, quote).ok_or_else(|| unbalanced(text))?;
            continue;
        }
        match ch {
            '(' | '[' | '{' => stack.push(ch),
            '<' if opens_generics(&chars, i) => stack.push(ch),
            ')' | ']' | '}' => {
                let open = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if angles == Angles::Lenient {
                    while stack.last() == Some(&'<') {
                        stack.pop();
                    }
                }
                if stack.pop() != Some(open) {
                    return Err(unbalanced(text));
                }
            }
            '>' => {
                let arrow = i > 0 && matches!(chars[i - 1].1, '-' | '=');
                if !arrow && stack.last() == Some(&'<') {
                    stack.pop();
                }
            }
            _ => {}
        }
        tokens.push(Token {
            index,
            ch,
            depth: stack.len(),
        });
        i += 1;
    }

    if angles == Angles::Lenient {
        while stack.last() == Some(&'<') {
            stack.pop();
        }
    }
    if !stack.is_empty() {
        return Err(unbalanced(text));
    }
    Ok(tokens)
}

/// A `<` opens generic arguments only when glued to a type or function
/// name (`Vec<`, `apply<`, `::<`). Spaced `<` is a comparison.
fn opens_generics(chars: &[(usize, char)], i: usize) -> bool {
    i > 0 && {
        let prev = chars[i - 1].1;
        prev.is_alphanumeric() || prev == '_' || prev == ':'
    }
}

/// `"` and backticks always quote; `'` only for char literals, since it
/// also introduces lifetimes.
fn opens_quote(chars: &[(usize, char)], i: usize) -> Option<char> {
    match chars[i].1 {
        '"' => Some('"'),
        '`' => Some('`'),
        '\'' => {
            let escaped = chars.get(i + 1).map(|c| c.1) == Some('\\');
            let literal = chars.get(i + 2).map(|c| c.1) == Some('\'');
            (escaped || literal).then_some('\'')
        }
        _ => None,
    }
}

/// Returns the position just past the closing quote.
fn skip_quoted(chars: &[(usize, char)], start: usize, quote: char) -> Option<usize> {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i].1 {
            '\\' => i += 2,
            c if c == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Parameter list of a closure such as `move |a, b| a + b`.
fn closure_list<'t>(text: &'t str, tokens: &[Token]) -> Option<&'t str> {
    let trimmed = text.trim_start();
    let rest = trimmed.strip_prefix("move").unwrap_or(trimmed).trim_start();
    if !rest.starts_with('|') {
        return None;
    }
    let mut bars = tokens.iter().filter(|t| t.ch == '|' && t.depth == 0);
    let open = bars.next()?;
    let close = bars.next()?;
    Some(&text[open.index + 1..close.index])
}

/// Single unparenthesized arrow parameter: `x => ...` or `async x => ...`.
fn arrow_parameter(text: &str, arrow: usize) -> Result<Vec<String>, SignatureError> {
    match text[..arrow].split_whitespace().last() {
        Some(name) if is_identifier(name) => Ok(vec![name.to_string()]),
        _ => Err(SignatureError::NoParameterList {
            text: text.to_string(),
        }),
    }
}

fn split_top_level(list: &str) -> Result<Vec<&str>, SignatureError> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for token in scan(list, Angles::Strict)? {
        if token.ch == ',' && token.depth == 0 {
            pieces.push(&list[start..token.index]);
            start = token.index + 1;
        }
    }
    pieces.push(&list[start..]);
    Ok(pieces)
}

/// Extracts the bound name from one parameter. `Ok(None)` for receivers.
fn parameter_name(piece: &str, position: usize) -> Result<Option<String>, SignatureError> {
    // The binding ends at the first top-level type annotation or default.
    let end = scan(piece, Angles::Strict)?
        .into_iter()
        .find(|t| (t.ch == ':' || t.ch == '=') && t.depth == 0)
        .map_or(piece.len(), |t| t.index);
    let head = piece[..end].trim();

    let receiver: Vec<&str> = head
        .split(|c: char| c == '&' || c.is_whitespace())
        .filter(|w| !w.is_empty() && *w != "mut" && !w.starts_with('\''))
        .collect();
    if receiver == ["self"] {
        return Ok(None);
    }

    let mut binding = head.strip_prefix("...").unwrap_or(head).trim_start();
    for keyword in ["ref ", "mut "] {
        binding = binding.strip_prefix(keyword).unwrap_or(binding).trim_start();
    }
    let binding = binding.strip_suffix('?').unwrap_or(binding);

    if is_identifier(binding) {
        Ok(Some(binding.to_string()))
    } else {
        Err(SignatureError::UnsupportedParameter {
            position,
            text: piece.to_string(),
        })
    }
}
