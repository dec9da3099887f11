//! Parser for Go module files (`go.mod`).
//!
//! Only the subset of the grammar needed to extract requirements is interpreted. Every
//! directive is still tokenized and checked so that malformed files are rejected rather
//! than partially read.

use super::{DependencyRecord, ParseError};
use tracing::debug;

/// Directives accepted by the module file grammar.
const KNOWN_DIRECTIVES: &[&str] = &[
    "module",
    "go",
    "toolchain",
    "godebug",
    "require",
    "replace",
    "exclude",
    "retract",
    "tool",
    "ignore",
];

/// A parsed module file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoModule {
    /// Module path declared by the `module` directive.
    pub module: Option<String>,

    /// Language version declared by the `go` directive.
    pub go_version: Option<String>,

    /// Requirements in declaration order.
    pub requires: Vec<DependencyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Word(String),
}

/// Parses raw `go.mod` bytes into dependency records.
///
/// # Errors
///
/// Returns [`ParseError`] if the bytes are not UTF-8 or the grammar is violated.
pub fn parse_go_mod(raw: &[u8]) -> Result<Vec<DependencyRecord>, ParseError> {
    let text = std::str::from_utf8(raw)?;
    let module = parse_go_module(text)?;
    debug!(
        module = module.module.as_deref().unwrap_or(""),
        requires = module.requires.len(),
        "Parsed go.mod"
    );
    Ok(module.requires)
}

/// Parses module file text.
///
/// `replace`, `exclude` and the other non-require directives are validated
/// syntactically and otherwise ignored.
///
/// # Errors
///
/// Returns [`ParseError::GoMod`] with the offending 1-based line number.
pub fn parse_go_module(text: &str) -> Result<GoModule, ParseError> {
    let mut module = GoModule::default();
    // Directive of the open block and the line it was opened on.
    let mut block: Option<(String, usize)> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let number = index + 1;
        let tokens = tokenize(raw_line, number)?;
        if tokens.is_empty() {
            continue;
        }

        if let Some((verb, _)) = &block {
            if tokens == [Token::Close] {
                block = None;
                continue;
            }
            let args = into_words(tokens, number)?;
            apply_directive(&mut module, verb, args, number)?;
            continue;
        }

        let mut tokens = tokens.into_iter();
        let verb = match tokens.next() {
            Some(Token::Word(verb)) => verb,
            Some(Token::Open) => return Err(ParseError::go_mod(number, "unexpected '('")),
            Some(Token::Close) => return Err(ParseError::go_mod(number, "unexpected ')'")),
            None => continue,
        };
        if !KNOWN_DIRECTIVES.contains(&verb.as_str()) {
            return Err(ParseError::go_mod(
                number,
                format!("unknown directive: {verb}"),
            ));
        }

        let rest: Vec<Token> = tokens.collect();
        if rest == [Token::Open] {
            block = Some((verb, number));
            continue;
        }

        // A block written on one line, e.g. `require ( a.b/c v1.2.3 )`.
        let inline_block = rest.len() >= 2
            && rest.first() == Some(&Token::Open)
            && rest.last() == Some(&Token::Close);
        let args = if inline_block {
            let inner = rest[1..rest.len() - 1].to_vec();
            if inner.is_empty() {
                continue;
            }
            into_words(inner, number)?
        } else {
            into_words(rest, number)?
        };
        apply_directive(&mut module, &verb, args, number)?;
    }

    if let Some((verb, opened_at)) = block {
        return Err(ParseError::go_mod(
            opened_at,
            format!("unterminated {verb} block"),
        ));
    }

    Ok(module)
}

fn apply_directive(
    module: &mut GoModule,
    verb: &str,
    args: Vec<String>,
    line: usize,
) -> Result<(), ParseError> {
    match verb {
        "module" => {
            let [path] = take_args::<1>(args, line, "usage: module module/path")?;
            module.module = Some(path);
        }
        "go" => {
            let [version] = take_args::<1>(args, line, "usage: go 1.23")?;
            module.go_version = Some(version);
        }
        "require" => {
            let [path, version] = take_args::<2>(args, line, "usage: require module/path v1.2.3")?;
            if !version.starts_with('v') {
                return Err(ParseError::go_mod(
                    line,
                    format!("invalid version {version:?} for {path}"),
                ));
            }
            module.requires.push(DependencyRecord::versioned(path, version));
        }
        _ => {
            if args.is_empty() {
                return Err(ParseError::go_mod(line, format!("{verb} needs arguments")));
            }
        }
    }
    Ok(())
}

fn take_args<const N: usize>(
    args: Vec<String>,
    line: usize,
    usage: &str,
) -> Result<[String; N], ParseError> {
    args.try_into()
        .map_err(|_| ParseError::go_mod(line, usage.to_string()))
}

fn into_words(tokens: Vec<Token>, line: usize) -> Result<Vec<String>, ParseError> {
    tokens
        .into_iter()
        .map(|token| match token {
            Token::Word(word) => Ok(word),
            Token::Open => Err(ParseError::go_mod(line, "unexpected '('")),
            Token::Close => Err(ParseError::go_mod(line, "unexpected ')'")),
        })
        .collect()
}

/// Splits one line into tokens, dropping any trailing `//` comment.
fn tokenize(line: &str, number: usize) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if line[start..].starts_with("//") {
            break;
        }

        match c {
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' | '`' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, next)) = chars.next() {
                    if next == c {
                        closed = true;
                        break;
                    }
                    if next == '\\' && c == '"' {
                        match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        }
                        continue;
                    }
                    value.push(next);
                }
                if !closed {
                    return Err(ParseError::go_mod(number, "unterminated quoted string"));
                }
                tokens.push(Token::Word(value));
            }
            _ => {
                let mut value = String::new();
                while let Some(&(index, next)) = chars.peek() {
                    if next.is_whitespace()
                        || matches!(next, '(' | ')' | '"' | '`')
                        || line[index..].starts_with("//")
                    {
                        break;
                    }
                    value.push(next);
                    chars.next();
                }
                tokens.push(Token::Word(value));
            }
        }
    }

    Ok(tokens)
}
