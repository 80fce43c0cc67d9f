//! Directive grammar and resolved directives.
//!
//! The annotation on a start marker line is everything after the last
//! separator character:
//!
//! ```text
//! # START INJECTION | tmpl_primitives(Primitives,Arrays)
//!                     ^^^^^^^^^^^^^^^ ^^^^^^^^^^^^^^^^^
//!                     generator       categories, in emission order
//! ```
//!
//! Grammar: `ident '(' ident (',' ident)* ')'`, whitespace allowed between
//! tokens, identifiers matching `[A-Za-z_][A-Za-z0-9_]*`.

use crate::{Generator, Result, TaxonomyCategory, TypeDescriptor, WeaveError};
use regex::Regex;
use std::sync::OnceLock;

const IDENT_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

static IDENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn ident_regex() -> &'static Regex {
    IDENT_REGEX.get_or_init(|| Regex::new(IDENT_PATTERN).expect("Invalid identifier regex"))
}

/// The syntactic content of an annotation, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveSpec {
    /// Name of the generator to call.
    pub generator: String,
    /// Category names, in the order listed.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Open,
    Close,
    Comma,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Open => "'('".to_string(),
            Token::Close => "')'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, c) in input.char_indices() {
        let delimiter = match c {
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            ',' => Some(Token::Comma),
            _ => None,
        };

        if delimiter.is_some() || c.is_whitespace() {
            if let Some(start) = word_start.take() {
                tokens.push(Token::Word(&input[start..i]));
            }
            if let Some(token) = delimiter {
                tokens.push(token);
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }

    if let Some(start) = word_start {
        tokens.push(Token::Word(&input[start..]));
    }

    tokens
}

/// Extract the annotation from a marker line: the trimmed text after the
/// last `separator`. `None` if the separator does not occur.
pub fn annotation(line: &str, separator: char) -> Option<&str> {
    line.rfind(separator)
        .map(|idx| line[idx + separator.len_utf8()..].trim())
}

impl DirectiveSpec {
    /// Parse a start marker line. `line_no` is used for error reporting.
    pub fn from_marker_line(line: &str, separator: char, line_no: usize) -> Result<Self> {
        let annotation = annotation(line, separator).ok_or_else(|| {
            WeaveError::malformed(line_no, format!("no '{}' separator before the directive", separator))
        })?;
        Self::parse(annotation, line_no)
    }

    /// Parse an annotation such as `tmpl_array(Primitives, Composites)`.
    pub fn parse(annotation: &str, line_no: usize) -> Result<Self> {
        let tokens = tokenize(annotation);
        let mut tokens = tokens.iter().copied();
        let err = |reason: String| WeaveError::malformed(line_no, reason);

        let generator = match tokens.next() {
            Some(Token::Word(w)) => identifier(w, "generator name", line_no)?,
            Some(other) => return Err(err(format!("expected a generator name, found {}", other.describe()))),
            None => return Err(err("empty directive".to_string())),
        };

        match tokens.next() {
            Some(Token::Open) => {}
            Some(other) => return Err(err(format!("expected '(' after '{}', found {}", generator, other.describe()))),
            None => return Err(err(format!("missing '(' after '{}'", generator))),
        }

        let mut categories = Vec::new();
        loop {
            match tokens.next() {
                Some(Token::Word(w)) => categories.push(identifier(w, "category name", line_no)?),
                Some(Token::Close) if categories.is_empty() => {
                    return Err(err("empty category list".to_string()))
                }
                Some(Token::Comma) | Some(Token::Close) => {
                    return Err(err("empty category entry".to_string()))
                }
                Some(Token::Open) => return Err(err("unexpected '(' in category list".to_string())),
                None => return Err(err("missing ')'".to_string())),
            }

            match tokens.next() {
                Some(Token::Comma) => continue,
                Some(Token::Close) => break,
                Some(other) => {
                    return Err(err(format!("expected ',' or ')', found {}", other.describe())))
                }
                None => return Err(err("missing ')'".to_string())),
            }
        }

        if let Some(extra) = tokens.next() {
            return Err(err(format!("unexpected {} after ')'", extra.describe())));
        }

        Ok(Self {
            generator,
            categories,
        })
    }
}

fn identifier(word: &str, what: &str, line_no: usize) -> Result<String> {
    if ident_regex().is_match(word) {
        Ok(word.to_string())
    } else {
        Err(WeaveError::malformed(line_no, format!("invalid {} '{}'", what, word)))
    }
}

/// The resolved meaning of one start marker: a generator and the ordered
/// categories whose descriptors it is called with.
pub struct Directive<'a> {
    generator_name: String,
    generator: Option<&'a dyn Generator>,
    categories: Vec<&'a TaxonomyCategory>,
}

impl<'a> Directive<'a> {
    /// A directive over `categories` calling `generator`.
    /// A `None` generator produces no blocks.
    pub fn new(
        generator_name: impl Into<String>,
        generator: Option<&'a dyn Generator>,
        categories: Vec<&'a TaxonomyCategory>,
    ) -> Self {
        Self {
            generator_name: generator_name.into(),
            generator,
            categories,
        }
    }

    /// A directive that yields nothing.
    pub fn empty() -> Self {
        Self::new(String::new(), None, Vec::new())
    }

    pub fn generator_name(&self) -> &str {
        &self.generator_name
    }

    pub fn generator(&self) -> Option<&'a dyn Generator> {
        self.generator
    }

    /// `(label, descriptor)` pairs: each category's entries in insertion
    /// order, categories in the order they were listed.
    pub fn targets(&self) -> impl Iterator<Item = (&'a str, &'a TypeDescriptor)> + '_ {
        self.categories.iter().copied().flat_map(TaxonomyCategory::entries)
    }

    /// Whether this directive can emit anything at all.
    pub fn is_empty(&self) -> bool {
        self.generator.is_none() || self.categories.iter().all(|c| c.is_empty())
    }
}

impl std::fmt::Debug for Directive<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directive")
            .field("generator_name", &self.generator_name)
            .field("resolved", &self.generator.is_some())
            .field(
                "categories",
                &self.categories.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
