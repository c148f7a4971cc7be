//! CSS selector subset used by page wiring.
//!
//! Supported:
//! - Selector lists: `.about-person, .gallery-item`
//! - Descendant combinator: `.form-group input`
//! - Compound parts: `*`, `tag`, `#id`, `.class`, `[attr]`, `[attr="v"]`,
//!   `[attr^="v"]`, `:not(compound)`
//!
//! Child/sibling combinators and other pseudo-classes are rejected with a
//! [`SelectorError`] rather than silently matching the wrong thing.

use super::Document;
use crate::types::ElementId;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unsupported combinator `{0}`")]
    UnsupportedCombinator(char),
    #[error("unsupported pseudo-class `:{0}`")]
    UnsupportedPseudo(String),
    #[error("unterminated `{0}`")]
    Unterminated(char),
}

// =============================================================================
// AST
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Tag(String),
    Id(String),
    Class(String),
    Attr { name: String, op: AttrOp },
    Not(Compound),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    parts: Vec<Part>,
}

/// Compounds joined by descendant combinators, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

// =============================================================================
// PARSER
// =============================================================================

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected { found, offset: self.pos },
            None => SelectorError::Empty,
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.bump();
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn attr_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(_) => {}
                        None => return Err(SelectorError::Unterminated(quote)),
                    }
                }
                Ok(self.src[start..self.pos - 1].to_string())
            }
            _ => self.ident(),
        }
    }

    fn attribute(&mut self) -> Result<Part, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match self.peek() {
            Some(']') => AttrOp::Exists,
            Some('=') => {
                self.bump();
                self.skip_ws();
                AttrOp::Equals(self.attr_value()?)
            }
            Some('^') => {
                self.bump();
                if self.bump() != Some('=') {
                    return Err(self.unexpected());
                }
                self.skip_ws();
                AttrOp::Prefix(self.attr_value()?)
            }
            None => return Err(SelectorError::Unterminated('[')),
            _ => return Err(self.unexpected()),
        };
        self.skip_ws();
        if self.bump() != Some(']') {
            return Err(SelectorError::Unterminated('['));
        }
        Ok(Part::Attr { name, op })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut matched_any = match self.peek() {
            Some('*') => {
                self.bump();
                true
            }
            Some(c) if c.is_alphabetic() => {
                compound.parts.push(Part::Tag(self.ident()?.to_ascii_lowercase()));
                true
            }
            _ => false,
        };
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.parts.push(Part::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    compound.parts.push(Part::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    compound.parts.push(self.attribute()?);
                }
                Some(':') => {
                    self.bump();
                    let name = self.ident()?;
                    if name != "not" {
                        return Err(SelectorError::UnsupportedPseudo(name));
                    }
                    if self.bump() != Some('(') {
                        return Err(self.unexpected());
                    }
                    self.skip_ws();
                    let inner = self.compound()?;
                    self.skip_ws();
                    if self.bump() != Some(')') {
                        return Err(SelectorError::Unterminated('('));
                    }
                    compound.parts.push(Part::Not(inner));
                }
                _ => break,
            }
            matched_any = true;
        }
        if !matched_any {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some(c @ ('>' | '+' | '~')) => return Err(SelectorError::UnsupportedCombinator(c)),
                Some(_) if had_ws => compounds.push(self.compound()?),
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(Complex { compounds })
    }
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(src: &str) -> Result<Self, SelectorError> {
        if src.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser { src, pos: 0 };
        let mut alternatives = vec![parser.complex()?];
        while parser.peek() == Some(',') {
            parser.bump();
            alternatives.push(parser.complex()?);
        }
        if parser.peek().is_some() {
            return Err(parser.unexpected());
        }
        Ok(Self { alternatives })
    }

    /// Whether `el` matches any alternative of the list.
    pub fn matches<D: Document + ?Sized>(&self, doc: &D, el: ElementId) -> bool {
        self.alternatives.iter().any(|complex| complex.matches(doc, el))
    }
}

// =============================================================================
// MATCHING
// =============================================================================

impl Compound {
    fn matches<D: Document + ?Sized>(&self, doc: &D, el: ElementId) -> bool {
        self.parts.iter().all(|part| match part {
            Part::Tag(tag) => doc.tag_name(el).is_some_and(|t| t.eq_ignore_ascii_case(tag)),
            Part::Id(id) => doc.attribute(el, "id").as_deref() == Some(id.as_str()),
            Part::Class(class) => doc.has_class(el, class),
            Part::Attr { name, op } => match (doc.attribute(el, name), op) {
                (None, _) => false,
                (Some(_), AttrOp::Exists) => true,
                (Some(v), AttrOp::Equals(want)) => v == *want,
                (Some(v), AttrOp::Prefix(want)) => v.starts_with(want.as_str()),
            },
            Part::Not(inner) => !inner.matches(doc, el),
        })
    }
}

impl Complex {
    /// Right-to-left match. With only descendant combinators the nearest
    /// matching ancestor is always a valid choice, so no backtracking.
    fn matches<D: Document + ?Sized>(&self, doc: &D, el: ElementId) -> bool {
        let Some((subject, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(doc, el) {
            return false;
        }
        let mut cursor = doc.parent(el);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(candidate) = cursor else { return false };
                cursor = doc.parent(candidate);
                if compound.matches(doc, candidate) {
                    break;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lists_and_compounds() {
        let s = Selector::parse(".about-person, .gallery-item").unwrap();
        assert_eq!(s.alternatives.len(), 2);

        let s = Selector::parse("a[href^=\"#\"]").unwrap();
        assert_eq!(s.alternatives[0].compounds[0].parts.len(), 2);

        let s = Selector::parse(".section-animate:not(.schedule-section)").unwrap();
        assert!(matches!(s.alternatives[0].compounds[0].parts[1], Part::Not(_)));

        let s = Selector::parse(".form-group   input").unwrap();
        assert_eq!(s.alternatives[0].compounds.len(), 2);

        assert!(Selector::parse("*").is_ok());
        assert!(Selector::parse("[data-tooltip]").is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(
            Selector::parse(".cards-3 > .card"),
            Err(SelectorError::UnsupportedCombinator('>'))
        );
        assert_eq!(
            Selector::parse("li:hover"),
            Err(SelectorError::UnsupportedPseudo("hover".into()))
        );
        assert_eq!(Selector::parse("[href=\"x]"), Err(SelectorError::Unterminated('"')));
        assert!(matches!(Selector::parse(".a,"), Err(SelectorError::Empty)));
        assert!(matches!(Selector::parse("..a"), Err(SelectorError::Unexpected { .. })));
    }
}
