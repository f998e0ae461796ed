//! Signature resolver. Builds the `T:`/`M:`/`P:` keys the XML doc
//! generator uses for members.
//!
//! Parameter types are kept as a typed [`TypeRef`] so generic
//! instantiations are rendered from their argument list rather than from a
//! serialized CLR type name. Raw CLR names are still accepted through
//! [`TypeRef::parse_clr`].

use crate::metadata::ParameterInfo;
use serde::Deserialize;

const VOID: &str = "System.Void";

/// Reference to a parameter or return type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTypeRef")]
pub enum TypeRef {
    /// Non-generic qualified name, e.g. `System.Int32`.
    Simple(String),
    /// Generic instantiation, `name` still carries the backtick arity.
    Generic { name: String, args: Vec<TypeRef> },
    /// Array of `element`; rank 1 is `T[]`.
    Array { element: Box<TypeRef>, rank: usize },
    /// `ref`/`out` parameter.
    ByRef(Box<TypeRef>),
}

/// Either a raw CLR name or a structured generic description.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeRef {
    Name(String),
    Structured {
        name: String,
        #[serde(default)]
        args: Vec<RawTypeRef>,
    },
}

impl From<RawTypeRef> for TypeRef {
    fn from(raw: RawTypeRef) -> Self {
        match raw {
            RawTypeRef::Name(name) => TypeRef::parse_clr(&name),
            RawTypeRef::Structured { name, args } if args.is_empty() => TypeRef::parse_clr(&name),
            RawTypeRef::Structured { name, args } => TypeRef::Generic {
                name,
                args: args.into_iter().map(TypeRef::from).collect(),
            },
        }
    }
}

impl TypeRef {
    pub fn void() -> Self {
        TypeRef::Simple(VOID.to_string())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Simple(name) if name == VOID)
    }

    /// Parse a CLR `Type.FullName`, e.g.
    /// ``System.Collections.Generic.Dictionary`2[[System.String, mscorlib],[System.Int32, mscorlib]]``.
    ///
    /// An open generic name without an argument list is kept as written.
    pub fn parse_clr(raw: &str) -> Self {
        let mut cursor = Cursor {
            chars: raw.trim().chars().collect(),
            pos: 0,
        };
        cursor.parse_type()
    }

    /// Name as it appears in a doc-comment member key.
    pub fn doc_name(&self) -> String {
        match self {
            TypeRef::Simple(name) => name.replace('+', "."),
            TypeRef::Generic { name, args } => {
                let args: Vec<String> = args.iter().map(TypeRef::doc_name).collect();
                generic_doc_name(name, &args)
            }
            TypeRef::Array { element, rank } => {
                if *rank <= 1 {
                    format!("{}[]", element.doc_name())
                } else {
                    let dims = vec!["0:"; *rank].join(",");
                    format!("{}[{}]", element.doc_name(), dims)
                }
            }
            TypeRef::ByRef(inner) => format!("{}@", inner.doc_name()),
        }
    }
}

/// Spread a flat argument list over the `+`-separated segments of a generic
/// name by their arities: `Outer`1+Inner`1` with `[A, B]` is
/// `Outer{A}.Inner{B}`. When the arities do not account for every argument,
/// all of them go to the last segment.
fn generic_doc_name(name: &str, args: &[String]) -> String {
    let segments: Vec<(&str, usize)> = name.split('+').map(split_arity).collect();
    let declared: usize = segments.iter().map(|(_, arity)| arity).sum();

    let mut rest = args;
    let mut parts = Vec::with_capacity(segments.len());
    for (idx, (base, arity)) in segments.iter().enumerate() {
        let take = if declared == args.len() {
            *arity
        } else if idx + 1 == segments.len() {
            rest.len()
        } else {
            0
        };
        let (own, tail) = rest.split_at(take);
        rest = tail;
        if own.is_empty() {
            parts.push(base.to_string());
        } else {
            parts.push(format!("{}{{{}}}", base, own.join(",")));
        }
    }
    parts.join(".")
}

/// `List`1` → (`List`, 1); a name without arity is (`name`, 0).
fn split_arity(segment: &str) -> (&str, usize) {
    match segment.split_once('`') {
        Some((base, digits)) => (base, digits.parse().unwrap_or(0)),
        None => (segment, 0),
    }
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse_type(&mut self) -> TypeRef {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '[' | ']' | ',' | '&' | '*') {
                break;
            }
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        let name = name.trim_end().to_string();

        let mut ty = if self.at_generic_args() {
            let args = self.parse_generic_args();
            if args.is_empty() {
                TypeRef::Simple(name)
            } else {
                TypeRef::Generic { name, args }
            }
        } else {
            TypeRef::Simple(name)
        };

        loop {
            match self.peek() {
                Some('[') if matches!(self.peek_at(1), Some(']' | ',' | '*')) => {
                    let mut rank = 1;
                    self.pos += 1;
                    while let Some(c) = self.peek() {
                        self.pos += 1;
                        match c {
                            ',' => rank += 1,
                            ']' => break,
                            _ => {}
                        }
                    }
                    ty = TypeRef::Array {
                        element: Box::new(ty),
                        rank,
                    };
                }
                Some('&') => {
                    self.pos += 1;
                    ty = TypeRef::ByRef(Box::new(ty));
                }
                Some('*') => {
                    self.pos += 1;
                    ty = match ty {
                        TypeRef::Simple(name) => TypeRef::Simple(format!("{name}*")),
                        other => other,
                    };
                }
                _ => break,
            }
        }
        ty
    }

    /// A `[` that opens an argument list rather than an array rank.
    fn at_generic_args(&self) -> bool {
        self.peek() == Some('[') && !matches!(self.peek_at(1), Some(']' | ',' | '*') | None)
    }

    fn parse_generic_args(&mut self) -> Vec<TypeRef> {
        let mut args = Vec::new();
        self.pos += 1; // '['
        loop {
            self.skip_ws();
            match self.peek() {
                Some('[') => {
                    // assembly-qualified argument: [Name, Assembly, Version=...]
                    self.pos += 1;
                    args.push(self.parse_type());
                    self.skip_qualifier();
                }
                Some(_) => args.push(self.parse_type()),
                None => break,
            }
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                _ => break,
            }
        }
        args
    }

    /// Skip `, Assembly, Version=..., PublicKeyToken=...]`.
    fn skip_qualifier(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '[' => depth += 1,
                ']' if depth == 0 => break,
                ']' => depth -= 1,
                _ => {}
            }
        }
    }
}

/// Member shape used to derive a lookup key.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Type,
    Property(&'a str),
    Method {
        name: &'a str,
        params: &'a [ParameterInfo],
    },
}

/// `Name` or `Name(T1,T2)` for a method; no parentheses without parameters.
pub fn method_id(name: &str, params: &[ParameterInfo]) -> String {
    if params.is_empty() {
        return name.to_string();
    }
    let types: Vec<String> = params.iter().map(|p| p.ty.doc_name()).collect();
    format!("{}({})", name, types.join(","))
}

/// Comment-store key for `member` declared on (or being) `qualified_name`.
/// Nested types use `.` in keys where metadata writes `+`.
pub fn key_for(qualified_name: &str, member: Member<'_>) -> String {
    let qualified_name = qualified_name.replace('+', ".");
    match member {
        Member::Type => format!("T:{}", qualified_name),
        Member::Property(name) => format!("P:{}.{}", qualified_name, name),
        Member::Method { name, params } => {
            format!("M:{}.{}", qualified_name, method_id(name, params))
        }
    }
}
