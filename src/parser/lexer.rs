//! Logos-based lexer for architecture files
//!
//! Fast tokenization using the logos crate. The token stream is lossless:
//! whitespace and comments come through as trivia so that editor features can
//! scan raw text with the same tokenizer the parser uses.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its kind, text, and byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

impl Token<'_> {
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );
        let kind = result.unwrap_or(TokenKind::Error);
        Some(Token {
            kind,
            text: self.inner.slice(),
            range,
        })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Token kinds of the architecture language
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("architecture")]
    ArchitectureKw,
    #[token("import")]
    ImportKw,
    #[token("as")]
    AsKw,
    #[token("person")]
    PersonKw,
    #[token("system")]
    SystemKw,
    #[token("container")]
    ContainerKw,
    #[token("component")]
    ComponentKw,
    #[token("datastore")]
    DataStoreKw,
    #[token("queue")]
    QueueKw,
    #[token("scenario")]
    ScenarioKw,
    #[token("adr")]
    AdrKw,
    #[token("description")]
    DescriptionKw,
    #[token("technology")]
    TechnologyKw,
    #[token("metadata")]
    MetadataKw,
    #[token("status")]
    StatusKw,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    /// A string literal that runs to end of input.
    #[regex(r#""([^"\\]|\\.)*"#)]
    UnterminatedString,

    /// A block comment opener with no matching close.
    #[token("/*")]
    UnterminatedComment,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("->")]
    Arrow,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,

    /// Anything the lexer does not recognize.
    Error,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Element keywords map onto element kinds.
    pub fn element_kind(self) -> Option<crate::syntax::ElementKind> {
        use crate::syntax::ElementKind;
        match self {
            TokenKind::PersonKw => Some(ElementKind::Person),
            TokenKind::SystemKw => Some(ElementKind::System),
            TokenKind::ContainerKw => Some(ElementKind::Container),
            TokenKind::ComponentKw => Some(ElementKind::Component),
            TokenKind::DataStoreKw => Some(ElementKind::DataStore),
            TokenKind::QueueKw => Some(ElementKind::Queue),
            _ => None,
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::ArchitectureKw
                | TokenKind::ImportKw
                | TokenKind::AsKw
                | TokenKind::PersonKw
                | TokenKind::SystemKw
                | TokenKind::ContainerKw
                | TokenKind::ComponentKw
                | TokenKind::DataStoreKw
                | TokenKind::QueueKw
                | TokenKind::ScenarioKw
                | TokenKind::AdrKw
                | TokenKind::DescriptionKw
                | TokenKind::TechnologyKw
                | TokenKind::MetadataKw
                | TokenKind::StatusKw
        )
    }

    /// How the token is named in "expected ..." messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::String => "string",
            TokenKind::Arrow => "'->'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::UnterminatedString => "unterminated string",
            TokenKind::UnterminatedComment => "unterminated comment",
            TokenKind::Error => "invalid character",
            kind if kind.is_keyword() => "keyword",
            _ => "token",
        }
    }
}

/// Keywords in source spelling, for completion.
pub const KEYWORDS: &[&str] = &[
    "architecture",
    "import",
    "as",
    "person",
    "system",
    "container",
    "component",
    "datastore",
    "queue",
    "scenario",
    "adr",
    "description",
    "technology",
    "metadata",
    "status",
];
