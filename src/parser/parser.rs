//! Recursive-descent parser producing a [`Model`].
//!
//! Errors inside a declaration are recoverable: the parser records them,
//! skips the offending token and keeps going, so one typo does not hide the
//! rest of the file. Input that ends inside a block, string or comment is
//! fatal because no usable tree can be built around it.

use text_size::TextSize;

use super::error::{SyntaxError, SyntaxErrorKind};
use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{LineIndex, Span};
use crate::syntax::{
    Decision, Decl, Element, ElementKind, Import, MetadataEntry, Model, Name, Reference, Relation,
    Scenario,
};

const MAX_ERRORS: usize = 64;

type PResult<T> = Result<T, SyntaxError>;

pub(crate) struct Parser<'t> {
    tokens: Vec<Token<'t>>,
    spans: Vec<Span>,
    pos: usize,
    eof_span: Span,
    errors: Vec<SyntaxError>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        let line_index = LineIndex::new(text);
        let end = line_index.position(text, TextSize::of(text));
        let mut tokens = Vec::new();
        let mut spans = Vec::new();
        for token in tokenize(text).into_iter().filter(|t| !t.is_trivia()) {
            tokens.push(token);
            spans.push(Span::new(
                line_index.position(text, token.range.start()),
                line_index.position(text, token.range.end()),
            ));
        }
        Self {
            tokens,
            spans,
            pos: 0,
            eof_span: Span::new(end, end),
            errors: Vec::new(),
        }
    }

    /// Parse the whole input. `Err` carries the fatal error plus everything
    /// recorded before it.
    pub(crate) fn parse(mut self) -> Result<(Model, Vec<SyntaxError>), (SyntaxError, Vec<SyntaxError>)> {
        if let Err(fatal) = self.check_lexical() {
            return Err((fatal, self.errors));
        }
        match self.parse_model() {
            Ok(model) => Ok((model, self.errors)),
            Err(fatal) => Err((fatal, self.errors)),
        }
    }

    // ========================================================================
    // TOKEN CURSOR
    // ========================================================================

    fn peek(&self) -> Option<TokenKind> {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn current_span(&self) -> Span {
        self.spans.get(self.pos).copied().unwrap_or(self.eof_span)
    }

    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.spans.get(idx).copied())
            .unwrap_or(self.eof_span)
    }

    fn bump(&mut self) -> Option<(Token<'t>, Span)> {
        let token = *self.tokens.get(self.pos)?;
        let span = self.spans[self.pos];
        self.pos += 1;
        Some((token, span))
    }

    fn eat(&mut self, kind: TokenKind) -> Option<(Token<'t>, Span)> {
        if self.at(kind) { self.bump() } else { None }
    }

    fn error(&mut self, error: SyntaxError) -> PResult<()> {
        self.errors.push(error);
        if self.errors.len() >= MAX_ERRORS {
            return Err(SyntaxError::new(
                SyntaxErrorKind::TooManyErrors,
                format!("too many syntax errors (stopped after {MAX_ERRORS})"),
                self.current_span(),
            ));
        }
        Ok(())
    }

    /// Consume `kind` or record a missing-token error without consuming.
    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Option<(Token<'t>, Span)>> {
        if let Some(found) = self.eat(kind) {
            return Ok(Some(found));
        }
        let found = self.peek().map(TokenKind::describe).unwrap_or("end of file");
        self.error(SyntaxError::new(
            SyntaxErrorKind::MissingToken,
            format!("expected {what}, found {found}"),
            self.current_span(),
        ))?;
        Ok(None)
    }

    fn expect_string(&mut self, what: &str) -> PResult<Option<std::sync::Arc<str>>> {
        Ok(self
            .expect(TokenKind::String, what)?
            .map(|(token, _)| unquote(token.text).into()))
    }

    /// Record an unexpected-token error and skip the token.
    fn unexpected(&mut self, context: &str) -> PResult<()> {
        let span = self.current_span();
        let text = self.tokens.get(self.pos).map(|t| t.text).unwrap_or("");
        self.bump();
        self.error(SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken,
            format!("unexpected '{text}' {context}"),
            span,
        ))
    }

    fn unclosed(&self, what: &str, open: Span) -> SyntaxError {
        SyntaxError::new(
            SyntaxErrorKind::UnexpectedEof,
            format!("{what} opened here is never closed"),
            open,
        )
        .with_hint("add a closing '}'")
    }

    /// Reject input the lexer could only partially tokenize.
    fn check_lexical(&mut self) -> PResult<()> {
        let mut idx = 0;
        while idx < self.tokens.len() {
            let span = self.spans[idx];
            match self.tokens[idx].kind {
                TokenKind::UnterminatedString => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedEof,
                        "unterminated string literal",
                        span,
                    )
                    .with_hint("add a closing '\"'"));
                }
                TokenKind::UnterminatedComment => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedEof,
                        "unterminated block comment",
                        span,
                    )
                    .with_hint("add a closing '*/'"));
                }
                TokenKind::Error => {
                    let text = self.tokens[idx].text;
                    self.tokens.remove(idx);
                    self.spans.remove(idx);
                    self.error(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken,
                        format!("invalid character '{text}'"),
                        span,
                    ))?;
                    continue;
                }
                _ => {}
            }
            idx += 1;
        }
        Ok(())
    }

    // ========================================================================
    // GRAMMAR
    // ========================================================================

    fn parse_model(&mut self) -> PResult<Model> {
        let mut model = Model::new();

        if let Some((_, open)) = self.eat(TokenKind::ArchitectureKw) {
            model.name = self.expect_string("architecture name")?;
            if self.expect(TokenKind::LBrace, "'{'")?.is_some() {
                self.parse_root_items(&mut model, true)?;
                if self.eat(TokenKind::RBrace).is_none() {
                    return Err(self.unclosed("architecture block", open));
                }
            }
        }

        self.parse_root_items(&mut model, false)?;
        Ok(model)
    }

    fn parse_root_items(&mut self, model: &mut Model, in_block: bool) -> PResult<()> {
        loop {
            match self.peek() {
                None => return Ok(()),
                Some(TokenKind::RBrace) if in_block => return Ok(()),
                Some(TokenKind::ImportKw) => model.imports.extend(self.parse_import()?),
                Some(TokenKind::ScenarioKw) => model.scenarios.extend(self.parse_scenario()?),
                Some(TokenKind::AdrKw) => model.decisions.extend(self.parse_decision()?),
                Some(kind) if kind.element_kind().is_some() => {
                    model.elements.extend(self.parse_element(None)?);
                }
                Some(TokenKind::Ident) => model.relations.extend(self.parse_relation()?),
                Some(_) => self.unexpected("at model root")?,
            }
        }
    }

    fn parse_import(&mut self) -> PResult<Option<Import>> {
        let Some((_, start)) = self.bump() else {
            return Ok(None);
        };
        let Some(path) = self.expect_string("import path")? else {
            return Ok(None);
        };
        let mut alias = None;
        if self.eat(TokenKind::AsKw).is_some() {
            alias = self
                .expect(TokenKind::Ident, "import alias")?
                .map(|(token, _)| Name::from(token.text));
        }
        Ok(Some(Import {
            path,
            alias,
            span: start.cover(self.prev_span()),
        }))
    }

    fn parse_element(&mut self, parent: Option<ElementKind>) -> PResult<Option<Element>> {
        let Some((keyword, keyword_span)) = self.bump() else {
            return Ok(None);
        };
        let Some(kind) = keyword.kind.element_kind() else {
            return Ok(None);
        };
        let Some((name, name_span)) = self.expect(TokenKind::Ident, "element identifier")? else {
            return Ok(None);
        };

        let mut decl = Decl::new(name.text, name_span);
        if let Some((label, _)) = self.eat(TokenKind::String) {
            decl.label = Some(unquote(label.text).into());
        }

        let mut children = Vec::new();
        if let Some((_, open)) = self.eat(TokenKind::LBrace) {
            self.parse_element_body(kind, &mut decl, &mut children, open)?;
        }
        decl.span = keyword_span.cover(self.prev_span());

        if !kind.allowed_in(parent) {
            let place = match parent {
                None => "at model root".to_string(),
                Some(parent) => format!("inside a {parent}"),
            };
            self.error(SyntaxError::new(
                SyntaxErrorKind::InvalidNesting,
                format!("{kind} '{}' cannot be declared {place}", decl.name),
                keyword_span,
            ))?;
        }

        Ok(Some(Element::new(kind, decl, children)))
    }

    fn parse_element_body(
        &mut self,
        kind: ElementKind,
        decl: &mut Decl,
        children: &mut Vec<Element>,
        open: Span,
    ) -> PResult<()> {
        loop {
            match self.peek() {
                None => return Err(self.unclosed(&format!("{kind} body"), open)),
                Some(TokenKind::RBrace) => {
                    self.bump();
                    return Ok(());
                }
                Some(TokenKind::DescriptionKw) => {
                    self.bump();
                    if let Some(text) = self.expect_string("description text")? {
                        decl.description = Some(text);
                    }
                }
                Some(TokenKind::TechnologyKw) => {
                    self.bump();
                    if let Some(text) = self.expect_string("technology text")? {
                        decl.technology = Some(text);
                    }
                }
                Some(TokenKind::MetadataKw) => self.parse_metadata(&mut decl.metadata)?,
                Some(next) if next.element_kind().is_some() => {
                    children.extend(self.parse_element(Some(kind))?);
                }
                Some(TokenKind::Ident) => decl.relations.extend(self.parse_relation()?),
                Some(next @ (TokenKind::ImportKw | TokenKind::ScenarioKw | TokenKind::AdrKw)) => {
                    self.error(
                        SyntaxError::new(
                            SyntaxErrorKind::MisplacedDeclaration,
                            format!("{} declarations are only allowed at model root", keyword_text(next)),
                            self.current_span(),
                        )
                        .with_hint("move the declaration out of the element body"),
                    )?;
                    // parse it anyway to stay in sync, then drop it
                    match next {
                        TokenKind::ImportKw => {
                            self.parse_import()?;
                        }
                        TokenKind::ScenarioKw => {
                            self.parse_scenario()?;
                        }
                        _ => {
                            self.parse_decision()?;
                        }
                    }
                }
                Some(_) => self.unexpected(&format!("in {kind} body"))?,
            }
        }
    }

    fn parse_metadata(&mut self, entries: &mut Vec<MetadataEntry>) -> PResult<()> {
        let Some((_, start)) = self.bump() else {
            return Ok(());
        };
        if self.expect(TokenKind::LBrace, "'{' after metadata")?.is_none() {
            return Ok(());
        }
        loop {
            match self.peek() {
                None => return Err(self.unclosed("metadata block", start)),
                Some(TokenKind::RBrace) => {
                    self.bump();
                    return Ok(());
                }
                Some(TokenKind::Ident) => {
                    let Some((key, key_span)) = self.bump() else {
                        return Ok(());
                    };
                    if self.expect(TokenKind::Colon, "':' after metadata key")?.is_none() {
                        continue;
                    }
                    if let Some(value) = self.expect_string("metadata value")? {
                        entries.push(MetadataEntry {
                            key: Name::from(key.text),
                            value,
                            span: key_span.cover(self.prev_span()),
                        });
                    }
                }
                Some(_) => self.unexpected("in metadata block")?,
            }
        }
    }

    fn parse_reference(&mut self) -> PResult<Option<Reference>> {
        let Some((first, first_span)) = self.expect(TokenKind::Ident, "element reference")? else {
            return Ok(None);
        };
        let mut segments = vec![Name::from(first.text)];
        let mut span = first_span;
        while self.eat(TokenKind::Dot).is_some() {
            match self.expect(TokenKind::Ident, "identifier after '.'")? {
                Some((segment, segment_span)) => {
                    segments.push(Name::from(segment.text));
                    span = span.cover(segment_span);
                }
                None => break,
            }
        }
        Ok(Some(Reference::new(segments, span)))
    }

    fn parse_relation(&mut self) -> PResult<Option<Relation>> {
        let Some(from) = self.parse_reference()? else {
            return Ok(None);
        };
        if self.expect(TokenKind::Arrow, &format!("'->' after '{from}'"))?.is_none() {
            return Ok(None);
        }
        let Some(to) = self.parse_reference()? else {
            return Ok(None);
        };

        let mut relation = Relation::new(from, to);
        // an identifier that does not start another relation is the verb
        if self.at(TokenKind::Ident)
            && !matches!(self.nth(1), Some(TokenKind::Arrow | TokenKind::Dot))
        {
            relation.verb = self.bump().map(|(token, _)| Name::from(token.text));
        }
        if let Some((label, _)) = self.eat(TokenKind::String) {
            relation.label = Some(unquote(label.text).into());
        }
        relation.span = relation.span.cover(self.prev_span());
        Ok(Some(relation))
    }

    fn parse_scenario(&mut self) -> PResult<Option<Scenario>> {
        let Some((_, start)) = self.bump() else {
            return Ok(None);
        };
        let Some((name, name_span)) = self.expect(TokenKind::Ident, "scenario identifier")? else {
            return Ok(None);
        };
        let label = self
            .eat(TokenKind::String)
            .map(|(token, _)| unquote(token.text).into());
        let mut steps = Vec::new();
        if let Some((_, open)) = self.eat(TokenKind::LBrace) {
            loop {
                match self.peek() {
                    None => return Err(self.unclosed("scenario body", open)),
                    Some(TokenKind::RBrace) => {
                        self.bump();
                        break;
                    }
                    Some(TokenKind::Ident) => steps.extend(self.parse_relation()?),
                    Some(_) => self.unexpected("in scenario body")?,
                }
            }
        }
        Ok(Some(Scenario {
            name: Name::from(name.text),
            name_span,
            label,
            steps,
            span: start.cover(self.prev_span()),
        }))
    }

    fn parse_decision(&mut self) -> PResult<Option<Decision>> {
        let Some((_, start)) = self.bump() else {
            return Ok(None);
        };
        let Some((name, name_span)) = self.expect(TokenKind::Ident, "decision identifier")? else {
            return Ok(None);
        };
        let mut decision = Decision {
            name: Name::from(name.text),
            name_span,
            title: self
                .eat(TokenKind::String)
                .map(|(token, _)| unquote(token.text).into()),
            status: None,
            description: None,
            span: start,
        };
        if let Some((_, open)) = self.eat(TokenKind::LBrace) {
            loop {
                match self.peek() {
                    None => return Err(self.unclosed("adr body", open)),
                    Some(TokenKind::RBrace) => {
                        self.bump();
                        break;
                    }
                    Some(TokenKind::StatusKw) => {
                        self.bump();
                        decision.status = self.expect_string("status text")?.or(decision.status);
                    }
                    Some(TokenKind::DescriptionKw) => {
                        self.bump();
                        decision.description =
                            self.expect_string("description text")?.or(decision.description);
                    }
                    Some(_) => self.unexpected("in adr body")?,
                }
            }
        }
        decision.span = start.cover(self.prev_span());
        Ok(Some(decision))
    }
}

fn keyword_text(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::ImportKw => "import",
        TokenKind::ScenarioKw => "scenario",
        TokenKind::AdrKw => "adr",
        _ => "this",
    }
}

/// Strip the surrounding quotes of a string token and process escapes.
pub(crate) fn unquote(token: &str) -> String {
    let inner = token
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(token);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
