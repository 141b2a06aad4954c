//! Conversão de spans de caracteres em intervalos de tokens.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::span::Span;
use crate::tokenizer::Token;

/// Intervalo semiaberto `[start, end)` de índices de token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Intervalo de tokens que cobre `span`.
///
/// O início é o primeiro token que contém `span.start`; o fim é o último token que
/// contém o caractere anterior a `span.end`. `None` quando alguma das pontas cai fora
/// dos tokens (espaço em branco, texto não tokenizado).
pub fn find_token_span(span: Span, tokens: &[Token]) -> Option<TokenSpan> {
    let start = tokens
        .iter()
        .position(|t| t.start <= span.start && span.start < t.end)?;
    let end = tokens
        .iter()
        .rposition(|t| t.start < span.end && span.end <= t.end)?
        + 1;
    (start < end).then_some(TokenSpan { start, end })
}

/// Como [`find_token_span`], registrando o contexto da falha.
pub fn map_mention_span(
    document: &str,
    mention: &str,
    span: Span,
    tokens: &[Token],
) -> Option<TokenSpan> {
    let mapped = find_token_span(span, tokens);
    if mapped.is_none() {
        let rendered: Vec<String> = tokens
            .iter()
            .map(|t| format!("{}[{},{})", t.text, t.start, t.end))
            .collect();
        warn!(
            "{}: menção {} em {} não corresponde a fronteiras de token: {}",
            document,
            mention,
            span,
            rendered.join(" ")
        );
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{tokenize_with_mode, TokenizerMode};

    fn tokens() -> Vec<Token> {
        tokenize_with_mode("John Smith works in Paris", TokenizerMode::Regex)
    }

    #[test]
    fn test_exact_token_boundaries() {
        let tokens = tokens();
        assert_eq!(
            find_token_span(Span::new(0, 10), &tokens),
            Some(TokenSpan { start: 0, end: 2 })
        );
        assert_eq!(
            find_token_span(Span::new(20, 25), &tokens),
            Some(TokenSpan { start: 4, end: 5 })
        );
    }

    #[test]
    fn test_partial_token_expands() {
        // "mith wor" começa dentro de "Smith" e termina dentro de "works".
        assert_eq!(
            find_token_span(Span::new(6, 14), &tokens()),
            Some(TokenSpan { start: 1, end: 3 })
        );
    }

    #[test]
    fn test_unmappable_span() {
        let tokens = tokens();
        // Começa no espaço entre "John" e "Smith".
        assert_eq!(find_token_span(Span::new(4, 10), &tokens), None);
        // Ultrapassa o texto tokenizado.
        assert_eq!(find_token_span(Span::new(20, 30), &tokens), None);
        assert_eq!(map_mention_span("doc", "E1-1", Span::new(20, 30), &tokens), None);
    }
}
