//! # Spans de Caracteres
//!
//! Intervalo semiaberto `[start, end)` medido em **caracteres** (escalares Unicode)
//! do texto de um documento. Todas as anotações ACE (extents, heads, âncoras, escopos)
//! e todas as sentenças são descritas por um `Span`.
//!
//! ## Ordenação
//!
//! Spans são ordenados por `start` crescente e, em empate, por `end` **decrescente**:
//! o span mais longo vem primeiro. É a ordem natural de catálogos de menções onde
//! uma menção externa precede as menções aninhadas que começam no mesmo ponto.
//!
//! ```rust
//! use ace_core::span::Span;
//!
//! let outer = Span::new(0, 10);
//! let inner = Span::new(0, 4);
//! assert!(outer < inner);
//! assert!(outer.contains(&inner));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Intervalo `[start, end)` em offsets de caracteres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Offset inicial (inclusivo).
    pub start: usize,
    /// Offset final (exclusivo).
    pub end: usize,
}

impl Span {
    /// Cria um span. Um `end` menor que `start` é rebaixado para `start` (span vazio).
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Número de caracteres cobertos.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `true` se `other` está inteiramente dentro deste span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// `true` se os dois spans compartilham ao menos um caractere.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Traduz o span para coordenadas relativas a `origin`.
    ///
    /// Retorna `None` se o span começa antes da origem.
    pub fn relative_to(&self, origin: usize) -> Option<Span> {
        if self.start < origin {
            return None;
        }
        Some(Span {
            start: self.start - origin,
            end: self.end - origin,
        })
    }

    /// Interseção com `outer`, ou `None` se forem disjuntos.
    pub fn clip_to(&self, outer: &Span) -> Option<Span> {
        let start = self.start.max(outer.start);
        let end = self.end.min(outer.end);
        (start < end || (start == end && outer.contains(self))).then_some(Span { start, end })
    }
}

impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.end.cmp(&self.end))
    }
}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_longer_first() {
        let mut spans = vec![Span::new(5, 6), Span::new(0, 2), Span::new(0, 8), Span::new(3, 4)];
        spans.sort();
        assert_eq!(
            spans,
            vec![Span::new(0, 8), Span::new(0, 2), Span::new(3, 4), Span::new(5, 6)]
        );
    }

    #[test]
    fn test_contains_and_overlaps() {
        let sentence = Span::new(10, 20);
        assert!(sentence.contains(&Span::new(10, 20)));
        assert!(sentence.contains(&Span::new(12, 15)));
        assert!(!sentence.contains(&Span::new(18, 21)));
        assert!(sentence.overlaps(&Span::new(18, 21)));
        assert!(!sentence.overlaps(&Span::new(20, 25)));
    }

    #[test]
    fn test_relative_to() {
        let span = Span::new(12, 15);
        assert_eq!(span.relative_to(10), Some(Span::new(2, 5)));
        assert_eq!(span.relative_to(13), None);
    }

    #[test]
    fn test_clip_to() {
        let sentence = Span::new(10, 20);
        assert_eq!(Span::new(5, 15).clip_to(&sentence), Some(Span::new(10, 15)));
        assert_eq!(Span::new(21, 25).clip_to(&sentence), None);
        assert_eq!(Span::new(12, 12).clip_to(&sentence), Some(Span::new(12, 12)));
    }

    #[test]
    fn test_new_never_inverts() {
        let span = Span::new(7, 3);
        assert!(span.is_empty());
        assert_eq!(span.start, 7);
    }
}
