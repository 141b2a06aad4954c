//! # Texto Indexado por Caractere
//!
//! As anotações ACE contam offsets em caracteres, enquanto `str` em Rust é indexado
//! por bytes. `CharText` guarda o texto junto com a tabela caractere → byte, permitindo
//! fatiar e buscar em coordenadas de caractere sem percorrer a string a cada consulta.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::span::Span;

/// Entidades XML que podem aparecer escapadas no texto gravado de uma anotação.
static XML_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&(amp|lt|gt);").expect("regex de entidades XML válida"));

/// Substituições na ordem em que são aplicadas.
static XML_REPLACEMENTS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [("amp", "&"), ("lt", "<"), ("gt", ">")]
        .into_iter()
        .map(|(entity, plain)| {
            let pattern = Regex::new(&format!("(?i)&{entity};")).expect("entidade XML constante");
            (pattern, plain)
        })
        .collect()
});

/// Texto com índice de caracteres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharText {
    text: String,
    /// `offsets[i]` é o byte onde começa o caractere `i`; a última entrada é `text.len()`.
    offsets: Vec<usize>,
}

impl CharText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut offsets: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Comprimento em caracteres.
    pub fn len_chars(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte correspondente ao caractere `index` (aceita `index == len_chars()`).
    pub fn byte_of(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Caractere que começa no byte `byte`, se `byte` for uma fronteira de caractere.
    pub fn char_of(&self, byte: usize) -> Option<usize> {
        self.offsets.binary_search(&byte).ok()
    }

    /// Texto coberto por `span`, ou `None` se o span excede o texto.
    pub fn slice(&self, span: Span) -> Option<&str> {
        if span.end > self.len_chars() || span.start > span.end {
            return None;
        }
        Some(&self.text[self.offsets[span.start]..self.offsets[span.end]])
    }

    /// Índice (em caracteres) da primeira ocorrência de `needle`.
    pub fn find(&self, needle: &str) -> Option<usize> {
        self.text.find(needle).and_then(|byte| self.char_of(byte))
    }

    /// Última ocorrência de `needle` que **começa** em um índice `<= from`.
    ///
    /// `from` acima do comprimento é limitado ao comprimento do texto.
    pub fn rfind_from(&self, needle: &str, from: usize) -> Option<usize> {
        let from = from.min(self.len_chars());
        if needle.is_empty() {
            return Some(from);
        }
        let from_byte = self.offsets[from];
        let mut limit = (from_byte + needle.len()).min(self.text.len());
        while !self.text.is_char_boundary(limit) {
            limit -= 1;
        }
        let byte = self.text[..limit].rfind(needle)?;
        self.char_of(byte)
    }
}

/// Comprimento de `s` em caracteres.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Desfaz `&amp;`, `&lt;` e `&gt;` (sem diferenciar maiúsculas).
///
/// As substituições são aplicadas em sequência, como em três `replace` encadeados:
/// `&amp;lt;` vira `&lt;` e depois `<`.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !XML_ENTITY.is_match(s) {
        return Cow::Borrowed(s);
    }
    let mut current = s.to_string();
    for (pattern, plain) in XML_REPLACEMENTS.iter() {
        current = pattern.replace_all(&current, *plain).into_owned();
    }
    Cow::Owned(current)
}
