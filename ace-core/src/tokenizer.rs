//! # Tokenizadores
//!
//! Divide o texto de uma sentença em tokens, preservando a posição de cada um em
//! **caracteres** (mesma unidade dos spans de anotação) e o espaço em branco ao redor.
//! Os offsets são relativos ao texto recebido: para uma sentença, relativos ao início
//! da sentença.
//!
//! ## Modos
//!
//! - **Regex** (padrão): sequências de caracteres de palavra (`\w`) ou sequências de
//!   pontuação. `"Smith's"` → `Smith`, `'`, `s`.
//! - **Whitespace**: apenas espaço em branco separa tokens.
//! - **Unicode**: fronteiras de palavra UAX #29 (`unicode-segmentation`).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ace_core::tokenizer::{tokenize_with_mode, TokenizerMode};
//!
//! let tokens = tokenize_with_mode("Hi, John Smith.", TokenizerMode::Regex);
//! let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(words, vec!["Hi", ",", "John", "Smith", "."]);
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::text::CharText;

/// Padrão de token do modo Regex.
pub const DEFAULT_TOKEN_PATTERN: &str = r"\w+|[^\w \t\r\n]+";

static DEFAULT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_TOKEN_PATTERN).expect("padrão de token válido"));

static NON_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^ \t\r\n]+").expect("padrão de espaço válido"));

/// Token que deve ser quebrado no primeiro hífen: hífen seguido de maiúscula
/// (`anti-American`) ou nome com dois hífens (`Al-Sheikh-Ali`).
static SPLITTABLE_HYPHEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^-]*-[A-Z].*|[^-]*[A-Z][^-]*-[^-]+-[^-]*)$").expect("padrão de hífen válido")
});

/// Um token extraído do texto.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Offset inicial em caracteres (inclusivo).
    pub start: usize,
    /// Offset final em caracteres (exclusivo).
    pub end: usize,
    /// Posição do token na sentença.
    pub index: usize,
    /// Texto entre o token anterior e este.
    pub before: String,
    /// Texto entre este token e o próximo.
    pub after: String,
}

/// Estratégias de tokenização disponíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    #[default]
    Regex,
    Whitespace,
    Unicode,
}

impl TokenizerMode {
    pub fn name(&self) -> &'static str {
        match self {
            TokenizerMode::Regex => "regex",
            TokenizerMode::Whitespace => "whitespace",
            TokenizerMode::Unicode => "unicode",
        }
    }
}

impl fmt::Display for TokenizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TokenizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "regex" => Ok(TokenizerMode::Regex),
            "whitespace" => Ok(TokenizerMode::Whitespace),
            "unicode" => Ok(TokenizerMode::Unicode),
            other => Err(format!("tokenizador desconhecido: {other}")),
        }
    }
}

/// Tokenizador plugável.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Tokens são os trechos que casam com um padrão.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    pattern: Regex,
}

impl Default for RegexTokenizer {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TOKEN.clone(),
        }
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        build_tokens(text, self.pattern.find_iter(text).map(|m| (m.start(), m.end())))
    }
}

/// Separa apenas por espaço, tabulação e quebra de linha.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        build_tokens(text, NON_SPACE.find_iter(text).map(|m| (m.start(), m.end())))
    }
}

/// Fronteiras de palavra UAX #29, descartando segmentos só de espaço.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeTokenizer;

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let ranges = text
            .split_word_bound_indices()
            .filter(|(_, segment)| !segment.trim().is_empty())
            .map(|(start, segment)| (start, start + segment.len()));
        build_tokens(text, ranges)
    }
}

/// Tokenizador para um modo.
pub fn tokenizer_for(mode: TokenizerMode) -> Box<dyn Tokenizer> {
    match mode {
        TokenizerMode::Regex => Box::new(RegexTokenizer::default()),
        TokenizerMode::Whitespace => Box::new(WhitespaceTokenizer),
        TokenizerMode::Unicode => Box::new(UnicodeTokenizer),
    }
}

/// Tokeniza um texto com o modo especificado.
pub fn tokenize_with_mode(text: &str, mode: TokenizerMode) -> Vec<Token> {
    tokenizer_for(mode).tokenize(text)
}

/// Monta tokens a partir de intervalos de bytes em ordem e sem sobreposição.
fn build_tokens(text: &str, byte_ranges: impl Iterator<Item = (usize, usize)>) -> Vec<Token> {
    let indexed = CharText::new(text);
    let to_char = |byte: usize| indexed.char_of(byte).unwrap_or_else(|| indexed.len_chars());
    let ranges: Vec<(usize, usize)> = byte_ranges.filter(|(s, e)| s < e).collect();

    ranges
        .iter()
        .enumerate()
        .map(|(index, &(start, end))| {
            let previous_end = if index == 0 { 0 } else { ranges[index - 1].1 };
            let next_start = ranges.get(index + 1).map_or(text.len(), |r| r.0);
            Token {
                text: text[start..end].to_string(),
                start: to_char(start),
                end: to_char(end),
                index,
                before: text[previous_end..start].to_string(),
                after: text[end..next_start].to_string(),
            }
        })
        .collect()
}

/// Quebra tokens hifenizados que juntam nomes próprios (`U.S.-Iraqi` → `U.S.`, `Iraqi`).
///
/// O hífen sai da sequência de tokens e vira o `after`/`before` das duas partes.
pub fn fix_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut fixed = Vec::with_capacity(tokens.len());
    for token in tokens {
        let mut current = token;
        loop {
            let dash = current.text.find('-').filter(|&d| d > 0);
            match dash {
                Some(dash) if SPLITTABLE_HYPHEN.is_match(&current.text) => {
                    let head_len = current.text[..dash].chars().count();
                    let rest = Token {
                        text: current.text[dash + 1..].to_string(),
                        start: current.start + head_len + 1,
                        end: current.end,
                        index: 0,
                        before: "-".to_string(),
                        after: std::mem::take(&mut current.after),
                    };
                    current.text.truncate(dash);
                    current.end = current.start + head_len;
                    current.after = "-".to_string();
                    fixed.push(current);
                    current = rest;
                }
                _ => {
                    fixed.push(current);
                    break;
                }
            }
        }
    }
    for (index, token) in fixed.iter_mut().enumerate() {
        token.index = index;
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_regex_tokenizer_punctuation() {
        let tokens = tokenize_with_mode(
            "Apparently \"the thing's\" teeth (but not) are.",
            TokenizerMode::Regex,
        );
        assert_eq!(
            words(&tokens),
            vec![
                "Apparently", "\"", "the", "thing", "'", "s", "\"", "teeth", "(", "but", "not",
                ")", "are", "."
            ]
        );
    }

    #[test]
    fn test_regex_tokenizer_keeps_punctuation_runs() {
        let tokens = tokenize_with_mode("I'm so sad le:-(", TokenizerMode::Regex);
        assert_eq!(words(&tokens), vec!["I", "'", "m", "so", "sad", "le", ":-("]);
    }

    #[test]
    fn test_regex_tokenizer_non_ascii() {
        let tokens = tokenize_with_mode("Lol i mean wah, 又是我做坏人.", TokenizerMode::Regex);
        assert_eq!(words(&tokens), vec!["Lol", "i", "mean", "wah", ",", "又是我做坏人", "."]);
        let last = tokens.last().unwrap();
        assert_eq!((last.start, last.end), (22, 23));
    }

    #[test]
    fn test_char_offsets_and_whitespace() {
        let tokens = tokenize_with_mode("São  Paulo", TokenizerMode::Whitespace);
        assert_eq!(words(&tokens), vec!["São", "Paulo"]);
        assert_eq!((tokens[1].start, tokens[1].end), (5, 10));
        assert_eq!(tokens[0].after, "  ");
        assert_eq!(tokens[1].before, "  ");
        assert_eq!(tokens[1].index, 1);
    }

    #[test]
    fn test_unicode_tokenizer() {
        let tokens = tokenize_with_mode("Hello, world!", TokenizerMode::Unicode);
        assert_eq!(words(&tokens), vec!["Hello", ",", "world", "!"]);
    }

    #[test]
    fn test_fix_tokens_splits_hyphenated_names() {
        let tokens = tokenize_with_mode(
            "pro-Saddam U.S.-Iraqi Al-Sheikh-Ali well-known U.S.-led",
            TokenizerMode::Whitespace,
        );
        let fixed = fix_tokens(tokens);
        assert_eq!(
            words(&fixed),
            vec!["pro", "Saddam", "U.S.", "Iraqi", "Al", "Sheikh", "Ali", "well-known", "U.S.-led"]
        );
        let saddam = &fixed[1];
        assert_eq!((saddam.start, saddam.end), (4, 10));
        assert_eq!(saddam.before, "-");
        assert_eq!(saddam.after, " ");
        assert_eq!(fixed[0].after, "-");
        assert_eq!(fixed[8].index, 8);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Unicode".parse::<TokenizerMode>(), Ok(TokenizerMode::Unicode));
        assert!("bpe".parse::<TokenizerMode>().is_err());
    }
}
