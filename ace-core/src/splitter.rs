//! # Segmentação de Sentenças
//!
//! O segmentador divide o texto de um documento em sentenças, guardando para cada uma
//! o espaço em branco antes e depois. A concatenação
//! `primeira.before + Σ (sentença.text + sentença.after)` reconstrói o texto original.
//!
//! O segmentador padrão é baseado em regras: quebra após `.`, `!` ou `?` seguidos de
//! espaço, exceto em abreviações conhecidas, iniciais (`J. Smith`) e quando a próxima
//! palavra começa com minúscula. Quebras de parágrafo e manchetes sem pontuação ficam
//! a cargo de [`fix_boundaries`](crate::boundary::fix_boundaries).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Sentença como produzida pelo segmentador, em coordenadas do documento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSentence {
    pub span: Span,
    pub text: String,
    /// Espaço em branco entre a sentença anterior e esta.
    pub before: String,
    /// Espaço em branco entre esta sentença e a próxima.
    pub after: String,
}

/// Segmentador de sentenças plugável.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<RawSentence>;
}

/// Abreviações inglesas cujo ponto não encerra sentença.
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Mt", "Gen", "Gov", "Sen", "Rep", "Lt",
    "Col", "Capt", "Sgt", "Cmdr", "Adm", "Rev", "Hon", "Pres", "Corp", "Inc", "Ltd", "Co", "Bros",
    "vs", "etc", "approx", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct",
    "Nov", "Dec", "No", "Nos", "Vol", "Fig", "Ave", "Blvd", "Dept", "Univ", "Calif", "Mass",
    "Wash", "Fla", "Ill",
];

/// Fechamentos que podem seguir a pontuação final (`."`, `?)`).
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '\u{201D}', '\u{2019}', '`'];

/// Segmentador baseado em pontuação e lista de abreviações.
#[derive(Debug, Clone)]
pub struct RuleSentenceSplitter {
    abbreviations: HashSet<String>,
}

impl Default for RuleSentenceSplitter {
    fn default() -> Self {
        Self::with_abbreviations(ABBREVIATIONS.iter().copied())
    }
}

impl RuleSentenceSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abbreviations<'a>(abbreviations: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            abbreviations: abbreviations.into_iter().map(str::to_string).collect(),
        }
    }

    /// O ponto em `dot` pertence a uma abreviação ou inicial.
    fn is_abbreviation(&self, chars: &[char], dot: usize) -> bool {
        if chars[dot] != '.' {
            return false;
        }
        let word_start = chars[..dot]
            .iter()
            .rposition(|c| !c.is_alphabetic())
            .map_or(0, |i| i + 1);
        let word: String = chars[word_start..dot].iter().collect();
        if word.is_empty() {
            return false;
        }
        let single_initial = word.chars().count() == 1 && word.chars().all(char::is_uppercase);
        single_initial || self.abbreviations.contains(&word)
    }

    /// Offsets (em caracteres) onde cada sentença termina.
    fn cut_points(&self, chars: &[char]) -> Vec<usize> {
        let mut cuts = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if !matches!(chars[i], '.' | '!' | '?') {
                i += 1;
                continue;
            }
            let last_terminator = {
                let mut j = i;
                while j + 1 < chars.len() && matches!(chars[j + 1], '.' | '!' | '?') {
                    j += 1;
                }
                j
            };
            let mut end = last_terminator + 1;
            while end < chars.len() && CLOSERS.contains(&chars[end]) {
                end += 1;
            }
            let followed_by_space = end < chars.len() && chars[end].is_whitespace();
            if followed_by_space
                && !self.is_abbreviation(chars, last_terminator)
                && !next_word_is_lowercase(chars, end)
            {
                cuts.push(end);
            }
            i = end;
        }
        cuts.push(chars.len());
        cuts
    }
}

fn next_word_is_lowercase(chars: &[char], from: usize) -> bool {
    chars[from..]
        .iter()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c.is_lowercase())
}

/// Reduz `[start, end)` até não começar nem terminar com espaço.
fn trim_range(chars: &[char], mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    (start, end)
}

impl SentenceSplitter for RuleSentenceSplitter {
    fn split(&self, text: &str) -> Vec<RawSentence> {
        let chars: Vec<char> = text.chars().collect();
        let mut ranges = Vec::new();
        let mut segment_start = 0;
        for cut in self.cut_points(&chars) {
            let (start, end) = trim_range(&chars, segment_start, cut);
            if start < end {
                ranges.push((start, end));
            }
            segment_start = cut;
        }

        let collect = |start: usize, end: usize| chars[start..end].iter().collect::<String>();
        ranges
            .iter()
            .enumerate()
            .map(|(k, &(start, end))| {
                let previous_end = if k == 0 { 0 } else { ranges[k - 1].1 };
                let next_start = ranges.get(k + 1).map_or(chars.len(), |r| r.0);
                RawSentence {
                    span: Span::new(start, end),
                    text: collect(start, end),
                    before: collect(previous_end, start),
                    after: collect(end, next_start),
                }
            })
            .collect()
    }
}
