//! # Correção de Fronteiras de Sentença
//!
//! Segmentadores genéricos erram de dois jeitos em textos de notícia:
//! - juntam manchete, dateline e corpo numa sentença só (não há pontuação entre eles,
//!   só quebras de linha);
//! - partem uma sentença em duas sem nenhum espaço entre as partes.
//!
//! A correção percorre as sentenças uma vez. Para cada sentença:
//! 1. **Quebra**: se o texto contém `"\n\n"`, ou contém `"\n"` e a sentença termina
//!    até o caractere 70 do documento, corta na primeira quebra (`"\n"` no segundo caso,
//!    `"\n\n"` no primeiro). O espaço em branco consecutivo a partir do corte vira o
//!    `after` da primeira parte e o `before` da segunda. A primeira parte sai como está;
//!    só a segunda é reavaliada.
//! 2. **Junção**: se a próxima sentença começa exatamente onde esta termina, as duas
//!    viram uma, e a junção também é reavaliada.
//!
//! Nenhum caractere é perdido: `primeira.before + Σ (text + after)` continua igual ao
//! texto do documento.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::span::Span;
use crate::splitter::RawSentence;
use crate::text::char_len;

/// Sentenças que terminam até aqui (manchetes) quebram em qualquer `"\n"`.
const HEADLINE_WINDOW: usize = 70;

static BREAK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\n\t ]+").expect("regex de espaço em branco válida"));

/// Byte onde a sentença deve ser cortada, se houver.
fn break_position(sentence: &RawSentence) -> Option<usize> {
    if sentence.text.trim().is_empty() {
        return None;
    }
    if sentence.span.end <= HEADLINE_WINDOW && sentence.text.contains('\n') {
        return sentence.text.find('\n');
    }
    sentence.text.find("\n\n")
}

/// Corta `sentence` no byte `at`. Devolve a parte inicial (se não vazia) e o restante
/// (se não vazio); partes vazias cedem o espaço em branco para a vizinha.
fn split_at_break(sentence: RawSentence, at: usize) -> (Option<RawSentence>, Option<RawSentence>) {
    let run_len = BREAK_RUN
        .find(&sentence.text[at..])
        .map_or(0, |m| m.end());
    let head_text = &sentence.text[..at];
    let run = &sentence.text[at..at + run_len];
    let rest_text = &sentence.text[at + run_len..];

    let head_end = sentence.span.start + char_len(head_text);
    let rest_start = head_end + char_len(run);

    match (head_text.is_empty(), rest_text.is_empty()) {
        (false, false) => (
            Some(RawSentence {
                span: Span::new(sentence.span.start, head_end),
                text: head_text.to_string(),
                before: sentence.before.clone(),
                after: run.to_string(),
            }),
            Some(RawSentence {
                span: Span::new(rest_start, sentence.span.end),
                text: rest_text.to_string(),
                before: run.to_string(),
                after: sentence.after,
            }),
        ),
        (true, _) => (
            None,
            Some(RawSentence {
                span: Span::new(rest_start, sentence.span.end),
                text: rest_text.to_string(),
                before: format!("{}{}", sentence.before, run),
                after: sentence.after,
            }),
        ),
        (false, true) => (
            Some(RawSentence {
                span: Span::new(sentence.span.start, head_end),
                text: head_text.to_string(),
                before: sentence.before.clone(),
                after: format!("{}{}", run, sentence.after),
            }),
            None,
        ),
    }
}

/// Aplica quebras e junções sobre a saída do segmentador.
pub fn fix_boundaries(sentences: Vec<RawSentence>) -> Vec<RawSentence> {
    let mut fixed = Vec::with_capacity(sentences.len());
    let mut queue = sentences.into_iter().peekable();
    let mut pending: Option<RawSentence> = None;

    // Uma sentença em trabalho: reavaliada até não haver mais quebra nem junção.
    loop {
        let Some(mut current) = pending.take().or_else(|| queue.next()) else {
            break;
        };

        if let Some(at) = break_position(&current) {
            match split_at_break(current, at) {
                (Some(head), Some(rest)) => {
                    fixed.push(head);
                    pending = Some(rest);
                }
                (Some(head), None) => pending = Some(head),
                (None, Some(rest)) => {
                    if let Some(previous) = fixed.last_mut() {
                        previous.after = rest.before.clone();
                    }
                    pending = Some(rest);
                }
                (None, None) => {}
            }
            continue;
        }

        if let Some(next) = queue.next_if(|next| next.span.start == current.span.end) {
            current.text.push_str(&next.before);
            current.text.push_str(&next.text);
            current.span = Span::new(current.span.start, next.span.end);
            current.after = next.after;
            pending = Some(current);
            continue;
        }

        fixed.push(current);
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::{RuleSentenceSplitter, SentenceSplitter};

    fn sentence(start: usize, text: &str, before: &str, after: &str) -> RawSentence {
        RawSentence {
            span: Span::new(start, start + char_len(text)),
            text: text.to_string(),
            before: before.to_string(),
            after: after.to_string(),
        }
    }

    fn rebuild(sentences: &[RawSentence]) -> String {
        let mut text = sentences.first().map(|s| s.before.clone()).unwrap_or_default();
        for s in sentences {
            text.push_str(&s.text);
            text.push_str(&s.after);
        }
        text
    }

    #[test]
    fn test_headline_split_on_single_newline() {
        let input = vec![sentence(0, "HEADLINE\nBody text here.", "", "")];
        let fixed = fix_boundaries(input);
        assert_eq!(fixed.len(), 2);
        assert_eq!(fixed[0].text, "HEADLINE");
        assert_eq!(fixed[0].after, "\n");
        assert_eq!(fixed[1].text, "Body text here.");
        assert_eq!(fixed[1].before, "\n");
        assert_eq!(fixed[1].span, Span::new(9, 24));
    }

    #[test]
    fn test_paragraph_break_split_anywhere() {
        let prefix = "x".repeat(80);
        let text = format!("{prefix}\nstill one\n\nSecond paragraph.");
        let fixed = fix_boundaries(vec![sentence(100, &text, " ", "\n")]);
        assert_eq!(fixed.len(), 2);
        assert_eq!(fixed[0].text, format!("{prefix}\nstill one"));
        assert_eq!(fixed[0].before, " ");
        assert_eq!(fixed[1].text, "Second paragraph.");
        assert_eq!(fixed[1].before, "\n\n");
        assert_eq!(fixed[1].after, "\n");
        assert_eq!(fixed[1].span.start, 100 + 80 + 1 + 9 + 2);
    }

    #[test]
    fn test_far_single_newline_kept() {
        let text = format!("{}\nnot a headline", "y".repeat(80));
        let fixed = fix_boundaries(vec![sentence(0, &text, "", "")]);
        assert_eq!(fixed.len(), 1);
    }

    #[test]
    fn test_adjacent_sentences_merged() {
        let input = vec![
            sentence(0, "Dr.", "", ""),
            sentence(3, "Smith arrived.", "", " "),
            sentence(18, "Good.", "", ""),
        ];
        let fixed = fix_boundaries(input);
        assert_eq!(fixed.len(), 2);
        assert_eq!(fixed[0].text, "Dr.Smith arrived.");
        assert_eq!(fixed[0].span, Span::new(0, 17));
        assert_eq!(fixed[0].after, " ");
    }

    #[test]
    fn test_merge_then_split_again() {
        let input = vec![
            sentence(0, "Title", "", ""),
            sentence(5, "\n\nBody.", "", ""),
        ];
        // A junção gera "Title\n\nBody.", que volta a ser cortada.
        let fixed = fix_boundaries(input);
        assert_eq!(fixed.len(), 2);
        assert_eq!(fixed[0].text, "Title");
        assert_eq!(fixed[1].text, "Body.");
        assert_eq!(fixed[1].span, Span::new(7, 12));
    }

    #[test]
    fn test_coverage_with_rule_splitter() {
        let text = "AFP_ENG_20030304\nNEWS STORY\n\nPARIS, March 4 (AFP)\n\nJohn Smith works in Paris. \
                    He likes it.\n\nThe end.";
        let sentences = fix_boundaries(RuleSentenceSplitter::new().split(text));
        assert_eq!(rebuild(&sentences), text);
        let first: Vec<&str> = sentences.iter().take(3).map(|s| s.text.as_str()).collect();
        assert_eq!(
            first,
            vec![
                "AFP_ENG_20030304\nNEWS STORY",
                "PARIS, March 4 (AFP)",
                "John Smith works in Paris."
            ]
        );
        for s in &sentences {
            assert!(!s.text.contains("\n\n"));
            assert_eq!(s.span.len(), char_len(&s.text));
        }
    }
}
