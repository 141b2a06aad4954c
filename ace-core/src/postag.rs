//! Etiquetagem morfossintática e análise de dependências.
//!
//! O conversor só precisa de uma etiqueta por token (coluna POS do CoNLL) e, se houver um
//! analisador, de núcleo e rótulo de dependência por token. O etiquetador padrão usa
//! regras simples sobre o conjunto de etiquetas do Penn Treebank.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Etiquetador plugável.
pub trait PosTagger: Send + Sync {
    /// Uma etiqueta por token, na mesma ordem.
    fn tag(&self, tokens: &[Token]) -> Vec<String>;
}

/// Arco de dependência de um token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Índice (base 1) do núcleo; 0 é a raiz.
    pub head: usize,
    pub label: String,
}

/// Analisador de dependências plugável. Não há implementação padrão.
///
/// `tags` vem vazio quando não há etiquetador.
pub trait DepParser: Send + Sync {
    fn parse(&self, tokens: &[Token], tags: &[String]) -> Vec<Dependency>;
}

/// Palavras de classe fechada e suas etiquetas.
static CLOSED_CLASS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut words = HashMap::new();
    for w in ["the", "a", "an", "this", "that", "these", "those", "some", "any", "every", "no"] {
        words.insert(w, "DT");
    }
    for w in [
        "in", "on", "at", "of", "for", "with", "by", "from", "about", "into", "over", "after",
        "before", "under", "between", "during", "against", "without", "through", "since",
    ] {
        words.insert(w, "IN");
    }
    for w in ["i", "you", "he", "she", "it", "we", "they", "him", "them", "us", "me"] {
        words.insert(w, "PRP");
    }
    for w in ["his", "her", "its", "their", "our", "my", "your"] {
        words.insert(w, "PRP$");
    }
    for w in ["and", "or", "but", "nor"] {
        words.insert(w, "CC");
    }
    for w in ["is", "was", "are", "were", "be", "been", "am"] {
        words.insert(w, "VB");
    }
    for w in ["will", "would", "can", "could", "may", "might", "shall", "should", "must"] {
        words.insert(w, "MD");
    }
    for w in ["who", "whom", "which", "what"] {
        words.insert(w, "WP");
    }
    words.insert("to", "TO");
    words.insert("not", "RB");
    words
});

/// Etiquetador baseado em regras de forma e lista de palavras funcionais.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPosTagger;

impl HeuristicPosTagger {
    fn tag_word(word: &str, sentence_initial: bool) -> &'static str {
        if word.chars().all(|c| !c.is_alphanumeric()) {
            return match word {
                "," => ",",
                "." | "!" | "?" => ".",
                ":" | ";" | "-" | "--" => ":",
                "(" | "[" | "{" => "-LRB-",
                ")" | "]" | "}" => "-RRB-",
                "\"" | "``" | "''" => "''",
                "$" => "$",
                _ => "SYM",
            };
        }
        if word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '/'))
        {
            return "CD";
        }
        let lower = word.to_lowercase();
        if let Some(&tag) = CLOSED_CLASS.get(lower.as_str()) {
            return tag;
        }
        let capitalised = word.chars().next().is_some_and(char::is_uppercase);
        if capitalised && !sentence_initial {
            return "NNP";
        }
        if lower.ends_with("ly") {
            "RB"
        } else if lower.ends_with("ing") {
            "VBG"
        } else if lower.ends_with("ed") {
            "VBD"
        } else if lower.ends_with('s') && !lower.ends_with("ss") {
            "NNS"
        } else if capitalised {
            "NNP"
        } else {
            "NN"
        }
    }
}

impl PosTagger for HeuristicPosTagger {
    fn tag(&self, tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, token)| Self::tag_word(&token.text, i == 0).to_string())
            .collect()
    }
}

/// Nomes do Penn Treebank para cada colchete, na ordem em que são testados.
const BRACKETS: [(char, &str); 6] = [
    ('(', "-LRB-"),
    (')', "-RRB-"),
    ('[', "-LSB-"),
    (']', "-RSB-"),
    ('{', "-LCB-"),
    ('}', "-RCB-"),
];

/// Um token que contém um colchete é trocado inteiro pelo nome do Treebank (`(a` → `-LRB-`).
pub fn escape_bracket(word: &str) -> &str {
    BRACKETS
        .iter()
        .find(|(bracket, _)| word.contains(*bracket))
        .map_or(word, |(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{tokenize_with_mode, TokenizerMode};

    #[test]
    fn test_heuristic_tags() {
        let tokens = tokenize_with_mode("John Smith works in Paris with 2 friends.", TokenizerMode::Regex);
        let tags = HeuristicPosTagger.tag(&tokens);
        assert_eq!(
            tags,
            vec!["NNP", "NNP", "NNS", "IN", "NNP", "IN", "CD", "NNS", "."]
        );
    }

    #[test]
    fn test_sentence_initial_function_word() {
        let tokens = tokenize_with_mode("The reporters quickly left (again) today.", TokenizerMode::Regex);
        let tags = HeuristicPosTagger.tag(&tokens);
        assert_eq!(
            tags,
            vec!["DT", "NNS", "RB", "NN", "-LRB-", "NN", "-RRB-", "NN", "."]
        );
    }

    #[test]
    fn test_escape_bracket() {
        assert_eq!(escape_bracket("("), "-LRB-");
        assert_eq!(escape_bracket("}"), "-RCB-");
        assert_eq!(escape_bracket("word"), "word");
    }

    #[test]
    fn test_escape_bracket_inside_token() {
        assert_eq!(escape_bracket("(a"), "-LRB-");
        assert_eq!(escape_bracket("f(x)"), "-LRB-");
        assert_eq!(escape_bracket("x]"), "-RSB-");
        assert_eq!(escape_bracket("a-b"), "a-b");
    }
}
