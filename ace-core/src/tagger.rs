//! # Esquemas de Rótulos BIO e BILOU
//!
//! Converte as menções de entidade de uma sentença em um rótulo por token.
//!
//! ## Esquemas
//!
//! | Posição        | BIO     | BILOU   |
//! |----------------|---------|---------|
//! | token único    | `B-X`   | `U-X`   |
//! | primeiro       | `B-X`   | `B-X`   |
//! | meio           | `I-X`   | `I-X`   |
//! | último         | `I-X`   | `L-X`   |
//! | fora           | `O`     | `O`     |
//!
//! ## Colisões
//!
//! Menções são processadas na ordem do catálogo. Se um token já tem rótulo quando uma
//! menção posterior escreve nele, o novo rótulo ganha o marcador `H` (híbrido) e substitui
//! o anterior: `B-PER` vira `BH-PER`. O resultado depende da ordem das menções.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::EntityMention;
use crate::mapper::{map_mention_span, TokenSpan};
use crate::tokenizer::Token;

/// Esquema de rotulação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TagScheme {
    #[default]
    Bio,
    Bilou,
}

impl FromStr for TagScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bio" => Ok(TagScheme::Bio),
            "bilou" => Ok(TagScheme::Bilou),
            other => Err(format!("esquema de rótulos desconhecido: {other}")),
        }
    }
}

/// Posição do token dentro da menção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Begin,
    Inside,
    Last,
    Unit,
}

impl Position {
    pub fn letter(&self) -> &'static str {
        match self {
            Position::Begin => "B",
            Position::Inside => "I",
            Position::Last => "L",
            Position::Unit => "U",
        }
    }

    /// Posição do índice `i` em `span` segundo o esquema.
    fn at(i: usize, span: TokenSpan, scheme: TagScheme) -> Self {
        let last = span.end - 1;
        match (i == span.start, i == last, scheme) {
            (true, true, TagScheme::Bilou) => Position::Unit,
            (true, _, _) => Position::Begin,
            (false, true, TagScheme::Bilou) => Position::Last,
            _ => Position::Inside,
        }
    }
}

/// Rótulo de um token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Outside,
    Entity {
        position: Position,
        /// Escrito sobre um rótulo de outra menção.
        hybrid: bool,
        entity_type: String,
    },
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Outside => f.write_str("O"),
            Label::Entity {
                position,
                hybrid,
                entity_type,
            } => write!(
                f,
                "{}{}-{}",
                position.letter(),
                if *hybrid { "H" } else { "" },
                entity_type
            ),
        }
    }
}

/// Rotula `len` tokens a partir de intervalos já mapeados, na ordem dada.
pub fn encode_labels(len: usize, spans: &[(TokenSpan, &str)], scheme: TagScheme) -> Vec<Label> {
    let mut labels: Vec<Option<Label>> = vec![None; len];
    for &(span, entity_type) in spans {
        for i in span.start..span.end.min(len) {
            labels[i] = Some(Label::Entity {
                position: Position::at(i, span, scheme),
                hybrid: labels[i].is_some(),
                entity_type: entity_type.to_string(),
            });
        }
    }
    labels
        .into_iter()
        .map(|label| label.unwrap_or(Label::Outside))
        .collect()
}

/// Rotula os tokens de uma sentença com as menções de entidade (já em coordenadas da
/// sentença). Menções que não se alinham aos tokens ficam sem rótulo.
pub fn spans_to_labels(
    document: &str,
    mentions: &[EntityMention],
    tokens: &[Token],
    scheme: TagScheme,
) -> Vec<Label> {
    let spans: Vec<(TokenSpan, &str)> = mentions
        .iter()
        .filter_map(|m| {
            map_mention_span(document, &m.full_id.0, m.extent.span, tokens)
                .map(|span| (span, m.label.as_str()))
        })
        .collect();
    encode_labels(tokens.len(), &spans, scheme)
}
