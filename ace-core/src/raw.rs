//! # Formato de Intercâmbio
//!
//! Um documento ACE chega ao conversor como um arquivo JSON por documento, com a mesma
//! estrutura do APF (entidades, valores, expressões temporais, relações e eventos, cada
//! objeto com suas menções). A leitura do XML original fica fora deste crate.
//!
//! ## Convenções dos offsets
//!
//! Os `charseq` seguem o APF: `start` e `end` são offsets de caractere relativos a
//! `full_text` e `end` é **inclusivo**. A conversão para `Span` acontece em
//! [`Document::build`](crate::document::Document::build).
//!
//! ```json
//! { "uri": "CNN_ENG_20030424.0000", "version": "ace2005",
//!   "full_text": "John Smith works in Paris.",
//!   "entities": [{ "id": "CNN_ENG_20030424.0000-E1", "type": "PER",
//!     "mentions": [{ "id": "CNN_ENG_20030424.0000-E1-1", "type": "NAM",
//!       "extent": { "start": 0, "end": 9, "text": "John Smith" } }] }] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::AceVersion;
use crate::error::DocumentError;
use crate::text::{char_len, CharText};

/// Trecho anotado no texto completo (`end` inclusivo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCharseq {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl RawCharseq {
    /// Charseq da primeira ocorrência de `needle` em `text` a partir do caractere `from`.
    pub fn locate(text: &str, needle: &str, from: usize) -> Option<Self> {
        if needle.is_empty() {
            return None;
        }
        let indexed = CharText::new(text);
        let from_byte = indexed.byte_of(from)?;
        let byte = text[from_byte..].find(needle)? + from_byte;
        let start = indexed.char_of(byte)?;
        Some(Self {
            start,
            end: start + char_len(needle) - 1,
            text: needle.to_string(),
        })
    }
}

/// Referência de um argumento a outro objeto ou menção.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArgument {
    pub role: String,
    pub ref_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntityMention {
    pub id: String,
    /// NAM, NOM, PRO...
    #[serde(rename = "type", default)]
    pub mention_type: String,
    #[serde(default)]
    pub ldc_type: String,
    #[serde(default)]
    pub ldc_atr: String,
    pub extent: RawCharseq,
    #[serde(default)]
    pub head: Option<RawCharseq>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub mentions: Vec<RawEntityMention>,
}

/// Menção de valor ou de expressão temporal: só tem extent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlainMention {
    pub id: String,
    pub extent: RawCharseq,
}

/// Objeto de valor (`values`) ou expressão temporal (`timexes`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlainObject {
    pub id: String,
    #[serde(rename = "type", default)]
    pub object_type: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub val: Option<String>,
    #[serde(default)]
    pub mentions: Vec<RawPlainMention>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRelationMention {
    pub id: String,
    #[serde(default)]
    pub lexical_condition: String,
    pub extent: RawCharseq,
    #[serde(default)]
    pub arguments: Vec<RawArgument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRelation {
    pub id: String,
    #[serde(rename = "type")]
    pub relation_type: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub tense: Option<String>,
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub arguments: Vec<RawArgument>,
    #[serde(default)]
    pub mentions: Vec<RawRelationMention>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventMention {
    pub id: String,
    pub extent: RawCharseq,
    pub scope: RawCharseq,
    pub anchor: RawCharseq,
    #[serde(default)]
    pub arguments: Vec<RawArgument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub tense: Option<String>,
    #[serde(default)]
    pub genericity: Option<String>,
    #[serde(default)]
    pub polarity: Option<String>,
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub arguments: Vec<RawArgument>,
    #[serde(default)]
    pub mentions: Vec<RawEventMention>,
}

/// Documento ACE como lido do disco, antes de qualquer reparo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub uri: String,
    #[serde(default)]
    pub version: AceVersion,
    pub full_text: String,
    /// Texto do corpo (sem cabeçalhos), usado quando os metadados são excluídos.
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub entities: Vec<RawEntity>,
    #[serde(default)]
    pub values: Vec<RawPlainObject>,
    #[serde(default)]
    pub timexes: Vec<RawPlainObject>,
    #[serde(default)]
    pub relations: Vec<RawRelation>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

impl RawDocument {
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let json = r#"{
            "uri": "doc1",
            "full_text": "John Smith works in Paris.",
            "entities": [{
                "id": "doc1-E1", "type": "PER",
                "mentions": [{ "id": "doc1-E1-1", "type": "NAM",
                    "extent": { "start": 0, "end": 9, "text": "John Smith" } }]
            }]
        }"#;
        let raw = RawDocument::from_json_str(json).unwrap();
        assert_eq!(raw.version, AceVersion::Ace2005);
        assert_eq!(raw.entities[0].mentions[0].extent.end, 9);
        assert!(raw.entities[0].mentions[0].head.is_none());
        assert!(raw.events.is_empty());
    }

    #[test]
    fn test_missing_extent_is_malformed() {
        let json = r#"{ "uri": "d", "full_text": "x",
            "timexes": [{ "id": "d-T1", "mentions": [{ "id": "d-T1-1" }] }] }"#;
        assert!(matches!(
            RawDocument::from_json_str(json),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn test_locate_inclusive_end() {
        let seq = RawCharseq::locate("Ação em São Paulo", "São Paulo", 0).unwrap();
        assert_eq!((seq.start, seq.end), (8, 16));
        assert!(RawCharseq::locate("abc", "x", 0).is_none());
        assert_eq!(RawCharseq::locate("a b a", "a", 1).unwrap().start, 4);
    }

    #[test]
    fn test_from_path_reports_io() {
        let err = RawDocument::from_path(Path::new("/nao/existe.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
