//! # ace-core — Conversão de Corpora ACE para Dados de Treino
//!
//! Este crate transforma documentos anotados no padrão ACE (Automatic Content Extraction)
//! em sentenças anotadas, prontas para treinar modelos de sequência (NER, extração de
//! relações). As anotações originais têm offsets de caractere que muitas vezes não batem
//! com o texto; o núcleo do crate corrige esses offsets antes de qualquer outra coisa.
//!
//! ## Arquitetura do Sistema
//!
//! Cada documento passa pelos estágios abaixo, de forma independente dos demais:
//!
//! 1.  **Entrada** ([`raw`]): documento JSON com texto e objetos ACE.
//! 2.  **Arena** ([`document`]): objetos e menções indexados por id, catálogos por tipo.
//! 3.  **Reparo** ([`repair`]): cada menção cujo texto não está no offset anotado é
//!     procurada para trás no documento; se não existe, é removida.
//! 4.  **Sentenças** ([`splitter`], [`boundary`]): segmentação e correção de fronteiras
//!     (quebras de parágrafo dentro de uma sentença, sentenças sem pontuação final).
//! 5.  **Projeção** ([`projector`]): menções contidas em cada sentença, com offsets
//!     relativos; o que não cabe em nenhuma sentença vira órfão.
//! 6.  **Saída** ([`tokenizer`], [`mapper`], [`tagger`], [`output`]): spans de token,
//!     rótulos BIO/BILOU e arquivos plain, CoNLL ou JSON.
//!
//! O lote inteiro é coordenado por [`pipeline::AcePipeline`], que roda os documentos em
//! paralelo e combina estatísticas ([`stats`]) e a divisão em treino/dev/teste
//! ([`dataset`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ace_core::corpus::demo_document;
//! use ace_core::AcePipeline;
//!
//! let pipeline = AcePipeline::new().exclude_metadata(true);
//! let output = pipeline.convert_corpus(&[demo_document()]);
//!
//! assert!(output.failures.is_empty());
//! for sentence in output.documents.iter().flat_map(|d| &d.sentences) {
//!     println!("{} ({} entidades)", sentence.text, sentence.entities.len());
//! }
//! ```

pub mod boundary;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod document;
pub mod error;
pub mod mapper;
pub mod output;
pub mod pipeline;
pub mod postag;
pub mod projector;
pub mod raw;
pub mod repair;
pub mod schema;
pub mod span;
pub mod splitter;
pub mod stats;
pub mod tagger;
pub mod text;
pub mod tokenizer;

pub use config::ConversionConfig;
pub use document::{Document, Mention, MentionId, MentionKind, ObjectId};
pub use error::{ConfigError, CorpusError, DocumentError};
pub use output::{OutputFormat, OutputOptions};
pub use pipeline::{AcePipeline, CorpusOutput, DocumentSource};
pub use projector::{OrphanReport, SentenceRecord};
pub use span::Span;
pub use tagger::{Label, TagScheme};
pub use tokenizer::{Token, TokenizerMode};
