//! Erros do núcleo de conversão.
//!
//! Cada documento falha de forma isolada (`DocumentError`); o corpus continua.
//! Erros de configuração são detectados antes de qualquer processamento.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Falha ao ler, validar ou montar um documento ACE.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("falha ao ler {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("documento malformado: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{uri}: texto do corpo não encontrado no texto completo")]
    BodyNotFound { uri: String },

    #[error("{uri}: identificador de menção fora do padrão: {id}")]
    MalformedMentionId { uri: String, id: String },

    #[error("{uri}: charseq inválido em {mention}: {start}..={end}")]
    InvalidCharseq {
        uri: String,
        mention: String,
        start: usize,
        end: usize,
    },

    #[error("{uri}: {owner} referencia {reference}, que não existe")]
    UnknownReference {
        uri: String,
        owner: String,
        reference: String,
    },

    #[error("{uri}: menção de relação {mention} sem o argumento {slot}")]
    MissingRelationArgument {
        uri: String,
        mention: String,
        slot: usize,
    },
}

/// Falha ao percorrer o diretório do corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("falha ao listar {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("diretório do corpus não encontrado: {0}")]
    MissingRoot(PathBuf),
}

/// Configuração de conversão inválida.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("falha ao ler a configuração {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuração JSON inválida: {0}")]
    Json(#[from] serde_json::Error),

    #[error("divisão de dados inválida: {0}")]
    InvalidSplit(String),

    #[error("número de folds inválido: {0} (mínimo 2)")]
    InvalidFolds(usize),

    #[error("divisão de dados e folds são mutuamente exclusivos")]
    SplitAndFolds,
}
