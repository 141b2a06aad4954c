//! Configuração da conversão.
//!
//! Todos os campos têm valor padrão, então um arquivo JSON pode trazer apenas o que
//! muda. A linha de comando aplica suas opções por cima do que foi carregado.
//!
//! ```json
//! { "format": "conll", "scheme": "bilou", "entities": true, "split": "80,10,10" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::{DataSplit, Shuffle, SplitUnit, DEFAULT_SEED};
use crate::error::ConfigError;
use crate::output::{OutputFormat, OutputOptions};
use crate::projector::ProjectionOptions;
use crate::tagger::TagScheme;
use crate::tokenizer::TokenizerMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub format: OutputFormat,
    pub scheme: TagScheme,
    pub entities: bool,
    pub relations: bool,
    /// Descarta a menor de duas entidades sobrepostas na mesma sentença.
    pub resolve_overlaps: bool,
    pub tokenizer: TokenizerMode,
    /// `false` imprime o texto cru da sentença no modo plain.
    pub tokenize: bool,
    pub pos: bool,
    /// Usa só o corpo do documento, sem cabeçalho.
    pub exclude_metadata: bool,
    /// `treino,teste` ou `treino,dev,teste`.
    pub split: Option<String>,
    pub folds: Option<usize>,
    pub split_unit: SplitUnit,
    pub shuffle: bool,
    pub seed: u64,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            scheme: TagScheme::default(),
            entities: false,
            relations: false,
            resolve_overlaps: true,
            tokenizer: TokenizerMode::default(),
            tokenize: true,
            pos: false,
            exclude_metadata: false,
            split: None,
            folds: None,
            split_unit: SplitUnit::default(),
            shuffle: false,
            seed: DEFAULT_SEED,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
        }
    }
}

impl ConversionConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Verifica combinações inválidas antes de qualquer documento ser lido.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.split.is_some() && self.folds.is_some() {
            return Err(ConfigError::SplitAndFolds);
        }
        if let Some(folds) = self.folds {
            if folds < 2 {
                return Err(ConfigError::InvalidFolds(folds));
            }
        }
        self.data_split().map(|_| ())
    }

    pub fn data_split(&self) -> Result<Option<DataSplit>, ConfigError> {
        self.split.as_deref().map(str::parse).transpose()
    }

    pub fn shuffle(&self) -> Shuffle {
        Shuffle {
            enabled: self.shuffle,
            seed: self.seed,
        }
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            format: self.format,
            tokenize: self.tokenize,
            entities: self.entities,
            relations: self.relations,
            scheme: self.scheme,
        }
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            resolve_overlaps: self.resolve_overlaps,
        }
    }
}
