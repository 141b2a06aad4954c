//! # Pipeline de Conversão
//!
//! Orquestra os estágios para cada documento do corpus:
//!
//! 1. **Montagem** ([`Document::build`]): arena de objetos e menções.
//! 2. **Reparo** ([`repair_document`]): realinha offsets ao texto.
//! 3. **Validação** ([`validate_event_arguments`]): só reporta.
//! 4. **Segmentação** ([`SentenceSplitter`] + [`fix_boundaries`]).
//! 5. **Projeção** ([`project_document`]): menções por sentença e órfãs.
//!
//! Os documentos são independentes entre si e rodam em paralelo com `rayon`. Os
//! resultados são combinados depois, em ordem de uri, então a saída não depende da
//! ordem de execução. Um documento que falha é registrado e pulado.

use std::fmt;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::boundary::fix_boundaries;
use crate::config::ConversionConfig;
use crate::corpus::{list_documents, CorpusEntry};
use crate::dataset::{split_data, split_folds, DataSplit, Shuffle, SplitUnit};
use crate::document::Document;
use crate::error::{CorpusError, DocumentError};
use crate::output::Annotators;
use crate::postag::{DepParser, HeuristicPosTagger, PosTagger};
use crate::projector::{
    project_document, DocumentProjection, OrphanReport, ProjectionOptions, SentenceRecord,
};
use crate::raw::RawDocument;
use crate::repair::{repair_document, RepairSummary};
use crate::schema::{validate_event_arguments, SchemaViolation};
use crate::splitter::{RuleSentenceSplitter, SentenceSplitter};
use crate::stats::CorpusStats;
use crate::tokenizer::{tokenizer_for, Tokenizer, TokenizerMode};

/// Origem de um documento bruto.
pub trait DocumentSource: Send + Sync {
    /// Identificação usada nos logs de falha.
    fn describe(&self) -> String;

    fn load(&self) -> Result<RawDocument, DocumentError>;
}

impl DocumentSource for CorpusEntry {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RawDocument, DocumentError> {
        RawDocument::from_path(&self.path)
    }
}

impl DocumentSource for RawDocument {
    fn describe(&self) -> String {
        self.uri.clone()
    }

    fn load(&self) -> Result<RawDocument, DocumentError> {
        Ok(self.clone())
    }
}

/// Documento montado, reparado e validado.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub document: Document,
    pub repairs: RepairSummary,
    pub violations: Vec<SchemaViolation>,
}

/// Resultado da conversão de um documento.
#[derive(Debug, Clone)]
pub struct DocumentOutput {
    pub uri: String,
    pub sentences: Vec<SentenceRecord>,
    pub report: OrphanReport,
    pub stats: CorpusStats,
}

#[derive(Debug)]
pub struct DocumentFailure {
    pub source: String,
    pub error: DocumentError,
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Resultado combinado de um corpus.
#[derive(Debug, Default)]
pub struct CorpusOutput {
    /// Em ordem de uri.
    pub documents: Vec<DocumentOutput>,
    pub failures: Vec<DocumentFailure>,
    pub stats: CorpusStats,
    pub report: OrphanReport,
}

impl CorpusOutput {
    pub fn sentence_count(&self) -> usize {
        self.documents.iter().map(|d| d.sentences.len()).sum()
    }

    /// Separa as sentenças nos arquivos de saída: `train`/`dev`/`test`, `fold1..n` ou
    /// `all`. Com unidade documento, as sentenças de um documento ficam juntas.
    pub fn partition(
        self,
        unit: SplitUnit,
        split: Option<&DataSplit>,
        folds: Option<usize>,
        shuffle: Shuffle,
    ) -> Vec<(String, Vec<SentenceRecord>)> {
        let groups: Vec<Vec<SentenceRecord>> = match unit {
            SplitUnit::Document => self.documents.into_iter().map(|d| d.sentences).collect(),
            SplitUnit::Sentence => self
                .documents
                .into_iter()
                .flat_map(|d| d.sentences)
                .map(|s| vec![s])
                .collect(),
        };
        let flatten = |parts: Vec<Vec<SentenceRecord>>| -> Vec<SentenceRecord> {
            parts.into_iter().flatten().collect()
        };

        if let Some(split) = split {
            let sets = split_data(groups, split, shuffle);
            vec![
                ("train".to_string(), flatten(sets.train)),
                ("dev".to_string(), flatten(sets.dev)),
                ("test".to_string(), flatten(sets.test)),
            ]
        } else if let Some(folds) = folds {
            split_folds(groups, folds, shuffle)
                .into_iter()
                .enumerate()
                .map(|(i, fold)| (format!("fold{}", i + 1), flatten(fold)))
                .collect()
        } else {
            vec![("all".to_string(), flatten(groups))]
        }
    }
}

/// O pipeline de conversão ACE.
///
/// Os colaboradores externos são injetados uma vez e compartilhados entre as threads,
/// por isso todos exigem `Send + Sync`.
pub struct AcePipeline {
    splitter: Box<dyn SentenceSplitter>,
    tokenizer: Box<dyn Tokenizer>,
    pos_tagger: Option<Box<dyn PosTagger>>,
    dep_parser: Option<Box<dyn DepParser>>,
    exclude_metadata: bool,
    projection: ProjectionOptions,
}

impl AcePipeline {
    /// Pipeline com o divisor de sentenças e o tokenizador padrão, sem POS.
    pub fn new() -> Self {
        Self {
            splitter: Box::new(RuleSentenceSplitter::new()),
            tokenizer: tokenizer_for(TokenizerMode::default()),
            pos_tagger: None,
            dep_parser: None,
            exclude_metadata: false,
            projection: ProjectionOptions::default(),
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        let mut pipeline = Self::new()
            .with_tokenizer(tokenizer_for(config.tokenizer))
            .exclude_metadata(config.exclude_metadata)
            .with_projection(config.projection_options());
        if config.pos {
            pipeline = pipeline.with_pos_tagger(Box::new(HeuristicPosTagger));
        }
        pipeline
    }

    pub fn with_splitter(mut self, splitter: Box<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_pos_tagger(mut self, tagger: Box<dyn PosTagger>) -> Self {
        self.pos_tagger = Some(tagger);
        self
    }

    pub fn with_dep_parser(mut self, parser: Box<dyn DepParser>) -> Self {
        self.dep_parser = Some(parser);
        self
    }

    pub fn exclude_metadata(mut self, exclude: bool) -> Self {
        self.exclude_metadata = exclude;
        self
    }

    pub fn with_projection(mut self, projection: ProjectionOptions) -> Self {
        self.projection = projection;
        self
    }

    /// Ferramentas para os escritores de saída.
    pub fn annotators(&self) -> Annotators<'_> {
        Annotators {
            tokenizer: self.tokenizer.as_ref(),
            pos_tagger: self.pos_tagger.as_deref(),
            dep_parser: self.dep_parser.as_deref(),
        }
    }

    /// Monta o documento, repara os offsets e valida os argumentos de evento.
    pub fn prepare_document(&self, raw: RawDocument) -> Result<PreparedDocument, DocumentError> {
        let mut document = Document::build(raw, self.exclude_metadata)?;
        let repairs = repair_document(&mut document);
        let violations = validate_event_arguments(&document);
        for violation in &violations {
            warn!("{}: {}", document.uri, violation);
        }
        Ok(PreparedDocument {
            document,
            repairs,
            violations,
        })
    }

    /// Divide em sentenças, corrige as fronteiras e projeta as menções.
    pub fn project(&self, document: &Document) -> DocumentProjection {
        let sentences = fix_boundaries(self.splitter.split(document.text.as_str()));
        project_document(document, &sentences, &self.projection)
    }

    pub fn convert_document(
        &self,
        source: &dyn DocumentSource,
    ) -> Result<DocumentOutput, DocumentError> {
        let prepared = self.prepare_document(source.load()?)?;
        let projection = self.project(&prepared.document);

        let mut stats = CorpusStats::from_document(&prepared.document, self.tokenizer.as_ref());
        stats.record_repairs(&prepared.repairs);
        stats.schema_violations += prepared.violations.len();
        stats.record_projection(&projection.report);
        debug!(
            "{}: {} sentenças",
            prepared.document.uri,
            projection.sentences.len()
        );

        Ok(DocumentOutput {
            uri: prepared.document.uri,
            sentences: projection.sentences,
            report: projection.report,
            stats,
        })
    }

    /// Converte todos os documentos em paralelo e combina os resultados.
    pub fn convert_corpus<S: DocumentSource>(&self, sources: &[S]) -> CorpusOutput {
        let results: Vec<Result<DocumentOutput, DocumentFailure>> = sources
            .par_iter()
            .map(|source| {
                self.convert_document(source).map_err(|error| DocumentFailure {
                    source: source.describe(),
                    error,
                })
            })
            .collect();

        let mut output = CorpusOutput::default();
        for result in results {
            match result {
                Ok(document) => output.documents.push(document),
                Err(failure) => {
                    warn!("documento ignorado: {}", failure);
                    output.stats.merge(CorpusStats::failed());
                    output.failures.push(failure);
                }
            }
        }
        output.documents.sort_by(|a, b| a.uri.cmp(&b.uri));
        for document in &output.documents {
            output.stats.merge(document.stats.clone());
            output.report.merge(document.report.clone());
        }
        info!(
            "{} documentos convertidos, {} com erro, {} sentenças",
            output.documents.len(),
            output.failures.len(),
            output.sentence_count()
        );
        output.report.log_summary();
        output
    }

    /// Lê e converte um diretório de corpus.
    pub fn convert_directory(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<CorpusOutput, CorpusError> {
        let entries = list_documents(root, include, exclude)?;
        info!("{} documentos em {}", entries.len(), root.display());
        Ok(self.convert_corpus(&entries))
    }
}

impl Default for AcePipeline {
    fn default() -> Self {
        Self::new()
    }
}
