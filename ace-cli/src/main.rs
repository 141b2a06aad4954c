//! Conversor em lote de corpora ACE para arquivos de treino.
//!
//! ```bash
//! ace-cli --input corpus/ace2005 --output data/ --format conll --entities --split 80,10,10
//! ace-cli --demo --relations
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use ace_core::corpus::demo_document;
use ace_core::dataset::SplitUnit;
use ace_core::output::write_sentences;
use ace_core::stats::SentenceStats;
use ace_core::{
    AcePipeline, ConversionConfig, CorpusOutput, OutputFormat, TagScheme, TokenizerMode,
};

/// Converte documentos ACE (JSON) em sentenças anotadas.
#[derive(Debug, Parser)]
#[command(name = "ace-cli", version, about)]
struct Cli {
    /// Diretório do corpus (subdiretórios por domínio).
    #[arg(short, long, required_unless_present = "demo")]
    input: Option<PathBuf>,

    /// Diretório onde os arquivos `.data` são gravados.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Arquivo JSON com a configuração base; as opções abaixo têm precedência.
    #[arg(short, long, env = "ACE_CONFIG")]
    config: Option<PathBuf>,

    /// plain, conll ou json.
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Rótulos BILOU em vez de BIO.
    #[arg(long)]
    bilou: bool,

    #[arg(long)]
    entities: bool,

    #[arg(long)]
    relations: bool,

    /// Mantém entidades sobrepostas na mesma sentença.
    #[arg(long)]
    ignore_overlaps: bool,

    /// Imprime o texto cru das sentenças no formato plain.
    #[arg(long)]
    no_tokenize: bool,

    /// regex, whitespace ou unicode.
    #[arg(long)]
    tokenizer: Option<TokenizerMode>,

    /// Inclui etiquetas morfossintáticas.
    #[arg(long)]
    pos: bool,

    /// Descarta o cabeçalho dos documentos e usa só o corpo.
    #[arg(long)]
    exclude_metadata: bool,

    /// Proporções `treino,teste` ou `treino,dev,teste`.
    #[arg(long, conflicts_with = "folds")]
    split: Option<String>,

    /// Número de partições para validação cruzada.
    #[arg(long)]
    folds: Option<usize>,

    /// Divide por sentenças em vez de documentos.
    #[arg(long)]
    by_sentences: bool,

    #[arg(long)]
    shuffle: bool,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_delimiter = ',')]
    include_domains: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    exclude_domains: Vec<String>,

    /// Converte o documento de demonstração embutido.
    #[arg(long)]
    demo: bool,
}

impl Cli {
    fn into_config(self) -> Result<(ConversionConfig, Option<PathBuf>, Option<PathBuf>, bool)> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::from_json_file(path)
                .with_context(|| format!("falha ao carregar {}", path.display()))?,
            None => ConversionConfig::default(),
        };

        if let Some(format) = self.format {
            config.format = format;
        }
        if self.bilou {
            config.scheme = TagScheme::Bilou;
        }
        config.entities |= self.entities;
        config.relations |= self.relations;
        if self.ignore_overlaps {
            config.resolve_overlaps = false;
        }
        if self.no_tokenize {
            config.tokenize = false;
        }
        if let Some(mode) = self.tokenizer {
            config.tokenizer = mode;
        }
        config.pos |= self.pos;
        config.exclude_metadata |= self.exclude_metadata;
        if self.split.is_some() {
            config.split = self.split;
        }
        if self.folds.is_some() {
            config.folds = self.folds;
        }
        if self.by_sentences {
            config.split_unit = SplitUnit::Sentence;
        }
        config.shuffle |= self.shuffle;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if !self.include_domains.is_empty() {
            config.include_domains = self.include_domains;
        }
        if !self.exclude_domains.is_empty() {
            config.exclude_domains = self.exclude_domains;
        }
        config.validate().context("configuração inválida")?;
        Ok((config, self.input, self.output, self.demo))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let (config, input, output_dir, demo) = Cli::parse().into_config()?;
    let pipeline = AcePipeline::from_config(&config);

    let corpus = match input {
        Some(root) if !demo => pipeline
            .convert_directory(&root, &config.include_domains, &config.exclude_domains)
            .with_context(|| format!("falha ao ler o corpus em {}", root.display()))?,
        _ => pipeline.convert_corpus(&[demo_document()]),
    };
    if corpus.documents.is_empty() {
        bail!("nenhum documento convertido");
    }
    // Sem diretório de saída os dados vão para stdout; as estatísticas, para stderr.
    if output_dir.is_some() {
        print!("{}", corpus.stats);
    } else {
        eprint!("{}", corpus.stats);
    }

    write_files(&pipeline, &config, corpus, output_dir)
}

fn write_files(
    pipeline: &AcePipeline,
    config: &ConversionConfig,
    corpus: CorpusOutput,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let split = config.data_split()?;
    let files = corpus.partition(config.split_unit, split.as_ref(), config.folds, config.shuffle());
    let options = config.output_options();
    let annotators = pipeline.annotators();

    let Some(dir) = output_dir else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for (_, sentences) in &files {
            write_sentences(&mut out, sentences, &options, &annotators)?;
        }
        return Ok(());
    };

    fs::create_dir_all(&dir).with_context(|| format!("falha ao criar {}", dir.display()))?;
    for (name, sentences) in &files {
        let path = dir.join(format!("{name}.data"));
        let file =
            File::create(&path).with_context(|| format!("falha ao criar {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write_sentences(&mut out, sentences, &options, &annotators)
            .with_context(|| format!("falha ao escrever {}", path.display()))?;
        out.flush()?;

        info!("{}: {} sentenças", path.display(), sentences.len());
        println!("== {name}");
        print!("{}", SentenceStats::from_sentences(sentences));
    }
    Ok(())
}
