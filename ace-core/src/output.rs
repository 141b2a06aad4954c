//! # Escrita dos Arquivos de Saída
//!
//! Formatos:
//!
//! - **CoNLL**: uma linha por token (`token<TAB>POS<TAB>rótulo`, sem a coluna POS quando
//!   não há etiquetador), linha em branco entre sentenças.
//! - **Plain tokenizado**: tokens separados por espaço, linha de POS, linhas de
//!   dependência (núcleos e rótulos), linha de entidades e linha de relações, com
//!   offsets em índices de token.
//! - **Plain bruto**: o texto da sentença, linha de entidades e linha de relações, com
//!   offsets em caracteres.
//! - **JSON**: um [`SentenceRecord`] serializado por linha.
//!
//! Descritor de entidade: `início,fim,início_head,fim_head RÓTULO,TIPO_MENÇÃO`, entradas
//! separadas por `|`. Relação: `TIPO::SUBTIPO` seguido de um descritor por argumento.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::EntityMention;
use crate::mapper::{map_mention_span, TokenSpan};
use crate::postag::{escape_bracket, DepParser, PosTagger};
use crate::projector::{RelationRecord, SentenceRecord};
use crate::span::Span;
use crate::tagger::{spans_to_labels, TagScheme};
use crate::tokenizer::{fix_tokens, Token, Tokenizer};

/// Formato dos arquivos `.data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Plain,
    Conll,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Conll => "conll",
            OutputFormat::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(OutputFormat::Plain),
            "conll" => Ok(OutputFormat::Conll),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("formato de saída desconhecido: {other}")),
        }
    }
}

/// O que escrever e como.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// No formato plain, tokeniza as sentenças (offsets em tokens).
    pub tokenize: bool,
    pub entities: bool,
    pub relations: bool,
    pub scheme: TagScheme,
}

/// Ferramentas externas usadas na escrita.
#[derive(Clone, Copy)]
pub struct Annotators<'a> {
    pub tokenizer: &'a dyn Tokenizer,
    pub pos_tagger: Option<&'a dyn PosTagger>,
    pub dep_parser: Option<&'a dyn DepParser>,
}

/// Escreve as sentenças no formato pedido.
pub fn write_sentences<W: Write>(
    out: &mut W,
    sentences: &[SentenceRecord],
    options: &OutputOptions,
    annotators: &Annotators<'_>,
) -> io::Result<()> {
    for sentence in sentences {
        match options.format {
            OutputFormat::Conll => write_conll(out, sentence, options, annotators)?,
            OutputFormat::Plain if options.tokenize => {
                write_tokenized(out, sentence, options, annotators)?
            }
            OutputFormat::Plain => write_raw(out, sentence, options)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, sentence)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn tokens_of(sentence: &SentenceRecord, tokenizer: &dyn Tokenizer) -> Vec<Token> {
    fix_tokens(tokenizer.tokenize(&sentence.text))
}

fn write_conll<W: Write>(
    out: &mut W,
    sentence: &SentenceRecord,
    options: &OutputOptions,
    annotators: &Annotators<'_>,
) -> io::Result<()> {
    let tokens = tokens_of(sentence, annotators.tokenizer);
    let labels = spans_to_labels(&sentence.document, &sentence.entities, &tokens, options.scheme);
    let tags = annotators.pos_tagger.map(|tagger| tagger.tag(&tokens));
    if let Some(tags) = &tags {
        check_len("etiquetas POS", tags.len(), tokens.len())?;
    }
    for (i, token) in tokens.iter().enumerate() {
        let label = if options.entities {
            labels[i].to_string()
        } else {
            String::new()
        };
        match &tags {
            Some(tags) => writeln!(out, "{}\t{}\t{}", token.text, tags[i], label)?,
            None => writeln!(out, "{}\t{}", token.text, label)?,
        }
    }
    writeln!(out)
}

fn write_tokenized<W: Write>(
    out: &mut W,
    sentence: &SentenceRecord,
    options: &OutputOptions,
    annotators: &Annotators<'_>,
) -> io::Result<()> {
    let tokens = tokens_of(sentence, annotators.tokenizer);
    writeln!(out, "{}", join(tokens.iter().map(|t| t.text.as_str()), " "))?;

    let tags = match annotators.pos_tagger {
        Some(tagger) => {
            let tags = tagger.tag(&tokens);
            check_len("etiquetas POS", tags.len(), tokens.len())?;
            writeln!(out, "{}", tags.join(" "))?;
            tags
        }
        None => Vec::new(),
    };
    if let Some(parser) = annotators.dep_parser {
        // O analisador recebe colchetes no padrão do Treebank.
        let escaped: Vec<Token> = tokens
            .iter()
            .map(|t| Token {
                text: escape_bracket(&t.text).to_string(),
                ..t.clone()
            })
            .collect();
        let deps = parser.parse(&escaped, &tags);
        check_len("dependências", deps.len(), tokens.len())?;
        let heads = deps.iter().map(|d| (d.head as i64 - 1).to_string());
        writeln!(out, "{}", heads.collect::<Vec<_>>().join(" "))?;
        writeln!(out, "{}", join(deps.iter().map(|d| d.label.as_str()), " "))?;
    }

    let locate = |mention: &EntityMention| -> Option<(TokenSpan, TokenSpan)> {
        let id = &mention.full_id.0;
        let extent = map_mention_span(&sentence.document, id, mention.extent.span, &tokens)?;
        let head = map_mention_span(&sentence.document, id, mention.head.span, &tokens)?;
        Some((extent, head))
    };
    let describe = |mention: &EntityMention| {
        locate(mention).map(|(extent, head)| {
            descriptor(
                Span::new(extent.start, extent.end),
                Span::new(head.start, head.end),
                mention,
            )
        })
    };
    write_annotation_lines(out, sentence, options, describe)
}

fn write_raw<W: Write>(
    out: &mut W,
    sentence: &SentenceRecord,
    options: &OutputOptions,
) -> io::Result<()> {
    writeln!(out, "{}", sentence.text.replace(['\n', '\t'], " "))?;
    let describe =
        |mention: &EntityMention| Some(descriptor(mention.extent.span, mention.head.span, mention));
    write_annotation_lines(out, sentence, options, describe)
}

/// Linhas de entidades e relações, seguidas da linha em branco.
fn write_annotation_lines<W, F>(
    out: &mut W,
    sentence: &SentenceRecord,
    options: &OutputOptions,
    describe: F,
) -> io::Result<()>
where
    W: Write,
    F: Fn(&EntityMention) -> Option<String>,
{
    if options.entities {
        let entries = sentence.entities.iter().filter_map(&describe);
        writeln!(out, "{}", entries.collect::<Vec<_>>().join("|"))?;
    }
    if options.relations {
        let entries = sentence
            .relations
            .iter()
            .filter_map(|relation| describe_relation(relation, &describe));
        writeln!(out, "{}", entries.collect::<Vec<_>>().join("|"))?;
    }
    writeln!(out)
}

fn describe_relation<F>(relation: &RelationRecord, describe: &F) -> Option<String>
where
    F: Fn(&EntityMention) -> Option<String>,
{
    let mut entry = relation.qualified_type();
    for arg in &relation.args {
        entry.push(' ');
        entry.push_str(&describe(arg)?);
    }
    Some(entry)
}

fn descriptor(extent: Span, head: Span, mention: &EntityMention) -> String {
    format!(
        "{},{},{},{} {},{}",
        extent.start, extent.end, head.start, head.end, mention.label, mention.mention_type
    )
}

/// Etiquetador ou analisador que não devolve um valor por token corromperia as colunas.
fn check_len(what: &str, got: usize, expected: usize) -> io::Result<()> {
    if got == expected {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{what}: {got} valores para {expected} tokens"),
    ))
}

fn join<'a>(parts: impl Iterator<Item = &'a str>, separator: &str) -> String {
    parts.collect::<Vec<_>>().join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::fix_boundaries;
    use crate::corpus::demo_document;
    use crate::document::Document;
    use crate::postag::{Dependency, HeuristicPosTagger};
    use crate::projector::{project_document, ProjectionOptions};
    use crate::splitter::{RuleSentenceSplitter, SentenceSplitter};
    use crate::tokenizer::RegexTokenizer;

    fn demo_sentences() -> Vec<SentenceRecord> {
        let doc = Document::build(demo_document(), true).unwrap();
        let sentences = fix_boundaries(RuleSentenceSplitter::new().split(doc.text.as_str()));
        project_document(&doc, &sentences, &ProjectionOptions::default()).sentences
    }

    fn render(sentences: &[SentenceRecord], options: OutputOptions, annotators: Annotators<'_>) -> String {
        let mut out = Vec::new();
        write_sentences(&mut out, sentences, &options, &annotators).unwrap();
        String::from_utf8(out).unwrap()
    }

    struct ChainParser;

    impl DepParser for ChainParser {
        fn parse(&self, tokens: &[Token], _tags: &[String]) -> Vec<Dependency> {
            (0..tokens.len())
                .map(|i| Dependency {
                    head: i,
                    label: if i == 0 { "root" } else { "dep" }.to_string(),
                })
                .collect()
        }
    }

    #[test]
    fn test_conll_with_pos_and_labels() {
        let sentences = demo_sentences();
        let tokenizer = RegexTokenizer::default();
        let options = OutputOptions {
            format: OutputFormat::Conll,
            entities: true,
            ..OutputOptions::default()
        };
        let annotators = Annotators {
            tokenizer: &tokenizer,
            pos_tagger: Some(&HeuristicPosTagger),
            dep_parser: None,
        };
        let text = render(&sentences[..1], options, annotators);
        assert_eq!(
            text,
            "John\tNNP\tB-PER\nSmith\tNNP\tI-PER\nworks\tNNS\tO\nin\tIN\tO\nParis\tNNP\tB-GPE\n.\t.\tO\n\n"
        );
    }

    #[test]
    fn test_conll_without_entities_leaves_label_empty() {
        let sentences = demo_sentences();
        let tokenizer = RegexTokenizer::default();
        let options = OutputOptions {
            format: OutputFormat::Conll,
            scheme: TagScheme::Bilou,
            ..OutputOptions::default()
        };
        let annotators = Annotators {
            tokenizer: &tokenizer,
            pos_tagger: None,
            dep_parser: None,
        };
        let text = render(&sentences[2..], options, annotators);
        assert!(text.starts_with("The\t\nmeeting\t\n"));
    }

    #[test]
    fn test_tokenized_plain() {
        let sentences = demo_sentences();
        let tokenizer = RegexTokenizer::default();
        let options = OutputOptions {
            format: OutputFormat::Plain,
            tokenize: true,
            entities: true,
            relations: true,
            ..OutputOptions::default()
        };
        let annotators = Annotators {
            tokenizer: &tokenizer,
            pos_tagger: Some(&HeuristicPosTagger),
            dep_parser: Some(&ChainParser),
        };
        let text = render(&sentences[..1], options, annotators);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "John Smith works in Paris .",
                "NNP NNP NNS IN NNP .",
                "-1 0 1 2 3 4",
                "root dep dep dep dep dep",
                "0,2,1,2 PER,NAM|4,5,4,5 GPE,NAM",
                "PHYS::Located 0,2,1,2 PER,NAM 4,5,4,5 GPE,NAM",
                "",
            ]
        );
    }

    /// Devolve o próprio texto de cada token como etiqueta.
    struct EchoTagger;

    impl PosTagger for EchoTagger {
        fn tag(&self, tokens: &[Token]) -> Vec<String> {
            tokens.iter().map(|t| t.text.clone()).collect()
        }
    }

    /// Rótulo de cada arco é o texto que o analisador recebeu.
    struct EchoParser;

    impl DepParser for EchoParser {
        fn parse(&self, tokens: &[Token], tags: &[String]) -> Vec<Dependency> {
            assert!(tags.is_empty() || tags.len() == tokens.len());
            tokens
                .iter()
                .map(|t| Dependency {
                    head: 0,
                    label: t.text.clone(),
                })
                .collect()
        }
    }

    struct ShortTagger;

    impl PosTagger for ShortTagger {
        fn tag(&self, tokens: &[Token]) -> Vec<String> {
            vec!["NN".to_string(); tokens.len().saturating_sub(1)]
        }
    }

    fn bracket_sentence() -> Vec<SentenceRecord> {
        let mut sentences = demo_sentences();
        sentences.truncate(1);
        sentences[0].text = "Acme ( Ltd ) grew .".to_string();
        sentences[0].entities.clear();
        sentences[0].relations.clear();
        sentences
    }

    #[test]
    fn test_parser_without_tagger() {
        let sentences = bracket_sentence();
        let tokenizer = RegexTokenizer::default();
        let annotators = Annotators {
            tokenizer: &tokenizer,
            pos_tagger: None,
            dep_parser: Some(&EchoParser),
        };
        let options = OutputOptions {
            tokenize: true,
            ..OutputOptions::default()
        };
        let text = render(&sentences, options, annotators);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Acme ( Ltd ) grew .",
                "-1 -1 -1 -1 -1 -1",
                "Acme -LRB- Ltd -RRB- grew .",
                "",
            ]
        );
    }

    #[test]
    fn test_tagger_sees_raw_brackets() {
        let sentences = bracket_sentence();
        let tokenizer = RegexTokenizer::default();
        let annotators = Annotators {
            tokenizer: &tokenizer,
            pos_tagger: Some(&EchoTagger),
            dep_parser: Some(&EchoParser),
        };
        let options = OutputOptions {
            tokenize: true,
            ..OutputOptions::default()
        };
        let text = render(&sentences, options, annotators);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "Acme ( Ltd ) grew .");
        assert_eq!(lines[3], "Acme -LRB- Ltd -RRB- grew .");
    }

    #[test]
    fn test_short_tagger_is_an_error() {
        let sentences = demo_sentences();
        let tokenizer = RegexTokenizer::default();
        let annotators = Annotators {
            tokenizer: &tokenizer,
            pos_tagger: Some(&ShortTagger),
            dep_parser: None,
        };
        for format in [OutputFormat::Conll, OutputFormat::Plain] {
            let options = OutputOptions {
                format,
                tokenize: true,
                entities: true,
                ..OutputOptions::default()
            };
            let mut out = Vec::new();
            let err = write_sentences(&mut out, &sentences[..1], &options, &annotators).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        }
    }

    #[test]
    fn test_raw_plain_uses_character_offsets() {
        let sentences = demo_sentences();
        let tokenizer = RegexTokenizer::default();
        let options = OutputOptions {
            entities: true,
            relations: true,
            ..OutputOptions::default()
        };
        let annotators = Annotators {
            tokenizer: &tokenizer,
            pos_tagger: None,
            dep_parser: None,
        };
        let text = render(&sentences[1..2], options, annotators);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "He met Mary Jones there on Tuesday.");
        assert_eq!(lines[1], "0,2,0,2 PER,PRO|7,17,12,17 PER,NAM");
        assert_eq!(lines[2], "PER-SOC::Business 0,2,0,2 PER,PRO 7,17,12,17 PER,NAM");
    }

    #[test]
    fn test_json_lines() {
        let sentences = demo_sentences();
        let tokenizer = RegexTokenizer::default();
        let options = OutputOptions {
            format: OutputFormat::Json,
            ..OutputOptions::default()
        };
        let annotators = Annotators {
            tokenizer: &tokenizer,
            pos_tagger: None,
            dep_parser: None,
        };
        let text = render(&sentences, options, annotators);
        let parsed: Vec<SentenceRecord> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed, sentences);
    }
}
