//! # Leitura do Corpus ACE
//!
//! Um corpus convertido é um diretório com um arquivo JSON por documento, agrupados em
//! subdiretórios de **domínio** (gênero textual). Arquivos na raiz ficam sem domínio.
//!
//! ```text
//! ace2005/
//! ├── bn/CNN_ENG_20030305_170125.1.json
//! ├── nw/AFP_ENG_20030304.0250.json
//! └── wl/timex2norm/...
//! ```
//!
//! ## Domínios Conhecidos
//!
//! | Versão  | Domínios                                                              |
//! |---------|-----------------------------------------------------------------------|
//! | ACE2004 | arabic_treebank, bnews, chinese_treebank, fisher_transcripts, nwire    |
//! | ACE2005 | bc, bn, cts, nw, un, wl                                               |
//!
//! O módulo também traz um documento de demonstração montado em código, usado pelo
//! modo `--demo` da linha de comando e pelos testes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::AceVersion;
use crate::error::CorpusError;
use crate::raw::{
    RawArgument, RawCharseq, RawDocument, RawEntity, RawEntityMention, RawEvent, RawEventMention,
    RawPlainMention, RawPlainObject, RawRelation, RawRelationMention,
};

pub const ACE2004_DOMAINS: &[&str] = &[
    "arabic_treebank",
    "bnews",
    "chinese_treebank",
    "fisher_transcripts",
    "nwire",
];

pub const ACE2005_DOMAINS: &[&str] = &["bc", "bn", "cts", "nw", "un", "wl"];

/// Um arquivo de documento do corpus.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CorpusEntry {
    /// Nome do subdiretório de primeiro nível; vazio para arquivos na raiz.
    pub domain: String,
    pub path: PathBuf,
}

/// Lista os documentos JSON sob `root`, em ordem de caminho.
///
/// `include` vazio aceita todos os domínios; `exclude` tem precedência sobre `include`.
/// Arquivos na raiz só entram quando não há filtro de inclusão.
pub fn list_documents(
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<CorpusEntry>, CorpusError> {
    if !root.is_dir() {
        return Err(CorpusError::MissingRoot(root.to_path_buf()));
    }
    let accepts = |domain: &str| {
        let included = include.is_empty() || include.iter().any(|d| d == domain);
        included && !exclude.iter().any(|d| d == domain)
    };

    let mut entries = Vec::new();
    for path in read_dir_sorted(root)? {
        if path.is_dir() {
            let domain = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            if !accepts(&domain) {
                continue;
            }
            let mut files = Vec::new();
            collect_json(&path, &mut files)?;
            entries.extend(files.into_iter().map(|path| CorpusEntry {
                domain: domain.clone(),
                path,
            }));
        } else if is_json(&path) && include.is_empty() {
            entries.push(CorpusEntry {
                domain: String::new(),
                path,
            });
        }
    }
    entries.sort();
    Ok(entries)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let io_error = |source| CorpusError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        paths.push(entry.map_err(io_error)?.path());
    }
    paths.sort();
    Ok(paths)
}

fn collect_json(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CorpusError> {
    for path in read_dir_sorted(dir)? {
        if path.is_dir() {
            collect_json(&path, files)?;
        } else if is_json(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Identificador do documento de demonstração.
pub const DEMO_URI: &str = "AFP_ENG_20030304.0250";

const DEMO_HEADER: &str = "AFP_ENG_20030304.0250\nNEWS STORY\n\n";

const DEMO_BODY: &str = "John Smith works in Paris. He met Mary Jones there on Tuesday.\n\n\
                         The meeting cost $5 million.";

/// Documento de notícia com cabeçalho, duas entidades de pessoa, um local, um valor,
/// uma expressão temporal, duas relações e um evento de encontro.
pub fn demo_document() -> RawDocument {
    let full_text = format!("{DEMO_HEADER}{DEMO_BODY}");
    let body_start = DEMO_HEADER.chars().count();
    let seq = |needle: &str| {
        RawCharseq::locate(&full_text, needle, body_start)
            .unwrap_or_else(|| panic!("trecho de demonstração ausente: {needle}"))
    };
    let id = |suffix: &str| format!("{DEMO_URI}-{suffix}");
    let arg = |role: &str, suffix: &str| RawArgument {
        role: role.to_string(),
        ref_id: id(suffix),
    };
    let entity_mention = |suffix: &str, mention_type: &str, extent: &str, head: &str| {
        RawEntityMention {
            id: id(suffix),
            mention_type: mention_type.to_string(),
            ldc_type: mention_type.to_string(),
            ldc_atr: "FALSE".to_string(),
            extent: seq(extent),
            head: Some(seq(head)),
        }
    };
    let entity = |suffix: &str, entity_type: &str, subtype: &str, mentions| RawEntity {
        id: id(suffix),
        entity_type: entity_type.to_string(),
        subtype: subtype.to_string(),
        class: "SPC".to_string(),
        mentions,
    };

    let entities = vec![
        entity(
            "E1",
            "PER",
            "Individual",
            vec![
                entity_mention("E1-1", "NAM", "John Smith", "Smith"),
                entity_mention("E1-2", "PRO", "He", "He"),
            ],
        ),
        entity(
            "E2",
            "GPE",
            "Population-Center",
            vec![entity_mention("E2-1", "NAM", "Paris", "Paris")],
        ),
        entity(
            "E3",
            "PER",
            "Individual",
            vec![entity_mention("E3-1", "NAM", "Mary Jones", "Jones")],
        ),
    ];

    let values = vec![RawPlainObject {
        id: id("V1"),
        object_type: "Numeric".to_string(),
        subtype: "Money".to_string(),
        val: None,
        mentions: vec![RawPlainMention {
            id: id("V1-1"),
            extent: seq("$5 million"),
        }],
    }];

    let timexes = vec![RawPlainObject {
        id: id("T1"),
        object_type: String::new(),
        subtype: String::new(),
        val: Some("2003-03-04".to_string()),
        mentions: vec![RawPlainMention {
            id: id("T1-1"),
            extent: seq("Tuesday"),
        }],
    }];

    let relation = |suffix: &str, relation_type: &str, subtype: &str, args: [&str; 2], extent: &str| {
        RawRelation {
            id: id(suffix),
            relation_type: relation_type.to_string(),
            subtype: subtype.to_string(),
            tense: Some("Present".to_string()),
            modality: Some("Asserted".to_string()),
            arguments: vec![
                arg("Arg-1", &args[0][..2]),
                arg("Arg-2", &args[1][..2]),
            ],
            mentions: vec![RawRelationMention {
                id: id(&format!("{suffix}-1")),
                lexical_condition: "Verbal".to_string(),
                extent: seq(extent),
                arguments: vec![arg("Arg-1", args[0]), arg("Arg-2", args[1])],
            }],
        }
    };
    let relations = vec![
        relation("R1", "PHYS", "Located", ["E1-1", "E2-1"], "John Smith works in Paris"),
        relation("R2", "PER-SOC", "Business", ["E1-2", "E3-1"], "He met Mary Jones"),
    ];

    let events = vec![RawEvent {
        id: id("EV1"),
        event_type: "Contact".to_string(),
        subtype: "Meet".to_string(),
        tense: Some("Past".to_string()),
        genericity: Some("Specific".to_string()),
        polarity: Some("Positive".to_string()),
        modality: Some("Asserted".to_string()),
        arguments: vec![
            arg("Entity", "E1"),
            arg("Entity", "E3"),
            arg("Place", "E2"),
            arg("Time-Within", "T1"),
        ],
        mentions: vec![RawEventMention {
            id: id("EV1-1"),
            extent: seq("He met Mary Jones there on Tuesday"),
            scope: seq("He met Mary Jones there on Tuesday."),
            anchor: seq("met"),
            arguments: vec![
                arg("Entity", "E1-2"),
                arg("Entity", "E3-1"),
                arg("Time-Within", "T1-1"),
            ],
        }],
    }];

    RawDocument {
        uri: DEMO_URI.to_string(),
        version: AceVersion::Ace2005,
        full_text,
        body_text: Some(DEMO_BODY.to_string()),
        entities,
        values,
        timexes,
        relations,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, MentionKind};
    use crate::schema::validate_event_arguments;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn test_list_documents_by_domain() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("nw/b.json"));
        touch(&dir.path().join("nw/a.json"));
        touch(&dir.path().join("bn/timex2norm/c.json"));
        touch(&dir.path().join("bn/notes.txt"));
        touch(&dir.path().join("loose.json"));

        let all = list_documents(dir.path(), &[], &[]).unwrap();
        let names: Vec<(&str, &str)> = all
            .iter()
            .map(|e| (e.domain.as_str(), e.path.file_name().unwrap().to_str().unwrap()))
            .collect();
        assert_eq!(
            names,
            vec![("", "loose.json"), ("bn", "c.json"), ("nw", "a.json"), ("nw", "b.json")]
        );

        let only_nw = list_documents(dir.path(), &["nw".to_string()], &[]).unwrap();
        assert_eq!(only_nw.len(), 2);
        let no_nw = list_documents(dir.path(), &[], &["nw".to_string()]).unwrap();
        assert_eq!(no_nw.len(), 2);
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            list_documents(&missing, &[], &[]),
            Err(CorpusError::MissingRoot(_))
        ));
    }

    #[test]
    fn test_demo_document_is_consistent() {
        let doc = Document::build(demo_document(), true).unwrap();
        assert_eq!(doc.offset, DEMO_HEADER.chars().count());
        for kind in MentionKind::ALL {
            assert!(doc.misaligned(kind).is_empty(), "{kind} desalinhado");
        }
        assert_eq!(doc.catalog(MentionKind::Entity).len(), 4);
        assert_eq!(doc.catalog(MentionKind::Relation).len(), 2);
        assert_eq!(doc.catalog(MentionKind::Event).len(), 1);
        assert!(validate_event_arguments(&doc).is_empty());
    }
}
