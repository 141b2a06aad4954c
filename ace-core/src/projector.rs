//! # Projeção de Menções em Sentenças
//!
//! Distribui as menções de um documento (já reparadas) pelas sentenças corrigidas.
//! Cada sentença recebe **cópias** das menções que contém, com os spans traduzidos para
//! coordenadas do texto da sentença.
//!
//! ## Regras por tipo
//!
//! | Tipo              | Entra na sentença quando...                                 |
//! |-------------------|-------------------------------------------------------------|
//! | Entidade          | a sentença contém o extent                                  |
//! | Relação           | a sentença contém o extent **e** os dois argumentos          |
//! | Evento/Timex/Valor| a sentença contém o extent                                  |
//!
//! Uma relação cujo extent está na sentença mas com argumento fora dela é descartada
//! (não é órfã). Menções que nenhuma sentença contém são **órfãs** e vão para o relatório.
//!
//! Com a resolução de sobreposições ligada, entre duas entidades sobrepostas da mesma
//! sentença fica a de span mais longo; em empate fica a que entrou primeiro.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{
    Document, EntityMention, EventMention, Mention, MentionId, MentionKind, RelationMention,
    TimexMention, ValueMention,
};
use crate::span::Span;
use crate::splitter::RawSentence;

/// Opções de projeção.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOptions {
    /// Mantém só a mais longa entre entidades sobrepostas.
    pub resolve_overlaps: bool,
}

/// Menção de relação com os argumentos já copiados para a sentença.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub mention: RelationMention,
    pub relation_type: String,
    pub relation_subtype: String,
    pub args: [EntityMention; 2],
}

impl RelationRecord {
    /// `TYPE::SUBTYPE`
    pub fn qualified_type(&self) -> String {
        format!("{}::{}", self.relation_type, self.relation_subtype)
    }
}

/// Uma sentença com suas anotações em coordenadas locais.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub document: String,
    /// Posição da sentença no documento.
    pub index: usize,
    /// Span no texto de trabalho do documento.
    pub span: Span,
    pub text: String,
    pub entities: Vec<EntityMention>,
    pub relations: Vec<RelationRecord>,
    pub events: Vec<EventMention>,
    pub timexes: Vec<TimexMention>,
    pub values: Vec<ValueMention>,
}

/// Referência estável a uma menção de um documento.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MentionRef {
    pub document: String,
    pub mention: MentionId,
}

/// Menções sem sentença e relações descartadas por argumento fora da sentença.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanReport {
    pub orphans: BTreeMap<MentionKind, Vec<MentionRef>>,
    pub dropped_relations: Vec<MentionRef>,
}

impl OrphanReport {
    pub fn count(&self, kind: MentionKind) -> usize {
        self.orphans.get(&kind).map_or(0, Vec::len)
    }

    pub fn total(&self) -> usize {
        self.orphans.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0 && self.dropped_relations.is_empty()
    }

    /// Junta dois relatórios; a ordem final é por documento e id, independente da
    /// ordem de chegada.
    pub fn merge(&mut self, other: OrphanReport) {
        for (kind, refs) in other.orphans {
            let list = self.orphans.entry(kind).or_default();
            list.extend(refs);
            list.sort();
        }
        self.dropped_relations.extend(other.dropped_relations);
        self.dropped_relations.sort();
    }

    /// Uma linha por tipo com a contagem e os ids.
    pub fn log_summary(&self) {
        for kind in MentionKind::ALL {
            let refs = self.orphans.get(&kind).map(Vec::as_slice).unwrap_or(&[]);
            let ids: Vec<String> = refs
                .iter()
                .map(|r| r.mention.to_string())
                .collect();
            info!(
                "menções de {} fora de qualquer sentença: {} [{}]",
                kind,
                refs.len(),
                ids.join(",")
            );
        }
        if !self.dropped_relations.is_empty() {
            info!(
                "relações descartadas por argumento fora da sentença: {}",
                self.dropped_relations.len()
            );
        }
    }
}

/// Resultado da projeção de um documento.
#[derive(Debug, Clone, Default)]
pub struct DocumentProjection {
    pub sentences: Vec<SentenceRecord>,
    pub report: OrphanReport,
}

/// Span traduzido para a sentença; partes fora dela são cortadas.
fn localize(span: Span, sentence: &Span) -> Option<Span> {
    span.clip_to(sentence)?.relative_to(sentence.start)
}

fn localize_entity(mention: &EntityMention, sentence: &Span) -> Option<EntityMention> {
    if !sentence.contains(&mention.extent.span) {
        return None;
    }
    let mut copy = mention.clone();
    copy.extent.span = localize(mention.extent.span, sentence)?;
    copy.head.span = if sentence.contains(&mention.head.span) {
        localize(mention.head.span, sentence)?
    } else {
        copy.extent.span
    };
    Some(copy)
}

/// Insere `candidate` aplicando a resolução de sobreposições.
fn accept_entity(entities: &mut Vec<EntityMention>, candidate: EntityMention, resolve: bool) {
    if resolve {
        let span = candidate.extent.span;
        for i in (0..entities.len()).rev() {
            let existing = entities[i].extent.span;
            if !span.overlaps(&existing) {
                continue;
            }
            if span.len() > existing.len() {
                entities.remove(i);
            } else {
                return;
            }
        }
    }
    entities.push(candidate);
}

/// Projeta as menções do documento nas sentenças dadas.
pub fn project_document(
    document: &Document,
    sentences: &[RawSentence],
    options: &ProjectionOptions,
) -> DocumentProjection {
    let mut claimed: HashSet<&MentionId> = HashSet::new();
    let mut dropped: Vec<MentionRef> = Vec::new();
    let mention_ref = |id: &MentionId| MentionRef {
        document: document.uri.clone(),
        mention: id.clone(),
    };

    let mut records = Vec::with_capacity(sentences.len());
    for (index, sentence) in sentences.iter().enumerate() {
        let bounds = sentence.span;
        let mut record = SentenceRecord {
            document: document.uri.clone(),
            index,
            span: bounds,
            text: sentence.text.clone(),
            entities: Vec::new(),
            relations: Vec::new(),
            events: Vec::new(),
            timexes: Vec::new(),
            values: Vec::new(),
        };

        for mention in document.mentions_of(MentionKind::Entity) {
            let Some(entity) = mention.as_entity() else {
                continue;
            };
            if let Some(local) = localize_entity(entity, &bounds) {
                claimed.insert(&entity.full_id);
                accept_entity(&mut record.entities, local, options.resolve_overlaps);
            }
        }

        for mention in document.mentions_of(MentionKind::Relation) {
            let Mention::Relation(relation) = mention else {
                continue;
            };
            if !bounds.contains(&relation.extent.span) {
                continue;
            }
            let args = [
                document.entity_mention(&relation.args[0]),
                document.entity_mention(&relation.args[1]),
            ];
            let [Some(first), Some(second)] = args else {
                debug!(
                    "{}: relação {} com argumento inexistente",
                    document.uri, relation.full_id
                );
                continue;
            };
            let (Some(first), Some(second)) = (
                localize_entity(first, &bounds),
                localize_entity(second, &bounds),
            ) else {
                dropped.push(mention_ref(&relation.full_id));
                continue;
            };
            let mut copy = relation.clone();
            copy.extent.span = match localize(relation.extent.span, &bounds) {
                Some(span) => span,
                None => continue,
            };
            let parent = document.parent_of(mention);
            claimed.insert(&relation.full_id);
            record.relations.push(RelationRecord {
                mention: copy,
                relation_type: parent.map(|p| p.object_type.clone()).unwrap_or_default(),
                relation_subtype: parent.map(|p| p.subtype.clone()).unwrap_or_default(),
                args: [first, second],
            });
        }

        for mention in document.mentions_of(MentionKind::Event) {
            let Mention::Event(event) = mention else {
                continue;
            };
            let Some(extent) = bounds
                .contains(&event.extent.span)
                .then(|| localize(event.extent.span, &bounds))
                .flatten()
            else {
                continue;
            };
            let mut copy = event.clone();
            copy.extent.span = extent;
            copy.scope.span = localize(event.scope.span, &bounds).unwrap_or(extent);
            copy.anchor.span = localize(event.anchor.span, &bounds).unwrap_or(extent);
            claimed.insert(&event.full_id);
            record.events.push(copy);
        }

        for mention in document.mentions_of(MentionKind::Timex) {
            let Mention::Timex(timex) = mention else {
                continue;
            };
            if !bounds.contains(&timex.extent.span) {
                continue;
            }
            if let Some(span) = localize(timex.extent.span, &bounds) {
                let mut copy = timex.clone();
                copy.extent.span = span;
                claimed.insert(&timex.full_id);
                record.timexes.push(copy);
            }
        }

        for mention in document.mentions_of(MentionKind::Value) {
            let Mention::Value(value) = mention else {
                continue;
            };
            if !bounds.contains(&value.extent.span) {
                continue;
            }
            if let Some(span) = localize(value.extent.span, &bounds) {
                let mut copy = value.clone();
                copy.extent.span = span;
                claimed.insert(&value.full_id);
                record.values.push(copy);
            }
        }

        records.push(record);
    }

    let dropped_ids: HashSet<&MentionId> = dropped.iter().map(|r| &r.mention).collect();
    let mut report = OrphanReport::default();
    for kind in MentionKind::ALL {
        let mut orphans: Vec<MentionRef> = document
            .catalog(kind)
            .iter()
            .filter(|id| !claimed.contains(id) && !dropped_ids.contains(id))
            .map(mention_ref)
            .collect();
        if !orphans.is_empty() {
            orphans.sort();
            report.orphans.insert(kind, orphans);
        }
    }
    dropped.sort();
    report.dropped_relations = dropped;

    DocumentProjection {
        sentences: records,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::fix_boundaries;
    use crate::corpus::{demo_document, DEMO_URI};
    use crate::raw::{RawCharseq, RawDocument, RawEntity, RawEntityMention};
    use crate::splitter::{RuleSentenceSplitter, SentenceSplitter};

    fn sentences(doc: &Document) -> Vec<RawSentence> {
        fix_boundaries(RuleSentenceSplitter::new().split(doc.text.as_str()))
    }

    fn ids(entities: &[EntityMention]) -> Vec<String> {
        entities.iter().map(|e| e.full_id.to_string()).collect()
    }

    fn full(suffix: &str) -> String {
        format!("{DEMO_URI}-{suffix}")
    }

    /// Acrescenta uma entidade com uma menção localizada no corpo.
    fn add_entity(raw: &mut RawDocument, suffix: &str, entity_type: &str, needle: &str) {
        let body_start = raw.full_text.find("John").unwrap();
        let extent = RawCharseq::locate(&raw.full_text, needle, body_start).unwrap();
        raw.entities.push(RawEntity {
            id: full(suffix),
            entity_type: entity_type.to_string(),
            subtype: String::new(),
            class: "SPC".to_string(),
            mentions: vec![RawEntityMention {
                id: full(&format!("{suffix}-1")),
                mention_type: "NOM".to_string(),
                ldc_type: "NOM".to_string(),
                ldc_atr: "FALSE".to_string(),
                extent,
                head: None,
            }],
        });
    }

    #[test]
    fn test_demo_projection() {
        let doc = Document::build(demo_document(), true).unwrap();
        let projection = project_document(&doc, &sentences(&doc), &ProjectionOptions::default());
        assert_eq!(projection.sentences.len(), 3);
        assert!(projection.report.is_empty());

        let first = &projection.sentences[0];
        assert_eq!(first.text, "John Smith works in Paris.");
        assert_eq!(ids(&first.entities), vec![full("E1-1"), full("E2-1")]);
        assert_eq!(first.entities[0].head.span, Span::new(5, 10));
        assert_eq!(first.relations.len(), 1);
        assert_eq!(first.relations[0].qualified_type(), "PHYS::Located");
        assert_eq!(first.relations[0].args[1].extent.span, Span::new(20, 25));

        let second = &projection.sentences[1];
        assert_eq!(second.span, Span::new(27, 62));
        let mary = &second.entities[1];
        assert_eq!(mary.extent.span, Span::new(7, 17));
        assert_eq!(mary.head.span, Span::new(12, 17));
        let meeting = &second.events[0];
        assert_eq!(meeting.extent.span, Span::new(0, 34));
        assert_eq!(meeting.scope.span, Span::new(0, 35));
        assert_eq!(meeting.anchor.span, Span::new(3, 6));
        assert_eq!(second.timexes[0].extent.span, Span::new(27, 34));

        let third = &projection.sentences[2];
        assert_eq!(third.values[0].extent.span, Span::new(17, 27));
    }

    #[test]
    fn test_translated_spans_stay_inside_sentence() {
        let doc = Document::build(demo_document(), true).unwrap();
        let projection = project_document(&doc, &sentences(&doc), &ProjectionOptions::default());
        for sentence in &projection.sentences {
            let len = sentence.text.chars().count();
            let mut spans: Vec<Span> = Vec::new();
            for e in &sentence.entities {
                spans.extend([e.extent.span, e.head.span]);
            }
            for r in &sentence.relations {
                spans.push(r.mention.extent.span);
                spans.extend(r.args.iter().map(|a| a.extent.span));
            }
            for e in &sentence.events {
                spans.extend([e.extent.span, e.scope.span, e.anchor.span]);
            }
            spans.extend(sentence.timexes.iter().map(|t| t.extent.span));
            spans.extend(sentence.values.iter().map(|v| v.extent.span));
            for span in spans {
                assert!(span.start <= span.end && span.end <= len, "{span} fora de {len}");
            }
        }
    }

    #[test]
    fn test_relation_with_argument_outside_sentence_dropped() {
        let mut raw = demo_document();
        // R2 ("He met Mary Jones") passa a apontar para "John Smith", na sentença anterior.
        raw.relations[1].mentions[0].arguments[0].ref_id = full("E1-1");
        let doc = Document::build(raw, true).unwrap();
        let projection = project_document(&doc, &sentences(&doc), &ProjectionOptions::default());
        assert!(projection.sentences[1].relations.is_empty());
        assert_eq!(
            projection.report.dropped_relations,
            vec![MentionRef {
                document: DEMO_URI.to_string(),
                mention: MentionId(full("R2-1")),
            }]
        );
        assert_eq!(projection.report.count(MentionKind::Relation), 0);
    }

    #[test]
    fn test_mentions_without_sentence_are_orphans() {
        let doc = Document::build(demo_document(), true).unwrap();
        let mut fixed = sentences(&doc);
        fixed.pop();
        let projection = project_document(&doc, &fixed, &ProjectionOptions::default());
        assert_eq!(projection.report.count(MentionKind::Value), 1);
        assert_eq!(projection.report.total(), 1);
    }

    #[test]
    fn test_overlap_resolution_keeps_longer() {
        let mut raw = demo_document();
        add_entity(&mut raw, "E4", "LOC", "in Paris");
        add_entity(&mut raw, "E5", "PER", "Smith works");
        let doc = Document::build(raw, true).unwrap();
        let fixed = sentences(&doc);

        let kept = project_document(&doc, &fixed, &ProjectionOptions::default());
        assert_eq!(kept.sentences[0].entities.len(), 4);

        let options = ProjectionOptions {
            resolve_overlaps: true,
        };
        let resolved = project_document(&doc, &fixed, &options);
        assert_eq!(
            ids(&resolved.sentences[0].entities),
            vec![full("E5-1"), full("E4-1")]
        );
        // Menções removidas pela resolução continuam atribuídas à sentença.
        assert!(resolved.report.is_empty());
    }

    #[test]
    fn test_overlap_tie_keeps_existing() {
        let mut raw = demo_document();
        add_entity(&mut raw, "E4", "ORG", "works in");
        add_entity(&mut raw, "E5", "LOC", "in Paris");
        let doc = Document::build(raw, true).unwrap();
        let options = ProjectionOptions {
            resolve_overlaps: true,
        };
        let resolved = project_document(&doc, &sentences(&doc), &options);
        // "in Paris" empata com "works in", que já estava aceita; "Paris" não sobrepõe mais nada.
        assert_eq!(
            ids(&resolved.sentences[0].entities),
            vec![full("E1-1"), full("E4-1"), full("E2-1")]
        );
    }

    #[test]
    fn test_report_merge_is_sorted() {
        let mut a = OrphanReport::default();
        a.orphans.insert(
            MentionKind::Entity,
            vec![MentionRef {
                document: "b".to_string(),
                mention: MentionId::from("b-E1-1"),
            }],
        );
        let mut b = OrphanReport::default();
        b.orphans.insert(
            MentionKind::Entity,
            vec![MentionRef {
                document: "a".to_string(),
                mention: MentionId::from("a-E1-1"),
            }],
        );
        a.merge(b);
        let docs: Vec<&str> = a.orphans[&MentionKind::Entity]
            .iter()
            .map(|r| r.document.as_str())
            .collect();
        assert_eq!(docs, vec!["a", "b"]);
    }
}
