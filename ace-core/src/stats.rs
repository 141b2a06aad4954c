//! Estatísticas do corpus e das sentenças emitidas.
//!
//! Cada documento produz um [`CorpusStats`] próprio; o lote soma todos com
//! [`CorpusStats::merge`], em qualquer ordem.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::document::{Document, MentionKind};
use crate::projector::{OrphanReport, SentenceRecord};
use crate::repair::RepairSummary;
use crate::tokenizer::{fix_tokens, Tokenizer};

/// Contagens por tipo e por `tipo::subtipo` de um tipo de objeto.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub objects: usize,
    pub mentions: usize,
    /// Objetos por tipo e por `tipo::subtipo`.
    pub objects_by_type: BTreeMap<String, usize>,
    /// Menções por tipo e por `tipo::subtipo`; objeto sem menções conta uma.
    pub mentions_by_type: BTreeMap<String, usize>,
}

impl TypeCounts {
    fn merge(&mut self, other: TypeCounts) {
        self.objects += other.objects;
        self.mentions += other.mentions;
        add_all(&mut self.objects_by_type, other.objects_by_type);
        add_all(&mut self.mentions_by_type, other.mentions_by_type);
    }
}

fn add_all<K: Ord>(target: &mut BTreeMap<K, usize>, source: BTreeMap<K, usize>) {
    for (key, count) in source {
        *target.entry(key).or_insert(0) += count;
    }
}

/// Totais de um ou mais documentos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub documents: usize,
    pub lowercase_documents: usize,
    pub failed_documents: usize,
    pub by_kind: BTreeMap<MentionKind, TypeCounts>,
    /// Menções de entidade que se sobrepõem a alguma outra do mesmo documento.
    pub overlapping_entity_mentions: usize,
    /// Tamanho (em tokens) das menções de entidade → quantidade.
    pub entity_mention_lengths: BTreeMap<usize, usize>,
    pub relocated_mentions: usize,
    pub removed_mentions: usize,
    pub outside_text_mentions: usize,
    pub schema_violations: usize,
    pub orphan_mentions: usize,
    pub dropped_relations: usize,
}

impl CorpusStats {
    /// Contagens de um documento já reparado.
    pub fn from_document(document: &Document, tokenizer: &dyn Tokenizer) -> Self {
        let mut stats = CorpusStats {
            documents: 1,
            lowercase_documents: usize::from(document.lowercase),
            outside_text_mentions: document.outside_text().len(),
            ..CorpusStats::default()
        };

        for kind in MentionKind::ALL {
            let mut counts = TypeCounts::default();
            for object in document.objects_of(kind) {
                if object.mentions.is_empty()
                    && !(kind == MentionKind::Relation && object.object_type == "METONYMY")
                {
                    debug!("{}: {} sem menções", document.uri, object.id);
                }
                let weight = object.mentions.len().max(1);
                counts.objects += 1;
                counts.mentions += object.mentions.len();
                let mut keys = vec![object.object_type.clone()];
                if !object.subtype.is_empty() {
                    keys.push(object.qualified_type());
                }
                for key in keys {
                    *counts.objects_by_type.entry(key.clone()).or_insert(0) += 1;
                    *counts.mentions_by_type.entry(key).or_insert(0) += weight;
                }
            }
            if counts.objects > 0 {
                stats.by_kind.insert(kind, counts);
            }
        }

        let entities: Vec<_> = document.mentions_of(MentionKind::Entity).collect();
        for (i, mention) in entities.iter().enumerate() {
            let span = mention.span();
            let overlaps = entities
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && span.overlaps(&other.span()));
            stats.overlapping_entity_mentions += usize::from(overlaps);
            let length = fix_tokens(tokenizer.tokenize(&mention.extent().text)).len();
            *stats.entity_mention_lengths.entry(length).or_insert(0) += 1;
        }
        stats
    }

    pub fn failed() -> Self {
        CorpusStats {
            failed_documents: 1,
            ..CorpusStats::default()
        }
    }

    pub fn record_repairs(&mut self, summary: &RepairSummary) {
        self.relocated_mentions += summary.relocated();
        self.removed_mentions += summary.removed();
    }

    pub fn record_projection(&mut self, report: &OrphanReport) {
        self.orphan_mentions += report.total();
        self.dropped_relations += report.dropped_relations.len();
    }

    pub fn merge(&mut self, other: CorpusStats) {
        self.documents += other.documents;
        self.lowercase_documents += other.lowercase_documents;
        self.failed_documents += other.failed_documents;
        for (kind, counts) in other.by_kind {
            self.by_kind.entry(kind).or_default().merge(counts);
        }
        self.overlapping_entity_mentions += other.overlapping_entity_mentions;
        add_all(&mut self.entity_mention_lengths, other.entity_mention_lengths);
        self.relocated_mentions += other.relocated_mentions;
        self.removed_mentions += other.removed_mentions;
        self.outside_text_mentions += other.outside_text_mentions;
        self.schema_violations += other.schema_violations;
        self.orphan_mentions += other.orphan_mentions;
        self.dropped_relations += other.dropped_relations;
    }

    pub fn objects(&self, kind: MentionKind) -> usize {
        self.by_kind.get(&kind).map_or(0, |c| c.objects)
    }

    pub fn mentions(&self, kind: MentionKind) -> usize {
        self.by_kind.get(&kind).map_or(0, |c| c.mentions)
    }
}

impl fmt::Display for CorpusStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Documentos: {}", self.documents)?;
        writeln!(f, "Documentos em minúsculas: {}", self.lowercase_documents)?;
        if self.failed_documents > 0 {
            writeln!(f, "Documentos com erro: {}", self.failed_documents)?;
        }
        for kind in MentionKind::ALL {
            writeln!(
                f,
                "{}: {} objetos, {} menções",
                kind,
                self.objects(kind),
                self.mentions(kind)
            )?;
        }
        writeln!(
            f,
            "Menções de entidade sobrepostas: {}",
            self.overlapping_entity_mentions
        )?;
        writeln!(f, "Tamanho das menções de entidade (tokens):")?;
        for (length, count) in &self.entity_mention_lengths {
            writeln!(f, "  {}: {}", length, count)?;
        }
        writeln!(
            f,
            "Reparo: {} realocadas, {} removidas",
            self.relocated_mentions, self.removed_mentions
        )?;
        writeln!(f, "Fora do texto de trabalho: {}", self.outside_text_mentions)?;
        writeln!(f, "Violações de esquema de evento: {}", self.schema_violations)?;
        writeln!(f, "Menções órfãs: {}", self.orphan_mentions)?;
        writeln!(f, "Relações descartadas: {}", self.dropped_relations)?;
        for (kind, counts) in &self.by_kind {
            writeln!(f, "Menções de {} por tipo:", kind)?;
            for (key, mentions) in &counts.mentions_by_type {
                let objects = counts.objects_by_type.get(key).copied().unwrap_or(0);
                writeln!(f, "  {}: {} ({})", key, mentions, objects)?;
            }
        }
        Ok(())
    }
}

/// Tipos de entidade e de relação nas sentenças de um arquivo de saída.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentenceStats {
    pub sentences: usize,
    pub entity_types: BTreeMap<String, usize>,
    pub relation_types: BTreeMap<String, usize>,
}

impl SentenceStats {
    pub fn from_sentences(sentences: &[SentenceRecord]) -> Self {
        let mut stats = SentenceStats {
            sentences: sentences.len(),
            ..SentenceStats::default()
        };
        for sentence in sentences {
            for entity in &sentence.entities {
                *stats.entity_types.entry(entity.label.clone()).or_insert(0) += 1;
            }
            for relation in &sentence.relations {
                *stats
                    .relation_types
                    .entry(relation.relation_type.clone())
                    .or_insert(0) += 1;
            }
        }
        stats
    }

    pub fn merge(&mut self, other: SentenceStats) {
        self.sentences += other.sentences;
        add_all(&mut self.entity_types, other.entity_types);
        add_all(&mut self.relation_types, other.relation_types);
    }
}

impl fmt::Display for SentenceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sentenças: {}", self.sentences)?;
        writeln!(f, "Entidades:")?;
        for (label, count) in &self.entity_types {
            writeln!(f, "  {}: {}", label, count)?;
        }
        writeln!(f, "Relações:")?;
        for (label, count) in &self.relation_types {
            writeln!(f, "  {}: {}", label, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::fix_boundaries;
    use crate::corpus::demo_document;
    use crate::projector::{project_document, ProjectionOptions};
    use crate::splitter::{RuleSentenceSplitter, SentenceSplitter};
    use crate::tokenizer::RegexTokenizer;

    #[test]
    fn test_document_counts() {
        let doc = Document::build(demo_document(), true).unwrap();
        let stats = CorpusStats::from_document(&doc, &RegexTokenizer::default());
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.objects(MentionKind::Entity), 3);
        assert_eq!(stats.mentions(MentionKind::Entity), 4);
        assert_eq!(stats.objects(MentionKind::Relation), 2);
        let entities = &stats.by_kind[&MentionKind::Entity];
        assert_eq!(entities.objects_by_type["PER"], 2);
        assert_eq!(entities.mentions_by_type["PER"], 3);
        assert_eq!(entities.mentions_by_type["PER::Individual"], 3);
        assert_eq!(stats.overlapping_entity_mentions, 0);
        // "John Smith", "Mary Jones" → 2 tokens; "He", "Paris" → 1.
        assert_eq!(stats.entity_mention_lengths[&1], 2);
        assert_eq!(stats.entity_mention_lengths[&2], 2);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let doc = Document::build(demo_document(), true).unwrap();
        let tokenizer = RegexTokenizer::default();
        let one = CorpusStats::from_document(&doc, &tokenizer);

        let mut a = one.clone();
        a.merge(CorpusStats::failed());
        let mut b = CorpusStats::failed();
        b.merge(one);
        assert_eq!(a, b);
        assert_eq!(a.failed_documents, 1);
        assert!(a.to_string().contains("Documentos: 1"));
    }

    #[test]
    fn test_sentence_stats() {
        let doc = Document::build(demo_document(), true).unwrap();
        let sentences = fix_boundaries(RuleSentenceSplitter::new().split(doc.text.as_str()));
        let records = project_document(&doc, &sentences, &ProjectionOptions::default()).sentences;
        let stats = SentenceStats::from_sentences(&records);
        assert_eq!(stats.sentences, 3);
        assert_eq!(stats.entity_types["PER"], 3);
        assert_eq!(stats.entity_types["GPE"], 1);
        assert_eq!(stats.relation_types["PHYS"], 1);
        assert_eq!(stats.relation_types["PER-SOC"], 1);
    }
}
