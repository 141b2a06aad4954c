//! # Reparo de Offsets
//!
//! Os offsets gravados nas anotações ACE às vezes não batem com o texto: o arquivo de
//! anotação foi gerado sobre uma versão do texto com entidades XML expandidas, ou com
//! cabeçalhos ligeiramente diferentes. O reparo realinha cada menção procurando o texto
//! gravado **para trás** a partir de uma posição estimada.
//!
//! ## Algoritmo
//!
//! Para cada catálogo (entidades, valores, timex, relações, eventos), em ordem de span:
//! 1. Se `texto[span]` (sem entidades XML) é igual ao texto gravado, nada muda.
//! 2. Senão, procura a última ocorrência do texto gravado que começa em até
//!    `min(len, start - last_diff)`, onde `last_diff` é o deslocamento do último reparo
//!    bem-sucedido **neste catálogo** (começa em 0).
//! 3. Se encontrou em `index`, o span vira `[index, index + len)` e
//!    `last_diff = start - index`.
//! 4. Se não encontrou, a menção sai do catálogo (e do objeto pai, para entidades,
//!    relações e timex).
//!
//! Menções de entidade reparam o head antes do extent. O head atualiza `last_diff`
//! mas nunca causa remoção: se não for encontrado, fica como estava.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::document::{extent_aligned, Document, Extent, Mention, MentionId, MentionKind};
use crate::span::Span;
use crate::text::{char_len, unescape, CharText};

/// Resultado da verificação de um único extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanFix {
    /// Texto confere.
    Intact,
    /// Texto encontrado em outro lugar.
    Relocated(Span),
    /// Texto não encontrado antes do limite de busca.
    Lost,
}

/// Verifica um extent e devolve a correção junto com o `last_diff` seguinte.
pub fn repair_extent(text: &CharText, extent: &Extent, last_diff: i64) -> (SpanFix, i64) {
    if extent_aligned(text, extent) {
        return (SpanFix::Intact, last_diff);
    }
    let recorded = unescape(&extent.text);
    let start = extent.span.start as i64;
    let bound = (start - last_diff).min(text.len_chars() as i64);
    if bound < 0 {
        return (SpanFix::Lost, last_diff);
    }
    match text.rfind_from(&recorded, bound as usize) {
        Some(index) => {
            let span = Span::new(index, index + char_len(&recorded));
            (SpanFix::Relocated(span), start - index as i64)
        }
        None => (SpanFix::Lost, last_diff),
    }
}

/// Novos spans de uma menção realocada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub mention: MentionId,
    pub extent: Option<Span>,
    pub head: Option<Span>,
}

/// Mudanças calculadas para um catálogo, ainda não aplicadas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairPlan {
    pub relocations: Vec<Relocation>,
    pub lost: Vec<MentionId>,
}

impl RepairPlan {
    pub fn is_empty(&self) -> bool {
        self.relocations.is_empty() && self.lost.is_empty()
    }
}

/// Calcula o plano de reparo para uma sequência de menções, em ordem.
///
/// É uma dobra: cada menção lê o `last_diff` deixado pela anterior.
pub fn plan_repairs<'a>(
    text: &CharText,
    mentions: impl IntoIterator<Item = &'a Mention>,
) -> RepairPlan {
    let (plan, _) = mentions.into_iter().fold(
        (RepairPlan::default(), 0i64),
        |(mut plan, last_diff), mention| {
            let (head, last_diff) = match mention.head() {
                Some(head) => match repair_extent(text, head, last_diff) {
                    (SpanFix::Relocated(span), diff) => (Some(span), diff),
                    (_, diff) => (None, diff),
                },
                None => (None, last_diff),
            };
            let (fix, last_diff) = repair_extent(text, mention.extent(), last_diff);
            let id = mention.full_id().clone();
            match fix {
                SpanFix::Lost => plan.lost.push(id),
                SpanFix::Relocated(span) => plan.relocations.push(Relocation {
                    mention: id,
                    extent: Some(span),
                    head,
                }),
                SpanFix::Intact if head.is_some() => plan.relocations.push(Relocation {
                    mention: id,
                    extent: None,
                    head,
                }),
                SpanFix::Intact => {}
            }
            (plan, last_diff)
        },
    );
    plan
}

/// Contagem de reparos por catálogo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub kind: Option<MentionKind>,
    pub relocated: usize,
    pub removed: Vec<MentionId>,
}

/// Resumo do reparo de um documento inteiro.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    pub reports: Vec<RepairReport>,
}

impl RepairSummary {
    pub fn relocated(&self) -> usize {
        self.reports.iter().map(|r| r.relocated).sum()
    }

    pub fn removed(&self) -> usize {
        self.reports.iter().map(|r| r.removed.len()).sum()
    }

    pub fn removed_of(&self, kind: MentionKind) -> &[MentionId] {
        self.reports
            .iter()
            .find(|r| r.kind == Some(kind))
            .map(|r| r.removed.as_slice())
            .unwrap_or(&[])
    }
}

impl Document {
    /// Aplica um plano calculado por [`plan_repairs`] sobre um catálogo.
    pub fn apply_repairs(&mut self, kind: MentionKind, plan: &RepairPlan) {
        for relocation in &plan.relocations {
            if let Some(mention) = self.mention_mut(&relocation.mention) {
                mention.relocate(relocation.extent, relocation.head);
            }
        }
        let lost: HashSet<MentionId> = plan.lost.iter().cloned().collect();
        self.remove_from_catalog(kind, &lost);
    }
}

/// Repara todos os catálogos do documento, na ordem entidades, valores, timex,
/// relações, eventos. Rodar duas vezes não muda mais nada.
pub fn repair_document(document: &mut Document) -> RepairSummary {
    let mut summary = RepairSummary::default();
    for kind in MentionKind::REPAIR_ORDER {
        let plan = plan_repairs(&document.text, document.mentions_of(kind));
        let relocated = plan.relocations.iter().filter(|r| r.extent.is_some()).count();
        if !plan.is_empty() {
            debug!(
                "{}: {} menções de {} realocadas, {} perdidas",
                document.uri,
                relocated,
                kind,
                plan.lost.len()
            );
        }
        document.apply_repairs(kind, &plan);
        summary.reports.push(RepairReport {
            kind: Some(kind),
            relocated,
            removed: plan.lost,
        });
    }
    let removed = summary.removed();
    if removed > 0 {
        info!(
            "{}: {} menções removidas por texto não encontrado",
            document.uri, removed
        );
    }
    summary
}
