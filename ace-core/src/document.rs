//! # Modelo de Documento ACE
//!
//! Um documento guarda o texto e cinco tipos de anotação: entidades, relações, eventos,
//! expressões temporais (timex) e valores. Cada **objeto** (ex: a entidade "John Smith")
//! agrupa várias **menções** (cada ocorrência no texto).
//!
//! ## Arena
//!
//! Objetos e menções se referenciam mutuamente (menção → objeto pai, relação → menções
//! argumento, evento → menções argumento). Em vez de ponteiros cruzados, o documento é
//! uma arena: mapas de identificador para registro, mais um **catálogo** ordenado por tipo
//! de menção. As referências são identificadores resolvidos sob demanda.
//!
//! ## Montagem
//!
//! [`Document::build`] converte um [`RawDocument`] em arena:
//! 1. Troca `&amp;`, `&lt;` e `&gt;` pelo caractere, escolhe o texto (completo ou só o
//!    corpo) e calcula o offset do corpo.
//! 2. Converte cada `charseq` (fim inclusivo, relativo ao texto completo) em [`Span`].
//! 3. Calcula o identificador completo de cada menção (`pai-N`).
//! 4. Resolve argumentos de relações e eventos.
//! 5. Ordena os catálogos.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DocumentError;
use crate::raw::{RawCharseq, RawDocument, RawEntity, RawEvent, RawPlainObject, RawRelation};
use crate::span::Span;
use crate::text::{unescape, CharText};

/// Sufixo numérico de um id de menção: `...-E1-2` → grupo 2 = `2`.
static MENTION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+-(\d+))$").expect("regex de sufixo de menção válida"));

/// Identificador de objeto (entidade, relação, evento, timex ou valor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

/// Identificador completo de menção (`pai-N`), chave da arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionId(pub String);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MentionId {
    fn from(id: &str) -> Self {
        MentionId(id.to_string())
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        ObjectId(id.to_string())
    }
}

/// Tipos de menção (e de objeto) ACE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Entity,
    Relation,
    Event,
    Timex,
    Value,
}

impl MentionKind {
    pub const ALL: [MentionKind; 5] = [
        MentionKind::Entity,
        MentionKind::Relation,
        MentionKind::Event,
        MentionKind::Timex,
        MentionKind::Value,
    ];

    /// Ordem em que os catálogos passam pelo reparo de offsets.
    pub const REPAIR_ORDER: [MentionKind; 5] = [
        MentionKind::Entity,
        MentionKind::Value,
        MentionKind::Timex,
        MentionKind::Relation,
        MentionKind::Event,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MentionKind::Entity => "entity",
            MentionKind::Relation => "relation",
            MentionKind::Event => "event",
            MentionKind::Timex => "timex",
            MentionKind::Value => "value",
        }
    }
}

impl fmt::Display for MentionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Edição do corpus (muda a forma dos argumentos de relação).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AceVersion {
    Ace2004,
    #[default]
    Ace2005,
}

impl AceVersion {
    pub fn name(&self) -> &'static str {
        match self {
            AceVersion::Ace2004 => "ace2004",
            AceVersion::Ace2005 => "ace2005",
        }
    }
}

/// Trecho do texto e o conteúdo gravado pela anotação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub span: Span,
    pub text: String,
}

/// Argumento de menção: papel + menção referenciada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub role: String,
    pub mention: MentionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Id como gravado no arquivo.
    pub id: String,
    pub full_id: MentionId,
    pub entity: ObjectId,
    pub extent: Extent,
    /// Núcleo da menção; igual ao extent quando a anotação não traz head.
    pub head: Extent,
    /// NAM, NOM, PRO...
    pub mention_type: String,
    pub ldc_type: String,
    pub ldc_attribute: String,
    /// Tipo da entidade pai (PER, ORG, GPE...), usado como rótulo de sequência.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMention {
    pub id: String,
    pub full_id: MentionId,
    pub relation: ObjectId,
    pub extent: Extent,
    /// Par ordenado (Arg-1, Arg-2) de menções de entidade.
    pub args: [MentionId; 2],
    /// Argumento temporal (`Time-Within`, ...), se houver.
    pub timestamp: Option<Argument>,
    pub lexical_condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMention {
    pub id: String,
    pub full_id: MentionId,
    pub event: ObjectId,
    pub extent: Extent,
    pub scope: Extent,
    pub anchor: Extent,
    pub args: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimexMention {
    pub id: String,
    pub full_id: MentionId,
    pub timex: ObjectId,
    pub extent: Extent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMention {
    pub id: String,
    pub full_id: MentionId,
    pub value: ObjectId,
    pub extent: Extent,
}

/// Qualquer menção da arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mention {
    Entity(EntityMention),
    Relation(RelationMention),
    Event(EventMention),
    Timex(TimexMention),
    Value(ValueMention),
}

impl Mention {
    pub fn kind(&self) -> MentionKind {
        match self {
            Mention::Entity(_) => MentionKind::Entity,
            Mention::Relation(_) => MentionKind::Relation,
            Mention::Event(_) => MentionKind::Event,
            Mention::Timex(_) => MentionKind::Timex,
            Mention::Value(_) => MentionKind::Value,
        }
    }

    /// Id como gravado no arquivo.
    pub fn raw_id(&self) -> &str {
        match self {
            Mention::Entity(m) => &m.id,
            Mention::Relation(m) => &m.id,
            Mention::Event(m) => &m.id,
            Mention::Timex(m) => &m.id,
            Mention::Value(m) => &m.id,
        }
    }

    pub fn full_id(&self) -> &MentionId {
        match self {
            Mention::Entity(m) => &m.full_id,
            Mention::Relation(m) => &m.full_id,
            Mention::Event(m) => &m.full_id,
            Mention::Timex(m) => &m.full_id,
            Mention::Value(m) => &m.full_id,
        }
    }

    pub fn parent(&self) -> &ObjectId {
        match self {
            Mention::Entity(m) => &m.entity,
            Mention::Relation(m) => &m.relation,
            Mention::Event(m) => &m.event,
            Mention::Timex(m) => &m.timex,
            Mention::Value(m) => &m.value,
        }
    }

    pub fn extent(&self) -> &Extent {
        match self {
            Mention::Entity(m) => &m.extent,
            Mention::Relation(m) => &m.extent,
            Mention::Event(m) => &m.extent,
            Mention::Timex(m) => &m.extent,
            Mention::Value(m) => &m.extent,
        }
    }

    fn extent_mut(&mut self) -> &mut Extent {
        match self {
            Mention::Entity(m) => &mut m.extent,
            Mention::Relation(m) => &mut m.extent,
            Mention::Event(m) => &mut m.extent,
            Mention::Timex(m) => &mut m.extent,
            Mention::Value(m) => &mut m.extent,
        }
    }

    pub fn span(&self) -> Span {
        self.extent().span
    }

    /// Head, apenas para menções de entidade.
    pub fn head(&self) -> Option<&Extent> {
        match self {
            Mention::Entity(m) => Some(&m.head),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityMention> {
        match self {
            Mention::Entity(m) => Some(m),
            _ => None,
        }
    }

    /// Move a menção para novos spans (o texto gravado não muda).
    pub(crate) fn relocate(&mut self, extent: Option<Span>, head: Option<Span>) {
        if let Some(span) = extent {
            self.extent_mut().span = span;
        }
        if let (Some(span), Mention::Entity(m)) = (head, self) {
            m.head.span = span;
        }
    }
}

/// Argumento de objeto (relação ou evento) apontando para outro objeto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectArgument {
    pub role: String,
    pub object: ObjectId,
    /// Papel original quando um papel `Time*` foi normalizado para `Time`.
    pub timestamp_type: Option<String>,
}

/// Objeto ACE com suas menções.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AceObject {
    pub id: ObjectId,
    pub kind: MentionKind,
    pub object_type: String,
    pub subtype: String,
    pub mentions: Vec<MentionId>,
    /// Atributos livres: `class`, `tense`, `modality`, `val`...
    pub attributes: BTreeMap<String, String>,
    pub arguments: Vec<ObjectArgument>,
}

impl AceObject {
    fn new(id: &str, kind: MentionKind, object_type: &str, subtype: &str) -> Self {
        Self {
            id: ObjectId(id.to_string()),
            kind,
            object_type: object_type.to_string(),
            subtype: subtype.to_string(),
            mentions: Vec::new(),
            attributes: BTreeMap::new(),
            arguments: Vec::new(),
        }
    }

    fn with_attribute(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.attributes.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Tipo completo no formato `type::subtype` (ou só `type`).
    pub fn qualified_type(&self) -> String {
        if self.subtype.is_empty() {
            self.object_type.clone()
        } else {
            format!("{}::{}", self.object_type, self.subtype)
        }
    }
}

/// Documento ACE em forma de arena.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: String,
    pub version: AceVersion,
    pub full_text: String,
    /// Texto de trabalho: completo ou só o corpo.
    pub text: CharText,
    /// Offset (em caracteres) de `text` dentro de `full_text`.
    pub offset: usize,
    /// O texto não tem nenhuma letra maiúscula.
    pub lowercase: bool,
    objects: HashMap<ObjectId, AceObject>,
    object_order: Vec<ObjectId>,
    mentions: HashMap<MentionId, Mention>,
    catalogs: BTreeMap<MentionKind, Vec<MentionId>>,
    outside_text: Vec<MentionId>,
}

impl Document {
    /// Monta a arena a partir do documento bruto.
    ///
    /// Com `exclude_metadata`, o texto de trabalho é `body_text` (quando presente) e os
    /// offsets passam a ser relativos ao corpo. Menções anotadas antes do corpo (cabeçalhos)
    /// são descartadas, assim como relações e argumentos de evento que dependem delas.
    pub fn build(raw: RawDocument, exclude_metadata: bool) -> Result<Self, DocumentError> {
        let RawDocument {
            uri,
            version,
            full_text,
            body_text,
            entities,
            values,
            timexes,
            relations,
            events,
        } = raw;

        // Os offsets das anotações contam `&amp;` como um único caractere.
        let full_text = CharText::new(unescape(&full_text));
        let (text, offset) = match body_text {
            Some(body) if exclude_metadata => {
                let body = unescape(&body);
                let offset = full_text
                    .find(&body)
                    .ok_or_else(|| DocumentError::BodyNotFound { uri: uri.clone() })?;
                (CharText::new(body), offset)
            }
            _ => (full_text.clone(), 0),
        };
        let lowercase = !text.as_str().chars().any(char::is_uppercase);

        let mut builder = Builder::new(&uri, version, offset);
        for entity in &entities {
            builder.add_entity(entity)?;
        }
        for value in &values {
            builder.add_plain(MentionKind::Value, value)?;
        }
        for timex in &timexes {
            builder.add_plain(MentionKind::Timex, timex)?;
        }
        for relation in &relations {
            builder.add_relation(relation)?;
        }
        for event in &events {
            builder.add_event(event)?;
        }

        let Builder {
            objects,
            object_order,
            mentions,
            catalogs,
            outside_text,
            ..
        } = builder;
        if !outside_text.is_empty() {
            debug!(
                "{}: {} menções fora do texto de trabalho descartadas",
                uri,
                outside_text.len()
            );
        }

        let mut document = Document {
            uri,
            version,
            full_text: full_text.as_str().to_string(),
            text,
            offset,
            lowercase,
            objects,
            object_order,
            mentions,
            catalogs,
            outside_text,
        };
        document.sort_catalogs();
        Ok(document)
    }

    /// Ids do catálogo de um tipo, em ordem de span.
    pub fn catalog(&self, kind: MentionKind) -> &[MentionId] {
        self.catalogs.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Menções de um catálogo, em ordem.
    pub fn mentions_of(&self, kind: MentionKind) -> impl Iterator<Item = &Mention> + '_ {
        self.catalog(kind)
            .iter()
            .filter_map(move |id| self.mentions.get(id))
    }

    /// Busca na arena (inclui menções já removidas do catálogo).
    pub fn mention(&self, id: &MentionId) -> Option<&Mention> {
        self.mentions.get(id)
    }

    pub fn entity_mention(&self, id: &MentionId) -> Option<&EntityMention> {
        self.mention(id).and_then(Mention::as_entity)
    }

    pub fn object(&self, id: &ObjectId) -> Option<&AceObject> {
        self.objects.get(id)
    }

    /// Objeto pai de uma menção.
    pub fn parent_of(&self, mention: &Mention) -> Option<&AceObject> {
        self.object(mention.parent())
    }

    /// Objetos na ordem em que aparecem no arquivo.
    pub fn objects(&self) -> impl Iterator<Item = &AceObject> + '_ {
        self.object_order
            .iter()
            .filter_map(move |id| self.objects.get(id))
    }

    pub fn objects_of(&self, kind: MentionKind) -> impl Iterator<Item = &AceObject> + '_ {
        self.objects().filter(move |o| o.kind == kind)
    }

    /// Menções descartadas na montagem por estarem fora do texto de trabalho.
    pub fn outside_text(&self) -> &[MentionId] {
        &self.outside_text
    }

    /// Menções do catálogo cujo texto não confere com o texto gravado.
    pub fn misaligned(&self, kind: MentionKind) -> Vec<MentionId> {
        self.mentions_of(kind)
            .filter(|m| !extent_aligned(&self.text, m.extent()))
            .map(|m| m.full_id().clone())
            .collect()
    }

    pub(crate) fn mention_mut(&mut self, id: &MentionId) -> Option<&mut Mention> {
        self.mentions.get_mut(id)
    }

    /// Tira menções do catálogo. Entidades, relações e timex também são desligadas do pai.
    pub(crate) fn remove_from_catalog(&mut self, kind: MentionKind, removed: &HashSet<MentionId>) {
        if removed.is_empty() {
            return;
        }
        if let Some(catalog) = self.catalogs.get_mut(&kind) {
            catalog.retain(|id| !removed.contains(id));
        }
        if !matches!(
            kind,
            MentionKind::Entity | MentionKind::Relation | MentionKind::Timex
        ) {
            return;
        }
        for id in removed {
            let Some(parent) = self.mentions.get(id).map(|m| m.parent().clone()) else {
                continue;
            };
            if let Some(object) = self.objects.get_mut(&parent) {
                object.mentions.retain(|m| m != id);
            }
        }
    }

    fn sort_catalogs(&mut self) {
        let mentions = &self.mentions;
        for catalog in self.catalogs.values_mut() {
            catalog.sort_by(|a, b| {
                let (ma, mb) = (&mentions[a], &mentions[b]);
                ma.span()
                    .cmp(&mb.span())
                    .then_with(|| {
                        let ha = ma.head().map(|h| h.span);
                        let hb = mb.head().map(|h| h.span);
                        ha.cmp(&hb)
                    })
                    .then_with(|| a.cmp(b))
            });
        }
    }
}

/// O texto sob o span confere com o texto gravado (após desfazer entidades XML).
pub fn extent_aligned(text: &CharText, extent: &Extent) -> bool {
    text.slice(extent.span)
        .map(|actual| unescape(actual) == unescape(&extent.text))
        .unwrap_or(false)
}

enum Resolution {
    Found(MentionId),
    Discarded,
    Unknown,
}

/// Estado intermediário da montagem da arena.
struct Builder<'a> {
    uri: &'a str,
    version: AceVersion,
    offset: usize,
    objects: HashMap<ObjectId, AceObject>,
    object_order: Vec<ObjectId>,
    mentions: HashMap<MentionId, Mention>,
    catalogs: BTreeMap<MentionKind, Vec<MentionId>>,
    by_raw_id: HashMap<String, MentionId>,
    discarded: HashSet<String>,
    outside_text: Vec<MentionId>,
}

impl<'a> Builder<'a> {
    fn new(uri: &'a str, version: AceVersion, offset: usize) -> Self {
        Self {
            uri,
            version,
            offset,
            objects: HashMap::new(),
            object_order: Vec::new(),
            mentions: HashMap::new(),
            catalogs: BTreeMap::new(),
            by_raw_id: HashMap::new(),
            discarded: HashSet::new(),
            outside_text: Vec::new(),
        }
    }

    fn full_id(&self, parent: &str, id: &str) -> Result<MentionId, DocumentError> {
        let caps = MENTION_SUFFIX
            .captures(id)
            .ok_or_else(|| DocumentError::MalformedMentionId {
                uri: self.uri.to_string(),
                id: id.to_string(),
            })?;
        Ok(MentionId(format!("{}-{}", parent, &caps[2])))
    }

    /// `charseq` → `Extent`; `None` se o trecho começa antes do texto de trabalho.
    fn extent(&self, owner: &str, seq: &RawCharseq) -> Result<Option<Extent>, DocumentError> {
        if seq.end + 1 < seq.start {
            return Err(DocumentError::InvalidCharseq {
                uri: self.uri.to_string(),
                mention: owner.to_string(),
                start: seq.start,
                end: seq.end,
            });
        }
        if seq.start < self.offset {
            return Ok(None);
        }
        Ok(Some(Extent {
            span: Span::new(seq.start - self.offset, seq.end + 1 - self.offset),
            text: unescape(&seq.text).into_owned(),
        }))
    }

    fn discard(&mut self, raw_id: &str, full_id: MentionId) {
        self.discarded.insert(raw_id.to_string());
        self.discarded.insert(full_id.0.clone());
        self.outside_text.push(full_id);
    }

    fn insert(&mut self, object: &mut AceObject, mention: Mention) {
        let full_id = mention.full_id().clone();
        object.mentions.push(full_id.clone());
        self.by_raw_id
            .entry(mention.raw_id().to_string())
            .or_insert_with(|| full_id.clone());
        self.catalogs
            .entry(mention.kind())
            .or_default()
            .push(full_id.clone());
        self.mentions.insert(full_id, mention);
    }

    fn insert_object(&mut self, object: AceObject) {
        self.object_order.push(object.id.clone());
        self.objects.insert(object.id.clone(), object);
    }

    fn resolve(&self, reference: &str) -> Resolution {
        if self.discarded.contains(reference) {
            return Resolution::Discarded;
        }
        if let Some(id) = self.by_raw_id.get(reference) {
            return Resolution::Found(id.clone());
        }
        let id = MentionId(reference.to_string());
        if self.mentions.contains_key(&id) {
            Resolution::Found(id)
        } else {
            Resolution::Unknown
        }
    }

    fn unknown(&self, owner: &str, reference: &str) -> DocumentError {
        DocumentError::UnknownReference {
            uri: self.uri.to_string(),
            owner: owner.to_string(),
            reference: reference.to_string(),
        }
    }

    fn object_arguments(
        &self,
        owner: &str,
        arguments: &[crate::raw::RawArgument],
        normalize_time: bool,
    ) -> Result<Vec<ObjectArgument>, DocumentError> {
        arguments
            .iter()
            .map(|arg| {
                let object = ObjectId(arg.ref_id.clone());
                if !self.objects.contains_key(&object) {
                    return Err(self.unknown(owner, &arg.ref_id));
                }
                let (role, timestamp_type) = if normalize_time && arg.role.starts_with("Time") {
                    ("Time".to_string(), Some(arg.role.clone()))
                } else {
                    (arg.role.clone(), None)
                };
                Ok(ObjectArgument {
                    role,
                    object,
                    timestamp_type,
                })
            })
            .collect()
    }

    fn add_entity(&mut self, raw: &RawEntity) -> Result<(), DocumentError> {
        let mut object = AceObject::new(&raw.id, MentionKind::Entity, &raw.entity_type, &raw.subtype)
            .with_attribute("class", Some(raw.class.as_str()));
        for m in &raw.mentions {
            let full_id = self.full_id(&raw.id, &m.id)?;
            let Some(extent) = self.extent(&m.id, &m.extent)? else {
                self.discard(&m.id, full_id);
                continue;
            };
            let head = match &m.head {
                Some(seq) => self.extent(&m.id, seq)?.unwrap_or_else(|| extent.clone()),
                None => extent.clone(),
            };
            let mention = EntityMention {
                id: m.id.clone(),
                full_id,
                entity: object.id.clone(),
                extent,
                head,
                mention_type: m.mention_type.clone(),
                ldc_type: m.ldc_type.clone(),
                ldc_attribute: m.ldc_atr.clone(),
                label: raw.entity_type.clone(),
            };
            self.insert(&mut object, Mention::Entity(mention));
        }
        self.insert_object(object);
        Ok(())
    }

    fn add_plain(&mut self, kind: MentionKind, raw: &RawPlainObject) -> Result<(), DocumentError> {
        let object_type = match (kind, raw.object_type.is_empty()) {
            (MentionKind::Timex, true) => "Time",
            _ => raw.object_type.as_str(),
        };
        let mut object = AceObject::new(&raw.id, kind, object_type, &raw.subtype)
            .with_attribute("val", raw.val.as_deref());
        for m in &raw.mentions {
            let full_id = self.full_id(&raw.id, &m.id)?;
            let Some(extent) = self.extent(&m.id, &m.extent)? else {
                self.discard(&m.id, full_id);
                continue;
            };
            let mention = match kind {
                MentionKind::Timex => Mention::Timex(TimexMention {
                    id: m.id.clone(),
                    full_id,
                    timex: object.id.clone(),
                    extent,
                }),
                _ => Mention::Value(ValueMention {
                    id: m.id.clone(),
                    full_id,
                    value: object.id.clone(),
                    extent,
                }),
            };
            self.insert(&mut object, mention);
        }
        self.insert_object(object);
        Ok(())
    }

    /// Posição do argumento no par ordenado, ou `None` para argumentos temporais.
    fn relation_slot(role: &str) -> Option<usize> {
        match role.strip_prefix("Arg-").unwrap_or(role) {
            "1" => Some(0),
            "2" => Some(1),
            _ => None,
        }
    }

    /// Referência de uma menção-argumento. No ACE2004 o id é curto (`1-3`) e precisa
    /// ser prefixado pela entidade que ocupa a mesma posição na relação.
    fn relation_reference(&self, relation: &RawRelation, slot: usize, ref_id: &str) -> String {
        if self.version != AceVersion::Ace2004 {
            return ref_id.to_string();
        }
        let entity = relation
            .arguments
            .iter()
            .find(|arg| Self::relation_slot(&arg.role) == Some(slot));
        match (entity, ref_id.find('-')) {
            (Some(entity), Some(dash)) => format!("{}{}", entity.ref_id, &ref_id[dash..]),
            _ => ref_id.to_string(),
        }
    }

    fn add_relation(&mut self, raw: &RawRelation) -> Result<(), DocumentError> {
        let mut object =
            AceObject::new(&raw.id, MentionKind::Relation, &raw.relation_type, &raw.subtype)
                .with_attribute("tense", raw.tense.as_deref())
                .with_attribute("modality", raw.modality.as_deref());
        object.arguments = self.object_arguments(&raw.id, &raw.arguments, false)?;

        for m in &raw.mentions {
            let full_id = self.full_id(&raw.id, &m.id)?;
            let Some(extent) = self.extent(&m.id, &m.extent)? else {
                self.discard(&m.id, full_id);
                continue;
            };
            let mut slots: [Option<MentionId>; 2] = [None, None];
            let mut timestamp = None;
            let mut lost_argument = false;
            for arg in &m.arguments {
                let slot = Self::relation_slot(&arg.role);
                let reference = match slot {
                    Some(i) => self.relation_reference(raw, i, &arg.ref_id),
                    None => arg.ref_id.clone(),
                };
                match (self.resolve(&reference), slot) {
                    (Resolution::Found(id), Some(i)) => {
                        if self.mentions.get(&id).and_then(Mention::as_entity).is_none() {
                            return Err(self.unknown(&m.id, &reference));
                        }
                        slots[i] = Some(id);
                    }
                    (Resolution::Found(id), None) => {
                        timestamp = Some(Argument {
                            role: arg.role.clone(),
                            mention: id,
                        });
                    }
                    (Resolution::Discarded, Some(_)) => lost_argument = true,
                    (Resolution::Discarded, None) => {}
                    (Resolution::Unknown, _) => return Err(self.unknown(&m.id, &reference)),
                }
            }
            let (first, second) = match slots {
                [Some(first), Some(second)] => (first, second),
                _ if lost_argument => {
                    self.discard(&m.id, full_id);
                    continue;
                }
                [first, _] => {
                    return Err(DocumentError::MissingRelationArgument {
                        uri: self.uri.to_string(),
                        mention: m.id.clone(),
                        slot: if first.is_none() { 1 } else { 2 },
                    });
                }
            };
            let mention = RelationMention {
                id: m.id.clone(),
                full_id,
                relation: object.id.clone(),
                extent,
                args: [first, second],
                timestamp,
                lexical_condition: m.lexical_condition.clone(),
            };
            self.insert(&mut object, Mention::Relation(mention));
        }
        self.insert_object(object);
        Ok(())
    }

    fn add_event(&mut self, raw: &RawEvent) -> Result<(), DocumentError> {
        let mut object = AceObject::new(&raw.id, MentionKind::Event, &raw.event_type, &raw.subtype)
            .with_attribute("tense", raw.tense.as_deref())
            .with_attribute("genericity", raw.genericity.as_deref())
            .with_attribute("polarity", raw.polarity.as_deref())
            .with_attribute("modality", raw.modality.as_deref());
        object.arguments = self.object_arguments(&raw.id, &raw.arguments, true)?;

        for m in &raw.mentions {
            let full_id = self.full_id(&raw.id, &m.id)?;
            let extent = self.extent(&m.id, &m.extent)?;
            let scope = self.extent(&m.id, &m.scope)?;
            let anchor = self.extent(&m.id, &m.anchor)?;
            let (Some(extent), Some(scope), Some(anchor)) = (extent, scope, anchor) else {
                self.discard(&m.id, full_id);
                continue;
            };
            let mut args = Vec::with_capacity(m.arguments.len());
            for arg in &m.arguments {
                match self.resolve(&arg.ref_id) {
                    Resolution::Found(mention) => {
                        let role = if arg.role.starts_with("Time") {
                            "Time".to_string()
                        } else {
                            arg.role.clone()
                        };
                        args.push(Argument { role, mention });
                    }
                    Resolution::Discarded => {}
                    Resolution::Unknown => return Err(self.unknown(&m.id, &arg.ref_id)),
                }
            }
            let mention = EventMention {
                id: m.id.clone(),
                full_id,
                event: object.id.clone(),
                extent,
                scope,
                anchor,
                args,
            };
            self.insert(&mut object, Mention::Event(mention));
        }
        self.insert_object(object);
        Ok(())
    }
}
