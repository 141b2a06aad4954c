//! # Esquema de Argumentos de Eventos
//!
//! Cada subtipo de evento ACE define os papéis aceitos e os tipos de objeto que podem
//! preenchê-los (ex: em `Die`, `Victim` só aceita `PER`). A tabela é estática; a
//! validação de um documento apenas reporta violações, sem alterar nada.
//!
//! ## Satisfação
//!
//! Um requisito `Numeric` é satisfeito por qualquer valor `Numeric` (inclusive
//! `Numeric.Money`); um requisito `Numeric.Money` exige o subtipo exato.

use std::fmt;

use serde::Serialize;

use crate::document::{Document, MentionKind, ObjectId};

/// Papel aceito por um subtipo de evento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSpec {
    pub role: &'static str,
    /// Tipos aceitos: `PER`, `Time`, `Numeric`, `Numeric.Money`...
    pub accepts: &'static [&'static str],
}

/// Subtipo de evento e seus papéis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSchema {
    pub event_type: &'static str,
    pub subtype: &'static str,
    pub roles: &'static [RoleSpec],
}

impl EventSchema {
    pub fn role(&self, role: &str) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.role.eq_ignore_ascii_case(role))
    }
}

const PLACE: &[&str] = &["GPE", "LOC", "FAC"];
const TIME: &[&str] = &["Time"];
const ACTOR: &[&str] = &["PER", "ORG", "GPE"];
const PERSON: &[&str] = &["PER"];
const ORG: &[&str] = &["ORG"];
const CRIME: &[&str] = &["Crime"];
const JOB: &[&str] = &["Job-Title"];

const fn role(role: &'static str, accepts: &'static [&'static str]) -> RoleSpec {
    RoleSpec { role, accepts }
}

const fn event(
    event_type: &'static str,
    subtype: &'static str,
    roles: &'static [RoleSpec],
) -> EventSchema {
    EventSchema {
        event_type,
        subtype,
        roles,
    }
}

/// Tabela completa dos subtipos de evento ACE2005.
pub static EVENT_SCHEMAS: &[EventSchema] = &[
    event("Life", "Be-Born", &[role("Person", PERSON), role("Time", TIME), role("Place", PLACE)]),
    event("Life", "Marry", &[role("Person", PERSON), role("Time", TIME), role("Place", PLACE)]),
    event("Life", "Divorce", &[role("Person", PERSON), role("Time", TIME), role("Place", PLACE)]),
    event(
        "Life",
        "Injure",
        &[
            role("Agent", ACTOR),
            role("Victim", PERSON),
            role("Instrument", &["WEA", "VEH"]),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Life",
        "Die",
        &[
            role("Agent", ACTOR),
            role("Victim", PERSON),
            role("Instrument", &["WEA", "VEH"]),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Movement",
        "Transport",
        &[
            role("Agent", ACTOR),
            role("Artifact", &["PER", "WEA", "VEH"]),
            role("Vehicle", &["VEH"]),
            role("Price", &["Numeric"]),
            role("Origin", PLACE),
            role("Destination", PLACE),
            role("Time", TIME),
        ],
    ),
    event(
        "Transaction",
        "Transfer-Ownership",
        &[
            role("Buyer", ACTOR),
            role("Seller", ACTOR),
            role("Beneficiary", ACTOR),
            role("Artifact", &["VEH", "WEA", "FAC", "ORG"]),
            role("Price", &["Numeric.Money"]),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Transaction",
        "Transfer-Money",
        &[
            role("Giver", ACTOR),
            role("Recipient", ACTOR),
            role("Beneficiary", ACTOR),
            role("Money", &["Numeric.Money"]),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Business",
        "Start-Org",
        &[role("Agent", ACTOR), role("Org", ORG), role("Time", TIME), role("Place", PLACE)],
    ),
    event("Business", "Merge-Org", &[role("Org", ORG), role("Time", TIME), role("Place", PLACE)]),
    event("Business", "End-Org", &[role("Org", ORG), role("Time", TIME), role("Place", PLACE)]),
    event(
        "Business",
        "Declare-Bankruptcy",
        &[role("Org", ORG), role("Time", TIME), role("Place", PLACE)],
    ),
    event(
        "Conflict",
        "Attack",
        &[
            role("Attacker", ACTOR),
            role("Target", &["PER", "ORG", "VEH", "FAC", "WEA"]),
            role("Instrument", &["VEH", "WEA"]),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Conflict",
        "Demonstrate",
        &[role("Entity", &["PER", "ORG"]), role("Time", TIME), role("Place", PLACE)],
    ),
    event("Contact", "Meet", &[role("Entity", ACTOR), role("Time", TIME), role("Place", PLACE)]),
    event("Contact", "Phone-Write", &[role("Entity", ACTOR), role("Time", TIME)]),
    event(
        "Personnel",
        "Start-Position",
        &[
            role("Person", PERSON),
            role("Entity", &["ORG", "GPE"]),
            role("Position", JOB),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Personnel",
        "End-Position",
        &[
            role("Person", PERSON),
            role("Entity", &["ORG", "GPE"]),
            role("Position", JOB),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Personnel",
        "Nominate",
        &[
            role("Person", PERSON),
            role("Agent", &["PER", "ORG", "GPE", "FAC"]),
            role("Position", JOB),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Personnel",
        "Elect",
        &[
            role("Person", PERSON),
            role("Entity", ACTOR),
            role("Position", JOB),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Arrest-Jail",
        &[
            role("Person", PERSON),
            role("Agent", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Release-Parole",
        &[
            role("Person", PERSON),
            role("Entity", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Trial-Hearing",
        &[
            role("Defendant", ACTOR),
            role("Prosecutor", ACTOR),
            role("Adjudicator", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Charge-Indict",
        &[
            role("Defendant", ACTOR),
            role("Prosecutor", ACTOR),
            role("Adjudicator", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Sue",
        &[
            role("Plaintiff", ACTOR),
            role("Defendant", ACTOR),
            role("Adjudicator", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Convict",
        &[
            role("Defendant", ACTOR),
            role("Adjudicator", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Sentence",
        &[
            role("Defendant", ACTOR),
            role("Adjudicator", ACTOR),
            role("Crime", CRIME),
            role("Sentence", &["Sentence"]),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Fine",
        &[
            role("Entity", ACTOR),
            role("Adjudicator", ACTOR),
            role("Money", &["Numeric"]),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Execute",
        &[
            role("Person", PERSON),
            role("Agent", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Extradite",
        &[
            role("Agent", ACTOR),
            role("Person", PERSON),
            role("Destination", PLACE),
            role("Origin", PLACE),
            role("Crime", CRIME),
            role("Time", TIME),
        ],
    ),
    event(
        "Justice",
        "Acquit",
        &[
            role("Defendant", ACTOR),
            role("Adjudicator", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Pardon",
        &[
            role("Defendant", ACTOR),
            role("Adjudicator", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
    event(
        "Justice",
        "Appeal",
        &[
            role("Defendant", ACTOR),
            role("Prosecutor", ACTOR),
            role("Adjudicator", ACTOR),
            role("Crime", CRIME),
            role("Time", TIME),
            role("Place", PLACE),
        ],
    ),
];

/// Esquema de um subtipo de evento (comparação sem diferenciar maiúsculas).
pub fn schema_for(event_type: &str, subtype: &str) -> Option<&'static EventSchema> {
    EVENT_SCHEMAS.iter().find(|s| {
        s.event_type.eq_ignore_ascii_case(event_type) && s.subtype.eq_ignore_ascii_case(subtype)
    })
}

/// `true` se um objeto de tipo `given_type`/`given_subtype` satisfaz `required`.
///
/// `required` é um tipo (`Numeric`) ou um subtipo qualificado (`Numeric.Money`).
pub fn satisfies(required: &str, given_type: &str, given_subtype: &str) -> bool {
    match required.split_once('.') {
        Some((parent, sub)) => {
            parent.eq_ignore_ascii_case(given_type) && sub.eq_ignore_ascii_case(given_subtype)
        }
        None => required.eq_ignore_ascii_case(given_type),
    }
}

/// Problema encontrado ao validar argumentos de evento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum SchemaViolation {
    UnknownEventType {
        event: ObjectId,
        event_type: String,
    },
    UnknownRole {
        event: ObjectId,
        role: String,
    },
    TypeMismatch {
        event: ObjectId,
        role: String,
        argument: ObjectId,
        given: String,
    },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaViolation::UnknownEventType { event, event_type } => {
                write!(f, "{event}: tipo de evento desconhecido {event_type}")
            }
            SchemaViolation::UnknownRole { event, role } => {
                write!(f, "{event}: papel {role} não previsto para o subtipo")
            }
            SchemaViolation::TypeMismatch {
                event,
                role,
                argument,
                given,
            } => write!(f, "{event}: {argument} ({given}) não pode ocupar o papel {role}"),
        }
    }
}

/// Confere todos os argumentos de evento do documento contra a tabela.
pub fn validate_event_arguments(document: &Document) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    for event in document.objects_of(MentionKind::Event) {
        let Some(schema) = schema_for(&event.object_type, &event.subtype) else {
            violations.push(SchemaViolation::UnknownEventType {
                event: event.id.clone(),
                event_type: event.qualified_type(),
            });
            continue;
        };
        for arg in &event.arguments {
            let Some(spec) = schema.role(&arg.role) else {
                violations.push(SchemaViolation::UnknownRole {
                    event: event.id.clone(),
                    role: arg.role.clone(),
                });
                continue;
            };
            let Some(target) = document.object(&arg.object) else {
                continue;
            };
            let accepted = spec
                .accepts
                .iter()
                .any(|required| satisfies(required, &target.object_type, &target.subtype));
            if !accepted {
                violations.push(SchemaViolation::TypeMismatch {
                    event: event.id.clone(),
                    role: arg.role.clone(),
                    argument: target.id.clone(),
                    given: target.qualified_type(),
                });
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawArgument, RawCharseq, RawDocument, RawEntity, RawEvent, RawPlainObject};

    #[test]
    fn test_table_covers_all_subtypes() {
        assert_eq!(EVENT_SCHEMAS.len(), 33);
        let die = schema_for("life", "DIE").unwrap();
        assert_eq!(die.role("Victim").unwrap().accepts, &["PER"]);
        assert!(schema_for("Life", "Party").is_none());
    }

    #[test]
    fn test_satisfies_type_and_subtype() {
        assert!(satisfies("Numeric", "Numeric", "Money"));
        assert!(satisfies("Numeric", "Numeric", "Percent"));
        assert!(satisfies("Numeric.Money", "Numeric", "Money"));
        assert!(!satisfies("Numeric.Money", "Numeric", "Percent"));
        assert!(!satisfies("PER", "ORG", ""));
    }

    fn raw_event_document(victim_type: &str) -> RawDocument {
        let text = "Smith died on Monday.";
        RawDocument {
            uri: "d".to_string(),
            version: Default::default(),
            full_text: text.to_string(),
            body_text: None,
            entities: vec![RawEntity {
                id: "d-E1".to_string(),
                entity_type: victim_type.to_string(),
                subtype: String::new(),
                class: String::new(),
                mentions: vec![],
            }],
            values: vec![],
            timexes: vec![RawPlainObject {
                id: "d-T1".to_string(),
                object_type: String::new(),
                subtype: String::new(),
                val: Some("2003-04-21".to_string()),
                mentions: vec![],
            }],
            relations: vec![],
            events: vec![RawEvent {
                id: "d-EV1".to_string(),
                event_type: "Life".to_string(),
                subtype: "Die".to_string(),
                tense: None,
                genericity: None,
                polarity: None,
                modality: None,
                arguments: vec![
                    RawArgument { role: "Victim".to_string(), ref_id: "d-E1".to_string() },
                    RawArgument { role: "Time-Within".to_string(), ref_id: "d-T1".to_string() },
                ],
                mentions: vec![crate::raw::RawEventMention {
                    id: "d-EV1-1".to_string(),
                    extent: RawCharseq::locate(text, "Smith died on Monday", 0).unwrap(),
                    scope: RawCharseq::locate(text, "Smith died on Monday.", 0).unwrap(),
                    anchor: RawCharseq::locate(text, "died", 0).unwrap(),
                    arguments: vec![],
                }],
            }],
        }
    }

    #[test]
    fn test_valid_event_has_no_violations() {
        let doc = Document::build(raw_event_document("PER"), false).unwrap();
        assert!(validate_event_arguments(&doc).is_empty());
        let event = doc.objects_of(MentionKind::Event).next().unwrap();
        assert_eq!(event.arguments[1].role, "Time");
        assert_eq!(event.arguments[1].timestamp_type.as_deref(), Some("Time-Within"));
    }

    #[test]
    fn test_type_mismatch_reported() {
        let doc = Document::build(raw_event_document("ORG"), false).unwrap();
        let violations = validate_event_arguments(&doc);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0],
            SchemaViolation::TypeMismatch { role, .. } if role == "Victim"
        ));
    }
}
