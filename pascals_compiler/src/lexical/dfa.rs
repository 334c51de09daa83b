//! DFA rule loading and validation
//!
//! A rule file is a JSON object with exactly three required fields:
//! `start_state`, `final_states` (state -> token kind name or
//! `IDENTIFIER_CANDIDATE`) and `transitions` (state -> input class -> state).
//! Input classes are `letter`, `digit` or a literal character.

use crate::config::compile_time::lexical::{MAX_DFA_RULES_SIZE, MAX_DFA_STATES};
use crate::logging::codes;
use crate::tokens::TokenKind;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Rules shipped with the compiler
pub const EMBEDDED_DFA_RULES: &str = include_str!("../../rules/dfa_rules.json");

const IDENTIFIER_CANDIDATE: &str = "IDENTIFIER_CANDIDATE";
const REQUIRED_FIELDS: [&str; 3] = ["start_state", "final_states", "transitions"];

/// Fatal rule-file problems; a lexer is never built from a rejected file
#[derive(Debug, thiserror::Error)]
pub enum DfaError {
    #[error("Cannot read DFA rules '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("DFA rules '{path}' are {size} bytes (max {MAX_DFA_RULES_SIZE})")]
    TooLarge { path: String, size: u64 },

    #[error("Invalid DFA rules in '{origin}': {message}")]
    Malformed { origin: String, message: String },

    #[error("DFA rules in '{origin}' are incomplete: missing '{field}'")]
    MissingField { origin: String, field: &'static str },

    #[error("DFA rules in '{origin}' reference state '{state}' with no definition")]
    UndefinedState { origin: String, state: String },

    #[error("Final state '{state}' maps to unknown token kind '{kind}'")]
    UnknownTokenKind { state: String, kind: String },

    #[error("DFA has {count} states (max {MAX_DFA_STATES})")]
    TooManyStates { count: usize },
}

impl DfaError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            DfaError::Unreadable { .. } | DfaError::TooLarge { .. } => {
                codes::lexical::DFA_RULES_UNREADABLE
            }
            DfaError::Malformed { .. } => codes::lexical::DFA_RULES_MALFORMED,
            DfaError::MissingField { .. } => codes::lexical::DFA_RULES_INCOMPLETE,
            DfaError::UndefinedState { .. } | DfaError::TooManyStates { .. } => {
                codes::lexical::DFA_INVALID_STATE
            }
            DfaError::UnknownTokenKind { .. } => codes::lexical::UNMAPPED_FINAL_STATE,
        }
    }
}

/// What a final state produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalClass {
    /// Keyword or identifier, decided by the keyword list
    IdentifierCandidate,
    Token(TokenKind),
}

#[derive(Deserialize)]
struct RawDfa {
    start_state: String,
    final_states: HashMap<String, String>,
    transitions: HashMap<String, HashMap<String, String>>,
}

/// Validated, immutable transition table
#[derive(Debug, Clone)]
pub struct DfaDefinition {
    start_state: String,
    final_states: HashMap<String, FinalClass>,
    transitions: HashMap<String, HashMap<String, String>>,
}

impl DfaDefinition {
    /// Rules compiled into the binary
    pub fn embedded() -> Result<Self, DfaError> {
        Self::from_json_str(EMBEDDED_DFA_RULES, "<embedded>")
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DfaError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let size = std::fs::metadata(path)
            .map_err(|source| DfaError::Unreadable {
                path: display.clone(),
                source,
            })?
            .len();
        if size > MAX_DFA_RULES_SIZE {
            return Err(DfaError::TooLarge {
                path: display,
                size,
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| DfaError::Unreadable {
            path: display.clone(),
            source,
        })?;
        Self::from_json_str(&content, &display)
    }

    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, DfaError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| DfaError::Malformed {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;

        let object = value.as_object().ok_or_else(|| DfaError::Malformed {
            origin: origin.to_string(),
            message: "top level must be an object".to_string(),
        })?;
        for field in REQUIRED_FIELDS {
            if !object.contains_key(field) {
                return Err(DfaError::MissingField {
                    origin: origin.to_string(),
                    field,
                });
            }
        }

        let raw: RawDfa = serde_json::from_value(value).map_err(|e| DfaError::Malformed {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

        Self::validate(raw, origin)
    }

    fn validate(raw: RawDfa, origin: &str) -> Result<Self, DfaError> {
        let mut states: HashSet<&str> = HashSet::new();
        states.insert(&raw.start_state);
        states.extend(raw.final_states.keys().map(String::as_str));
        for (from, edges) in &raw.transitions {
            states.insert(from);
            states.extend(edges.values().map(String::as_str));
        }
        if states.len() > MAX_DFA_STATES {
            return Err(DfaError::TooManyStates {
                count: states.len(),
            });
        }

        if !raw.transitions.contains_key(&raw.start_state) {
            return Err(DfaError::UndefinedState {
                origin: origin.to_string(),
                state: raw.start_state.clone(),
            });
        }

        // A target must lead somewhere or accept; otherwise the edge is a typo
        for edges in raw.transitions.values() {
            for target in edges.values() {
                if !raw.transitions.contains_key(target) && !raw.final_states.contains_key(target)
                {
                    return Err(DfaError::UndefinedState {
                        origin: origin.to_string(),
                        state: target.clone(),
                    });
                }
            }
        }

        let mut final_states = HashMap::with_capacity(raw.final_states.len());
        for (state, kind) in raw.final_states {
            let class = if kind == IDENTIFIER_CANDIDATE {
                FinalClass::IdentifierCandidate
            } else {
                TokenKind::from_name(&kind)
                    .map(FinalClass::Token)
                    .ok_or_else(|| DfaError::UnknownTokenKind {
                        state: state.clone(),
                        kind: kind.clone(),
                    })?
            };
            final_states.insert(state, class);
        }

        Ok(Self {
            start_state: raw.start_state,
            final_states,
            transitions: raw.transitions,
        })
    }

    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    pub fn final_class(&self, state: &str) -> Option<FinalClass> {
        self.final_states.get(state).copied()
    }

    /// Next state for `ch`, if the table has an edge for its input class
    pub fn step(&self, state: &str, ch: char) -> Option<&str> {
        let edges = self.transitions.get(state)?;
        let class = classify_char(ch);
        match class {
            InputClass::Letter => edges.get("letter"),
            InputClass::Digit => edges.get("digit"),
            InputClass::Symbol(c) => {
                let mut buf = [0u8; 4];
                edges.get(&*c.encode_utf8(&mut buf))
            }
        }
        .map(String::as_str)
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }
}

/// Input class of a character for table lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    Letter,
    Digit,
    Symbol(char),
}

pub fn classify_char(ch: char) -> InputClass {
    if ch.is_alphabetic() {
        InputClass::Letter
    } else if ch.is_ascii_digit() {
        InputClass::Digit
    } else {
        InputClass::Symbol(ch)
    }
}
