use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Unique identifier for a participant in the debt network.
///
/// A participant is anyone who can owe or be owed money: a person in a
/// shared household, a team member splitting expenses, or any other
/// named entity. Identity is the name itself — two lookups with the
/// same name always yield the same participant.
///
/// # Examples
///
/// ```
/// use netting_ledger::core::participant::ParticipantId;
///
/// let alice = ParticipantId::new("alice");
/// let bob = ParticipantId::new("bob");
/// assert_ne!(alice, bob);
/// assert_eq!(alice, ParticipantId::new("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create a new participant identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the string representation of this participant ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Registry of all participants known to the ledger.
///
/// `get_or_create` is idempotent: repeated calls with the same name
/// return the same identity. The directory only tracks who exists;
/// balances live in the balance graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantDirectory {
    names: BTreeSet<ParticipantId>,
}

impl ParticipantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a participant by name, registering it on first use.
    pub fn get_or_create(&mut self, name: &str) -> ParticipantId {
        let id = ParticipantId::new(name);
        self.names.insert(id.clone());
        id
    }

    /// Look up a participant without registering it.
    pub fn get(&self, name: &str) -> Option<&ParticipantId> {
        self.names.get(&ParticipantId::new(name))
    }

    /// All known participants, in name order.
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Forget every registered participant.
    pub fn clear(&mut self) {
        self.names.clear();
    }
}
