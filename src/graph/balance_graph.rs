use crate::core::participant::ParticipantId;
use crate::graph::edge::BalanceEdge;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors arising from balance graph mutations.
///
/// These are defensive: a correctly sequenced settlement never triggers
/// them. When one surfaces, the current event must be aborted and the
/// graph rolled back — the graph is never "fixed" silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("participant cannot owe money to themselves: {0}")]
    SelfEdge(ParticipantId),
    #[error("no balance edge from {debtor} to {creditor}")]
    EdgeNotFound {
        debtor: ParticipantId,
        creditor: ParticipantId,
    },
    #[error("balance from {debtor} to {creditor} would become {amount}; settled edges must be removed, not zeroed")]
    NonPositiveAmount {
        debtor: ParticipantId,
        creditor: ParticipantId,
        amount: i64,
    },
    #[error("balance graph index out of sync around {0}")]
    IndexCorrupted(ParticipantId),
}

/// The in-memory graph of net balances between participants.
///
/// Edges are stored once, keyed by the unordered participant pair, with
/// the owing direction carried by the edge itself. That representation
/// makes the core minimality invariant unrepresentable to violate: there
/// is no way to hold `A → B` and `B → A` at the same time, and no way to
/// hold two edges for one pair.
///
/// Each participant additionally holds non-owning counterparty indices
/// (`debts`: whom they owe, `claims`: who owes them) so that directional
/// lookups are O(degree). Indices are updated in the same step as every
/// edge mutation.
///
/// # Examples
///
/// ```
/// use netting_ledger::core::participant::ParticipantId;
/// use netting_ledger::graph::balance_graph::BalanceGraph;
///
/// let mut graph = BalanceGraph::new();
/// let bob = ParticipantId::new("bob");
/// let alice = ParticipantId::new("alice");
///
/// graph.upsert(&bob, &alice, 30).unwrap();
/// graph.upsert(&alice, &bob, 10).unwrap();
///
/// // Mutual debt collapses to a single net edge.
/// let edge = graph.find_edge(&bob, &alice).unwrap();
/// assert_eq!(edge.amount(), 20);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "EdgeList", into = "EdgeList")]
pub struct BalanceGraph {
    /// Name-ordered pair -> the single net edge for that pair.
    edges: HashMap<(ParticipantId, ParticipantId), BalanceEdge>,
    /// Debtor -> creditors they owe.
    debts: HashMap<ParticipantId, BTreeSet<ParticipantId>>,
    /// Creditor -> debtors who owe them.
    claims: HashMap<ParticipantId, BTreeSet<ParticipantId>>,
}

/// Serialized form: just the edge list. Indices are derived state and
/// are rebuilt on deserialization.
#[derive(Serialize, Deserialize)]
struct EdgeList {
    edges: Vec<BalanceEdge>,
}

impl From<BalanceGraph> for EdgeList {
    fn from(graph: BalanceGraph) -> Self {
        let mut edges: Vec<BalanceEdge> = graph.edges.into_values().collect();
        edges.sort_by(|a, b| {
            (a.debtor(), a.creditor()).cmp(&(b.debtor(), b.creditor()))
        });
        Self { edges }
    }
}

impl From<EdgeList> for BalanceGraph {
    fn from(list: EdgeList) -> Self {
        let mut graph = BalanceGraph::new();
        for edge in list.edges {
            graph.insert_edge(edge);
        }
        graph
    }
}

fn ordered_pair(a: &ParticipantId, b: &ParticipantId) -> (ParticipantId, ParticipantId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

impl BalanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The edge from `debtor` to `creditor`, if the pair's net balance
    /// currently runs in that direction.
    pub fn find_edge(&self, debtor: &ParticipantId, creditor: &ParticipantId) -> Option<&BalanceEdge> {
        self.edges
            .get(&ordered_pair(debtor, creditor))
            .filter(|edge| edge.debtor() == debtor)
    }

    /// The edge between two participants in whichever direction it runs.
    pub fn edge_between(&self, a: &ParticipantId, b: &ParticipantId) -> Option<&BalanceEdge> {
        self.edges.get(&ordered_pair(a, b))
    }

    /// Edges where `participant` is the debtor, ascending by amount
    /// (ties broken by creditor name). Returned by value so callers can
    /// mutate the graph while walking them.
    pub fn creditors_of(&self, participant: &ParticipantId) -> Vec<BalanceEdge> {
        let mut edges: Vec<BalanceEdge> = self
            .debts
            .get(participant)
            .into_iter()
            .flatten()
            .filter_map(|creditor| self.find_edge(participant, creditor).cloned())
            .collect();
        edges.sort_by(|a, b| {
            a.amount()
                .cmp(&b.amount())
                .then_with(|| a.creditor().cmp(b.creditor()))
        });
        edges
    }

    /// Edges where `participant` is the creditor, ascending by amount
    /// (ties broken by debtor name).
    pub fn debtors_of(&self, participant: &ParticipantId) -> Vec<BalanceEdge> {
        let mut edges: Vec<BalanceEdge> = self
            .claims
            .get(participant)
            .into_iter()
            .flatten()
            .filter_map(|debtor| self.find_edge(debtor, participant).cloned())
            .collect();
        edges.sort_by(|a, b| {
            a.amount()
                .cmp(&b.amount())
                .then_with(|| a.debtor().cmp(b.debtor()))
        });
        edges
    }

    /// Add `amount` of debt from `debtor` to `creditor`, netting against
    /// any opposite-direction balance.
    ///
    /// Grows a same-direction edge in place; shrinks, deletes, or flips
    /// an opposite-direction edge; inserts a fresh edge when the pair had
    /// none. The minimality invariant holds on exit in every case.
    pub fn upsert(
        &mut self,
        debtor: &ParticipantId,
        creditor: &ParticipantId,
        amount: i64,
    ) -> Result<(), GraphError> {
        if debtor == creditor {
            return Err(GraphError::SelfEdge(debtor.clone()));
        }
        if amount <= 0 {
            return Err(GraphError::NonPositiveAmount {
                debtor: debtor.clone(),
                creditor: creditor.clone(),
                amount,
            });
        }
        let key = ordered_pair(debtor, creditor);
        match self.edges.get_mut(&key) {
            None => {
                self.insert_edge(BalanceEdge::new(debtor.clone(), creditor.clone(), amount));
            }
            Some(edge) if edge.debtor() == debtor => {
                edge.grow(amount);
            }
            // Opposite direction: net the two balances.
            Some(edge) if edge.amount() > amount => {
                edge.shrink(amount);
            }
            Some(edge) => {
                let existing = edge.amount();
                self.delete_pair(&key);
                if existing < amount {
                    self.insert_edge(BalanceEdge::new(
                        debtor.clone(),
                        creditor.clone(),
                        amount - existing,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Shrink the edge from `debtor` to `creditor` by `delta`, which must
    /// leave a positive amount behind. Paying an edge off entirely is a
    /// `remove`, not a reduce to zero.
    pub fn reduce(
        &mut self,
        debtor: &ParticipantId,
        creditor: &ParticipantId,
        delta: i64,
    ) -> Result<(), GraphError> {
        let key = ordered_pair(debtor, creditor);
        let edge = self
            .edges
            .get_mut(&key)
            .filter(|edge| edge.debtor() == debtor)
            .ok_or_else(|| GraphError::EdgeNotFound {
                debtor: debtor.clone(),
                creditor: creditor.clone(),
            })?;
        let rest = edge.amount() - delta;
        if delta <= 0 || rest <= 0 {
            return Err(GraphError::NonPositiveAmount {
                debtor: debtor.clone(),
                creditor: creditor.clone(),
                amount: rest,
            });
        }
        edge.shrink(delta);
        Ok(())
    }

    /// Delete the edge from `debtor` to `creditor`, updating both
    /// endpoints' indices in the same step.
    pub fn remove(
        &mut self,
        debtor: &ParticipantId,
        creditor: &ParticipantId,
    ) -> Result<(), GraphError> {
        let key = ordered_pair(debtor, creditor);
        let matches = self
            .edges
            .get(&key)
            .is_some_and(|edge| edge.debtor() == debtor);
        if !matches {
            return Err(GraphError::EdgeNotFound {
                debtor: debtor.clone(),
                creditor: creditor.clone(),
            });
        }
        self.delete_pair(&key);
        Ok(())
    }

    /// Signed balances of `participant` against every counterparty:
    /// positive when owed to them, negative when they owe. Sorted by
    /// counterparty name. Empty when the participant has no edges.
    pub fn balances_for(&self, participant: &ParticipantId) -> Vec<(ParticipantId, i64)> {
        let mut balances: Vec<(ParticipantId, i64)> = Vec::new();
        for edge in self.debtors_of(participant) {
            balances.push((edge.debtor().clone(), edge.amount()));
        }
        for edge in self.creditors_of(participant) {
            balances.push((edge.creditor().clone(), -edge.amount()));
        }
        balances.sort_by(|a, b| a.0.cmp(&b.0));
        balances
    }

    /// Number of balance edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All edges, in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = &BalanceEdge> {
        self.edges.values()
    }

    /// Sum of all outstanding edge amounts.
    pub fn total_outstanding(&self) -> i64 {
        self.edges.values().map(|edge| edge.amount()).sum()
    }

    /// Drop every edge and index.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.debts.clear();
        self.claims.clear();
    }

    /// Defensive full-graph validation: every edge positive with distinct
    /// endpoints stored under its own pair key, and both index maps in
    /// exact agreement with the edge set.
    pub fn check_invariants(&self) -> Result<(), GraphError> {
        for (key, edge) in &self.edges {
            if edge.debtor() == edge.creditor() {
                return Err(GraphError::SelfEdge(edge.debtor().clone()));
            }
            if edge.amount() <= 0 {
                return Err(GraphError::NonPositiveAmount {
                    debtor: edge.debtor().clone(),
                    creditor: edge.creditor().clone(),
                    amount: edge.amount(),
                });
            }
            if *key != ordered_pair(edge.debtor(), edge.creditor()) {
                return Err(GraphError::IndexCorrupted(edge.debtor().clone()));
            }
            let debt_indexed = self
                .debts
                .get(edge.debtor())
                .is_some_and(|set| set.contains(edge.creditor()));
            let claim_indexed = self
                .claims
                .get(edge.creditor())
                .is_some_and(|set| set.contains(edge.debtor()));
            if !debt_indexed || !claim_indexed {
                return Err(GraphError::IndexCorrupted(edge.debtor().clone()));
            }
        }
        // No stale index entries pointing at deleted edges.
        for (debtor, creditors) in &self.debts {
            for creditor in creditors {
                if self.find_edge(debtor, creditor).is_none() {
                    return Err(GraphError::IndexCorrupted(debtor.clone()));
                }
            }
        }
        for (creditor, debtors) in &self.claims {
            for debtor in debtors {
                if self.find_edge(debtor, creditor).is_none() {
                    return Err(GraphError::IndexCorrupted(creditor.clone()));
                }
            }
        }
        Ok(())
    }

    fn insert_edge(&mut self, edge: BalanceEdge) {
        let key = ordered_pair(edge.debtor(), edge.creditor());
        self.debts
            .entry(edge.debtor().clone())
            .or_default()
            .insert(edge.creditor().clone());
        self.claims
            .entry(edge.creditor().clone())
            .or_default()
            .insert(edge.debtor().clone());
        self.edges.insert(key, edge);
    }

    fn delete_pair(&mut self, key: &(ParticipantId, ParticipantId)) {
        if let Some(edge) = self.edges.remove(key) {
            if let Some(set) = self.debts.get_mut(edge.debtor()) {
                set.remove(edge.creditor());
                if set.is_empty() {
                    self.debts.remove(edge.debtor());
                }
            }
            if let Some(set) = self.claims.get_mut(edge.creditor()) {
                set.remove(edge.debtor());
                if set.is_empty() {
                    self.claims.remove(edge.creditor());
                }
            }
        }
    }
}
