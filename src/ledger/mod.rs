//! Ledger facade: normalization, atomic settlement, audit, queries.

use crate::core::participant::{ParticipantDirectory, ParticipantId};
use crate::core::payment::{AuditLog, MemoryAuditLog, PaymentEvent};
use crate::graph::balance_graph::{BalanceGraph, GraphError};
use crate::settlement::engine::SettlementEngine;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the ledger facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The payer and payee of an event resolved to the same participant.
    #[error("payment rejected: {0} cannot pay themselves")]
    SelfPayment(ParticipantId),
    /// Internal consistency failure; the event was rolled back.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One entry of a participant's balance sheet: positive means the
/// counterparty owes them, negative means they owe the counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub counterparty: ParticipantId,
    pub amount: i64,
}

/// The debt ledger: the one entry point for recording payments and
/// reading balances.
///
/// `record_payment` normalizes raw caller input (a negative amount is
/// the reverse payment), rejects self-payments, funnels the event
/// through the settlement engine as an all-or-nothing step, and appends
/// the accepted event to the audit log. Every mutation takes `&mut
/// self`, so exclusive access is the serialization boundary; callers
/// sharing a ledger across threads wrap it in a lock.
///
/// # Examples
///
/// ```
/// use netting_ledger::ledger::DebtLedger;
///
/// let mut ledger = DebtLedger::new();
/// ledger.record_payment("alice", "bob", 10, "lunch").unwrap();
///
/// let balances = ledger.balances_of("alice");
/// assert_eq!(balances[0].counterparty.as_str(), "bob");
/// assert_eq!(balances[0].amount, 10); // bob owes alice
/// assert_eq!(ledger.balances_of("bob")[0].amount, -10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DebtLedger<L: AuditLog = MemoryAuditLog> {
    directory: ParticipantDirectory,
    graph: BalanceGraph,
    audit: L,
}

impl DebtLedger<MemoryAuditLog> {
    /// Create a ledger with an in-memory audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> &[PaymentEvent] {
        self.audit.events()
    }

    /// Number of accepted payment events.
    pub fn payment_count(&self) -> usize {
        self.audit.len()
    }
}

impl<L: AuditLog> DebtLedger<L> {
    /// Create a ledger appending to the given audit collaborator.
    pub fn with_audit_log(audit: L) -> Self {
        Self {
            directory: ParticipantDirectory::new(),
            graph: BalanceGraph::new(),
            audit,
        }
    }

    /// Record that `payer` handed `amount` to `payee`.
    ///
    /// A negative amount is normalized to the reverse payment before
    /// anything touches the graph. A zero amount is audited but leaves
    /// the graph unchanged. The settlement stages run as one atomic
    /// unit: if any stage fails the graph is restored to its prior
    /// state and the event is not logged.
    pub fn record_payment(
        &mut self,
        payer: &str,
        payee: &str,
        amount: i64,
        description: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let payer = self.directory.get_or_create(payer);
        let payee = self.directory.get_or_create(payee);
        let event = PaymentEvent::normalized(payer, payee, amount, description);
        if event.payer() == event.payee() {
            return Err(LedgerError::SelfPayment(event.payer().clone()));
        }

        debug!(
            "recording payment {}: {} -> {} ({})",
            event.id(),
            event.payer(),
            event.payee(),
            event.amount()
        );

        let checkpoint = self.graph.clone();
        if let Err(err) =
            SettlementEngine::apply(&mut self.graph, event.payer(), event.payee(), event.amount())
        {
            self.graph = checkpoint;
            return Err(err.into());
        }
        self.audit.append(event);
        Ok(())
    }

    /// Signed balances of the named participant against every
    /// counterparty, sorted by counterparty name. A name with no open
    /// balances — including one never seen before — yields an empty
    /// list.
    pub fn balances_of(&self, name: &str) -> Vec<Balance> {
        self.graph
            .balances_for(&ParticipantId::new(name))
            .into_iter()
            .map(|(counterparty, amount)| Balance {
                counterparty,
                amount,
            })
            .collect()
    }

    /// All known participants, in name order.
    pub fn participants(&self) -> Vec<&ParticipantId> {
        self.directory.participants().collect()
    }

    /// Number of open balance edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sum of all outstanding balances.
    pub fn total_outstanding(&self) -> i64 {
        self.graph.total_outstanding()
    }

    /// Read access to the balance graph.
    pub fn graph(&self) -> &BalanceGraph {
        &self.graph
    }

    /// Forget all participants and balances. The audit trail is
    /// append-only and is left intact.
    pub fn clear(&mut self) {
        self.directory.clear();
        self.graph.clear();
    }
}

impl<L: AuditLog> fmt::Display for DebtLedger<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Balance Report ===")?;
        writeln!(f, "Participants:  {}", self.directory.len())?;
        writeln!(f, "Open balances: {}", self.graph.edge_count())?;
        writeln!(f, "Outstanding:   {}", self.graph.total_outstanding())?;
        for participant in self.directory.participants() {
            let balances = self.graph.balances_for(participant);
            if balances.is_empty() {
                continue;
            }
            let entries: Vec<String> = balances
                .iter()
                .map(|(counterparty, amount)| format!("{}: {:+}", counterparty, amount))
                .collect();
            writeln!(f, "  {:<12} {}", participant.as_str(), entries.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_query() {
        let mut ledger = DebtLedger::new();
        ledger.record_payment("alice", "bob", 10, "lunch").unwrap();

        assert_eq!(
            ledger.balances_of("alice"),
            vec![Balance {
                counterparty: ParticipantId::new("bob"),
                amount: 10,
            }]
        );
        assert_eq!(ledger.balances_of("bob")[0].amount, -10);
        assert_eq!(ledger.payment_count(), 1);
    }

    #[test]
    fn test_negative_amount_normalizes_to_reverse_payment() {
        let mut ledger = DebtLedger::new();
        ledger.record_payment("alice", "bob", -10, "refund").unwrap();

        // Equivalent to bob paying alice 10: alice owes bob.
        assert_eq!(ledger.balances_of("alice")[0].amount, -10);
        assert_eq!(ledger.events()[0].payer().as_str(), "bob");
        assert_eq!(ledger.events()[0].amount(), 10);
    }

    #[test]
    fn test_self_payment_rejected_and_not_logged() {
        let mut ledger = DebtLedger::new();
        let err = ledger.record_payment("alice", "alice", 10, "oops").unwrap_err();
        assert_eq!(err, LedgerError::SelfPayment(ParticipantId::new("alice")));
        assert_eq!(ledger.payment_count(), 0);
        assert!(ledger.graph().is_empty());
    }

    #[test]
    fn test_zero_amount_logged_but_graph_untouched() {
        let mut ledger = DebtLedger::new();
        ledger.record_payment("alice", "bob", 0, "nothing").unwrap();
        assert!(ledger.graph().is_empty());
        assert_eq!(ledger.payment_count(), 1);
    }

    #[test]
    fn test_unknown_participant_has_empty_balances() {
        let ledger = DebtLedger::new();
        assert!(ledger.balances_of("stranger").is_empty());
    }

    #[test]
    fn test_participants_sorted() {
        let mut ledger = DebtLedger::new();
        ledger.record_payment("carol", "alice", 5, "").unwrap();
        ledger.record_payment("bob", "alice", 5, "").unwrap();
        let names: Vec<&str> = ledger.participants().iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_clear_keeps_audit_trail() {
        let mut ledger = DebtLedger::new();
        ledger.record_payment("alice", "bob", 10, "lunch").unwrap();
        ledger.clear();
        assert!(ledger.graph().is_empty());
        assert!(ledger.participants().is_empty());
        assert_eq!(ledger.payment_count(), 1);
    }

    #[test]
    fn test_display_report() {
        let mut ledger = DebtLedger::new();
        ledger.record_payment("alice", "bob", 10, "lunch").unwrap();
        let report = format!("{}", ledger);
        assert!(report.contains("Participants:  2"));
        assert!(report.contains("alice"));
        assert!(report.contains("+10"));
    }

    #[test]
    fn test_balance_json_shape() {
        let balance = Balance {
            counterparty: ParticipantId::new("bob"),
            amount: -25,
        };
        let json = serde_json::to_string(&balance).unwrap();
        assert_eq!(json, r#"{"counterparty":"bob","amount":-25}"#);
    }
}
