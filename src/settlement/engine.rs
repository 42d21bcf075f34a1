use crate::core::participant::ParticipantId;
use crate::graph::balance_graph::{BalanceGraph, GraphError};
use crate::graph::edge::BalanceEdge;
use log::debug;

/// The incremental settlement engine.
///
/// Consumes one payment event at a time — "`payer` extended `amount` of
/// credit to `payee`" — and rewrites the balance graph so that the
/// minimality invariant still holds: one net edge per pair, every edge
/// positive. Each event runs three stages, each consuming as much of the
/// running remainder as it can:
///
/// 1. **Direct settlement** — pay down an existing `payer → payee` debt
///    (surplus carries over), or grow an existing `payee → payer` one.
/// 2. **Triangulated rerouting** — while the payer still owes third
///    parties, the leftover credit either settles the payee's own debt
///    to a shared creditor or takes over the payer's debt outright,
///    smallest debts first.
/// 3. **Residual** — whatever is left becomes a fresh `payee → payer`
///    edge.
///
/// Rerouting looks exactly one hop out: a creditor is "shared" only if
/// the payee owes that same participant directly. Deeper chains are out
/// of scope by design, which keeps each event bounded by the payer's
/// out-degree.
///
/// # Examples
///
/// ```
/// use netting_ledger::core::participant::ParticipantId;
/// use netting_ledger::graph::balance_graph::BalanceGraph;
/// use netting_ledger::settlement::engine::SettlementEngine;
///
/// let mut graph = BalanceGraph::new();
/// let alice = ParticipantId::new("alice");
/// let bob = ParticipantId::new("bob");
///
/// // Alice lends bob 10: bob now owes alice.
/// SettlementEngine::apply(&mut graph, &alice, &bob, 10).unwrap();
/// assert_eq!(graph.find_edge(&bob, &alice).unwrap().amount(), 10);
///
/// // Bob pays 10 back: the edge disappears entirely.
/// SettlementEngine::apply(&mut graph, &bob, &alice, 10).unwrap();
/// assert!(graph.is_empty());
/// ```
pub struct SettlementEngine;

impl SettlementEngine {
    /// Apply one normalized event to the graph.
    ///
    /// `amount` must be non-negative (zero is a no-op) and the payer and
    /// payee must differ; the facade validates both before calling, so a
    /// violation here is a defensive error. On any error the graph may
    /// be partially mutated and the caller must roll back.
    pub fn apply(
        graph: &mut BalanceGraph,
        payer: &ParticipantId,
        payee: &ParticipantId,
        amount: i64,
    ) -> Result<(), GraphError> {
        if payer == payee {
            return Err(GraphError::SelfEdge(payer.clone()));
        }
        if amount < 0 {
            return Err(GraphError::NonPositiveAmount {
                debtor: payer.clone(),
                creditor: payee.clone(),
                amount,
            });
        }
        if amount == 0 {
            return Ok(());
        }

        let mut remaining = Self::settle_direct(graph, payer, payee, amount)?;

        if remaining > 0 {
            remaining = Self::reroute(graph, payer, payee, remaining)?;
        }

        if remaining > 0 {
            debug!("residual: {} owes {} {}", payee, payer, remaining);
            graph.upsert(payee, payer, remaining)?;
        }

        debug_assert!(
            graph.check_invariants().is_ok(),
            "settlement left the balance graph inconsistent"
        );
        Ok(())
    }

    /// Stage 1: settle against the existing balance between the two
    /// participants, if any. Returns the credit still unconsumed.
    fn settle_direct(
        graph: &mut BalanceGraph,
        payer: &ParticipantId,
        payee: &ParticipantId,
        remaining: i64,
    ) -> Result<i64, GraphError> {
        if let Some(edge) = graph.find_edge(payer, payee) {
            let owed = edge.amount();
            if owed > remaining {
                debug!("direct: {} pays {} down by {}", payer, payee, remaining);
                graph.reduce(payer, payee, remaining)?;
                Ok(0)
            } else {
                debug!("direct: {} pays {} off ({}), surplus {}", payer, payee, owed, remaining - owed);
                graph.remove(payer, payee)?;
                Ok(remaining - owed)
            }
        } else if graph.find_edge(payee, payer).is_some() {
            debug!("direct: {} lends {} another {}", payer, payee, remaining);
            graph.upsert(payee, payer, remaining)?;
            Ok(0)
        } else {
            Ok(remaining)
        }
    }

    /// Stage 2: route leftover credit through the payer's remaining
    /// creditors, smallest debt first. Creditors the payee also owes are
    /// settled directly in a first pass; the rest have the payer's debt
    /// transferred onto the payee in a second pass. The partition is
    /// taken once, before either pass mutates the graph.
    fn reroute(
        graph: &mut BalanceGraph,
        payer: &ParticipantId,
        payee: &ParticipantId,
        mut remaining: i64,
    ) -> Result<i64, GraphError> {
        let creditors = graph.creditors_of(payer);
        if creditors.is_empty() {
            return Ok(remaining);
        }

        let (shared, unshared): (Vec<BalanceEdge>, Vec<BalanceEdge>) = creditors
            .into_iter()
            .partition(|edge| graph.find_edge(payee, edge.creditor()).is_some());

        for edge in &shared {
            debug!("reroute: {} settles shared creditor {}", payee, edge.creditor());
            remaining = Self::settle_direct(graph, payee, edge.creditor(), remaining)?;
            if remaining == 0 {
                return Ok(0);
            }
        }
        for edge in &unshared {
            debug!("reroute: transferring '{}' onto {}", edge, payee);
            remaining = Self::transfer_debt(graph, payee, edge, remaining)?;
            if remaining == 0 {
                return Ok(0);
            }
        }
        Ok(remaining)
    }

    /// Move all or part of `old_edge` onto `new_debtor`, consuming up to
    /// `remaining` of it. Returns the credit still unconsumed.
    fn transfer_debt(
        graph: &mut BalanceGraph,
        new_debtor: &ParticipantId,
        old_edge: &BalanceEdge,
        remaining: i64,
    ) -> Result<i64, GraphError> {
        let owed = old_edge.amount();
        let creditor = old_edge.creditor();
        if remaining >= owed {
            graph.remove(old_edge.debtor(), creditor)?;
            graph.upsert(new_debtor, creditor, owed)?;
            Ok(remaining - owed)
        } else {
            graph.reduce(old_edge.debtor(), creditor, remaining)?;
            graph.upsert(new_debtor, creditor, remaining)?;
            Ok(0)
        }
    }
}
