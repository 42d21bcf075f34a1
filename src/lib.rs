//! # netting-ledger
//!
//! Incremental debt-netting ledger that keeps a minimal balance graph.
//!
//! Given a stream of payment events among named participants, the
//! ledger maintains at most one net balance edge between any two
//! participants: mutual debts collapse to a single direction, settled
//! edges disappear, and leftover credit is rerouted through existing
//! debts before a new edge is created.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: participants, payment events, audit log
//! - **graph** — The balance graph and its minimality invariants
//! - **settlement** — The incremental three-stage settlement engine
//! - **ledger** — The facade: record payments, query balances
//! - **simulation** — Random payment streams for stress testing

pub mod core;
pub mod graph;
pub mod ledger;
pub mod settlement;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::participant::{ParticipantDirectory, ParticipantId};
    pub use crate::core::payment::{AuditLog, MemoryAuditLog, PaymentEvent};
    pub use crate::graph::balance_graph::{BalanceGraph, GraphError};
    pub use crate::graph::edge::BalanceEdge;
    pub use crate::ledger::{Balance, DebtLedger, LedgerError};
    pub use crate::settlement::engine::SettlementEngine;
}
