use netting_ledger::core::participant::ParticipantId;
use netting_ledger::ledger::{Balance, DebtLedger, LedgerError};

fn balance(name: &str, amount: i64) -> Balance {
    Balance {
        counterparty: ParticipantId::new(name),
        amount,
    }
}

/// A first payment between strangers creates a single residual edge.
#[test]
fn first_payment_creates_debt() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("alice", "bob", 10, "lunch").unwrap();

    assert_eq!(ledger.balances_of("alice"), vec![balance("bob", 10)]);
    assert_eq!(ledger.balances_of("bob"), vec![balance("alice", -10)]);
    assert_eq!(ledger.edge_count(), 1);
}

/// Paying down part of an existing debt shrinks the edge in place.
#[test]
fn partial_payback_shrinks_debt() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("bob", "alice", 15, "loan").unwrap();
    ledger.record_payment("alice", "bob", 10, "payback").unwrap();

    assert_eq!(ledger.balances_of("alice"), vec![balance("bob", -5)]);
    assert_eq!(ledger.balances_of("bob"), vec![balance("alice", 5)]);
}

/// An exact payback removes the edge entirely.
#[test]
fn exact_payback_clears_debt() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("bob", "alice", 10, "loan").unwrap();
    ledger.record_payment("alice", "bob", 10, "payback").unwrap();

    assert!(ledger.balances_of("alice").is_empty());
    assert!(ledger.balances_of("bob").is_empty());
    assert_eq!(ledger.edge_count(), 0);
}

/// Overpaying a debt flips the direction with the leftover.
#[test]
fn overpayment_flips_direction() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("bob", "alice", 10, "loan").unwrap();
    ledger.record_payment("alice", "bob", 15, "payback plus").unwrap();

    assert_eq!(ledger.balances_of("alice"), vec![balance("bob", 5)]);
    assert_eq!(ledger.balances_of("bob"), vec![balance("alice", -5)]);
    assert_eq!(ledger.edge_count(), 1);
}

/// Leftover credit takes over the payer's existing debt instead of
/// adding a third relationship to the graph.
#[test]
fn rerouting_transfers_debt_and_leaves_residual() {
    let mut ledger = DebtLedger::new();
    // alice ends up owing carol 8.
    ledger.record_payment("carol", "alice", 8, "concert tickets").unwrap();
    // alice lends bob 20 with no prior alice/bob relationship.
    ledger.record_payment("alice", "bob", 20, "festival").unwrap();

    // alice's debt to carol moved onto bob; the rest became bob -> alice.
    assert_eq!(ledger.balances_of("alice"), vec![balance("bob", 12)]);
    assert_eq!(
        ledger.balances_of("bob"),
        vec![balance("alice", -12), balance("carol", -8)]
    );
    assert_eq!(ledger.balances_of("carol"), vec![balance("bob", 8)]);
    assert_eq!(ledger.edge_count(), 2);
}

/// When the payee already owes the payer's creditor, the leftover
/// credit settles that shared debt first.
#[test]
fn rerouting_settles_shared_creditor_first() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("carol", "alice", 8, "").unwrap(); // alice owes carol
    ledger.record_payment("carol", "bob", 10, "").unwrap(); // bob owes carol
    ledger.record_payment("alice", "bob", 5, "").unwrap();

    assert_eq!(ledger.balances_of("alice"), vec![balance("carol", -8)]);
    assert_eq!(ledger.balances_of("bob"), vec![balance("carol", -5)]);
    assert_eq!(
        ledger.balances_of("carol"),
        vec![balance("alice", 8), balance("bob", 5)]
    );
    // No alice/bob edge appeared.
    assert_eq!(ledger.edge_count(), 2);
}

/// Full household narrative: rent, groceries, paybacks.
#[test]
fn household_month_of_payments() {
    let mut ledger = DebtLedger::new();

    ledger.record_payment("alice", "bob", 300, "rent share").unwrap();
    ledger.record_payment("alice", "carol", 300, "rent share").unwrap();
    ledger.record_payment("bob", "alice", 120, "groceries").unwrap();
    ledger.record_payment("carol", "alice", 300, "rent payback").unwrap();
    ledger.record_payment("carol", "bob", 50, "takeaway").unwrap();

    assert_eq!(ledger.balances_of("alice"), vec![balance("bob", 180)]);
    assert_eq!(
        ledger.balances_of("bob"),
        vec![balance("alice", -180), balance("carol", -50)]
    );
    assert_eq!(ledger.balances_of("carol"), vec![balance("bob", 50)]);

    assert_eq!(ledger.edge_count(), 2);
    assert_eq!(ledger.total_outstanding(), 230);
    assert_eq!(ledger.payment_count(), 5);
    ledger.graph().check_invariants().unwrap();
}

/// Lending and immediately reversing the same amount between an
/// otherwise untangled pair leaves no trace on the graph.
#[test]
fn lend_and_reverse_cancel_out() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("carol", "dave", 75, "").unwrap();

    ledger.record_payment("alice", "bob", 40, "loan").unwrap();
    ledger.record_payment("bob", "alice", 40, "reverse").unwrap();

    assert!(ledger.balances_of("alice").is_empty());
    assert!(ledger.balances_of("bob").is_empty());
    // The unrelated carol/dave balance is untouched.
    assert_eq!(ledger.balances_of("dave"), vec![balance("carol", -75)]);
}

/// A negative amount is the reverse payment.
#[test]
fn negative_amount_is_reverse_payment() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("alice", "bob", -10, "correction").unwrap();

    // Same as bob paying alice 10.
    assert_eq!(ledger.balances_of("alice"), vec![balance("bob", -10)]);
    assert_eq!(ledger.events()[0].payer().as_str(), "bob");
    assert_eq!(ledger.events()[0].payee().as_str(), "alice");
    assert_eq!(ledger.events()[0].amount(), 10);
}

/// Zero-amount events are audited but change nothing.
#[test]
fn zero_amount_is_noop() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("alice", "bob", 25, "").unwrap();
    ledger.record_payment("alice", "bob", 0, "ping").unwrap();

    assert_eq!(ledger.balances_of("alice"), vec![balance("bob", 25)]);
    assert_eq!(ledger.payment_count(), 2);
}

/// Self-payments are rejected before anything is recorded.
#[test]
fn self_payment_rejected() {
    let mut ledger = DebtLedger::new();
    let err = ledger.record_payment("alice", "alice", 10, "").unwrap_err();
    assert!(matches!(err, LedgerError::SelfPayment(_)));
    assert_eq!(ledger.payment_count(), 0);
}

/// Unknown participants have no balances, by definition.
#[test]
fn unknown_participant_queries_empty() {
    let ledger = DebtLedger::new();
    assert!(ledger.balances_of("nobody").is_empty());
}

/// The audit trail records normalized events in arrival order.
#[test]
fn audit_trail_preserves_order() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("alice", "bob", 10, "first").unwrap();
    ledger.record_payment("bob", "carol", 20, "second").unwrap();

    let events = ledger.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].description(), "first");
    assert_eq!(events[1].description(), "second");
    assert!(events[0].timestamp() <= events[1].timestamp());
}

/// The balance graph serializes as a stable edge list.
#[test]
fn graph_serializes_to_edge_list() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("alice", "bob", 10, "").unwrap();
    ledger.record_payment("alice", "carol", 5, "").unwrap();

    let json = serde_json::to_value(ledger.graph()).unwrap();
    let edges = json["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0]["debtor"], "bob");
    assert_eq!(edges[0]["creditor"], "alice");
    assert_eq!(edges[0]["amount"], 10);
}

/// Balances serialize with signed amounts.
#[test]
fn balances_serialize() {
    let mut ledger = DebtLedger::new();
    ledger.record_payment("alice", "bob", 10, "").unwrap();

    let json = serde_json::to_string(&ledger.balances_of("bob")).unwrap();
    assert_eq!(json, r#"[{"counterparty":"alice","amount":-10}]"#);
}
