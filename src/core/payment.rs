use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw payment event: `payer` handed `amount` to `payee`.
///
/// Events are immutable once created and form the append-only audit
/// trail. The settlement engine consumes an event exactly once to
/// rewrite the balance graph and never reads the trail back.
///
/// # Examples
///
/// ```
/// use netting_ledger::core::participant::ParticipantId;
/// use netting_ledger::core::payment::PaymentEvent;
///
/// let event = PaymentEvent::new(
///     ParticipantId::new("alice"),
///     ParticipantId::new("bob"),
///     25,
///     "groceries",
/// );
/// assert_eq!(event.amount(), 25);
/// assert_eq!(event.payer().as_str(), "alice");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Unique identifier for this event.
    id: Uuid,
    /// The participant who handed over the money.
    payer: ParticipantId,
    /// The participant who received it.
    payee: ParticipantId,
    /// Whole-unit amount. Never negative once normalized.
    amount: i64,
    /// Free-form memo.
    description: String,
    /// When this event was recorded.
    timestamp: DateTime<Utc>,
}

impl PaymentEvent {
    /// Create a new payment event.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative. Use [`PaymentEvent::normalized`]
    /// for raw caller input that may carry a sign.
    pub fn new(
        payer: ParticipantId,
        payee: ParticipantId,
        amount: i64,
        description: impl Into<String>,
    ) -> Self {
        assert!(amount >= 0, "payment amount must not be negative, got {}", amount);
        Self {
            id: Uuid::new_v4(),
            payer,
            payee,
            amount,
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an event from raw signed input.
    ///
    /// A negative amount is definitionally the reverse event, so the
    /// payer and payee are swapped and the amount negated. This is the
    /// single place sign normalization happens; everything downstream
    /// sees a non-negative amount.
    ///
    /// # Examples
    ///
    /// ```
    /// use netting_ledger::core::participant::ParticipantId;
    /// use netting_ledger::core::payment::PaymentEvent;
    ///
    /// let event = PaymentEvent::normalized(
    ///     ParticipantId::new("alice"),
    ///     ParticipantId::new("bob"),
    ///     -40,
    ///     "refund",
    /// );
    /// assert_eq!(event.payer().as_str(), "bob");
    /// assert_eq!(event.payee().as_str(), "alice");
    /// assert_eq!(event.amount(), 40);
    /// ```
    pub fn normalized(
        payer: ParticipantId,
        payee: ParticipantId,
        amount: i64,
        description: impl Into<String>,
    ) -> Self {
        if amount < 0 {
            Self::new(payee, payer, -amount, description)
        } else {
            Self::new(payer, payee, amount, description)
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payer(&self) -> &ParticipantId {
        &self.payer
    }

    pub fn payee(&self) -> &ParticipantId {
        &self.payee
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Write-only sink for recorded payment events.
///
/// The audit trail is an external collaborator: the ledger appends every
/// accepted event, and nothing in the settlement path ever queries it.
pub trait AuditLog {
    fn append(&mut self, event: PaymentEvent);
}

/// In-memory audit log backed by a `Vec`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryAuditLog {
    events: Vec<PaymentEvent>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> &[PaymentEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&mut self, event: PaymentEvent) {
        self.events.push(event);
    }
}
