// 📒 Ledger Store - append-only, concurrent-safe transaction collection
//
// Records are fully built (id, timestamp, flag) before the write lock is
// taken, so readers only ever see complete records. Nothing is removed or
// edited after insertion.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::classifier;
use crate::transaction::{NewTransaction, Transaction};

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Default)]
struct LedgerState {
    /// ALL records in insertion order (append-only, never delete)
    records: Vec<Transaction>,

    /// id -> position in `records`
    index: HashMap<Uuid, usize>,
}

// ============================================================================
// LEDGER
// ============================================================================

/// Handle to an in-memory ledger. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,
}

impl Ledger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    // Neither guard can observe a half-applied write: the only mutation is
    // a push plus an index insert that cannot panic in between.
    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Classify and store a new transaction, returning a copy of the record
    pub fn insert(
        &self,
        student_id: impl Into<String>,
        amount: Decimal,
        transaction_type: impl Into<String>,
    ) -> Transaction {
        let tx = Transaction::create(student_id.into(), amount, transaction_type.into());

        {
            let mut state = self.write();
            let position = state.records.len();
            state.index.insert(tx.id(), position);
            state.records.push(tx.clone());
        }

        debug!(
            id = %tx.id(),
            student_id = tx.student_id(),
            amount = %tx.amount(),
            transaction_type = tx.transaction_type(),
            flagged = tx.is_flagged(),
            "transaction recorded"
        );

        if tx.is_flagged() {
            let rules: Vec<&str> = classifier::matched_rules(tx.transaction_type(), tx.amount())
                .iter()
                .map(|rule| rule.as_str())
                .collect();
            warn!(
                id = %tx.id(),
                student_id = tx.student_id(),
                amount = %tx.amount(),
                rules = ?rules,
                "anomalous transaction flagged"
            );
        }

        tx
    }

    /// Insert a transaction already validated by the intake layer
    pub fn record(&self, new: NewTransaction) -> Transaction {
        self.insert(new.student_id, new.amount, new.transaction_type)
    }

    /// Snapshot of every record, in insertion order
    pub fn list_all(&self) -> Vec<Transaction> {
        self.read().records.clone()
    }

    /// Records whose student id matches exactly (case-sensitive)
    pub fn list_by_student(&self, student_id: &str) -> Vec<Transaction> {
        let state = self.read();
        state
            .records
            .iter()
            .filter(|tx| tx.student_id() == student_id)
            .cloned()
            .collect()
    }

    /// Look up one record by its identifier
    pub fn get(&self, id: &Uuid) -> Option<Transaction> {
        let state = self.read();
        state
            .index
            .get(id)
            .and_then(|&position| state.records.get(position))
            .cloned()
    }

    /// Flagged records only, in insertion order
    pub fn list_flagged(&self) -> Vec<Transaction> {
        let state = self.read();
        state
            .records
            .iter()
            .filter(|tx| tx.is_flagged())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Totals over one consistent snapshot
    pub fn stats(&self) -> LedgerStats {
        let state = self.read();

        let mut by_type: BTreeMap<String, TypeStat> = BTreeMap::new();
        let mut flagged = 0;

        for tx in &state.records {
            if tx.is_flagged() {
                flagged += 1;
            }

            let label = classifier::fold_case(tx.transaction_type());
            let entry = by_type
                .entry(label.clone())
                .or_insert_with(|| TypeStat {
                    transaction_type: label,
                    count: 0,
                    flagged: 0,
                    total_amount: Some(Decimal::ZERO),
                });
            entry.count += 1;
            if tx.is_flagged() {
                entry.flagged += 1;
            }
            entry.total_amount = entry
                .total_amount
                .and_then(|total| total.checked_add(tx.amount()));
        }

        LedgerStats {
            total_transactions: state.records.len(),
            flagged_transactions: flagged,
            by_type: by_type.into_values().collect(),
        }
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStats {
    pub total_transactions: usize,
    pub flagged_transactions: usize,
    /// Sorted by case-folded type label
    pub by_type: Vec<TypeStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeStat {
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub count: usize,
    pub flagged: usize,
    /// None once the sum no longer fits in a Decimal
    pub total_amount: Option<Decimal>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_example_scenarios() {
        let ledger = Ledger::new();

        assert!(ledger.insert("S1", dec!(60000.00), "tuition").is_flagged());
        assert!(!ledger.insert("S1", dec!(9000.00), "grant").is_flagged());
        assert!(ledger.insert("S2", dec!(-500.00), "donation").is_flagged());
        assert!(!ledger.insert("S2", dec!(100.00), "TUITION").is_flagged());

        assert!(ledger.list_by_student("S3").is_empty());
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = Ledger::new();

        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert!(ledger.list_all().is_empty());
        assert!(ledger.list_flagged().is_empty());
    }

    #[test]
    fn test_no_deduplication() {
        let ledger = Ledger::new();

        let a = ledger.insert("S1", dec!(250), "fee");
        let b = ledger.insert("S1", dec!(250), "fee");

        assert_ne!(a.id(), b.id());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_list_all_returns_inserted_records_in_order() {
        let ledger = Ledger::new();

        let inserted: Vec<Transaction> = (0..10)
            .map(|i| ledger.insert(format!("S{}", i % 3), Decimal::from(i * 100), "fee"))
            .collect();

        assert_eq!(ledger.list_all(), inserted);
    }

    #[test]
    fn test_list_by_student_is_exact_match() {
        let ledger = Ledger::new();

        let s1 = ledger.insert("S1", dec!(10), "fee");
        ledger.insert("s1", dec!(20), "fee");
        ledger.insert("S1 ", dec!(30), "fee");
        ledger.insert("S10", dec!(40), "fee");
        let s1_again = ledger.insert("S1", dec!(50), "grant");

        assert_eq!(ledger.list_by_student("S1"), vec![s1, s1_again]);
        assert_eq!(ledger.list_by_student("s1").len(), 1);
        assert!(ledger.list_by_student("").is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let ledger = Ledger::new();

        let tx = ledger.insert("S1", dec!(75), "books");
        ledger.insert("S2", dec!(80), "books");

        assert_eq!(ledger.get(&tx.id()), Some(tx));
        assert_eq!(ledger.get(&Uuid::new_v4()), None);
    }

    #[test]
    fn test_list_flagged() {
        let ledger = Ledger::new();

        ledger.insert("S1", dec!(100), "tuition");
        let big = ledger.insert("S1", dec!(50001), "Tuition");
        ledger.insert("S2", dec!(5000), "grant");
        let refund = ledger.insert("S2", dec!(-1), "refund");

        assert_eq!(ledger.list_flagged(), vec![big, refund]);
    }

    #[test]
    fn test_returned_copy_cannot_change_ledger() {
        let ledger = Ledger::new();

        let tx = ledger.insert("S1", dec!(100), "fee");
        drop(tx);

        let stored = ledger.list_all();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].is_flagged());
        assert_eq!(stored[0].amount(), dec!(100));
    }

    #[test]
    fn test_clones_share_records() {
        let ledger = Ledger::new();
        let handle = ledger.clone();

        let tx = handle.insert("S9", dec!(1), "fee");

        assert_eq!(ledger.get(&tx.id()), Some(tx));
    }

    #[test]
    fn test_record_from_new_transaction() {
        let ledger = Ledger::new();

        let tx = ledger.record(NewTransaction::new("S4", dec!(12000), "Grant"));

        assert!(tx.is_flagged());
        assert_eq!(tx.student_id(), "S4");
        assert_eq!(tx.transaction_type(), "Grant");
    }

    #[test]
    fn test_stats() {
        let ledger = Ledger::new();

        ledger.insert("S1", dec!(60000), "tuition");
        ledger.insert("S1", dec!(1000), "Tuition");
        ledger.insert("S2", dec!(500), "grant");
        ledger.insert("S3", dec!(-20), "refund");

        let stats = ledger.stats();

        assert_eq!(stats.total_transactions, 4);
        assert_eq!(stats.flagged_transactions, 2);
        assert_eq!(stats.by_type.len(), 3);

        let tuition = &stats.by_type[2];
        assert_eq!(tuition.transaction_type, "tuition");
        assert_eq!(tuition.count, 2);
        assert_eq!(tuition.flagged, 1);
        assert_eq!(tuition.total_amount, Some(dec!(61000)));

        assert_eq!(stats.by_type[0].transaction_type, "grant");
        assert_eq!(stats.by_type[1].transaction_type, "refund");
        assert_eq!(stats.by_type[1].flagged, 1);
    }

    #[test]
    fn test_stats_total_overflow_is_none() {
        let ledger = Ledger::new();
        let huge = crate::intake::parse_amount_str("7e28").unwrap();

        ledger.insert("S1", huge, "fee");
        ledger.insert("S1", huge, "fee");
        ledger.insert("S2", dec!(5), "books");

        let stats = ledger.stats();

        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.by_type[0].transaction_type, "books");
        assert_eq!(stats.by_type[0].total_amount, Some(dec!(5)));
        assert_eq!(stats.by_type[1].transaction_type, "fee");
        assert_eq!(stats.by_type[1].count, 2);
        assert_eq!(stats.by_type[1].total_amount, None);
    }

    #[test]
    fn test_stats_groups_case_variants() {
        let ledger = Ledger::new();

        ledger.insert("S1", dec!(60000), "TU\u{0131}TION");
        ledger.insert("S1", dec!(10), "tuition");

        let stats = ledger.stats();

        assert_eq!(stats.by_type.len(), 1);
        assert_eq!(stats.by_type[0].transaction_type, "tuition");
        assert_eq!(stats.by_type[0].count, 2);
        assert_eq!(stats.by_type[0].flagged, 1);
    }
}
