// 📥 Intake - boundary validation before anything reaches the ledger
//
// The ledger trusts its inputs. Everything that can be malformed (amount
// text, missing ids) is rejected here.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::transaction::NewTransaction;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

// ============================================================================
// REQUEST PAYLOAD
// ============================================================================

/// Add-transaction payload as sent by clients. `amount` may arrive as a
/// JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default)]
    pub student_id: Option<String>,

    #[serde(default)]
    pub amount: Value,

    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
}

impl TransactionRequest {
    pub fn validate(self) -> Result<NewTransaction, IntakeError> {
        let student_id = required(self.student_id, "studentId")?;
        let transaction_type = required(self.transaction_type, "type")?;
        let amount = parse_amount(&self.amount)?;

        Ok(NewTransaction {
            student_id,
            amount,
            transaction_type,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, IntakeError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(IntakeError::MissingField(field)),
    }
}

/// Parse a wire amount (number or numeric string) into a Decimal
pub fn parse_amount(value: &Value) -> Result<Decimal, IntakeError> {
    match value {
        Value::Number(n) => parse_amount_str(&n.to_string()),
        Value::String(s) => parse_amount_str(s),
        Value::Null => Err(IntakeError::MissingField("amount")),
        other => Err(IntakeError::InvalidAmount(other.to_string())),
    }
}

/// Parse amount text: plain decimal ("1500.25") or scientific ("1.5e3")
pub fn parse_amount_str(text: &str) -> Result<Decimal, IntakeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::InvalidAmount(text.to_string()));
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| IntakeError::InvalidAmount(text.to_string()))
}

// ============================================================================
// CSV IMPORT
// ============================================================================

#[derive(Debug, Deserialize)]
struct CsvRow {
    student_id: String,
    amount: String,
    #[serde(rename = "type")]
    transaction_type: String,
}

/// Load transaction intents from a CSV file with headers
/// `student_id,amount,type`. Any invalid row fails the whole load.
pub fn load_csv(csv_path: &Path) -> Result<Vec<NewTransaction>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut transactions = Vec::new();

    for (i, result) in rdr.deserialize().enumerate() {
        // Header is line 1
        let line = i + 2;

        let row: CsvRow =
            result.with_context(|| format!("Failed to deserialize CSV row at line {}", line))?;

        let request = TransactionRequest {
            student_id: Some(row.student_id),
            amount: Value::String(row.amount),
            transaction_type: Some(row.transaction_type),
        };

        let new = request
            .validate()
            .with_context(|| format!("Invalid transaction at line {}", line))?;

        transactions.push(new);
    }

    Ok(transactions)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_amount_number_and_string() {
        assert_eq!(parse_amount(&json!(60000)).unwrap(), dec!(60000));
        assert_eq!(parse_amount(&json!(9000.5)).unwrap(), dec!(9000.5));
        assert_eq!(parse_amount(&json!(-500)).unwrap(), dec!(-500));
        assert_eq!(parse_amount(&json!("100.00")).unwrap(), dec!(100.00));
        assert_eq!(parse_amount(&json!("  42 ")).unwrap(), dec!(42));
        assert_eq!(parse_amount(&json!("1.5e3")).unwrap(), dec!(1500));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(
            parse_amount(&json!("abc")),
            Err(IntakeError::InvalidAmount("abc".to_string()))
        );
        assert!(matches!(parse_amount(&json!("")), Err(IntakeError::InvalidAmount(_))));
        assert!(matches!(parse_amount(&json!(true)), Err(IntakeError::InvalidAmount(_))));
        assert!(matches!(parse_amount(&json!([1])), Err(IntakeError::InvalidAmount(_))));
        assert_eq!(parse_amount(&Value::Null), Err(IntakeError::MissingField("amount")));
    }

    #[test]
    fn test_validate_request() {
        let request: TransactionRequest = serde_json::from_value(json!({
            "studentId": "S1",
            "amount": "60000.00",
            "type": "tuition"
        }))
        .unwrap();

        let new = request.validate().unwrap();
        assert_eq!(new, NewTransaction::new("S1", dec!(60000.00), "tuition"));
    }

    #[test]
    fn test_validate_missing_fields() {
        let no_student: TransactionRequest =
            serde_json::from_value(json!({ "amount": 1, "type": "fee" })).unwrap();
        assert_eq!(no_student.validate(), Err(IntakeError::MissingField("studentId")));

        let blank_type: TransactionRequest =
            serde_json::from_value(json!({ "studentId": "S1", "amount": 1, "type": "  " }))
                .unwrap();
        assert_eq!(blank_type.validate(), Err(IntakeError::MissingField("type")));

        let no_amount: TransactionRequest =
            serde_json::from_value(json!({ "studentId": "S1", "type": "fee" })).unwrap();
        assert_eq!(no_amount.validate(), Err(IntakeError::MissingField("amount")));
    }

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "student_id,amount,type").unwrap();
        writeln!(file, "S1,60000.00,tuition").unwrap();
        writeln!(file, "S2,-500,donation").unwrap();
        writeln!(file, "S2, 100.00 ,TUITION").unwrap();
        file.flush().unwrap();

        let rows = load_csv(file.path()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], NewTransaction::new("S1", dec!(60000.00), "tuition"));
        assert_eq!(rows[1].amount, dec!(-500));
        assert_eq!(rows[2].amount, dec!(100.00));
    }

    #[test]
    fn test_load_csv_reports_bad_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "student_id,amount,type").unwrap();
        writeln!(file, "S1,10,fee").unwrap();
        writeln!(file, "S1,ten,fee").unwrap();
        file.flush().unwrap();

        let err = load_csv(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }

    #[test]
    fn test_load_csv_missing_file() {
        let result = load_csv(Path::new("/nonexistent/transactions.csv"));
        assert!(result.is_err());
    }
}
