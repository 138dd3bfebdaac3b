use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::{PocketbookError, Result};
use crate::importer::{parse_amount, StatementRow};
use crate::models::{Account, Alias};
use crate::store;

#[derive(Debug)]
pub struct CommitResult {
    pub committed: usize,
    pub mirrored: usize,
    pub skipped: usize,
}

struct ReadyTransaction {
    date: NaiveDate,
    alias: Alias,
    amount: Decimal,
    account: Account,
}

/// Persist resolved statement rows as transactions.
///
/// Validation runs over every row before the first insert, so a malformed
/// date or amount, or a missing alias/account, rejects the whole batch
/// without a partial commit. Inserts then run in one SQLite transaction.
///
/// Duplicate detection is opt-in: with `dedup` set, rows whose
/// (date, alias, amount, account) already exist are skipped and counted.
/// Without it, re-committing identical rows creates duplicates.
pub fn commit(
    conn: &mut Connection,
    rows: &[StatementRow],
    date_format: &str,
    dedup: bool,
) -> Result<CommitResult> {
    let mut ready = Vec::with_capacity(rows.len());
    for row in rows {
        let date = NaiveDate::parse_from_str(row.date_raw.trim(), date_format)
            .map_err(|_| PocketbookError::BadDate(row.date_raw.clone(), date_format.to_string()))?;
        let amount = parse_amount(&row.amount_raw)?;
        let alias = store::alias_by_name(conn, &row.payee)?;
        let account = store::account_by_name(conn, &row.account_name)?;
        ready.push(ReadyTransaction {
            date,
            alias,
            amount,
            account,
        });
    }

    let tx = conn.transaction()?;
    let mut committed = 0usize;
    let mut mirrored = 0usize;
    let mut skipped = 0usize;
    for r in &ready {
        if dedup && store::transaction_exists(&tx, r.date, r.alias.id, r.amount, r.account.id)? {
            skipped += 1;
            continue;
        }
        store::insert_transaction(&tx, r.date, r.alias.id, r.amount, r.account.id)?;
        committed += 1;

        if let Some(entry) = store::double_entry_for_alias(&tx, r.alias.id)? {
            let mirror_account = store::account_by_id(&tx, entry.account_b)?;
            // Same-type pairs must net to zero across the two accounts;
            // cross-type pairs keep the sign, the liability convention
            // already offsets.
            let amount = if mirror_account.account_type == r.account.account_type {
                -r.amount
            } else {
                r.amount
            };
            store::insert_transaction(&tx, r.date, r.alias.id, amount, mirror_account.id)?;
            mirrored += 1;
        }
    }
    tx.commit()?;

    Ok(CommitResult {
        committed,
        mirrored,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::importer::RowStatus;
    use crate::models::AccountType;
    use crate::store::{insert_account, insert_alias, insert_double_entry};

    const DATE_FORMAT: &str = "%d/%m/%Y";

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn row(account: &str, date: &str, payee: &str, amount: &str) -> StatementRow {
        StatementRow {
            account_name: account.to_string(),
            date_raw: date.to_string(),
            payee: payee.to_string(),
            status: RowStatus::Matched,
            category: String::new(),
            subcategory: String::new(),
            amount_raw: amount.to_string(),
        }
    }

    fn all_txns(conn: &Connection) -> Vec<(String, i64, i64)> {
        conn.prepare("SELECT date, amount_cents, account_id FROM transactions ORDER BY id")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_commit_persists_transactions() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![row("Natwest", "03/11/2021", "Chipotle", "-13.00")];
        let result = commit(&mut conn, &rows, DATE_FORMAT, false).unwrap();
        assert_eq!(result.committed, 1);
        assert_eq!(result.mirrored, 0);
        let txns = all_txns(&conn);
        assert_eq!(txns, vec![("2021-11-03".to_string(), -1300, 1)]);
    }

    #[test]
    fn test_bad_date_rejects_whole_batch() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![
            row("Natwest", "03/11/2021", "Chipotle", "-13.00"),
            row("Natwest", "not-a-date", "Chipotle", "-7.00"),
        ];
        let err = commit(&mut conn, &rows, DATE_FORMAT, false).unwrap_err();
        assert!(matches!(err, PocketbookError::BadDate(_, _)));
        assert!(all_txns(&conn).is_empty(), "no partial commit");
    }

    #[test]
    fn test_bad_amount_rejects_whole_batch() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![row("Natwest", "03/11/2021", "Chipotle", "thirteen")];
        let err = commit(&mut conn, &rows, DATE_FORMAT, false).unwrap_err();
        assert!(matches!(err, PocketbookError::BadAmount(_)));
        assert!(all_txns(&conn).is_empty());
    }

    #[test]
    fn test_overflowing_amount_rejects_whole_batch() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![
            row("Natwest", "03/11/2021", "Chipotle", "-13.00"),
            // parses as a Decimal but cannot be stored as i64 cents
            row("Natwest", "04/11/2021", "Chipotle", "99999999999999999999"),
        ];
        let err = commit(&mut conn, &rows, DATE_FORMAT, false).unwrap_err();
        assert!(matches!(err, PocketbookError::BadAmount(_)));
        assert!(all_txns(&conn).is_empty(), "nothing persisted, zero-cent row included");
    }

    #[test]
    fn test_unknown_alias_is_reference_error() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        let rows = vec![row("Natwest", "03/11/2021", "UNKNOWN VENDOR", "-13.00")];
        let err = commit(&mut conn, &rows, DATE_FORMAT, false).unwrap_err();
        assert!(matches!(err, PocketbookError::NotFound("alias", _)));
        assert!(all_txns(&conn).is_empty());
    }

    #[test]
    fn test_unknown_account_is_reference_error() {
        let (_dir, mut conn) = test_db();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![row("Nowhere", "03/11/2021", "Chipotle", "-13.00")];
        let err = commit(&mut conn, &rows, DATE_FORMAT, false).unwrap_err();
        assert!(matches!(err, PocketbookError::NotFound("account", _)));
    }

    #[test]
    fn test_mirror_cross_type_keeps_sign() {
        let (_dir, mut conn) = test_db();
        let checking = insert_account(&conn, "Checking", AccountType::Asset, dec("500")).unwrap();
        let card = insert_account(&conn, "CreditCard", AccountType::Liability, dec("0")).unwrap();
        let alias = insert_alias(&conn, "CARD PAYMENT", None, None).unwrap();
        insert_double_entry(&conn, alias, checking, card).unwrap();

        let rows = vec![row("Checking", "08/11/2021", "CARD PAYMENT", "-50.00")];
        let result = commit(&mut conn, &rows, DATE_FORMAT, false).unwrap();
        assert_eq!(result.committed, 1);
        assert_eq!(result.mirrored, 1);
        let txns = all_txns(&conn);
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0], ("2021-11-08".to_string(), -5000, checking));
        assert_eq!(txns[1], ("2021-11-08".to_string(), -5000, card));
    }

    #[test]
    fn test_mirror_same_type_negates() {
        let (_dir, mut conn) = test_db();
        let current = insert_account(&conn, "Current", AccountType::Asset, dec("500")).unwrap();
        let savings = insert_account(&conn, "Savings", AccountType::Asset, dec("0")).unwrap();
        let alias = insert_alias(&conn, "SAVINGS TRANSFER", None, None).unwrap();
        insert_double_entry(&conn, alias, current, savings).unwrap();

        let rows = vec![row("Current", "08/11/2021", "SAVINGS TRANSFER", "-50.00")];
        commit(&mut conn, &rows, DATE_FORMAT, false).unwrap();
        let txns = all_txns(&conn);
        assert_eq!(txns[0], ("2021-11-08".to_string(), -5000, current));
        assert_eq!(txns[1], ("2021-11-08".to_string(), 5000, savings));
    }

    #[test]
    fn test_alias_without_double_entry_has_no_mirror() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![row("Natwest", "03/11/2021", "Chipotle", "-13.00")];
        let result = commit(&mut conn, &rows, DATE_FORMAT, false).unwrap();
        assert_eq!(result.mirrored, 0);
        assert_eq!(all_txns(&conn).len(), 1);
    }

    #[test]
    fn test_recommit_without_dedup_duplicates() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![row("Natwest", "03/11/2021", "Chipotle", "-13.00")];
        commit(&mut conn, &rows, DATE_FORMAT, false).unwrap();
        commit(&mut conn, &rows, DATE_FORMAT, false).unwrap();
        assert_eq!(all_txns(&conn).len(), 2);
    }

    #[test]
    fn test_recommit_with_dedup_skips() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![row("Natwest", "03/11/2021", "Chipotle", "-13.00")];
        commit(&mut conn, &rows, DATE_FORMAT, false).unwrap();
        let result = commit(&mut conn, &rows, DATE_FORMAT, true).unwrap();
        assert_eq!(result.committed, 0);
        assert_eq!(result.skipped, 1);
        assert_eq!(all_txns(&conn).len(), 1);
    }

    #[test]
    fn test_alternate_date_format() {
        let (_dir, mut conn) = test_db();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        insert_alias(&conn, "Chipotle", None, None).unwrap();
        let rows = vec![row("Natwest", "2021-11-03", "Chipotle", "-13.00")];
        let result = commit(&mut conn, &rows, "%Y-%m-%d", false).unwrap();
        assert_eq!(result.committed, 1);
        assert_eq!(all_txns(&conn)[0].0, "2021-11-03");
    }
}
