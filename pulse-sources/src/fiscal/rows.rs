//! Row shapes of the FiscalData datasets and the tolerant classifiers that turn
//! them into points. Upstream vocabulary drifts between vintages, so matching is
//! case-insensitive and substring based, and numeric fields accept thousands
//! separators and a literal `"null"`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use pulse_core::{AuctionRow, Point};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept strings, numbers and booleans as text; anything else is absent.
fn lenient_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn text(v: Option<&String>) -> &str {
    v.map_or("", |s| s.trim())
}

/// Parse a ledger amount. Empty and `"null"` are absent; commas are ignored.
pub(crate) fn numeric(v: Option<&String>) -> Option<f64> {
    let s = text(v);
    if s.is_empty() || s.eq_ignore_ascii_case("null") {
        return None;
    }
    s.replace(',', "").parse().ok()
}

fn date(v: Option<&String>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text(v), "%Y-%m-%d").ok()
}

/// `dts/operating_cash_balance`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CashBalanceRow {
    #[serde(default, deserialize_with = "lenient_text")]
    pub record_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub open_today_bal: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub close_today_bal: Option<String>,
}

/// `dts/public_debt_transactions`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DebtTransactionRow {
    #[serde(default, deserialize_with = "lenient_text")]
    pub record_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_today_amt: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub security_market: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub security_type: Option<String>,
}

/// `dts/deposits_withdrawals_operating_cash`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CashFlowRow {
    #[serde(default, deserialize_with = "lenient_text")]
    pub record_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_catg: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_catg_desc: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_today_amt: Option<String>,
}

/// `od/auctions_query`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AuctionRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub security_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub security_term: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub auction_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub offering_amt: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub total_accepted: Option<String>,
}

fn is_tga_account(account_type: &str) -> bool {
    let a = account_type.to_lowercase();
    if a.contains("opening balance") {
        return false;
    }
    a.contains("closing balance")
        || a.contains("federal reserve account")
        || a == "treasury general account"
}

/// Daily TGA balance. The first matching row with a usable value wins per date.
pub(crate) fn tga_points(rows: &[CashBalanceRow], scale: f64) -> Vec<Point> {
    let mut out: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in rows {
        if !is_tga_account(text(r.account_type.as_ref())) {
            continue;
        }
        let Some(d) = date(r.record_date.as_ref()) else {
            continue;
        };
        if out.contains_key(&d) {
            continue;
        }
        let value = numeric(r.open_today_bal.as_ref()).or_else(|| numeric(r.close_today_bal.as_ref()));
        if let Some(v) = value {
            out.insert(d, v * scale);
        }
    }
    out.into_iter().map(|(date, value)| Point { date, value }).collect()
}

fn is_public_redemption(r: &DebtTransactionRow) -> bool {
    if !text(r.transaction_type.as_ref()).eq_ignore_ascii_case("redemptions") {
        return false;
    }
    let market = text(r.security_market.as_ref()).to_lowercase();
    let stype = text(r.security_type.as_ref()).to_lowercase();
    if market.is_empty() && stype.is_empty() {
        return true;
    }
    market == "marketable" || (market == "nonmarketable" && stype.contains("savings"))
}

/// Daily public-facing redemptions, summed per date.
pub(crate) fn redemption_points(rows: &[DebtTransactionRow], scale: f64) -> Vec<Point> {
    let mut out: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in rows.iter().filter(|r| is_public_redemption(r)) {
        let (Some(d), Some(v)) = (
            date(r.record_date.as_ref()),
            numeric(r.transaction_today_amt.as_ref()),
        ) else {
            continue;
        };
        *out.entry(d).or_insert(0.0) += v * scale;
    }
    out.into_iter().map(|(date, value)| Point { date, value }).collect()
}

/// Daily interest outlays on Treasury securities.
///
/// One value per date: the first matching line, replaced by a later line whose
/// description is marked "(Gross)".
pub(crate) fn interest_points(rows: &[CashFlowRow], scale: f64) -> Vec<Point> {
    let mut out: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in rows {
        if !text(r.transaction_type.as_ref()).eq_ignore_ascii_case("withdrawals") {
            continue;
        }
        let mut desc = text(r.transaction_catg_desc.as_ref());
        if desc.eq_ignore_ascii_case("null") {
            desc = "";
        }
        let label = if desc.is_empty() {
            text(r.transaction_catg.as_ref())
        } else {
            desc
        };
        if !label.to_lowercase().starts_with("interest on treasury") {
            continue;
        }
        let (Some(d), Some(v)) = (
            date(r.record_date.as_ref()),
            numeric(r.transaction_today_amt.as_ref()),
        ) else {
            continue;
        };
        if !out.contains_key(&d) || desc.contains("(Gross)") {
            out.insert(d, v * scale);
        }
    }
    out.into_iter().map(|(date, value)| Point { date, value }).collect()
}

/// Normalize auction records. Rows carrying neither amount are dropped.
pub(crate) fn auction_rows(records: &[AuctionRecord]) -> Vec<AuctionRow> {
    records
        .iter()
        .filter_map(|r| {
            let offering_amount = numeric(r.offering_amt.as_ref());
            let accepted_amount = numeric(r.total_accepted.as_ref());
            if offering_amount.is_none() && accepted_amount.is_none() {
                return None;
            }
            let security_type = text(r.security_type.as_ref()).to_string();
            let lowered = security_type.to_lowercase();
            Some(AuctionRow {
                auction_date: date(r.auction_date.as_ref()),
                issue_date: date(r.issue_date.as_ref()),
                security_term: text(r.security_term.as_ref()).to_string(),
                is_bill: lowered.contains("bill"),
                is_coupon: ["note", "bond", "tips", "frn"]
                    .iter()
                    .any(|k| lowered.contains(k)),
                security_type,
                offering_amount,
                accepted_amount,
            })
        })
        .collect()
}

/// Gross issuance per issue date.
pub(crate) fn issuance_points(rows: &[AuctionRow], scale: f64) -> Vec<Point> {
    let mut out: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in rows {
        let Some(d) = r.issue_date else { continue };
        let amount = r.amount();
        if amount > 0.0 {
            *out.entry(d).or_insert(0.0) += amount * scale;
        }
    }
    out.into_iter().map(|(date, value)| Point { date, value }).collect()
}
