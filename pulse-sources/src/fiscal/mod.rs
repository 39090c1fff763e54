mod rows;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use pulse_core::{
    AuctionProvider, AuctionRow, FetchRequest, Point, PulseError, SeriesProvider, SourceConnector,
    SourceKind,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::http::{DEFAULT_TIMEOUT, build_client, status_error, transport_error};
use rows::{AuctionRecord, CashBalanceRow, CashFlowRow, DebtTransactionRow};

const SOURCE: &str = "Treasury";
const DEFAULT_BASE_URL: &str =
    "https://api.fiscaldata.treasury.gov/services/api/fiscal_service/v1/accounting/";

/// Auction history requested before the series cutoff, so issues settling
/// inside the window are captured even when auctioned earlier.
pub(crate) const AUCTION_LEAD_DAYS: u64 = 30;

/// Connection settings for [`FiscalConnector`].
#[derive(Debug, Clone)]
pub struct FiscalConfig {
    /// Accounting API root; dataset paths are appended to it.
    pub base_url: String,
    /// Rows per page for the daily statement datasets.
    pub page_size: u32,
    /// Rows per page for the auction dataset.
    pub auction_page_size: u32,
    /// Page budget for the redemption and interest datasets.
    pub ledger_pages: u32,
    /// Page budget for the auction dataset.
    pub auction_pages: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FiscalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 1000,
            auction_page_size: 500,
            ledger_pages: 5,
            auction_pages: 3,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Dataset {
    OperatingCashBalance,
    PublicDebtTransactions,
    OperatingCashFlows,
    Auctions,
}

impl Dataset {
    const fn path(self) -> &'static str {
        match self {
            Self::OperatingCashBalance => "dts/operating_cash_balance",
            Self::PublicDebtTransactions => "dts/public_debt_transactions",
            Self::OperatingCashFlows => "dts/deposits_withdrawals_operating_cash",
            Self::Auctions => "od/auctions_query",
        }
    }

    const fn fields(self) -> &'static str {
        match self {
            Self::OperatingCashBalance => "record_date,account_type,close_today_bal,open_today_bal",
            Self::PublicDebtTransactions => {
                "record_date,transaction_type,transaction_today_amt,security_market,security_type,security_type_desc"
            }
            Self::OperatingCashFlows => {
                "record_date,transaction_type,transaction_catg,transaction_catg_desc,transaction_today_amt"
            }
            Self::Auctions => {
                "security_type,security_term,auction_date,issue_date,offering_amt,total_accepted,maturity_date"
            }
        }
    }

    const fn sort(self) -> &'static str {
        match self {
            Self::Auctions => "-auction_date",
            _ => "-record_date",
        }
    }
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Treasury FiscalData connector.
///
/// Serves `TREASURY_TGA`, `TREASURY_REDEMPTIONS`, `TREASURY_INTEREST` and
/// `TREASURY_AUCTIONS`, and exposes raw auction rows through
/// [`AuctionProvider`].
///
/// Pagination stops on an empty page, on a short page, or when the upstream
/// answers 400 or 404 (its way of signalling a page past the end). Any other
/// non-success status fails the fetch.
pub struct FiscalConnector {
    client: reqwest::Client,
    cfg: FiscalConfig,
}

impl FiscalConnector {
    /// Stable connector name.
    pub const NAME: &'static str = "pulse-fiscal";

    /// Build with an explicit configuration.
    ///
    /// # Errors
    /// Returns `PulseError::Config` if the HTTP client cannot be constructed.
    pub fn new(cfg: FiscalConfig) -> Result<Self, PulseError> {
        Ok(Self {
            client: build_client(SOURCE, cfg.timeout)?,
            cfg,
        })
    }

    /// Build against the public endpoint.
    ///
    /// # Errors
    /// Returns `PulseError::Config` if the HTTP client cannot be constructed.
    pub fn new_default() -> Result<Self, PulseError> {
        Self::new(FiscalConfig::default())
    }

    fn url(&self, dataset: Dataset) -> String {
        let base = self.cfg.base_url.trim_end_matches('/');
        format!("{base}/{}", dataset.path())
    }

    /// Page budget for the TGA: at least three pages, one more per hundred days.
    const fn tga_pages(days: u32) -> u32 {
        let pages = days / 100 + 1;
        if pages < 3 { 3 } else { pages }
    }

    async fn paginate<T: DeserializeOwned>(
        &self,
        dataset: Dataset,
        pages: u32,
        page_size: u32,
        filter: Option<&str>,
    ) -> Result<Vec<T>, PulseError> {
        let url = self.url(dataset);
        let size = page_size.to_string();
        let mut combined = Vec::new();
        for number in 1..=pages {
            let number = number.to_string();
            let mut query = vec![
                ("sort", dataset.sort()),
                ("page[number]", number.as_str()),
                ("page[size]", size.as_str()),
                ("format", "json"),
                ("fields", dataset.fields()),
            ];
            if let Some(f) = filter {
                query.push(("filter", f));
            }
            let resp = self
                .client
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|e| transport_error(SOURCE, &e))?;
            let status = resp.status();
            if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
                #[cfg(feature = "tracing")]
                tracing::debug!(dataset = dataset.path(), page = %number, status = status.as_u16(), "pagination ended by status");
                break;
            }
            if !status.is_success() {
                return Err(status_error(SOURCE, status));
            }
            let body = resp.bytes().await.map_err(|e| transport_error(SOURCE, &e))?;
            let page: Page<T> = serde_json::from_slice(&body).map_err(|e| {
                PulseError::Data(format!("{} page {number}: {e}", dataset.path()))
            })?;
            let n = page.data.len();
            combined.extend(page.data);
            if n == 0 || n < page_size as usize {
                break;
            }
        }
        Ok(combined)
    }

    async fn auction_rows_since(&self, since: NaiveDate) -> Result<Vec<AuctionRow>, PulseError> {
        let filter = format!("auction_date:gte:{}", since.format("%Y-%m-%d"));
        let records: Vec<AuctionRecord> = self
            .paginate(
                Dataset::Auctions,
                self.cfg.auction_pages,
                self.cfg.auction_page_size,
                Some(&filter),
            )
            .await?;
        Ok(rows::auction_rows(&records))
    }
}

#[async_trait]
impl SeriesProvider for FiscalConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pulse_sources::fiscal::observations", skip(self), fields(series_id = %req.series_id, kind = %req.kind), err)
    )]
    async fn observations(&self, req: &FetchRequest) -> Result<Vec<Point>, PulseError> {
        let size = self.cfg.page_size;
        let scale = req.raw_scale;
        match req.kind {
            SourceKind::TreasuryTga => {
                let rows: Vec<CashBalanceRow> = self
                    .paginate(Dataset::OperatingCashBalance, Self::tga_pages(req.days), size, None)
                    .await?;
                Ok(rows::tga_points(&rows, scale))
            }
            SourceKind::TreasuryRedemptions => {
                let rows: Vec<DebtTransactionRow> = self
                    .paginate(Dataset::PublicDebtTransactions, self.cfg.ledger_pages, size, None)
                    .await?;
                Ok(rows::redemption_points(&rows, scale))
            }
            SourceKind::TreasuryInterest => {
                let rows: Vec<CashFlowRow> = self
                    .paginate(Dataset::OperatingCashFlows, self.cfg.ledger_pages, size, None)
                    .await?;
                Ok(rows::interest_points(&rows, scale))
            }
            SourceKind::TreasuryAuctions => {
                let cutoff = req.cutoff();
                let since = cutoff
                    .checked_sub_days(Days::new(AUCTION_LEAD_DAYS))
                    .unwrap_or(cutoff);
                let rows = self.auction_rows_since(since).await?;
                Ok(rows::issuance_points(&rows, scale))
            }
            other => Err(PulseError::InvalidArg(format!(
                "{} does not serve source kind {other}",
                Self::NAME
            ))),
        }
    }
}

#[async_trait]
impl AuctionProvider for FiscalConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pulse_sources::fiscal::auctions", skip(self), err)
    )]
    async fn auctions(&self, since: NaiveDate) -> Result<Vec<AuctionRow>, PulseError> {
        self.auction_rows_since(since).await
    }
}

impl SourceConnector for FiscalConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn serves(&self, kind: SourceKind) -> bool {
        matches!(
            kind,
            SourceKind::TreasuryTga
                | SourceKind::TreasuryRedemptions
                | SourceKind::TreasuryInterest
                | SourceKind::TreasuryAuctions
        )
    }

    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        Some(self as &dyn SeriesProvider)
    }

    fn as_auction_provider(&self) -> Option<&dyn AuctionProvider> {
        Some(self as &dyn AuctionProvider)
    }
}
