use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::read_to_string;
use std::str::FromStr;

const EMBEDDED_DATA: &str = include_str!("../data/market_data.json");

/// The time window a snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn all() -> &'static [Period] {
        &[Period::Daily, Period::Weekly, Period::Monthly]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    /// Title shown on the period tab
    pub fn title(self) -> &'static str {
        match self {
            Period::Daily => "일간",
            Period::Weekly => "주간",
            Period::Monthly => "월간",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            _ => Err(format!(
                "Unknown period: '{s}' (expected daily, weekly or monthly)"
            )),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the six instruments every snapshot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    Kospi,
    Kosdaq,
    UsdKrw,
    Gold,
    Btc,
    Bond,
}

impl IndexKey {
    pub fn all() -> &'static [IndexKey] {
        &[
            IndexKey::Kospi,
            IndexKey::Kosdaq,
            IndexKey::UsdKrw,
            IndexKey::Gold,
            IndexKey::Btc,
            IndexKey::Bond,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IndexKey::Kospi => "kospi",
            IndexKey::Kosdaq => "kosdaq",
            IndexKey::UsdKrw => "usdkrw",
            IndexKey::Gold => "gold",
            IndexKey::Btc => "btc",
            IndexKey::Bond => "bond",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            IndexKey::Kospi => "코스피",
            IndexKey::Kosdaq => "코스닥",
            IndexKey::UsdKrw => "원/달러",
            IndexKey::Gold => "금",
            IndexKey::Btc => "비트코인",
            IndexKey::Bond => "국고채 3년",
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price direction as recorded in the fixture. It is never derived from the
/// sign of the change figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// News grouping. Adding a category here requires a matching entry in the
/// style mapping of every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Stock,
    Forex,
    Economy,
    Crypto,
    Bond,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexQuote {
    pub value: String,
    pub change: String,
    /// Empty when a percent figure makes no sense, e.g. for bond yields.
    #[serde(default)]
    pub percent: String,
    pub direction: Direction,
}

/// The six index quotes of a record. Every field is required, so a record
/// missing one of them never deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Indices {
    pub kospi: IndexQuote,
    pub kosdaq: IndexQuote,
    pub usdkrw: IndexQuote,
    pub gold: IndexQuote,
    pub btc: IndexQuote,
    pub bond: IndexQuote,
}

impl Indices {
    pub fn get(&self, key: IndexKey) -> &IndexQuote {
        match key {
            IndexKey::Kospi => &self.kospi,
            IndexKey::Kosdaq => &self.kosdaq,
            IndexKey::UsdKrw => &self.usdkrw,
            IndexKey::Gold => &self.gold,
            IndexKey::Btc => &self.btc,
            IndexKey::Bond => &self.bond,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub icon: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorEntry {
    pub name: String,
    pub change: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub tag: String,
    pub tag_category: TagCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub date_label: String,
    pub indices: Indices,
    pub summary_items: Vec<SummaryItem>,
    pub sectors: Vec<SectorEntry>,
    pub news_items: Vec<NewsItem>,
}

/// Immutable snapshot data keyed by period.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    records: BTreeMap<Period, PeriodRecord>,
}

impl MarketData {
    #[cfg(test)]
    pub fn new(records: BTreeMap<Period, PeriodRecord>) -> Self {
        MarketData { records }
    }

    /// The sample data compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_DATA)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let records = serde_json::from_str::<BTreeMap<Period, PeriodRecord>>(data)?;
        Ok(MarketData { records })
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let data = read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.to_string(),
            source,
        })?;
        let market_data = Self::from_json(&data)?;

        let present: Vec<Period> = market_data.periods().collect();
        for period in Period::all() {
            if !present.contains(period) {
                log::warn!("Market data file '{path}' has no '{period}' record");
            }
        }
        Ok(market_data)
    }

    pub fn record(&self, period: Period) -> Result<&PeriodRecord> {
        self.records
            .get(&period)
            .ok_or(DashboardError::Lookup(period))
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.records.keys().copied()
    }
}
