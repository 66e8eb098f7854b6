//! Market data seam used by the ticker tools.
//!
//! The tools only know the [`MarketData`] trait. [`MockMarketData`] produces
//! deterministic, plausible figures derived from a hash of the ticker so the
//! tools can be exercised without a market data vendor.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use finsight_core::error::ToolError;
use serde::{Deserialize, Serialize};

/// Latest quote for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub price: f64,
    pub currency: String,
    pub as_of: NaiveDate,
}

/// End-of-day closing price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// One analyst recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub firm: String,
    pub rating: String,
    pub target_price: f64,
}

/// One news headline about a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub publisher: String,
    pub published: NaiveDate,
}

#[async_trait]
pub trait MarketData: Send + Sync {
    async fn quote(&self, ticker: &str) -> Result<Quote, ToolError>;

    /// Closing prices for roughly the last `months` months, oldest first.
    async fn price_history(&self, ticker: &str, months: u32) -> Result<Vec<DailyClose>, ToolError>;

    async fn recommendations(&self, ticker: &str) -> Result<Vec<Recommendation>, ToolError>;

    async fn latest_news(&self, ticker: &str) -> Result<Vec<NewsItem>, ToolError>;
}

/// Arguments shared by every ticker tool.
#[derive(Debug, Deserialize)]
pub(crate) struct TickerArgs {
    pub ticker: String,
}

impl TickerArgs {
    /// Upper-cased ticker; rejects empty or non-symbol input.
    pub fn normalized(&self, tool_name: &str) -> Result<String, ToolError> {
        let ticker = self.ticker.trim().to_uppercase();
        let valid = !ticker.is_empty()
            && ticker.len() <= 10
            && ticker.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid {
            return Err(ToolError::InvalidArguments(format!(
                "{tool_name}: '{}' is not a valid ticker symbol",
                self.ticker
            )));
        }
        Ok(ticker)
    }
}

pub(crate) fn ticker_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "ticker": {
                "type": "string",
                "description": "Stock ticker symbol, e.g. AMZN"
            }
        },
        "required": ["ticker"]
    })
}

/// Deterministic stand-in for a market data vendor.
pub struct MockMarketData {
    as_of: NaiveDate,
}

impl MockMarketData {
    /// Figures as of today (UTC).
    pub fn new() -> Self {
        Self {
            as_of: Utc::now().date_naive(),
        }
    }

    /// Figures as of a fixed date.
    pub fn as_of(date: NaiveDate) -> Self {
        Self { as_of: date }
    }

    fn seed(ticker: &str) -> u32 {
        ticker
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
    }

    fn base_price(ticker: &str) -> f64 {
        20.0 + (Self::seed(ticker) % 48_000) as f64 / 100.0
    }

    fn trading_days_back(&self, count: usize) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(count);
        let mut date = self.as_of;
        while days.len() < count {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                days.push(date);
            }
            date -= Duration::days(1);
        }
        days.reverse();
        days
    }
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[async_trait]
impl MarketData for MockMarketData {
    async fn quote(&self, ticker: &str) -> Result<Quote, ToolError> {
        Ok(Quote {
            ticker: ticker.to_string(),
            price: round2(Self::base_price(ticker)),
            currency: "USD".into(),
            as_of: self.as_of,
        })
    }

    async fn price_history(&self, ticker: &str, months: u32) -> Result<Vec<DailyClose>, ToolError> {
        let base = Self::base_price(ticker);
        let seed = Self::seed(ticker);
        let days = self.trading_days_back(months as usize * 21);
        let n = days.len();

        Ok(days
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                // Drift towards the current price with a small deterministic wobble.
                let back = (n - 1 - i) as f64;
                let drift = 1.0 - back * ((seed % 7) as f64 - 3.0) / 1000.0;
                let wobble = (((seed as usize + i * 17) % 11) as f64 - 5.0) / 200.0;
                DailyClose {
                    date,
                    close: round2(base * drift * (1.0 + wobble / 10.0)),
                }
            })
            .collect())
    }

    async fn recommendations(&self, ticker: &str) -> Result<Vec<Recommendation>, ToolError> {
        let base = Self::base_price(ticker);
        let seed = Self::seed(ticker);
        let ratings = ["Buy", "Overweight", "Hold", "Underweight"];
        let firms = ["Morgan Stanley", "Goldman Sachs", "JPMorgan"];

        Ok(firms
            .iter()
            .enumerate()
            .map(|(i, firm)| {
                let rating = ratings[(seed as usize + i) % ratings.len()];
                let upside = match rating {
                    "Buy" => 1.2,
                    "Overweight" => 1.1,
                    "Hold" => 1.0,
                    _ => 0.9,
                };
                Recommendation {
                    firm: firm.to_string(),
                    rating: rating.to_string(),
                    target_price: round2(base * upside),
                }
            })
            .collect())
    }

    async fn latest_news(&self, ticker: &str) -> Result<Vec<NewsItem>, ToolError> {
        let headlines = [
            format!("{ticker} beats quarterly earnings estimates"),
            format!("Analysts revisit {ticker} price targets after guidance update"),
            format!("{ticker} announces expanded share buyback program"),
        ];
        let publishers = ["Reuters", "Bloomberg", "MarketWatch"];

        Ok(headlines
            .into_iter()
            .zip(publishers)
            .enumerate()
            .map(|(i, (headline, publisher))| NewsItem {
                headline,
                publisher: publisher.to_string(),
                published: self.as_of - Duration::days(i as i64),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> MockMarketData {
        MockMarketData::as_of(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
    }

    #[test]
    fn ticker_normalization() {
        let args = TickerArgs { ticker: " amzn ".into() };
        assert_eq!(args.normalized("t").unwrap(), "AMZN");

        let bad = TickerArgs { ticker: "DROP TABLE".into() };
        assert!(matches!(bad.normalized("t"), Err(ToolError::InvalidArguments(_))));

        let empty = TickerArgs { ticker: "".into() };
        assert!(empty.normalized("t").is_err());
    }

    #[tokio::test]
    async fn quotes_are_deterministic() {
        let a = market().quote("NVDA").await.unwrap();
        let b = market().quote("NVDA").await.unwrap();
        assert_eq!(a, b);
        assert!(a.price > 0.0);
    }

    #[tokio::test]
    async fn history_covers_six_months_of_weekdays() {
        let history = market().price_history("AAPL", 6).await.unwrap();
        assert_eq!(history.len(), 126);
        assert!(history.windows(2).all(|w| w[0].date < w[1].date));
        assert!(history.iter().all(|d| !matches!(d.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert_eq!(history.last().unwrap().date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[tokio::test]
    async fn news_is_dated_newest_first() {
        let news = market().latest_news("TSLA").await.unwrap();
        assert_eq!(news.len(), 3);
        assert!(news[0].headline.contains("TSLA"));
        assert!(news[0].published > news[2].published);
    }
}
