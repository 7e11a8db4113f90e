//! ECB reference exchange rates
//!
//! The ECB publishes, per business day, how many units of each currency one
//! euro buys. Any pair is derived through EUR.

use chrono::{NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const RATE_SOURCE_LABEL: &str = "ECB reference rate";
const REFERENCE_CURRENCY: &str = "EUR";

static DAY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<Cube time=['"]([^'"]+)['"]>([\s\S]*?)</Cube>"#).expect("day pattern is valid")
});
static CURRENCY_RATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<Cube currency=['"]([A-Z]{3})['"] rate=['"]([0-9.]+)['"]"#).expect("rate pattern is valid")
});

/// Day → currency → units per euro
pub type RateTable = BTreeMap<NaiveDate, HashMap<String, f64>>;

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("failed to read rates from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("rate document contains no rates")]
    Empty,
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("rate unavailable for {0}")]
    Unavailable(String),
}

/// Where the raw ECB document comes from
pub trait RateSource {
    fn fetch(&self) -> Result<String, RateError>;
}

/// Reads a downloaded `eurofxref` XML file
pub struct FileRateSource {
    path: PathBuf,
}

impl FileRateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RateSource for FileRateSource {
    fn fetch(&self) -> Result<String, RateError> {
        fs::read_to_string(&self.path).map_err(|source| RateError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

/// Collect the rates of each dated `<Cube>` block. Blocks with an
/// unparsable date or no rates are skipped.
pub fn parse_ecb_xml(xml: &str) -> RateTable {
    let mut table = RateTable::new();
    for day in DAY_BLOCK.captures_iter(xml) {
        let Ok(date) = NaiveDate::parse_from_str(&day[1], "%Y-%m-%d") else {
            continue;
        };
        let rates: HashMap<String, f64> = CURRENCY_RATE
            .captures_iter(&day[2])
            .filter_map(|c| {
                let rate = c[2].parse::<f64>().ok().filter(|r| r.is_finite())?;
                Some((c[1].to_string(), rate))
            })
            .collect();
        if !rates.is_empty() {
            table.insert(date, rates);
        }
    }
    table
}

/// A rate between two currencies on a given day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FxQuote {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    pub date_used: String,
    pub source: &'static str,
    pub fetched_at: String,
}

struct Snapshot {
    rates: RateTable,
    fetched_at: Instant,
}

/// Parsed rates with the time they were loaded.
///
/// Rates older than the TTL are reloaded on the next lookup; when a reload
/// fails the previous rates keep being served.
pub struct RateCache {
    ttl: Duration,
    snapshot: Option<Snapshot>,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, snapshot: None }
    }

    fn is_fresh(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.fetched_at.elapsed() < self.ttl)
    }

    /// Current rate table, reloading from `source` when stale
    pub fn rates(&mut self, source: &dyn RateSource) -> Result<&RateTable, RateError> {
        if !self.is_fresh() {
            match source.fetch().map(|xml| parse_ecb_xml(&xml)) {
                Ok(rates) if !rates.is_empty() => {
                    info!(days = rates.len(), "loaded reference rates");
                    self.snapshot = Some(Snapshot { rates, fetched_at: Instant::now() });
                }
                Ok(_) if self.snapshot.is_some() => warn!("rate document was empty, serving cached rates"),
                Err(e) if self.snapshot.is_some() => warn!(error = %e, "rate refresh failed, serving cached rates"),
                Ok(_) => return Err(RateError::Empty),
                Err(e) => return Err(e),
            }
        }
        self.snapshot.as_ref().map(|s| &s.rates).ok_or(RateError::Empty)
    }

    /// Rate for `base` → `quote`. Without a date the newest day is used; a
    /// date with no publication falls back to the latest earlier day, or the
    /// newest day when none is earlier.
    pub fn quote(
        &mut self,
        source: &dyn RateSource,
        base: &str,
        quote: &str,
        date: Option<&str>,
    ) -> Result<FxQuote, RateError> {
        let base = base.trim().to_uppercase();
        let quote = quote.trim().to_uppercase();
        let requested = date
            .map(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|_| RateError::InvalidDate(d.to_string())))
            .transpose()?;

        let rates = self.rates(source)?;
        let (day, day_rates) = select_day(rates, requested).ok_or(RateError::Empty)?;

        let per_euro = |currency: &str| -> Result<f64, RateError> {
            if currency == REFERENCE_CURRENCY {
                return Ok(1.0);
            }
            day_rates
                .get(currency)
                .copied()
                .filter(|r| *r > 0.0)
                .ok_or_else(|| RateError::Unavailable(format!("{} on {}", currency, day)))
        };
        let rate = per_euro(&quote)? / per_euro(&base)?;
        debug!(%base, %quote, %day, rate, "quoted rate");

        Ok(FxQuote {
            base,
            quote,
            rate: round_to(rate, 6),
            date_used: day.format("%Y-%m-%d").to_string(),
            source: RATE_SOURCE_LABEL,
            fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

fn select_day(rates: &RateTable, requested: Option<NaiveDate>) -> Option<(NaiveDate, &HashMap<String, f64>)> {
    let newest = rates.iter().next_back();
    let Some(requested) = requested else {
        return newest.map(|(d, r)| (*d, r));
    };
    rates
        .range(..=requested)
        .next_back()
        .or(newest)
        .map(|(d, r)| (*d, r))
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
    <Cube>
        <Cube time="2026-10-16">
            <Cube currency="USD" rate="1.1650"/>
            <Cube currency="GBP" rate="0.8700"/>
            <Cube currency="JPY" rate="175.20"/>
        </Cube>
        <Cube time='2026-10-15'>
            <Cube currency='USD' rate='1.1600'/>
            <Cube currency='GBP' rate='0.8650'/>
        </Cube>
        <Cube time="2026-10-13">
            <Cube currency="USD" rate="1.1500"/>
        </Cube>
    </Cube>
</gesmes:Envelope>"#;

    struct StaticSource {
        body: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl StaticSource {
        fn ok() -> Self {
            Self { body: Some(SAMPLE), calls: Cell::new(0) }
        }
    }

    impl RateSource for StaticSource {
        fn fetch(&self) -> Result<String, RateError> {
            self.calls.set(self.calls.get() + 1);
            self.body.map(str::to_string).ok_or_else(|| RateError::Io {
                path: "test".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            })
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_ecb_xml() {
        let table = parse_ecb_xml(SAMPLE);
        assert_eq!(table.len(), 3);
        assert_eq!(table[&date("2026-10-16")]["JPY"], 175.20);
        assert_eq!(table[&date("2026-10-15")]["GBP"], 0.8650);
        assert!(parse_ecb_xml("<html>maintenance</html>").is_empty());
    }

    #[test]
    fn test_usd_to_eur_latest() {
        let mut cache = RateCache::new(Duration::from_secs(3600));
        let q = cache.quote(&StaticSource::ok(), "usd", "eur", None).unwrap();
        assert_eq!(q.base, "USD");
        assert_eq!(q.quote, "EUR");
        assert_eq!(q.rate, 0.858369);
        assert_eq!(q.date_used, "2026-10-16");
        assert_eq!(q.source, "ECB reference rate");
    }

    #[test]
    fn test_cross_rate_through_euro() {
        let mut cache = RateCache::new(Duration::from_secs(3600));
        let q = cache.quote(&StaticSource::ok(), "GBP", "USD", None).unwrap();
        assert_eq!(q.rate, round_to(1.1650 / 0.8700, 6));
    }

    #[test]
    fn test_date_fallback() {
        let mut cache = RateCache::new(Duration::from_secs(3600));
        let source = StaticSource::ok();
        // weekend: latest earlier publication
        let q = cache.quote(&source, "USD", "EUR", Some("2026-10-14")).unwrap();
        assert_eq!(q.date_used, "2026-10-13");
        // exact day
        let q = cache.quote(&source, "USD", "EUR", Some("2026-10-15")).unwrap();
        assert_eq!(q.date_used, "2026-10-15");
        // before the window: newest day
        let q = cache.quote(&source, "USD", "EUR", Some("2020-01-01")).unwrap();
        assert_eq!(q.date_used, "2026-10-16");
    }

    #[test]
    fn test_errors() {
        let mut cache = RateCache::new(Duration::from_secs(3600));
        let source = StaticSource::ok();
        assert!(matches!(
            cache.quote(&source, "USD", "EUR", Some("16/10/2026")),
            Err(RateError::InvalidDate(_))
        ));
        assert!(matches!(
            cache.quote(&source, "USD", "JPY", Some("2026-10-15")),
            Err(RateError::Unavailable(_))
        ));
    }

    #[test]
    fn test_cache_reuses_fresh_rates() {
        let mut cache = RateCache::new(Duration::from_secs(3600));
        let source = StaticSource::ok();
        cache.rates(&source).unwrap();
        cache.rates(&source).unwrap();
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_stale_rates_served_when_refresh_fails() {
        let mut cache = RateCache::new(Duration::ZERO);
        cache.rates(&StaticSource::ok()).unwrap();

        let failing = StaticSource { body: None, calls: Cell::new(0) };
        let rates = cache.rates(&failing).unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(failing.calls.get(), 1);
    }

    #[test]
    fn test_first_load_failure_is_an_error() {
        let mut cache = RateCache::new(Duration::from_secs(3600));
        let failing = StaticSource { body: None, calls: Cell::new(0) };
        assert!(matches!(cache.rates(&failing), Err(RateError::Io { .. })));
        let empty = StaticSource { body: Some("<Cube></Cube>"), calls: Cell::new(0) };
        assert!(matches!(cache.rates(&empty), Err(RateError::Empty)));
    }
}
