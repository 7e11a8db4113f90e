//! Server settings read from the environment

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_DATA_PATH: &str = "/app/tally";
const ECB_FILE_NAME: &str = "eurofxref-hist-90d.xml";
/// 12 hours
const DEFAULT_RATE_TTL_SECS: u64 = 12 * 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding calculator config `*.json` files
    pub data_path: PathBuf,
    /// ECB reference-rate XML document
    pub ecb_path: PathBuf,
    pub rate_ttl: Duration,
}

impl Settings {
    /// `TALLY_DATA_PATH`, `TALLY_ECB_PATH`, `TALLY_RATE_TTL_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_path = lookup("TALLY_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let ecb_path = lookup("TALLY_ECB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_path.join(ECB_FILE_NAME));

        let ttl_secs = match lookup("TALLY_RATE_TTL_SECS") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring invalid TALLY_RATE_TTL_SECS");
                DEFAULT_RATE_TTL_SECS
            }),
            None => DEFAULT_RATE_TTL_SECS,
        };

        Self {
            data_path,
            ecb_path,
            rate_ttl: Duration::from_secs(ttl_secs),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.data_path, PathBuf::from("/app/tally"));
        assert_eq!(s.ecb_path, PathBuf::from("/app/tally/eurofxref-hist-90d.xml"));
        assert_eq!(s.rate_ttl, Duration::from_secs(43200));
    }

    #[test]
    fn test_ecb_path_follows_data_path() {
        let s = settings(&[("TALLY_DATA_PATH", "/srv/calc")]);
        assert_eq!(s.ecb_path, PathBuf::from("/srv/calc/eurofxref-hist-90d.xml"));
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[("TALLY_ECB_PATH", "/tmp/ecb.xml"), ("TALLY_RATE_TTL_SECS", "60")]);
        assert_eq!(s.ecb_path, PathBuf::from("/tmp/ecb.xml"));
        assert_eq!(s.rate_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_ttl_falls_back() {
        let s = settings(&[("TALLY_RATE_TTL_SECS", "soon")]);
        assert_eq!(s.rate_ttl, Duration::from_secs(43200));
    }
}
