use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;

use crate::error::{PipelineError, Result};

const DEFAULT_DATE: &str = "2024-11-18";
const DEFAULT_BUCKET: &str = "hamza-dhich-wikidata";
const DEFAULT_REGION: &str = "eu-west-1";
pub const DEFAULT_API_BASE: &str = "https://wikimedia.org/api/rest_v1";

pub struct Config {
    pub date: NaiveDate,
    pub bucket: String,
    pub region: String,
    pub api_base: String,
    pub work_dir: PathBuf,
    /// When set, objects go to this directory instead of S3.
    pub local_store: Option<PathBuf>,
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| PipelineError::config(format!("invalid date {:?}: {}", value, err)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Reads `WIKIVIEWS_*` variables, falling back to the defaults above.
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, with variables resolved by `lookup`. Blank
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| {
            non_blank(lookup(name)).unwrap_or_else(|| default.to_string())
        };

        let date = parse_date(&var_or("WIKIVIEWS_DATE", DEFAULT_DATE))?;

        let work_dir = match non_blank(lookup("WIKIVIEWS_WORK_DIR")) {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir().map_err(|err| {
                PipelineError::config(format!("can't resolve current directory: {}", err))
            })?,
        };

        let local_store = non_blank(lookup("WIKIVIEWS_LOCAL_STORE")).map(PathBuf::from);

        Ok(Config {
            date,
            bucket: var_or("WIKIVIEWS_BUCKET", DEFAULT_BUCKET),
            region: var_or("WIKIVIEWS_REGION", DEFAULT_REGION),
            api_base: var_or("WIKIVIEWS_API_BASE", DEFAULT_API_BASE),
            work_dir,
            local_store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_iso_dates() {
        let date = parse_date("2024-11-18").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 11, 18).unwrap());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(matches!(
            parse_date("18/11/2024"),
            Err(PipelineError::Config { .. })
        ));
        assert!(parse_date("2024-02-30").is_err());
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn unset_variables_use_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.date, NaiveDate::from_ymd_opt(2024, 11, 18).unwrap());
        assert_eq!(config.bucket, "hamza-dhich-wikidata");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.api_base, "https://wikimedia.org/api/rest_v1");
        assert_eq!(config.work_dir, env::current_dir().unwrap());
        assert_eq!(config.local_store, None);
    }

    #[test]
    fn blank_variables_use_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("WIKIVIEWS_DATE", ""),
            ("WIKIVIEWS_BUCKET", "  "),
            ("WIKIVIEWS_REGION", ""),
            ("WIKIVIEWS_API_BASE", " "),
            ("WIKIVIEWS_WORK_DIR", ""),
            ("WIKIVIEWS_LOCAL_STORE", ""),
        ]))
        .unwrap();

        assert_eq!(config.date, NaiveDate::from_ymd_opt(2024, 11, 18).unwrap());
        assert_eq!(config.bucket, "hamza-dhich-wikidata");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.work_dir, env::current_dir().unwrap());
        assert_eq!(config.local_store, None);
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("WIKIVIEWS_DATE", "2024-01-05"),
            ("WIKIVIEWS_BUCKET", "abc-wikidata"),
            ("WIKIVIEWS_REGION", "us-east-1"),
            ("WIKIVIEWS_API_BASE", "http://localhost:8080"),
            ("WIKIVIEWS_WORK_DIR", "/tmp/work"),
            ("WIKIVIEWS_LOCAL_STORE", "/tmp/store"),
        ]))
        .unwrap();

        assert_eq!(config.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(config.bucket, "abc-wikidata");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.api_base, "http://localhost:8080");
        assert_eq!(config.work_dir, PathBuf::from("/tmp/work"));
        assert_eq!(config.local_store, Some(PathBuf::from("/tmp/store")));
    }

    #[test]
    fn invalid_date_is_a_config_error() {
        let result = Config::from_lookup(lookup(&[("WIKIVIEWS_DATE", "2024/11/18")]));
        assert!(matches!(result, Err(PipelineError::Config { .. })));
    }
}
