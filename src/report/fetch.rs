use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::error::Result;
use crate::report::RawReport;

const AGENT: &str = "curl/7.68.0";

pub fn top_views_url(api_base: &str, date: NaiveDate) -> String {
    format!(
        "{}/metrics/pageviews/top/en.wikipedia.org/all-access/{}",
        api_base.trim_end_matches('/'),
        date.format("%Y/%m/%d")
    )
}

/// Fetches the top viewed articles for `date`. Any status is accepted; only
/// transport failures are errors.
pub fn get(api_base: &str, date: NaiveDate, client: &Client) -> Result<RawReport> {
    let url = top_views_url(api_base, date);
    info!("Requesting REST API URL: {}", url);

    let res = client.get(&url).header(USER_AGENT, AGENT).send()?;
    let status = res.status().as_u16();
    let body = res.text()?;

    debug!("Page views API response body: {}", body);
    info!("Page views API response code: {}", status);

    let report = RawReport {
        date,
        url,
        status,
        body,
    };

    if report.is_ok() {
        info!(
            "Retrieved page views data, content-length: {}",
            report.body.len()
        );
    } else {
        warn!(
            "Received non-OK status code {} from {}. Response body: {}",
            report.status, report.url, report.body
        );
    }

    return Ok(report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 8).unwrap()
    }

    #[test]
    fn builds_slash_separated_date_url() {
        assert_eq!(
            top_views_url("https://wikimedia.org/api/rest_v1", date()),
            "https://wikimedia.org/api/rest_v1/metrics/pageviews/top/en.wikipedia.org/all-access/2024/11/08"
        );
        assert_eq!(
            top_views_url("http://localhost:1234/", date()),
            "http://localhost:1234/metrics/pageviews/top/en.wikipedia.org/all-access/2024/11/08"
        );
    }

    #[test]
    fn sends_curl_user_agent_and_keeps_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/metrics/pageviews/top/en.wikipedia.org/all-access/2024/11/08")
                .header("user-agent", "curl/7.68.0");
            then.status(200).body(r#"{"items":[]}"#);
        });

        let report = get(&server.base_url(), date(), &Client::new()).unwrap();

        mock.assert();
        assert!(report.is_ok());
        assert_eq!(report.body, r#"{"items":[]}"#);
        assert_eq!(report.date, date());
    }

    #[test]
    fn non_ok_status_is_returned_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(404).body("not found");
        });

        let report = get(&server.base_url(), date(), &Client::new()).unwrap();

        assert_eq!(report.status, 404);
        assert!(!report.is_ok());
        assert_eq!(report.body, "not found");
    }
}
