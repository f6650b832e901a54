use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{PipelineError, Result};
use crate::report::RawReport;

#[derive(Deserialize)]
struct TopArticle {
    article: String,
    views: u64,
    rank: u32,
}

#[derive(Deserialize)]
struct TopItem {
    articles: Vec<TopArticle>,
}

#[derive(Deserialize)]
struct TopViewsResponse {
    items: Vec<TopItem>,
}

/// One line of the views file. Field order is the column order downstream.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ArticleRecord {
    pub title: String,
    pub views: u64,
    pub rank: u32,
    pub date: NaiveDate,
    // No offset, query engines can't read it
    #[serde(serialize_with = "naive_iso")]
    pub retrieved_at: NaiveDateTime,
}

fn naive_iso<S: Serializer>(
    value: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    // Whole seconds carry no fraction
    if value.nanosecond() / 1_000 == 0 {
        serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S"))
    } else {
        serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S%.6f"))
    }
}

pub fn records(report: &RawReport, retrieved_at: NaiveDateTime) -> Result<Vec<ArticleRecord>> {
    let parsed: TopViewsResponse = serde_json::from_str(&report.body)
        .map_err(|err| PipelineError::json("parsing page views report", err))?;

    let item = match parsed.items.into_iter().next() {
        Some(item) => item,
        None => {
            return Err(PipelineError::EmptyReport {
                date: report.date.format("%Y-%m-%d").to_string(),
            })
        }
    };

    let records: Vec<ArticleRecord> = item
        .articles
        .into_iter()
        .map(|article| ArticleRecord {
            title: article.article,
            views: article.views,
            rank: article.rank,
            date: report.date,
            retrieved_at,
        })
        .collect();

    debug!("Projected {} articles", records.len());

    return Ok(records);
}

/// Records as newline-delimited JSON, every line terminated.
pub fn to_json_lines(records: &[ArticleRecord]) -> Result<String> {
    let mut json_lines = String::new();

    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|err| PipelineError::json("serializing article record", err))?;
        json_lines.push_str(&line);
        json_lines.push('\n');
    }

    return Ok(json_lines);
}

/// Stamps every record with the current UTC time and serializes them.
pub fn process(report: &RawReport) -> Result<(Vec<ArticleRecord>, String)> {
    let retrieved_at = Utc::now().naive_utc();
    let records = records(report, retrieved_at)?;
    let json_lines = to_json_lines(&records)?;

    info!("JSON lines:\n{}", json_lines);

    return Ok((records, json_lines));
}
