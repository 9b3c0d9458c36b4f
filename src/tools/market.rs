//! Job-market demand analysis via SerpAPI (Google Jobs).
//!
//! Queries real postings for an IT role, then aggregates demand and salary
//! figures. Salary strings are free text, so the monthly figure is a
//! heuristic extraction; percentiles are only reported when the salaried
//! sample supports them.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Tool;

const SOURCE: &str = "Google Jobs via SerpAPI";
const DEFAULT_LOCATION: &str = "Brasil";

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Analyze posting volume and salary ranges for an IT role.
pub struct MarketDemand {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl MarketDemand {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, "https://serpapi.com".to_string())
    }

    /// Custom base URL, for testing against a mock server.
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl Tool for MarketDemand {
    fn name(&self) -> &str {
        "analyze_market_demand"
    }

    fn description(&self) -> &str {
        "Analyze market demand and salary ranges for a specific IT role. Returns real posting counts, monthly salary percentiles (p25/p50/p75), top hiring companies and top cities. Always call this when the user asks about an IT career."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "area": {
                    "type": "string",
                    "description": "IT role to analyze (e.g. 'Engenheiro de DevOps', 'Cientista de Dados')"
                },
                "location": {
                    "type": "string",
                    "description": "Where to search for postings",
                    "default": DEFAULT_LOCATION
                }
            },
            "required": ["area"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<Value> {
        let area = args["area"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'area' argument"))?;
        let location = args["location"].as_str().unwrap_or(DEFAULT_LOCATION);

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("SERPAPI_API_KEY is not configured"))?;

        let url = format!("{}/search.json", self.base_url);
        let query = format!("{} {}", area, location);

        tracing::info!(area, location, "querying Google Jobs");

        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(30))
            .query(&[
                ("engine", "google_jobs"),
                ("q", query.as_str()),
                ("hl", "pt-BR"),
                ("gl", "br"),
                ("api_key", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("SerpAPI returned HTTP {}", status);
        }

        let payload: JobsResponse = response.json().await?;
        let report = aggregate(area, location, &payload.jobs_results);

        tracing::info!(
            sample_size = report.sample_size,
            salaried = report.salaried_count,
            "market demand collected"
        );

        Ok(serde_json::to_value(report)?)
    }
}

/// Subset of the SerpAPI google_jobs response we consume.
#[derive(Debug, Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs_results: Vec<JobPosting>,
}

#[derive(Debug, Default, Deserialize)]
struct JobPosting {
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    detected_extensions: Option<DetectedExtensions>,
    #[serde(default)]
    salary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DetectedExtensions {
    #[serde(default)]
    salary: Option<String>,
}

/// Monthly salary percentiles. All fields stay `None` below the sample
/// thresholds that make them meaningful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryPercentiles {
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
}

/// Aggregated demand data for one role/location query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDemandReport {
    pub area: String,
    pub location: String,
    pub sample_size: usize,
    pub salaried_count: usize,
    pub salary_percentiles: SalaryPercentiles,
    pub top_employers: Vec<String>,
    pub top_cities: Vec<String>,
    pub notes: String,
    pub source: String,
}

fn aggregate(area: &str, location: &str, jobs: &[JobPosting]) -> MarketDemandReport {
    if jobs.is_empty() {
        return MarketDemandReport {
            area: area.to_string(),
            location: location.to_string(),
            sample_size: 0,
            salaried_count: 0,
            salary_percentiles: SalaryPercentiles::default(),
            top_employers: Vec::new(),
            top_cities: Vec::new(),
            notes: "No postings found for this query".to_string(),
            source: SOURCE.to_string(),
        };
    }

    let mut salaries = Vec::new();
    let mut employers = Vec::new();
    let mut cities = Vec::new();

    for job in jobs {
        if let Some(company) = job.company_name.as_deref().filter(|c| !c.is_empty()) {
            employers.push(company.to_string());
        }

        if let Some(place) = job.location.as_deref() {
            // First comma-separated segment is the city.
            let city = place.split(',').next().unwrap_or("").trim();
            if !city.is_empty() {
                cities.push(city.to_string());
            }
        }

        let salary_text = job
            .detected_extensions
            .as_ref()
            .and_then(|e| e.salary.as_deref())
            .filter(|s| !s.is_empty())
            .or(job.salary.as_deref());

        if let Some(text) = salary_text {
            if let Some(monthly) = parse_monthly_salary(text) {
                salaries.push(monthly);
            }
        }
    }

    let sample_size = jobs.len();
    let salaried_count = salaries.len();
    let salary_percentiles = salary_percentiles(&salaries);

    let mut notes = Vec::new();
    if salaried_count == 0 {
        notes.push("No postings with an explicit salary were found".to_string());
    } else if (salaried_count as f64) < sample_size as f64 * 0.3 {
        notes.push(format!(
            "Only {}/{} postings list an explicit salary",
            salaried_count, sample_size
        ));
    }
    if salaried_count < 5 {
        notes.push("Small sample, percentiles may not be representative".to_string());
    }
    let notes = if notes.is_empty() {
        "Data collected successfully".to_string()
    } else {
        notes.join("; ")
    };

    MarketDemandReport {
        area: area.to_string(),
        location: location.to_string(),
        sample_size,
        salaried_count,
        salary_percentiles,
        top_employers: top_items(&employers, 3),
        top_cities: top_items(&cities, 3),
        notes,
        source: SOURCE.to_string(),
    }
}

/// Extract and normalize a monthly salary from free-text salary fields.
///
/// Heuristic: strip currency markers and separators, take the first digit
/// run, divide annual figures by 12, scale sub-1000 values that came from a
/// three-or-more digit run, and accept only plausible monthly values.
fn parse_monthly_salary(raw: &str) -> Option<f64> {
    let text = raw.to_lowercase().replace("r$", "").replace([',', '.'], "");

    let run = DIGIT_RUN.find(&text)?.as_str();
    let mut value: f64 = run.parse().ok()?;

    if text.contains("ano") || text.contains("anual") || text.contains("year") {
        value /= 12.0;
    }

    if value < 1000.0 && run.len() >= 3 {
        value *= 1000.0;
    }

    (1000.0..=100_000.0).contains(&value).then_some(value)
}

/// Percentile policy: full quartiles from 3 salaried points, median alone
/// below that, nothing on an empty sample.
fn salary_percentiles(samples: &[f64]) -> SalaryPercentiles {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    match sorted.len() {
        0 => SalaryPercentiles::default(),
        1 | 2 => SalaryPercentiles {
            p50: Some(round2(median(&sorted))),
            ..SalaryPercentiles::default()
        },
        _ => SalaryPercentiles {
            p25: Some(round2(quartile(&sorted, 1))),
            p50: Some(round2(median(&sorted))),
            p75: Some(round2(quartile(&sorted, 3))),
        },
    }
}

/// Exclusive-method quartile: position (n+1)*j/4 with linear interpolation,
/// clamped to the data range.
fn quartile(sorted: &[f64], j: usize) -> f64 {
    let n = sorted.len() as f64;
    let position = (n + 1.0) * j as f64 / 4.0;

    if position <= 1.0 {
        return sorted[0];
    }
    if position >= n {
        return sorted[sorted.len() - 1];
    }

    let index = position.floor() as usize;
    let fraction = position - position.floor();
    let lower = sorted[index - 1];
    let upper = sorted[index];
    lower + (upper - lower) * fraction
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Top-N items by frequency; ties keep first-seen order.
fn top_items(items: &[String], n: usize) -> Vec<String> {
    let mut counts: Vec<(&String, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(known, _)| *known == item) {
            Some(entry) => entry.1 += 1,
            None => counts.push((item, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(n).map(|(item, _)| item.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(company: &str, city: &str, salary: Option<&str>) -> JobPosting {
        JobPosting {
            company_name: Some(company.to_string()),
            location: Some(format!("{}, Brasil", city)),
            detected_extensions: salary.map(|s| DetectedExtensions {
                salary: Some(s.to_string()),
            }),
            salary: None,
        }
    }

    #[test]
    fn parses_plain_monthly_salary() {
        assert_eq!(parse_monthly_salary("R$ 4500 por mês"), Some(4500.0));
    }

    #[test]
    fn converts_annual_to_monthly() {
        assert_eq!(parse_monthly_salary("60000 por ano"), Some(5000.0));
        assert_eq!(parse_monthly_salary("120000/year"), Some(10000.0));
    }

    #[test]
    fn rejects_text_without_numbers() {
        assert_eq!(parse_monthly_salary("a combinar"), None);
        assert_eq!(parse_monthly_salary(""), None);
    }

    #[test]
    fn rejects_out_of_range_values() {
        // Thousands separators collapse into one large run, outside range.
        assert_eq!(parse_monthly_salary("R$ 5.000,00"), None);
        assert_eq!(parse_monthly_salary("R$ 12"), None);
    }

    #[test]
    fn empty_sample_has_no_percentiles() {
        let p = salary_percentiles(&[]);
        assert_eq!(p, SalaryPercentiles::default());
    }

    #[test]
    fn two_samples_yield_median_only() {
        let p = salary_percentiles(&[4000.0, 6000.0]);
        assert_eq!(p.p25, None);
        assert_eq!(p.p50, Some(5000.0));
        assert_eq!(p.p75, None);
    }

    #[test]
    fn five_samples_yield_ordered_quartiles() {
        let p = salary_percentiles(&[1000.0, 2000.0, 3000.0, 4000.0, 5000.0]);
        let (p25, p50, p75) = (p.p25.unwrap(), p.p50.unwrap(), p.p75.unwrap());
        assert_eq!(p25, 1500.0);
        assert_eq!(p50, 3000.0);
        assert_eq!(p75, 4500.0);
        assert!(p25 <= p50 && p50 <= p75);
    }

    #[test]
    fn top_items_breaks_ties_by_first_seen() {
        let items: Vec<String> = ["b", "a", "a", "c", "b", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(top_items(&items, 3), vec!["b", "a", "c"]);
    }

    #[test]
    fn aggregate_empty_sample() {
        let report = aggregate("Engenheiro de DevOps", "Brasil", &[]);
        assert_eq!(report.sample_size, 0);
        assert_eq!(report.notes, "No postings found for this query");
        assert_eq!(report.source, SOURCE);
    }

    #[test]
    fn aggregate_counts_and_notes() {
        let jobs = vec![
            posting("Acme", "São Paulo", Some("R$ 5000 por mês")),
            posting("Acme", "São Paulo", None),
            posting("Initech", "Recife", None),
            posting("Globex", "São Paulo", None),
        ];

        let report = aggregate("Engenheiro de DevOps", "Brasil", &jobs);
        assert_eq!(report.sample_size, 4);
        assert_eq!(report.salaried_count, 1);
        assert_eq!(report.salary_percentiles.p50, Some(5000.0));
        assert_eq!(report.salary_percentiles.p25, None);
        assert_eq!(report.top_employers[0], "Acme");
        assert_eq!(report.top_cities[0], "São Paulo");
        assert!(report.notes.contains("Only 1/4"));
        assert!(report.notes.contains("Small sample"));
    }

    #[test]
    fn report_serializes_expected_fields() {
        let report = aggregate("Data Engineer", "Brasil", &[]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["area"], "Data Engineer");
        assert_eq!(value["salary_percentiles"]["p50"], Value::Null);
        assert_eq!(value["source"], SOURCE);
    }
}
