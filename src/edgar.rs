//! EDGAR document source.
//!
//! Talks to the SEC filing archive: lists a company's recent
//! submissions, picks the 10-K for a requested fiscal year, and
//! downloads the primary document into the corpus directory.
//!
//! Every call is best-effort with a bounded timeout and no retries.
//! Failures are typed so [`ensure_filings`] can log and skip the
//! affected ticker or year while the rest of the corpus proceeds.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::config::Config;

/// Pause between downloads; the SEC rate-limits aggressive clients.
const DOWNLOAD_PACING: Duration = Duration::from_millis(500);

/// Failure at the document-source boundary.
#[derive(Debug)]
pub enum FetchError {
    /// The submissions listing could not be fetched or decoded.
    SourceUnavailable { ticker: String, reason: String },
    /// No 10-K filed in the requested year.
    FilingNotFound { ticker: String, year: String },
    /// The filing document itself could not be downloaded.
    Download { url: String, reason: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::SourceUnavailable { ticker, reason } => {
                write!(f, "could not fetch submissions for {}: {}", ticker, reason)
            }
            FetchError::FilingNotFound { ticker, year } => {
                write!(f, "no 10-K found for {} {}", ticker, year)
            }
            FetchError::Download { url, reason } => {
                write!(f, "download failed for {}: {}", url, reason)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Decoded submissions feed for one company.
///
/// The feed stores recent filings as parallel arrays; row `i` of each
/// array describes the same filing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submissions {
    #[serde(default)]
    pub filings: Filings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filings {
    #[serde(default)]
    pub recent: RecentFilings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentFilings {
    #[serde(default)]
    pub form: Vec<String>,
    #[serde(default, rename = "filingDate")]
    pub filing_date: Vec<String>,
    #[serde(default, rename = "accessionNumber")]
    pub accession_number: Vec<String>,
    #[serde(default, rename = "primaryDocument")]
    pub primary_document: Vec<String>,
}

/// An annual report selected from the submissions feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Filing {
    /// Accession number with dashes stripped, as used in archive URLs.
    pub accession: String,
    pub primary_document: String,
}

/// Fetch the recent-submissions listing for a CIK.
pub async fn fetch_submissions(
    client: &reqwest::Client,
    config: &Config,
    ticker: &str,
    cik: &str,
) -> Result<Submissions, FetchError> {
    let url = format!("https://www.sec.gov/Archives/edgar/data/{}/index.json", cik);

    let unavailable = |reason: String| FetchError::SourceUnavailable {
        ticker: ticker.to_string(),
        reason,
    };

    let response = client
        .get(&url)
        .timeout(Duration::from_secs(config.fetch.listing_timeout_secs))
        .send()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(unavailable(format!("HTTP {}", status)));
    }

    response
        .json::<Submissions>()
        .await
        .map_err(|e| unavailable(e.to_string()))
}

/// Pick the first 10-K filed in `year` from the recent-filings table.
pub fn find_annual_report(
    subs: &Submissions,
    ticker: &str,
    year: &str,
) -> Result<Filing, FetchError> {
    let recent = &subs.filings.recent;

    for (((form, date), acc), doc) in recent
        .form
        .iter()
        .zip(recent.filing_date.iter())
        .zip(recent.accession_number.iter())
        .zip(recent.primary_document.iter())
    {
        if form == "10-K" && date.starts_with(year) {
            return Ok(Filing {
                accession: acc.replace('-', ""),
                primary_document: doc.clone(),
            });
        }
    }

    Err(FetchError::FilingNotFound {
        ticker: ticker.to_string(),
        year: year.to_string(),
    })
}

/// Download a filing's primary document, returning the raw bytes.
pub async fn download_filing(
    client: &reqwest::Client,
    config: &Config,
    cik: &str,
    filing: &Filing,
) -> Result<Vec<u8>, FetchError> {
    // Archive paths use the CIK without leading zeros.
    let cik_trimmed = cik.trim_start_matches('0');
    let url = format!(
        "https://www.sec.gov/Archives/edgar/data/{}/{}/{}",
        cik_trimmed, filing.accession, filing.primary_document
    );

    let failed = |reason: String| FetchError::Download {
        url: url.clone(),
        reason,
    };

    let response = client
        .get(&url)
        .timeout(Duration::from_secs(config.fetch.download_timeout_secs))
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("HTTP {}", status)));
    }

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Download any missing filings into the corpus directory.
///
/// For each configured ticker and year, skips years already present on
/// disk, then fetches the listing, picks the 10-K, and writes it as
/// `{TICKER}_{YEAR}{ext}`. Every failure is logged and skipped; this
/// function only errors when the corpus directory itself cannot be
/// created or written.
pub async fn ensure_filings(config: &Config) -> Result<()> {
    let data_dir = &config.corpus.data_dir;
    std::fs::create_dir_all(data_dir)?;

    let client = reqwest::Client::builder()
        .user_agent(&config.fetch.user_agent)
        .build()?;

    for (ticker, cik) in &config.corpus.ciks {
        let subs = match fetch_submissions(&client, config, ticker, cik).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Warning: {}", e);
                continue;
            }
        };

        for year in &config.corpus.years {
            if has_filing(data_dir, ticker, year) {
                continue;
            }

            let filing = match find_annual_report(&subs, ticker, year) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: {}", e);
                    continue;
                }
            };

            let ext = document_extension(&filing.primary_document);
            let dest = data_dir.join(format!("{}_{}{}", ticker, year, ext));
            println!("Downloading {} {} -> {}", ticker, year, dest.display());

            match download_filing(&client, config, cik, &filing).await {
                Ok(bytes) => std::fs::write(&dest, bytes)?,
                Err(e) => {
                    eprintln!("Warning: {}", e);
                    continue;
                }
            }

            tokio::time::sleep(DOWNLOAD_PACING).await;
        }
    }

    Ok(())
}

/// True when a `{TICKER}_{YEAR}*` file already exists in the corpus.
fn has_filing(data_dir: &Path, ticker: &str, year: &str) -> bool {
    let prefix = format!("{}_{}", ticker, year);
    std::fs::read_dir(data_dir)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.file_name().to_string_lossy().starts_with(&prefix))
        })
        .unwrap_or(false)
}

/// Extension of the primary document, `.htm` when it has none.
fn document_extension(primary_document: &str) -> String {
    match primary_document.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => format!(".{}", ext),
        _ => ".htm".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_submissions() -> Submissions {
        serde_json::from_value(serde_json::json!({
            "filings": {
                "recent": {
                    "form": ["8-K", "10-K", "10-Q", "10-K"],
                    "filingDate": ["2023-09-01", "2023-07-27", "2023-04-25", "2022-07-28"],
                    "accessionNumber": [
                        "0000789019-23-000090",
                        "0000950170-23-035122",
                        "0000950170-23-014423",
                        "0001564590-22-026876"
                    ],
                    "primaryDocument": [
                        "evt.htm",
                        "msft-10k_20230630.htm",
                        "msft-10q_20230331.htm",
                        "msft-10k_20220630.htm"
                    ]
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn picks_first_ten_k_matching_year() {
        let subs = sample_submissions();
        let filing = find_annual_report(&subs, "MSFT", "2023").unwrap();
        assert_eq!(filing.accession, "000095017023035122");
        assert_eq!(filing.primary_document, "msft-10k_20230630.htm");
    }

    #[test]
    fn earlier_year_resolves_to_older_filing() {
        let subs = sample_submissions();
        let filing = find_annual_report(&subs, "MSFT", "2022").unwrap();
        assert_eq!(filing.primary_document, "msft-10k_20220630.htm");
    }

    #[test]
    fn missing_year_is_typed_not_found() {
        let subs = sample_submissions();
        let err = find_annual_report(&subs, "MSFT", "2019").unwrap_err();
        assert!(matches!(
            err,
            FetchError::FilingNotFound { ref year, .. } if year == "2019"
        ));
    }

    #[test]
    fn empty_feed_decodes_and_finds_nothing() {
        let subs: Submissions = serde_json::from_str("{}").unwrap();
        assert!(find_annual_report(&subs, "MSFT", "2023").is_err());
    }

    #[test]
    fn extension_falls_back_to_htm() {
        assert_eq!(document_extension("msft-10k.htm"), ".htm");
        assert_eq!(document_extension("report.pdf"), ".pdf");
        assert_eq!(document_extension("no_extension"), ".htm");
        assert_eq!(document_extension("trailingdot."), ".htm");
    }

    #[test]
    fn has_filing_matches_prefix_any_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("MSFT_2023.htm"), "x").unwrap();
        assert!(has_filing(tmp.path(), "MSFT", "2023"));
        assert!(!has_filing(tmp.path(), "MSFT", "2024"));
        assert!(!has_filing(tmp.path(), "GOOGL", "2023"));
    }
}
