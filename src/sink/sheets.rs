//! Google Sheets sink
//!
//! Appends the run's records to a named worksheet of a named spreadsheet:
//! 1. Authorize with the service-account key
//! 2. Find the spreadsheet by name (Drive `files.list`)
//! 3. Check that the worksheet tab exists
//! 4. Write the header row if row 1 is empty
//! 5. Append all records in one `values:append` call
//!
//! Concurrent runs are not coordinated; two runs appending at once both land.

use crate::config::SheetConfig;
use crate::scrape::{ProductRecord, HEADER};
use crate::sink::auth::{ServiceAccountKey, TokenProvider};
use crate::sink::traits::{RecordSink, SinkError, SinkResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    #[serde(default)]
    updated_range: Option<String>,
    #[serde(default)]
    updated_rows: Option<u64>,
}

/// Sink that appends records to a Google Sheets worksheet
#[derive(Debug, Clone)]
pub struct GoogleSheetsSink {
    client: Client,
    tokens: TokenProvider,
    config: SheetConfig,
}

impl GoogleSheetsSink {
    /// Creates a sink from an already loaded key
    ///
    /// Every request (token exchange included) is bounded by
    /// `config.request_timeout_secs`; a stalled endpoint surfaces as
    /// `SinkError::Auth` or `SinkError::Http`.
    pub fn new(config: &SheetConfig, key: &ServiceAccountKey) -> SinkResult<Self> {
        let client = build_api_client(config)?;
        let tokens = TokenProvider::new(key, client.clone())?;
        Ok(Self {
            client,
            tokens,
            config: config.clone(),
        })
    }

    /// Creates a sink, reading the key from `config.credential_env`
    pub fn from_env(config: &SheetConfig) -> SinkResult<Self> {
        let key = ServiceAccountKey::from_env(&config.credential_env)?;
        Self::new(config, &key)
    }

    /// Authorizes and opens the configured worksheet
    pub async fn connect(&self) -> SinkResult<Worksheet> {
        let token = self.tokens.access_token().await?;
        let spreadsheet_id = self.open_by_name(&token, &self.config.spreadsheet).await?;

        let worksheet = Worksheet {
            client: self.client.clone(),
            token,
            sheets_api_base: self.config.sheets_api_base.clone(),
            spreadsheet_id,
            title: self.config.worksheet.clone(),
        };
        worksheet.ensure_exists().await?;

        tracing::info!(
            "Connected to '{}' - '{}'",
            self.config.spreadsheet,
            self.config.worksheet
        );
        Ok(worksheet)
    }

    /// Resolves a spreadsheet name to its id
    async fn open_by_name(&self, token: &str, name: &str) -> SinkResult<String> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let url = api_url(&self.config.drive_api_base, &["files"])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        let list: FileList = check("open spreadsheet", response).await?.json().await?;

        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| SinkError::SpreadsheetNotFound(name.to_string()))
    }
}

#[async_trait]
impl RecordSink for GoogleSheetsSink {
    async fn write_records(&self, records: &[ProductRecord]) -> SinkResult<usize> {
        tracing::info!("Connecting to Google Sheets...");
        let worksheet = self.connect().await?;

        if !worksheet.has_header().await? {
            worksheet.append_header().await?;
        }

        worksheet.append_rows(records).await?;
        tracing::info!(
            "Successfully appended {} products to Google Sheet.",
            records.len()
        );
        Ok(records.len())
    }
}

/// An authorized handle on one worksheet
#[derive(Debug, Clone)]
pub struct Worksheet {
    client: Client,
    token: String,
    sheets_api_base: String,
    spreadsheet_id: String,
    title: String,
}

impl Worksheet {
    async fn ensure_exists(&self) -> SinkResult<()> {
        let url = api_url(
            &self.sheets_api_base,
            &["spreadsheets", self.spreadsheet_id.as_str()],
        )?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let spreadsheet: Spreadsheet = check("read worksheets", response).await?.json().await?;

        if spreadsheet
            .sheets
            .iter()
            .any(|sheet| sheet.properties.title == self.title)
        {
            Ok(())
        } else {
            Err(SinkError::WorksheetNotFound(self.title.clone()))
        }
    }

    /// Returns true if row 1 has at least one non-empty cell
    pub async fn has_header(&self) -> SinkResult<bool> {
        let range = self.range("1:1");
        let url = api_url(
            &self.sheets_api_base,
            &["spreadsheets", self.spreadsheet_id.as_str(), "values", range.as_str()],
        )?;
        let response = self.client.get(url).bearer_auth(&self.token).send().await?;
        let values: ValueRange = check("read header row", response).await?.json().await?;

        Ok(values.values.first().is_some_and(|row| {
            row.iter().any(|cell| match cell {
                serde_json::Value::String(s) => !s.trim().is_empty(),
                serde_json::Value::Null => false,
                _ => true,
            })
        }))
    }

    /// Appends the column header row
    pub async fn append_header(&self) -> SinkResult<()> {
        self.append(vec![HEADER.map(String::from)]).await?;
        tracing::info!("Wrote header row to empty worksheet '{}'", self.title);
        Ok(())
    }

    /// Appends every record as one row, in a single request
    pub async fn append_rows(&self, records: &[ProductRecord]) -> SinkResult<u64> {
        self.append(records.iter().map(ProductRecord::to_row).collect())
            .await
    }

    async fn append(&self, rows: Vec<[String; 3]>) -> SinkResult<u64> {
        let range = format!("{}:append", self.range("A1"));
        let url = api_url(
            &self.sheets_api_base,
            &["spreadsheets", self.spreadsheet_id.as_str(), "values", range.as_str()],
        )?;
        let row_count = rows.len() as u64;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": rows }))
            .send()
            .await?;
        let appended: AppendResponse = check("append rows", response)
            .await?
            .json()
            .await
            .unwrap_or_default();

        let updates = appended.updates.unwrap_or_default();
        tracing::debug!(
            "Appended {} rows at {}",
            updates.updated_rows.unwrap_or(row_count),
            updates.updated_range.as_deref().unwrap_or("?")
        );
        Ok(updates.updated_rows.unwrap_or(row_count))
    }

    /// A1 range on this worksheet, e.g. `'Products'!1:1`
    fn range(&self, cells: &str) -> String {
        format!("'{}'!{}", self.title.replace('\'', "''"), cells)
    }
}

/// Builds the HTTP client shared by the token, Drive and Sheets calls
fn build_api_client(config: &SheetConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
}

/// Joins percent-encoded path segments onto an API base URL
fn api_url(base: &str, segments: &[&str]) -> SinkResult<Url> {
    let mut url = Url::parse(base).map_err(|e| SinkError::Api {
        operation: "build request URL".to_string(),
        status: 0,
        message: format!("invalid API base '{}': {}", base, e),
    })?;

    url.path_segments_mut()
        .map_err(|_| SinkError::Api {
            operation: "build request URL".to_string(),
            status: 0,
            message: format!("API base '{}' cannot have a path", base),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Turns a non-2xx response into `SinkError::Api` carrying the body text
async fn check(operation: &str, response: Response) -> SinkResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(SinkError::Api {
        operation: operation.to_string(),
        status: status.as_u16(),
        message,
    })
}
