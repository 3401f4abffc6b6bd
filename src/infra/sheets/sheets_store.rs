// =============================================================================
// GOOGLE SHEETS SUBMISSION STORE
// =============================================================================
//
// One spreadsheet range holds every accepted submission, one row each, in the
// canonical column order (A..H). Rows are appended with
// `valueInputOption=USER_ENTERED` and read back with `values.get`. Cells that
// would parse as a formula get a leading `'` so they are stored as text.
//
// Sheets API reference:
// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values

use super::service_account::{AccessTokenSource, SheetsError};
use crate::core::submissions::{StoreError, StoreStatus, SubmissionRecord, SubmissionStore};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEET_RANGE: &str = "Sheet1!A:H";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Thin client for the three Sheets calls we make.
pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleSheetsClient {
    pub fn new(client: Client, spreadsheet_id: String, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            client,
            base_url: SHEETS_API_BASE.to_string(),
            spreadsheet_id,
            tokens,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// `{base}/v4/spreadsheets/{id}/{tail...}` with each segment escaped.
    fn endpoint(&self, tail: &[&str]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| SheetsError::Http(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Http(format!("cannot be a base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(tail);
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(SheetsError::Status { status, body })
    }

    pub async fn append_row(&self, range: &str, row: Vec<String>) -> Result<(), SheetsError> {
        let mut url = self.endpoint(&["values", &format!("{}:append", range)])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }

    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.endpoint(&["values", range])?;
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        let body: ValueRange = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Malformed(e.to_string()))?;
        Ok(body.values)
    }

    pub async fn sheet_titles(&self) -> Result<Vec<String>, SheetsError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        let metadata: SpreadsheetMetadata = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Malformed(e.to_string()))?;
        Ok(metadata
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }
}

impl From<SheetsError> for StoreError {
    fn from(err: SheetsError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// A header row written by hand is skipped when reading.
fn is_header(row: &[String]) -> bool {
    row.first()
        .is_some_and(|cell| cell.trim().eq_ignore_ascii_case("promptId"))
}

pub struct GoogleSheetsSubmissionStore {
    sheets: GoogleSheetsClient,
    range: String,
}

impl GoogleSheetsSubmissionStore {
    pub fn new(sheets: GoogleSheetsClient, range: String) -> Self {
        Self { sheets, range }
    }
}

/// Quote user text that USER_ENTERED would otherwise evaluate.
fn literal_cell(cell: String) -> String {
    if cell.starts_with(['=', '+', '-', '@']) {
        format!("'{cell}")
    } else {
        cell
    }
}

#[async_trait]
impl SubmissionStore for GoogleSheetsSubmissionStore {
    async fn append(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let row = record.to_row().into_iter().map(literal_cell).collect();
        self.sheets.append_row(&self.range, row).await?;
        tracing::debug!(
            prompt_id = %record.prompt_id,
            spreadsheet = %self.sheets.spreadsheet_id(),
            "Appended submission row"
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        let rows = self.sheets.get_values(&self.range).await?;
        Ok(rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_empty() && !is_header(row))
            .map(|(index, row)| SubmissionRecord::from_row(index, row))
            .collect())
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        let available_sheets = self.sheets.sheet_titles().await?;
        let row_count = self.list().await?.len();
        Ok(StoreStatus {
            backend: "google_sheets".to_string(),
            location: format!("{} ({})", self.sheets.spreadsheet_id(), self.range),
            row_count,
            available_sheets,
        })
    }
}
