// Google Sheets backed submission storage.
//
// `service_account` turns a service-account key into bearer tokens;
// `sheets_store` uses them to append and read rows.

pub mod service_account;
pub mod sheets_store;

pub use service_account::{ServiceAccountAuth, ServiceAccountSource};
pub use sheets_store::{GoogleSheetsClient, GoogleSheetsSubmissionStore, DEFAULT_SHEET_RANGE};
