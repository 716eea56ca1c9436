//! Listing reports for the admin console and the CLI.
//!
//! Every format goes through the same `CarResource` column mapping, so
//! a price or status reads the same in CSV, JSON and XLSX.

mod resource;
mod writers;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::config::{EXPORT_FILE_STEM, EXPORT_FILE_STEM_ASCII};
use crate::domain::CarListing;
use crate::errors::{AppError, AppResult};

pub use resource::{CarResource, Cell, COLUMNS, MISSING_DESCRIPTION, MISSING_SELLER};
pub use writers::{column_widths, write_csv, write_json, write_xlsx};

/// RFC 5987 `attr-char` minus the alphanumerics
const FILENAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'_')
    .remove(b'-')
    .remove(b'!')
    .remove(b'~');

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::BadRequest(format!(
                "Unsupported export format: {}",
                other
            ))),
        }
    }
}

/// Rendered report ready to be downloaded or written to disk
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub format: ExportFormat,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// `Объявления_CarHub.xlsx`
    pub fn file_name(&self) -> String {
        format!("{}.{}", EXPORT_FILE_STEM, self.format.extension())
    }

    /// `attachment` header with an ASCII fallback and the UTF-8 name
    pub fn content_disposition(&self) -> String {
        let encoded = utf8_percent_encode(&self.file_name(), FILENAME_ESCAPE).to_string();
        format!(
            "attachment; filename=\"{}.{}\"; filename*=UTF-8''{}",
            EXPORT_FILE_STEM_ASCII,
            self.format.extension(),
            encoded
        )
    }
}

/// Render `listings` in the requested format
pub fn export_listings(listings: &[CarListing], format: ExportFormat) -> AppResult<ExportFile> {
    let headers = CarResource::headers();
    let rows = CarResource::rows(listings);

    let bytes = match format {
        ExportFormat::Xlsx => write_xlsx(headers, &rows)?,
        ExportFormat::Csv => write_csv(headers, &rows)?,
        ExportFormat::Json => write_json(headers, &rows)?,
    };

    tracing::debug!(rows = rows.len(), format = format.extension(), "Listings exported");
    Ok(ExportFile {
        format,
        rows: rows.len(),
        bytes,
    })
}
