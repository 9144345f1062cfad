//! Reading the section table from a spreadsheet export.
//!
//! Expected header: `SectionID, Section, Instructor, Days, Time, Term, Price,
//! Credits, Utility`. `Instructor` and `Utility` may be missing; an absent or
//! empty utility reads as 0.
use crate::section::{Days, ParseDaysError, ParseTermError, Section, Term};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const COL_SECTION_ID: &str = "SectionID";
pub const COL_COURSE: &str = "Section";
pub const COL_INSTRUCTOR: &str = "Instructor";
pub const COL_DAYS: &str = "Days";
pub const COL_TIME: &str = "Time";
pub const COL_TERM: &str = "Term";
pub const COL_PRICE: &str = "Price";
pub const COL_CREDITS: &str = "Credits";
pub const COL_UTILITY: &str = "Utility";

const REQUIRED_COLUMNS: [&str; 7] = [
    COL_SECTION_ID,
    COL_COURSE,
    COL_DAYS,
    COL_TIME,
    COL_TERM,
    COL_PRICE,
    COL_CREDITS,
];

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("worksheet not found: {0}")]
    SheetNotFound(String),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}, column {column}: {message}")]
    InvalidValue { row: usize, column: String, message: String },
}

/// A tabular provider of section rows.
pub trait SectionSource {
    fn read_sections(&self) -> Result<Vec<Section>, SourceError>;
}

/// First worksheet (or a named one) of an `.xlsx` workbook.
#[derive(Debug, Clone)]
pub struct XlsxSource {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, name: impl Into<String>) -> Self {
        self.sheet = Some(name.into());
        self
    }
}

impl SectionSource for XlsxSource {
    fn read_sections(&self) -> Result<Vec<Section>, SourceError> {
        ensure_exists(&self.path)?;
        let book = umya_spreadsheet::reader::xlsx::read(&self.path).map_err(|e| SourceError::Workbook(e.to_string()))?;
        let sheet = match &self.sheet {
            Some(name) => book.get_sheet_by_name(name),
            None => book.get_sheet(&0),
        }
        .ok_or_else(|| SourceError::SheetNotFound(self.sheet.clone().unwrap_or_else(|| "#0".to_string())))?;

        let (max_col, max_row) = sheet.get_highest_column_and_row();
        let mut rows = (1..=max_row).map(|row| {
            (1..=max_col)
                .map(|col| sheet.get_value((col, row)).trim().to_string())
                .collect::<Vec<_>>()
        });
        let header = rows.next().unwrap_or_default();
        let records = to_records(&header, rows);
        info!(path = %self.path.display(), rows = records.len(), "read section workbook");
        parse_records(&records)
    }
}

#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SectionSource for CsvSource {
    fn read_sections(&self) -> Result<Vec<Section>, SourceError> {
        ensure_exists(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let header: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(|v| v.trim().to_string()).collect::<Vec<_>>());
        }
        let records = to_records(&header, rows);
        info!(path = %self.path.display(), rows = records.len(), "read section csv");
        parse_records(&records)
    }
}

/// Pick a reader by file extension.
pub fn source_for(path: &Path) -> Result<Box<dyn SectionSource>, SourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" => Ok(Box::new(XlsxSource::new(path))),
        "csv" => Ok(Box::new(CsvSource::new(path))),
        _ => Err(SourceError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn load_sections(path: &Path) -> Result<Vec<Section>, SourceError> {
    source_for(path)?.read_sections()
}

fn ensure_exists(path: &Path) -> Result<(), SourceError> {
    if path.exists() {
        Ok(())
    } else {
        Err(SourceError::FileNotFound(path.display().to_string()))
    }
}

type Record = HashMap<String, String>;

/// Zip each row with the header, dropping blank rows. Short rows still get
/// every header column, so missing-column checks only depend on the header.
fn to_records(header: &[String], rows: impl IntoIterator<Item = Vec<String>>) -> Vec<(usize, Record)> {
    let mut records = Vec::new();
    for (idx, row) in rows.into_iter().enumerate() {
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        let record: Record = header
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();
        // Header is sheet row 1.
        records.push((idx + 2, record));
    }
    records
}

fn parse_records(records: &[(usize, Record)]) -> Result<Vec<Section>, SourceError> {
    if let Some((_, first)) = records.first() {
        for column in REQUIRED_COLUMNS {
            if !first.contains_key(column) {
                return Err(SourceError::MissingColumn(column.to_string()));
            }
        }
    }
    let sections = records
        .iter()
        .map(|(row, record)| parse_row(*row, record))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(sections = sections.len(), "parsed sections");
    Ok(sections)
}

fn invalid(row: usize, column: &str, message: impl Into<String>) -> SourceError {
    SourceError::InvalidValue {
        row,
        column: column.to_string(),
        message: message.into(),
    }
}

fn text<'r>(record: &'r Record, column: &str) -> &'r str {
    record.get(column).map(String::as_str).unwrap_or("")
}

fn required_text(row: usize, record: &Record, column: &str) -> Result<String, SourceError> {
    let value = text(record, column);
    if value.is_empty() {
        return Err(invalid(row, column, "value is empty"));
    }
    Ok(value.to_string())
}

/// Accepts plain numbers as well as currency formatting like `$2,500.00`.
fn number(row: usize, record: &Record, column: &str, default: Option<f64>) -> Result<f64, SourceError> {
    let raw = text(record, column);
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ',' | ' ')).collect();
    if cleaned.is_empty() {
        return default.ok_or_else(|| invalid(row, column, "value is empty"));
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| invalid(row, column, format!("'{raw}' is not a number")))
}

fn parse_row(row: usize, record: &Record) -> Result<Section, SourceError> {
    let days: Days = text(record, COL_DAYS)
        .parse()
        .map_err(|e: ParseDaysError| invalid(row, COL_DAYS, e.to_string()))?;
    let term: Term = text(record, COL_TERM)
        .parse()
        .map_err(|e: ParseTermError| invalid(row, COL_TERM, e.to_string()))?;

    Ok(Section {
        section_id: required_text(row, record, COL_SECTION_ID)?,
        course_name: required_text(row, record, COL_COURSE)?,
        instructor: text(record, COL_INSTRUCTOR).to_string(),
        days,
        time_slot: required_text(row, record, COL_TIME)?,
        term,
        price: number(row, record, COL_PRICE, None)?,
        credits: number(row, record, COL_CREDITS, None)?,
        utility: number(row, record, COL_UTILITY, Some(0.0))?,
    })
}
