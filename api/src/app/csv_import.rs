//! CSV ingestion for maintenance tracker exports
//!
//! Turns the raw bytes of an upload into normalized [`ItemRecord`]s and the
//! row issues found along the way. Nothing here touches storage.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::domain::entities::{AdjustedUnit, ItemRecord, RowIssue, KNOWN_ITEM_TYPES};
use crate::error::CsvImportError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Cell values treated as absent, in addition to the empty string
const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Date layouts accepted in date columns, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Columns every upload must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    ItemCode,
    Position,
    Description,
    Type,
    IntervalMonths,
    IntervalHours,
    IntervalLandings,
    AdjustedInterval,
    PartNumber,
    PartSerial,
    LastCompletedDate,
    LastCompletedHours,
    LastCompletedLandings,
    LastCompletedCity,
    DueNextDate,
    DueNextHours,
    DueNextLandings,
    TimeRemaining,
    HoursRemaining,
    LandingsRemaining,
    Status,
    StatusNote,
}

impl Column {
    pub const ALL: [Column; 22] = [
        Column::ItemCode,
        Column::Position,
        Column::Description,
        Column::Type,
        Column::IntervalMonths,
        Column::IntervalHours,
        Column::IntervalLandings,
        Column::AdjustedInterval,
        Column::PartNumber,
        Column::PartSerial,
        Column::LastCompletedDate,
        Column::LastCompletedHours,
        Column::LastCompletedLandings,
        Column::LastCompletedCity,
        Column::DueNextDate,
        Column::DueNextHours,
        Column::DueNextLandings,
        Column::TimeRemaining,
        Column::HoursRemaining,
        Column::LandingsRemaining,
        Column::Status,
        Column::StatusNote,
    ];

    /// Header text as exported by the tracker
    pub fn header(self) -> &'static str {
        match self {
            Column::ItemCode => "Item Code",
            Column::Position => "Position",
            Column::Description => "Description",
            Column::Type => "Type",
            Column::IntervalMonths => "Interval Months",
            Column::IntervalHours => "Interval Hours",
            Column::IntervalLandings => "Interval Landings",
            Column::AdjustedInterval => "Adjusted Interval",
            Column::PartNumber => "Part Number",
            Column::PartSerial => "Part Serial",
            Column::LastCompletedDate => "Last Completed Date",
            Column::LastCompletedHours => "Last Completed Hours",
            Column::LastCompletedLandings => "Last Completed Landings",
            Column::LastCompletedCity => "Last Completed City",
            Column::DueNextDate => "Due Next Date",
            Column::DueNextHours => "Due Next Hours",
            Column::DueNextLandings => "Due Next Landings",
            Column::TimeRemaining => "Time Remaining",
            Column::HoursRemaining => "Hours Remaining",
            Column::LandingsRemaining => "Landings Remaining",
            Column::Status => "Status",
            Column::StatusNote => "Status Note",
        }
    }
}

/// One data row, with cells in [`Column::ALL`] order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 0-based index among data rows
    pub index: usize,
    cells: Vec<Option<String>>,
}

impl RawRow {
    pub fn cell(&self, column: Column) -> Option<&str> {
        self.cells
            .get(column as usize)
            .and_then(|c| c.as_deref())
    }
}

/// A row after normalization, with the warnings raised while normalizing
#[derive(Debug, Clone)]
pub struct SanitizedRow {
    pub index: usize,
    pub record: ItemRecord,
    pub issues: Vec<RowIssue>,
}

/// Read an upload into raw rows.
///
/// Requires a header row containing every column of [`Column::ALL`]; other
/// columns are ignored. Short rows yield absent cells.
pub fn parse_csv(content: &[u8]) -> Result<Vec<RawRow>, CsvImportError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(CsvImportError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let positions: Vec<Option<usize>> = Column::ALL
        .iter()
        .map(|c| headers.iter().position(|h| h == c.header()))
        .collect();

    let missing: Vec<String> = Column::ALL
        .iter()
        .zip(&positions)
        .filter(|(_, p)| p.is_none())
        .map(|(c, _)| c.header().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CsvImportError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.byte_records().enumerate() {
        let record = record?;
        let cells = positions
            .iter()
            .map(|p| {
                p.and_then(|i| record.get(i))
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .filter(|v| !is_missing(v))
            })
            .collect();
        rows.push(RawRow { index, cells });
    }

    Ok(rows)
}

/// Normalize one raw row
pub fn sanitize(row: &RawRow) -> SanitizedRow {
    let mut issues = Vec::new();
    let text = |c: Column| clean_text(row.cell(c));
    let int = |c: Column| to_int(row.cell(c));

    let mut date = |c: Column, field: &str| {
        let raw = text(c);
        match parse_date(raw.as_deref()) {
            Ok(d) => d,
            Err(()) => {
                issues.push(RowIssue::warning(
                    row.index,
                    field,
                    format!("Unrecognized date '{}'", raw.unwrap_or_default()),
                ));
                None
            }
        }
    };
    let last_completed_date = date(Column::LastCompletedDate, "last_completed_date");
    let due_next_date = date(Column::DueNextDate, "due_next_date");

    let (adjusted_value, adjusted_unit, adjusted_delta) =
        parse_adjusted_interval(text(Column::AdjustedInterval).as_deref());

    let time_remaining_text = text(Column::TimeRemaining);
    let (months_remaining, days_remaining, is_overdue_time) =
        parse_time_remaining(time_remaining_text.as_deref());

    let mut record = ItemRecord {
        item_code: text(Column::ItemCode),
        position: text(Column::Position),
        description: text(Column::Description),
        item_type: clean_text(row.cell(Column::Type).map(str::to_lowercase).as_deref()),
        interval_months: int(Column::IntervalMonths),
        interval_hours: int(Column::IntervalHours),
        interval_landings: int(Column::IntervalLandings),
        adjusted_value,
        adjusted_unit,
        adjusted_delta,
        part_number: text(Column::PartNumber),
        part_serial: text(Column::PartSerial),
        last_completed_date,
        last_completed_hours: int(Column::LastCompletedHours),
        last_completed_landings: int(Column::LastCompletedLandings),
        last_completed_city: text(Column::LastCompletedCity),
        due_next_date,
        due_next_hours: int(Column::DueNextHours),
        due_next_landings: int(Column::DueNextLandings),
        time_remaining_text,
        months_remaining,
        days_remaining,
        is_overdue_time,
        hours_remaining: first_integer(text(Column::HoursRemaining).as_deref()),
        landings_remaining: first_integer(text(Column::LandingsRemaining).as_deref()),
        status: text(Column::Status),
        status_note: text(Column::StatusNote),
        fingerprint: String::new(),
    };
    record.fingerprint = fingerprint(&record);

    SanitizedRow {
        index: row.index,
        record,
        issues,
    }
}

/// Business checks on a normalized row
pub fn validate(row_index: usize, record: &ItemRecord) -> Vec<RowIssue> {
    let mut issues = Vec::new();

    if record.description.is_none() {
        issues.push(RowIssue::error(
            row_index,
            "description",
            "Description is required.",
        ));
    }

    for (field, value) in record.non_negative_fields() {
        if value.is_some_and(|v| v < 0) {
            issues.push(RowIssue::error(row_index, field, "Must be >= 0."));
        }
    }

    if let Some(t) = &record.item_type {
        if !KNOWN_ITEM_TYPES.contains(&t.as_str()) {
            issues.push(RowIssue::warning(
                row_index,
                "type",
                format!("Invalid type '{}'.", t),
            ));
        }
    }

    if let (Some(last), Some(due)) = (record.last_completed_date, record.due_next_date) {
        if due < last {
            issues.push(RowIssue::warning(
                row_index,
                "due_next_date",
                "Due Next Date is before Last Completed Date.",
            ));
        }
    }

    issues
}

/// Hash of the fields that identify an item within one upload
pub fn fingerprint(record: &ItemRecord) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let number = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();

    let parts = [
        text(&record.item_code),
        text(&record.position),
        text(&record.description),
        text(&record.item_type),
        text(&record.part_number),
        text(&record.part_serial),
        number(record.interval_months),
        number(record.interval_hours),
        number(record.interval_landings),
    ];

    let mut hasher = Sha256::new();
    hasher.update(parts.join("||").as_bytes());
    hex::encode(hasher.finalize())
}

/// SHA-256 of an uploaded file
pub fn file_sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || MISSING_TOKENS.contains(&value)
}

/// Trim, drop tab characters, and treat empty as absent
fn clean_text(value: Option<&str>) -> Option<String> {
    let cleaned = value?.trim().replace('\t', "");
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Parse a number, ignoring thousands separators and truncating decimals
fn to_int(value: Option<&str>) -> Option<i64> {
    let cleaned = value?.replace(',', "");
    let parsed: f64 = cleaned.trim().parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    let truncated = parsed.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

fn adjusted_interval_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+)\s*(hrs|hr|ldgs|ldg|c)?\s*\(\s*([-+]?\d+)\s*\)")
            .expect("adjusted interval pattern is valid")
    })
}

fn months_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(-?\d+)\s*m").expect("months pattern is valid"))
}

fn days_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(-?\d+)\s*d").expect("days pattern is valid"))
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+").expect("integer pattern is valid"))
}

/// Parse `"<value> [unit] (<delta>)"`, e.g. `"600 hrs (+50)"`
fn parse_adjusted_interval(
    value: Option<&str>,
) -> (Option<i64>, Option<AdjustedUnit>, Option<i64>) {
    let Some(value) = value else {
        return (None, None, None);
    };
    let normalized = value.to_lowercase().replace(',', "");
    let Some(caps) = adjusted_interval_re().captures(normalized.trim()) else {
        return (None, None, None);
    };

    let (Ok(amount), Ok(delta)) = (caps[1].parse::<i64>(), caps[3].parse::<i64>()) else {
        return (None, None, None);
    };
    let unit = caps.get(2).and_then(|u| u.as_str().parse().ok());

    (Some(amount), unit, Some(delta))
}

/// Parse free text like `"3m 12d"` or `"-1 mo -4 d"` into months, days and
/// whether the item is overdue by time
fn parse_time_remaining(value: Option<&str>) -> (Option<i64>, Option<i64>, Option<bool>) {
    let Some(value) = value else {
        return (None, None, None);
    };
    let normalized = value.to_lowercase();
    let normalized = normalized.trim();

    let capture = |re: &Regex| {
        re.captures(normalized)
            .and_then(|c| c[1].parse::<i64>().ok())
    };
    let months = capture(months_re());
    let days = capture(days_re());
    let overdue = months.is_some_and(|m| m < 0) || days.is_some_and(|d| d < 0);

    (months, days, Some(overdue))
}

/// First signed integer in the text, e.g. `"1,250 hrs"` gives 1250
fn first_integer(value: Option<&str>) -> Option<i64> {
    let normalized = value?.to_lowercase().replace(',', "");
    integer_re()
        .find(normalized.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Absent input is `Ok(None)`; text in no known layout is `Err(())`
fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, ()> {
    let Some(value) = value else {
        return Ok(None);
    };

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(Some(date));
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(dt.date()));
        }
    }

    Err(())
}
