use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SERIAL_NO: &str = "Serial_No";
pub const BAND: &str = "Band";
pub const CHANNEL_SPEC: &str = "UL_DL_Chans";
pub const TEST_NAME: &str = "Test";
pub const MEAS_VALUE: &str = "MeasValue";

/// Fields every input file must expose, in projection order.
pub const REQUIRED_FIELDS: [&str; 5] = [SERIAL_NO, BAND, CHANNEL_SPEC, TEST_NAME, MEAS_VALUE];

/// A reading as it appeared in the XML: numeric when it parses as a finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasuredValue {
    Number(f64),
    Text(String),
    Empty,
}

impl MeasuredValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return MeasuredValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => MeasuredValue::Number(number),
            _ => MeasuredValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            MeasuredValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// One `TestStep` measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub serial_no: String,
    pub band: String,
    pub channel_spec: String,
    pub test_name: String,
    pub measured_value: MeasuredValue,
}

impl Record {
    /// Projects a parsed row onto the five report fields. Absent fields become empty.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        let text = |name: &str| fields.get(name).cloned().unwrap_or_default();
        Self {
            serial_no: text(SERIAL_NO),
            band: text(BAND),
            channel_spec: text(CHANNEL_SPEC),
            test_name: text(TEST_NAME),
            measured_value: fields
                .get(MEAS_VALUE)
                .map(|raw| MeasuredValue::parse(raw))
                .unwrap_or(MeasuredValue::Empty),
        }
    }

    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            self.serial_no.as_str(),
            self.band.as_str(),
            self.channel_spec.as_str(),
            self.test_name.as_str(),
        )
    }
}

/// A report line. The reserved columns are filled in by hand after export and are
/// always written empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    /// 1-based position among data rows.
    pub row: usize,
    pub serial_no: String,
    pub band: String,
    pub channel_spec: String,
    pub test_name: String,
    pub original_reading: Option<MeasuredValue>,
    pub group_o_reading: MeasuredValue,
    pub applies: Option<String>,
    pub rf1: Option<String>,
    pub rf6: Option<String>,
    pub rf12: Option<String>,
}

impl OutputRow {
    pub fn from_record(row: usize, record: Record) -> Self {
        Self {
            row,
            serial_no: record.serial_no,
            band: record.band,
            channel_spec: record.channel_spec,
            test_name: record.test_name,
            original_reading: None,
            group_o_reading: record.measured_value,
            applies: None,
            rf1: None,
            rf6: None,
            rf12: None,
        }
    }
}

/// Header, column letter and width of one report column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportColumn {
    pub header: &'static str,
    pub letter: char,
    pub width: f64,
}

const fn column(header: &'static str, letter: char, width: f64) -> ReportColumn {
    ReportColumn {
        header,
        letter,
        width,
    }
}

pub const REPORT_COLUMNS: [ReportColumn; 10] = [
    column("Serial_No", 'A', 16.0),
    column("Band", 'B', 8.0),
    column("UL_DL_Chans", 'C', 16.0),
    column("Test", 'D', 18.0),
    column("Original Reading", 'E', 18.0),
    column("GroupO's Reading", 'F', 18.0),
    column("Applies", 'G', 10.0),
    column("RF1", 'H', 8.0),
    column("RF6", 'I', 8.0),
    column("RF12", 'J', 8.0),
];

/// Zero-based index of the highlighted reading column (F).
pub const READING_COLUMN: u16 = 5;

/// Per-band channel allow-list. A band that is not listed keeps every channel, and so
/// does a band listed with no channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelAllowList(BTreeMap<String, Vec<String>>);

impl ChannelAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_band<I, S>(mut self, band: &str, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(band, channels);
        self
    }

    pub fn insert<I, S>(&mut self, band: &str, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(band.to_string())
            .or_default()
            .extend(channels.into_iter().map(Into::into));
    }

    pub fn allows(&self, band: &str, channel: &str) -> bool {
        match self.0.get(band) {
            None => true,
            Some(allowed) if allowed.is_empty() => true,
            Some(allowed) => allowed.iter().any(|c| c == channel),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bands(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub rows: Vec<OutputRow>,
    pub records_in: usize,
    pub records_dropped: usize,
}
