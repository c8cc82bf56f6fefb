use crate::domain::model::{MeasuredValue, OutputRow, READING_COLUMN, REPORT_COLUMNS};
use crate::utils::error::{EtlError, Result};
use rust_xlsxwriter::{ConditionalFormatCell, ConditionalFormatCellRule, Format, Workbook};

pub const SHEET_NAME: &str = "Sheet3";

/// Rows an xlsx sheet can hold below the header.
const MAX_DATA_ROWS: usize = 1_048_575;

/// "Cell value less than threshold" fill on the reading column. Stops further rule
/// evaluation for a matching cell.
#[derive(Debug, Clone)]
pub struct HighlightRule {
    pub threshold: f64,
    pub fill_color: &'static str,
    pub font_color: &'static str,
}

impl Default for HighlightRule {
    fn default() -> Self {
        Self {
            threshold: 95.0,
            fill_color: "FFC7CE",
            font_color: "9C0006",
        }
    }
}

impl HighlightRule {
    /// Whether Excel will highlight the cell. Blank cells compare as zero and text
    /// never compares below a number.
    pub fn matches(&self, value: &MeasuredValue) -> bool {
        match value {
            MeasuredValue::Number(n) => *n < self.threshold,
            MeasuredValue::Empty => 0.0 < self.threshold,
            MeasuredValue::Text(_) => false,
        }
    }

    fn conditional_format(&self) -> ConditionalFormatCell {
        let format = Format::new()
            .set_font_color(self.font_color)
            .set_background_color(self.fill_color);
        ConditionalFormatCell::new()
            .set_rule(ConditionalFormatCellRule::LessThan(self.threshold))
            .set_format(format)
            .set_stop_if_true(true)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SheetRenderer {
    rule: HighlightRule,
}

impl SheetRenderer {
    /// Builds the report workbook and returns its bytes.
    pub fn render(&self, rows: &[OutputRow]) -> Result<Vec<u8>> {
        if rows.len() > MAX_DATA_ROWS {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "{} rows exceed the {} row limit of a worksheet",
                    rows.len(),
                    MAX_DATA_ROWS
                ),
            });
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, column) in REPORT_COLUMNS.iter().enumerate() {
            worksheet.write_string(0, col as u16, column.header)?;
        }

        for output in rows {
            let row = output.row as u32;
            worksheet.write_string(row, 0, &output.serial_no)?;
            worksheet.write_string(row, 1, &output.band)?;
            worksheet.write_string(row, 2, &output.channel_spec)?;
            worksheet.write_string(row, 3, &output.test_name)?;
            // E, G..J stay blank for manual entry
            match &output.group_o_reading {
                MeasuredValue::Number(n) => {
                    worksheet.write_number(row, READING_COLUMN, *n)?;
                }
                MeasuredValue::Text(s) => {
                    worksheet.write_string(row, READING_COLUMN, s)?;
                }
                MeasuredValue::Empty => {}
            }
        }

        if !rows.is_empty() {
            worksheet.add_conditional_format(
                1,
                READING_COLUMN,
                rows.len() as u32,
                READING_COLUMN,
                &self.rule.conditional_format(),
            )?;
        }

        for (col, column) in REPORT_COLUMNS.iter().enumerate() {
            worksheet.set_column_width(col as u16, column.width)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    pub fn count_highlighted(&self, rows: &[OutputRow]) -> usize {
        rows.iter()
            .filter(|r| self.rule.matches(&r.group_o_reading))
            .count()
    }
}
