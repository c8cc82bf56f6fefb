use crate::domain::model::{OutputRow, Record};

/// Orders records by (serial, band, channel, test) and numbers them from 1.
pub fn shape_rows(mut records: Vec<Record>) -> Vec<OutputRow> {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| OutputRow::from_record(index + 1, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MeasuredValue;

    fn record(serial: &str, band: &str, channel: &str, test: &str, value: f64) -> Record {
        Record {
            serial_no: serial.to_string(),
            band: band.to_string(),
            channel_spec: channel.to_string(),
            test_name: test.to_string(),
            measured_value: MeasuredValue::Number(value),
        }
    }

    #[test]
    fn test_serial_orders_first() {
        let rows = shape_rows(vec![
            record("B", "n77", "650000/650000", "Throughput (%)", 1.0),
            record("A", "n77", "650000/650000", "Throughput (%)", 2.0),
        ]);
        assert_eq!(rows[0].serial_no, "A");
        assert_eq!(rows[1].serial_no, "B");
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[1].row, 2);
    }

    #[test]
    fn test_full_key_order_is_lexicographic() {
        let rows = shape_rows(vec![
            record("A", "n77", "650000/650000", "Throughput (%)", 1.0),
            record("A", "B12", "23095/5095", "Throughput (%)", 2.0),
            record("A", "B12", "23095/5095", "Max Power (dBm)", 3.0),
            record("A", "B12", "23060/5060", "Throughput (%)", 4.0),
        ]);
        let order: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.group_o_reading.as_number())
            .collect();
        // "B12" < "n77" in byte order
        assert_eq!(order, vec![4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_duplicates_are_kept_in_input_order() {
        let rows = shape_rows(vec![
            record("A", "n77", "1/1", "T", 1.0),
            record("A", "n77", "1/1", "T", 2.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group_o_reading, MeasuredValue::Number(1.0));
        assert_eq!(rows[1].group_o_reading, MeasuredValue::Number(2.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(shape_rows(Vec::new()).is_empty());
    }
}
