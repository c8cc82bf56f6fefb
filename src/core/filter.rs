use crate::domain::model::{ChannelAllowList, Record};
use crate::domain::ports::ConfigProvider;
use std::collections::HashSet;

/// Keeps the records whose test is allow-listed and whose channel passes the
/// per-band channel list. Each record is classified on its own.
#[derive(Debug, Clone)]
pub struct RowFilter {
    tests: HashSet<String>,
    channels: Option<ChannelAllowList>,
}

impl RowFilter {
    pub fn new<I, S>(tests: I, channels: Option<ChannelAllowList>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tests: tests.into_iter().map(Into::into).collect(),
            channels: channels.filter(|c| !c.is_empty()),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(
            config.tests_to_include().iter().cloned(),
            config.channels_keep().cloned(),
        )
    }

    pub fn keep(&self, record: &Record) -> bool {
        if !self.tests.contains(&record.test_name) {
            return false;
        }
        self.channels
            .as_ref()
            .map_or(true, |c| c.allows(&record.band, &record.channel_spec))
    }

    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.keep(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MeasuredValue;

    fn record(serial: &str, band: &str, channel: &str, test: &str) -> Record {
        Record {
            serial_no: serial.to_string(),
            band: band.to_string(),
            channel_spec: channel.to_string(),
            test_name: test.to_string(),
            measured_value: MeasuredValue::Number(97.0),
        }
    }

    #[test]
    fn test_drops_tests_not_in_allow_list() {
        let filter = RowFilter::new(["Max Power (dBm)"], None);
        let kept = filter.apply(vec![
            record("A", "n77", "650000/650000", "Max Power (dBm)"),
            record("A", "n77", "650000/650000", "Sensitivity (dBm)"),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].test_name, "Max Power (dBm)");
    }

    #[test]
    fn test_channel_allow_list_only_narrows_listed_bands() {
        let channels = ChannelAllowList::new().with_band("n77", ["650000/650000"]);
        let filter = RowFilter::new(["Throughput (%)"], Some(channels));

        assert!(filter.keep(&record("A", "n77", "650000/650000", "Throughput (%)")));
        assert!(!filter.keep(&record("A", "n77", "651000/651000", "Throughput (%)")));
        assert!(filter.keep(&record("A", "B12", "23095/5095", "Throughput (%)")));
    }

    #[test]
    fn test_band_with_empty_list_keeps_all_channels() {
        let channels = ChannelAllowList::new().with_band("B5", Vec::<String>::new());
        let filter = RowFilter::new(["Throughput (%)"], Some(channels));
        assert!(filter.keep(&record("A", "B5", "20525/2525", "Throughput (%)")));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let channels = ChannelAllowList::new().with_band("n77", ["650000/650000"]);
        let filter = RowFilter::new(["Max Power (dBm)", "Throughput (%)"], Some(channels));
        let input = vec![
            record("B", "n77", "650000/650000", "Throughput (%)"),
            record("A", "n77", "651000/651000", "Throughput (%)"),
            record("A", "B12", "23095/5095", "Max Power (dBm)"),
            record("C", "B12", "23095/5095", "ACLR (dB)"),
        ];

        let once = filter.apply(input);
        let twice = filter.apply(once.clone());
        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }
}
