//! CSV report file writer

use super::{format_number, format_values};
use crate::{
    error::{AppError, ErrorContext, Result},
    models::{AggregateRecord, Config, Summary},
    types::Protocol,
};
use chrono::{DateTime, Local};
use csv::{QuoteStyle, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Columns present in every report
pub const REPORT_COLUMNS: &[&str] = &[
    "protocol",
    "buffer_size",
    "bandwidth_mbps",
    "throughput_values",
    "min",
    "max",
    "mean",
    "std",
    "sender_min",
    "sender_max",
    "sender_mean",
    "sender_std",
];

/// Columns appended when any record carries link bitrate statistics
pub const BITRATE_COLUMNS: &[&str] = &[
    "bitrate_change_min",
    "bitrate_change_max",
    "bitrate_change_mean",
    "bitrate_change_std",
];

/// Writes one header row plus one row per aggregate record
#[derive(Debug, Clone)]
pub struct ReportWriter {
    protocol: Protocol,
    output_dir: PathBuf,
    output_file: Option<PathBuf>,
}

impl ReportWriter {
    /// Write generated file names into `output_dir`
    pub fn new<P: Into<PathBuf>>(protocol: Protocol, output_dir: P) -> Self {
        Self {
            protocol,
            output_dir: output_dir.into(),
            output_file: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.protocol, config.output_dir.clone()).with_output_file(config.output_file.clone())
    }

    /// Write to a fixed path instead of a generated one
    pub fn with_output_file(mut self, output_file: Option<PathBuf>) -> Self {
        self.output_file = output_file;
        self
    }

    /// `iperf3_results_<PROTOCOL>_<YYYYmmdd_HHMMSS>.csv`
    pub fn generate_file_name(protocol: Protocol, timestamp: &DateTime<Local>) -> String {
        format!("iperf3_results_{}_{}.csv", protocol, timestamp.format("%Y%m%d_%H%M%S"))
    }

    /// Destination for a report produced at `timestamp`
    pub fn target_path(&self, timestamp: &DateTime<Local>) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => self.output_dir.join(Self::generate_file_name(self.protocol, timestamp)),
        }
    }

    /// Write the report and return the path it was written to
    pub fn write(&self, records: &[AggregateRecord]) -> Result<PathBuf> {
        let path = self.target_path(&Local::now());
        Self::ensure_parent(&path)?;

        let file = fs::File::create(&path)
            .map_err(|e| AppError::report(format!("Cannot create {}: {}", path.display(), e)))?;
        Self::write_to(file, records).with_context(|| format!("Writing {}", path.display()))?;

        Ok(path)
    }

    /// Write the report to any writer
    pub fn write_to<W: Write>(writer: W, records: &[AggregateRecord]) -> Result<()> {
        let with_bitrate = records.iter().any(|r| r.bitrate_change.is_some());

        // The sample list carries its own quotes; no other field needs any
        let mut csv = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);

        let mut header: Vec<&str> = REPORT_COLUMNS.to_vec();
        if with_bitrate {
            header.extend_from_slice(BITRATE_COLUMNS);
        }
        csv.write_record(&header)?;

        for record in records {
            csv.write_record(&Self::row(record, with_bitrate))?;
        }

        csv.flush()?;
        Ok(())
    }

    fn row(record: &AggregateRecord, with_bitrate: bool) -> Vec<String> {
        let configuration = &record.configuration;
        let mut row = vec![
            configuration.protocol.to_string(),
            configuration.buffer_size.to_string(),
            configuration.bandwidth_mbps.to_string(),
            format!("\"{}\"", format_values(&record.throughput_values())),
        ];
        push_summary(&mut row, &record.throughput);
        push_summary(&mut row, &record.sender);

        if with_bitrate {
            // Records without probe data still fill the columns
            push_summary(&mut row, &record.bitrate_change.unwrap_or_default());
        }
        row
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .map_err(|e| AppError::report(format!("Cannot create directory {}: {}", parent.display(), e))),
            _ => Ok(()),
        }
    }
}

fn push_summary(row: &mut Vec<String>, summary: &Summary) {
    row.push(format_number(summary.min));
    row.push(format_number(summary.max));
    row.push(format_number(summary.mean));
    row.push(format_number(summary.std_dev));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TestConfiguration, ThroughputSample};
    use crate::stats::Aggregator;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn record(protocol: Protocol, buffer_size: u32, values: &[f64]) -> AggregateRecord {
        let samples = values.iter().map(|&v| ThroughputSample::new(v, v + 1.0)).collect();
        Aggregator::aggregate_samples(TestConfiguration::new(protocol, buffer_size, 30), samples, values.len() as u32)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_generate_file_name() {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            ReportWriter::generate_file_name(Protocol::Udp, &timestamp),
            "iperf3_results_UDP_20240309_140507.csv"
        );
    }

    #[test]
    fn test_target_path() {
        let timestamp = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let writer = ReportWriter::new(Protocol::Tcp, "out");
        assert_eq!(
            writer.target_path(&timestamp),
            PathBuf::from("out/iperf3_results_TCP_20240101_000000.csv")
        );

        let writer = writer.with_output_file(Some(PathBuf::from("fixed.csv")));
        assert_eq!(writer.target_path(&timestamp), PathBuf::from("fixed.csv"));
    }

    #[test]
    fn test_report_round_trip() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record(Protocol::Tcp, 1000, &[93.05, 94.12, 92.7]),
            record(Protocol::Tcp, 2000, &[]),
            record(Protocol::Tcp, 3000, &[88.0]),
        ];

        let writer = ReportWriter::new(Protocol::Tcp, dir.path().join("nested"));
        let path = writer.write(&records).unwrap();
        assert!(path.starts_with(dir.path().join("nested")));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, REPORT_COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), records.len());

        for (row, record) in rows.iter().zip(&records) {
            assert_eq!(&row[0], "TCP");
            assert_eq!(row[1].parse::<u32>().unwrap(), record.configuration.buffer_size);
            assert_eq!(&row[2], "30");

            let values: Vec<f64> = row[3]
                .split(';')
                .filter(|v| !v.is_empty())
                .map(|v| v.parse().unwrap())
                .collect();
            assert_eq!(values, record.throughput_values());

            let stats: Vec<f64> = (4..12).map(|i| row[i].parse().unwrap()).collect();
            assert!(close(stats[0], record.min()));
            assert!(close(stats[1], record.max()));
            assert!(close(stats[2], record.mean()));
            assert!(close(stats[3], record.std_dev()));
            assert!(close(stats[6], record.sender.mean));
        }

        // Zero-filled row
        assert_eq!(&rows[1][3], "");
        assert_eq!(&rows[1][4], "0");
    }

    #[test]
    fn test_sample_list_is_quoted() {
        let mut buffer = Vec::new();
        ReportWriter::write_to(&mut buffer, &[record(Protocol::Udp, 1400, &[29.5, 29.75])]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), REPORT_COLUMNS.join(","));
        assert!(lines.next().unwrap().starts_with("UDP,1400,30,\"29.5;29.75\","));
    }

    #[test]
    fn test_single_and_empty_sample_lists_are_quoted() {
        let mut buffer = Vec::new();
        ReportWriter::write_to(
            &mut buffer,
            &[record(Protocol::Tcp, 1000, &[88.0]), record(Protocol::Tcp, 2000, &[])],
        )
        .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();

        assert_eq!(rows[0], "TCP,1000,30,\"88\",88,88,88,0,89,89,89,0");
        assert_eq!(rows[1], "TCP,2000,30,\"\",0,0,0,0,0,0,0,0");
    }

    #[test]
    fn test_bitrate_columns_only_when_probed() {
        let plain = record(Protocol::Tcp, 1000, &[90.0]);
        let samples = vec![ThroughputSample::new(90.0, 91.0).with_bitrate_change(Some(-13.5))];
        let probed = Aggregator::aggregate_samples(TestConfiguration::new(Protocol::Tcp, 2000, 30), samples, 1);

        let mut buffer = Vec::new();
        ReportWriter::write_to(&mut buffer, &[plain.clone()]).unwrap();
        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        assert_eq!(reader.headers().unwrap().len(), REPORT_COLUMNS.len());

        let mut buffer = Vec::new();
        ReportWriter::write_to(&mut buffer, &[plain, probed]).unwrap();
        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        assert_eq!(reader.headers().unwrap().len(), REPORT_COLUMNS.len() + BITRATE_COLUMNS.len());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][12], "0");
        assert_eq!(&rows[1][12], "-13.5");
        assert_eq!(&rows[1][14], "-13.5");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_failure_names_the_report_path() {
        let writer = ReportWriter::new(Protocol::Tcp, "unused").with_output_file(Some(PathBuf::from("/dev/full")));

        let error = writer.write(&[record(Protocol::Tcp, 1000, &[90.0])]).unwrap_err();
        assert_eq!(error.exit_code(), 5);
        assert!(error.to_string().contains("Writing /dev/full"));
    }

    #[test]
    fn test_empty_record_list_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("only-header.csv");
        let writer = ReportWriter::new(Protocol::Tcp, dir.path()).with_output_file(Some(path.clone()));

        assert_eq!(writer.write(&[]).unwrap(), path);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
