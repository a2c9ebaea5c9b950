use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::SnapshotMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for snapshot cache metrics.
///
/// Writes in the Prometheus text exposition format so it can be scraped by
/// Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_counter(&self, name: &str, value: u64) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} counter", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_gauge(&self, name: &str, value: u64) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} gauge", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<SnapshotMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &SnapshotMetricsSnapshot) {
        self.write_counter(
            &self.metric_name("refresh_calls_total"),
            snapshot.refresh_calls,
        );
        self.write_counter(
            &self.metric_name("refreshes_completed_total"),
            snapshot.refreshes_completed,
        );
        self.write_counter(
            &self.metric_name("refreshes_skipped_total"),
            snapshot.refreshes_skipped,
        );
        self.write_counter(
            &self.metric_name("records_copied_total"),
            snapshot.records_copied,
        );
        self.write_counter(
            &self.metric_name("duplicates_dropped_total"),
            snapshot.duplicates_dropped,
        );
        self.write_counter(&self.metric_name("sort_changes_total"), snapshot.sort_changes);
        self.write_counter(
            &self.metric_name("record_at_calls_total"),
            snapshot.record_at_calls,
        );
        self.write_counter(
            &self.metric_name("record_at_hits_total"),
            snapshot.record_at_hits,
        );
        self.write_counter(&self.metric_name("row_of_calls_total"), snapshot.row_of_calls);
        self.write_counter(&self.metric_name("row_of_hits_total"), snapshot.row_of_hits);
        self.write_gauge(&self.metric_name("rows"), snapshot.len as u64);
        self.write_gauge(&self.metric_name("generation"), snapshot.generation);
    }
}
