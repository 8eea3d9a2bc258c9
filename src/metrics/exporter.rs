use std::io::Write;

use parking_lot::Mutex;
use tracing::warn;

use crate::metrics::snapshot::MemoMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for memoizer snapshots.
///
/// Writes in the Prometheus text exposition format so the output can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector.
///
/// ```
/// use memokit::metrics::exporter::PrometheusTextExporter;
/// use memokit::metrics::snapshot::MemoMetricsSnapshot;
/// use memokit::metrics::traits::MetricsExporter;
///
/// let exporter = PrometheusTextExporter::new("fetch", Vec::new());
/// exporter.export(&MemoMetricsSnapshot { hits: 2, misses: 1, ..Default::default() });
/// let text = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(text.contains("fetch_hits_total 2"));
/// ```
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

    /// Consumes the exporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self.writer.lock();
        let written = writeln!(writer, "# TYPE {name} {kind}")
            .and_then(|()| writeln!(writer, "{name} {value}"));
        if let Err(err) = written {
            warn!(metric = %name, error = %err, "failed to write metric");
        }
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<MemoMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &MemoMetricsSnapshot) {
        self.write_metric("counter", "hits_total", snapshot.hits);
        self.write_metric("counter", "misses_total", snapshot.misses);
        self.write_metric("counter", "evictions_total", snapshot.evictions);
        self.write_metric("gauge", "len", snapshot.len as u64);
        self.write_metric("gauge", "capacity", snapshot.capacity as u64);
    }
}
