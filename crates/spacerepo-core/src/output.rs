use std::sync::{Arc, Mutex};

use tracing::info;

/// Line-oriented destination for command output.
///
/// Each call to [`OutputSink::print`] is one output line.
pub trait OutputSink: Send + Sync {
    fn print(&self, line: &str);
}

/// Shared handle to an output sink.
pub type OutputHandle = Arc<dyn OutputSink>;

/// Writes lines as `INFO` events; the CLI's formatter renders those bare on
/// stdout.
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn print(&self, line: &str) {
        info!("{line}");
    }
}

/// Collector sink that stores all printed lines for inspection.
#[derive(Default)]
pub struct CollectorSink {
    lines: Mutex<Vec<String>>,
}

impl CollectorSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutputSink for CollectorSink {
    fn print(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
