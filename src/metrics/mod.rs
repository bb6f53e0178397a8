use serde_json::json;

use crate::logging::{LogEvent, LogFields, LogLevel};

/// Counters for the layout engine's hot paths.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    saves: u64,
    previews: u64,
    packs: u64,
    tiles_written: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_save(&mut self, tiles: usize) {
        self.saves = self.saves.saturating_add(1);
        self.tiles_written = self.tiles_written.saturating_add(tiles as u64);
    }

    pub fn record_preview(&mut self) {
        self.previews = self.previews.saturating_add(1);
    }

    pub fn record_pack(&mut self) {
        self.packs = self.packs.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            saves: self.saves,
            previews: self.previews,
            packs: self.packs,
            tiles_written: self.tiles_written,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub saves: u64,
    pub previews: u64,
    pub packs: u64,
    pub tiles_written: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        let mut fields = LogFields::new();
        fields.insert("saves".to_string(), json!(self.saves));
        fields.insert("previews".to_string(), json!(self.previews));
        fields.insert("packs".to_string(), json!(self.packs));
        fields.insert("tiles_written".to_string(), json!(self.tiles_written));
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", fields)
    }
}
