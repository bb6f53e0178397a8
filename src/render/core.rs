use std::collections::{HashMap, HashSet};

use blake3::Hash;

use crate::layout::pack::{RegionBuild, RegionItem};

/// Markup knobs for the region renderer.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Class prefix for generated wrappers, e.g. `tiles` yields
    /// `tiles-region` / `tiles-row` / `tile`.
    pub class_prefix: String,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            class_prefix: "tiles".to_string(),
        }
    }
}

/// Renders a packed region into deterministic HTML.
///
/// The markup carries the `data-` attributes the editing client reads back
/// when it builds a manifest from DOM state: module, delta, width, offset
/// and one `data-width-<breakpoint>` per override.
#[derive(Debug, Default)]
pub struct RegionRenderer {
    settings: RendererSettings,
}

impl RegionRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    pub fn render_region(&self, name: &str, region: &RegionBuild) -> String {
        let prefix = &self.settings.class_prefix;
        let mut out = String::new();
        out.push_str(&format!(
            "<div class=\"{prefix}-region\" data-name=\"{name}\">\n"
        ));

        // Foreign content keeps its flat placement ahead of the packed rows.
        for item in &region.items {
            out.push_str(&item.body);
            out.push('\n');
        }

        for row in &region.rows {
            out.push_str(&format!("<div class=\"{prefix}-row\">\n"));
            for item in row {
                self.render_tile(&mut out, item);
            }
            out.push_str("</div>\n");
        }

        out.push_str("</div>\n");
        out
    }

    fn render_tile(&self, out: &mut String, item: &RegionItem) {
        let Some(tile) = item.tile.as_ref() else {
            out.push_str(&item.body);
            out.push('\n');
            return;
        };

        let mut attrs = format!(
            "data-module=\"{}\" data-delta=\"{}\" data-width=\"{}\" data-offset=\"{}\"",
            tile.module, tile.delta, tile.width, tile.offset
        );
        for (breakpoint, width) in &tile.breakpoints {
            attrs.push_str(&format!(" data-width-{breakpoint}=\"{width}\""));
        }

        out.push_str(&format!(
            "<div class=\"tile width-{} offset-{}\" {}>\n{}\n</div>\n",
            tile.width, tile.offset, attrs, item.body
        ));
    }
}

#[derive(Debug, Clone)]
struct RegionState {
    content: String,
    hash: Option<Hash>,
    is_dirty: bool,
}

impl RegionState {
    fn new() -> Self {
        Self {
            content: String::new(),
            hash: None,
            is_dirty: true,
        }
    }

    fn update_content(&mut self, content: String) {
        let new_hash = blake3::hash(content.as_bytes());
        if self.hash.map(|h| h != new_hash).unwrap_or(true) {
            self.content = content;
            self.hash = Some(new_hash);
            self.is_dirty = true;
        }
    }
}

/// Tracks the last rendered output per region so unchanged previews can be
/// skipped instead of re-sent to the client.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    entries: HashMap<String, RegionState>,
    dirty: HashSet<String>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record freshly rendered output. Returns whether the content changed
    /// since the last recording.
    pub fn record(&mut self, region: &str, content: String) -> bool {
        let state = self
            .entries
            .entry(region.to_string())
            .or_insert_with(RegionState::new);
        state.is_dirty = false;
        state.update_content(content);
        if state.is_dirty {
            self.dirty.insert(region.to_string());
        }
        state.is_dirty
    }

    pub fn content(&self, region: &str) -> Option<&str> {
        self.entries.get(region).map(|state| state.content.as_str())
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Drain the regions whose output changed since the last drain.
    pub fn take_dirty(&mut self) -> Vec<String> {
        let mut ids: Vec<String> = self.dirty.drain().collect();
        ids.sort();
        for id in &ids {
            if let Some(state) = self.entries.get_mut(id) {
                state.is_dirty = false;
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::layout::pack::wrap_region;
    use crate::tile::Tile;

    fn tile_item(delta: &str, width: u16) -> RegionItem {
        let config = GridConfig::default();
        let mut tile = Tile::new(&config);
        tile.module = "bean".to_string();
        tile.delta = delta.to_string();
        tile.region = "content".to_string();
        tile.width = width;
        RegionItem::tile(tile, format!("<p>{delta}</p>"))
    }

    #[test]
    fn renders_rows_with_data_attributes() {
        let config = GridConfig::default();
        let mut region = RegionBuild::new();
        region.push(tile_item("promo", 6));
        wrap_region(&mut region, &config);

        let html = RegionRenderer::default().render_region("content", &region);
        assert!(html.contains("tiles-row"));
        assert!(html.contains("data-module=\"bean\""));
        assert!(html.contains("data-width=\"6\""));
        assert!(html.contains("<p>promo</p>"));
    }

    #[test]
    fn registry_flags_changed_content_only() {
        let mut registry = RegionRegistry::new();
        assert!(registry.record("content", "<div/>".to_string()));
        assert_eq!(registry.take_dirty(), vec!["content".to_string()]);

        assert!(!registry.record("content", "<div/>".to_string()));
        assert!(!registry.has_dirty());

        assert!(registry.record("content", "<span/>".to_string()));
        assert!(registry.has_dirty());
    }
}
