use std::collections::BTreeMap;

use crate::config::GridConfig;
use crate::manifest::Manifest;
use crate::tile::Tile;

/// One entry in a region's flat content list. Tile placements carry their
/// [`Tile`] record; foreign content (anything the host already placed in the
/// region) has `tile == None` and is never packed.
#[derive(Debug, Clone)]
pub struct RegionItem {
    pub id: String,
    pub weight: i32,
    pub body: String,
    pub tile: Option<Tile>,
}

impl RegionItem {
    pub fn tile(tile: Tile, body: impl Into<String>) -> Self {
        Self {
            id: tile.bid(),
            weight: tile.weight,
            body: body.into(),
            tile: Some(tile),
        }
    }

    pub fn foreign(id: impl Into<String>, weight: i32, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            weight,
            body: body.into(),
            tile: None,
        }
    }

    pub fn is_tile(&self) -> bool {
        self.tile.is_some()
    }
}

/// Render structure for one region: the flat content list, the packed rows
/// produced by [`wrap_region`], and a retained copy of every pre-pack tile
/// placement keyed by block id so a later edit can diff against what was
/// there before rather than against the row-nested structure.
#[derive(Debug, Clone, Default)]
pub struct RegionBuild {
    pub items: Vec<RegionItem>,
    pub rows: Vec<Vec<RegionItem>>,
    original: BTreeMap<String, RegionItem>,
    /// Whether `items` can be assumed weight-ordered. Cleared whenever tile
    /// content is merged next to foreign content; the packer re-sorts
    /// regardless.
    pub sorted: bool,
}

impl RegionBuild {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: RegionItem) {
        self.items.push(item);
    }

    pub fn original(&self) -> &BTreeMap<String, RegionItem> {
        &self.original
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.rows.is_empty()
    }

    /// Count of tile placements across flat list and packed rows.
    pub fn tile_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_tile()).count()
            + self
                .rows
                .iter()
                .flat_map(|row| row.iter())
                .filter(|item| item.is_tile())
                .count()
    }

    /// Rewind to the retained pre-pack placements for re-editing.
    ///
    /// The flat list is replaced with the stashed tile placements; packed
    /// rows are discarded. Foreign content does not survive the rewind,
    /// matching the preview path's tile-only re-render.
    pub fn restore_original(&mut self) {
        let original = std::mem::take(&mut self.original);
        self.items = original.into_values().collect();
        self.rows.clear();
        self.sorted = false;
    }

    /// Overlay an edited manifest onto the flat placements: weight, width,
    /// offset and per-breakpoint overrides of matching tiles are replaced by
    /// the client's values.
    pub fn apply_manifest(&mut self, manifest: &Manifest) {
        for block in &manifest.blocks {
            let bid = block.bid();
            let Some(item) = self.items.iter_mut().find(|item| item.id == bid) else {
                continue;
            };
            item.weight = block.weight;
            if let Some(tile) = item.tile.as_mut() {
                tile.weight = block.weight;
                tile.width = block.width.max(1);
                tile.offset = block.offset;
                if !block.breakpoints.is_empty() {
                    tile.breakpoints = block.breakpoints.clone();
                }
            }
        }
        self.sorted = false;
    }
}

/// Pack a region's tile placements into rows no wider than `max_step`.
///
/// Tiles are taken in weight order (a full stable re-sort runs first; the
/// build never trusts `sorted`). Each tile occupies `width + offset`
/// columns. A tile that cannot fit a row's remaining budget opens a new
/// row. Oversized tiles are shrunk to fit rather than rejected, and every
/// shrink step writes the reduced width back into the tile's default
/// breakpoint override, so packing is not read-only with respect to
/// breakpoint data. Width never drops below one column; once it reaches one,
/// remaining overflow comes out of the offset. Foreign content stays in the
/// flat list, untouched and not counted against the column budget.
pub fn wrap_region(region: &mut RegionBuild, config: &GridConfig) {
    let max_step = config.max_step.max(1);
    let default_breakpoint = config.default_breakpoint().to_string();

    region.sorted = false;
    region.items.sort_by_key(|item| item.weight);

    let items = std::mem::take(&mut region.items);
    let mut col_count: u16 = 0;

    for mut item in items {
        let Some(tile) = item.tile.as_mut() else {
            region.items.push(item);
            continue;
        };

        let mut effective = tile.width + tile.offset;
        while effective > max_step && tile.width > 1 {
            tile.width -= 1;
            effective = tile.width + tile.offset;
            tile.breakpoints
                .insert(default_breakpoint.clone(), tile.width);
        }
        if effective > max_step {
            // Width is pinned at one column; the rest of the overflow comes
            // out of the offset.
            tile.offset = max_step - tile.width;
            effective = max_step;
        }

        if region.rows.is_empty() {
            region.rows.push(Vec::new());
            col_count = 0;
        }

        if col_count + effective <= max_step {
            col_count += effective;
        } else {
            col_count = effective;
            region.rows.push(Vec::new());
        }

        region.original.insert(item.id.clone(), item.clone());
        if let Some(row) = region.rows.last_mut() {
            row.push(item);
        }
    }
}

/// Region-keyed page under construction, the unit the container layer
/// merges layouts into and the preview path re-renders from.
#[derive(Debug, Clone, Default)]
pub struct PageBuild {
    regions: BTreeMap<String, RegionBuild>,
}

impl PageBuild {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, key: &str) -> Option<&RegionBuild> {
        self.regions.get(key)
    }

    pub fn region_mut(&mut self, key: &str) -> Option<&mut RegionBuild> {
        self.regions.get_mut(key)
    }

    pub fn ensure_region(&mut self, key: &str) -> &mut RegionBuild {
        self.regions.entry(key.to_string()).or_default()
    }

    pub fn regions(&self) -> impl Iterator<Item = (&String, &RegionBuild)> {
        self.regions.iter()
    }
}
