use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::GridConfig;
use crate::tile::Tile;

/// Consolidated view of a layout: region key to canonical tiles in render
/// order. Always recomputed from the raw collection, never assumed sorted.
pub type SortedTiles = BTreeMap<String, Vec<Tile>>;

/// Host-side caching contract for a rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    None,
    Global,
    PerPage,
}

/// Presentation metadata for a block, resolved through the host.
#[derive(Debug, Clone)]
pub struct BlockMeta {
    pub title: String,
    pub cache: CachePolicy,
}

/// Boundary to the host rendering system. Implemented by the embedding
/// application; the engine only asks for metadata and body markup.
pub trait BlockSource {
    fn meta(&self, module: &str, delta: &str) -> Option<BlockMeta>;
    fn render(&self, module: &str, delta: &str) -> Option<String>;
}

/// A consolidated tile enriched with presentation metadata, ready for the
/// page builder.
#[derive(Debug, Clone)]
pub struct RenderTile {
    pub tile: Tile,
    pub title: String,
    pub cache: CachePolicy,
    pub body: String,
}

/// Aggregate owning every tile placement for one `(container, selector)`
/// pair.
///
/// The raw collection keeps one record per `(module, delta, breakpoint)`;
/// the derived view folds those into canonical per-block tiles. The derived
/// view is a pure function of the raw collection and is dropped on every
/// mutation.
#[derive(Debug, Clone, Default)]
pub struct TileLayout {
    /// Persistent identity, assigned on first save.
    pub id: Option<u64>,
    /// Container kind owning this layout, e.g. `region` or `section`.
    pub container: String,
    /// Path or context key distinguishing one page instance from another.
    pub selector: String,
    tiles: Vec<Tile>,
    sorted: Option<SortedTiles>,
}

impl TileLayout {
    pub fn new(container: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            id: None,
            container: container.into(),
            selector: selector.into(),
            tiles: Vec::new(),
            sorted: None,
        }
    }

    /// Append a raw placement record and invalidate the derived view.
    pub fn add_tile(&mut self, tile: Tile) {
        self.tiles.push(tile);
        self.sorted = None;
    }

    /// Hydrate a tile from untyped fields and add it.
    pub fn add_from_value(&mut self, value: &Value, config: &GridConfig) {
        self.add_tile(Tile::from_value(value, config));
    }

    /// Raw collection, for persistence and inspection.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Remove all tiles, or only the given region's, and invalidate the
    /// derived view.
    pub fn clear_tiles(&mut self, region: Option<&str>) {
        match region {
            Some(region) => self.tiles.retain(|tile| tile.region != region),
            None => self.tiles.clear(),
        }
        self.sorted = None;
    }

    /// Full consolidated view, region-keyed. Recomputes when stale.
    pub fn all_sorted(&mut self, config: &GridConfig) -> &SortedTiles {
        let sorted = match self.sorted.take() {
            Some(sorted) => sorted,
            None => self.sort_tiles(config),
        };
        self.sorted.insert(sorted)
    }

    /// Consolidated, sorted tiles for one region. `None` when the region
    /// holds no tiles.
    pub fn sorted_by_region(&mut self, region: &str, config: &GridConfig) -> Option<&[Tile]> {
        self.all_sorted(config)
            .get(region)
            .map(|tiles| tiles.as_slice())
    }

    /// Sorted tiles for one region enriched with presentation metadata.
    ///
    /// Blocks the host cannot render are filtered out, mirroring access
    /// checks on the host side.
    pub fn renderable_by_region(
        &mut self,
        region: &str,
        config: &GridConfig,
        blocks: &dyn BlockSource,
    ) -> Option<Vec<RenderTile>> {
        let tiles = self.sorted_by_region(region, config)?;
        let rendered: Vec<RenderTile> = tiles
            .iter()
            .filter_map(|tile| {
                let body = blocks.render(&tile.module, &tile.delta)?;
                let meta = blocks.meta(&tile.module, &tile.delta);
                Some(RenderTile {
                    tile: tile.clone(),
                    title: meta.as_ref().map(|m| m.title.clone()).unwrap_or_default(),
                    cache: meta.map(|m| m.cache).unwrap_or(CachePolicy::None),
                    body,
                })
            })
            .collect();
        if rendered.is_empty() {
            return None;
        }
        Some(rendered)
    }

    /// Persist this layout through the given store. Identity is assigned on
    /// first save; see [`crate::store::LayoutStore::save_layout`] for the
    /// replace semantics.
    pub fn save(
        &mut self,
        store: &dyn crate::store::LayoutStore,
        config: &GridConfig,
    ) -> crate::error::Result<u64> {
        store.save_layout(self, config)
    }

    /// Consolidation: fold raw records into canonical per-block tiles.
    ///
    /// Records are grouped by region, then by block id. The first record
    /// seen for a block id becomes canonical; every record sharing the id
    /// contributes its `breakpoint -> width` entry. Within a region,
    /// canonical records are stably sorted by weight, and each reports the
    /// default breakpoint's width (falling back to `max_step` when no
    /// default override exists).
    fn sort_tiles(&self, config: &GridConfig) -> SortedTiles {
        let mut sorted = SortedTiles::new();

        for tile in &self.tiles {
            let bucket = sorted.entry(tile.region.clone()).or_default();
            let bid = tile.bid();
            match bucket.iter_mut().find(|canonical| canonical.bid() == bid) {
                Some(canonical) => {
                    canonical
                        .breakpoints
                        .insert(tile.breakpoint.clone(), tile.width);
                }
                None => {
                    let mut canonical = tile.clone();
                    canonical
                        .breakpoints
                        .insert(tile.breakpoint.clone(), tile.width);
                    bucket.push(canonical);
                }
            }
        }

        let default_breakpoint = config.default_breakpoint().to_string();
        for bucket in sorted.values_mut() {
            // Vec::sort_by_key is stable, so equal weights keep insertion
            // order.
            bucket.sort_by_key(|tile| tile.weight);
            for canonical in bucket.iter_mut() {
                canonical.width = canonical
                    .breakpoints
                    .get(&default_breakpoint)
                    .copied()
                    .unwrap_or(config.max_step);
                canonical.breakpoint = default_breakpoint.clone();
            }
        }

        sorted
    }
}
