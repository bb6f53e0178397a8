use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::error::{Result, TilesError};
use crate::layout::TileLayout;
use crate::tile::Tile;

/// Persisted form of one tile record: one row per
/// `(layout_id, module, delta, breakpoint)` combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRow {
    pub layout_id: u64,
    pub module: String,
    pub delta: String,
    pub region: String,
    pub breakpoint: String,
    pub weight: i32,
    pub width: u16,
    pub indexable: bool,
    pub offset: u16,
}

impl TileRow {
    /// Reconstitute a raw (unconsolidated) tile record from storage.
    pub fn to_tile(&self) -> Tile {
        Tile {
            module: self.module.clone(),
            delta: self.delta.clone(),
            region: self.region.clone(),
            breakpoint: self.breakpoint.clone(),
            weight: self.weight,
            width: self.width,
            offset: self.offset,
            indexable: self.indexable,
            breakpoints: Default::default(),
        }
    }
}

/// Storage boundary for tile layouts.
///
/// `save_layout` must make delete+reinsert atomic within one writer's
/// transaction: readers never observe a layout with zero tiles mid-update.
/// Cross-writer serialization is explicitly not provided; two concurrent
/// saves against the same `(selector, container)` are last-writer-wins.
pub trait LayoutStore: Send + Sync {
    /// Load a layout by `(selector, container)`, reconstituting the full raw
    /// tile collection from persisted rows. `None` when no layout exists.
    fn load_by_selector(&self, selector: &str, container: &str) -> Result<Option<TileLayout>>;

    /// Persist identity fields, then replace all rows for this layout's id
    /// with the current consolidated set. Each canonical tile is assigned a
    /// fresh weight (0..n-1 in consolidation order) and expanded into one
    /// row per breakpoint override. Returns the layout id, assigning one on
    /// first save.
    fn save_layout(&self, layout: &mut TileLayout, config: &GridConfig) -> Result<u64>;
}

/// Expand a layout's consolidated view into persistable rows.
///
/// Consolidation order (region by region, canonical order within each)
/// defines the fresh weights; every row expanded from one canonical tile
/// shares that tile's new weight.
pub fn rows_for_layout(layout: &mut TileLayout, layout_id: u64, config: &GridConfig) -> Vec<TileRow> {
    let mut rows = Vec::new();
    let mut weight: i32 = 0;

    for tiles in layout.all_sorted(config).values() {
        for tile in tiles {
            if tile.breakpoints.is_empty() {
                rows.push(row_from(tile, layout_id, &tile.breakpoint, tile.width, weight));
            } else {
                for (breakpoint, width) in &tile.breakpoints {
                    rows.push(row_from(tile, layout_id, breakpoint, *width, weight));
                }
            }
            weight += 1;
        }
    }

    rows
}

fn row_from(tile: &Tile, layout_id: u64, breakpoint: &str, width: u16, weight: i32) -> TileRow {
    TileRow {
        layout_id,
        module: tile.module.clone(),
        delta: tile.delta.clone(),
        region: tile.region.clone(),
        breakpoint: breakpoint.to_string(),
        weight,
        width,
        indexable: tile.indexable,
        offset: tile.offset,
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: u64,
    layouts: HashMap<u64, (String, String)>,
    rows: HashMap<u64, Vec<TileRow>>,
}

/// In-memory reference implementation of [`LayoutStore`].
///
/// The whole delete+reinsert happens under one write lock, so readers never
/// see a half-saved layout. Nothing serializes concurrent writers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted rows for a layout id, for inspection in tests and tooling.
    pub fn rows(&self, layout_id: u64) -> Result<Vec<TileRow>> {
        let inner = self.read()?;
        Ok(inner.rows.get(&layout_id).cloned().unwrap_or_default())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreInner>> {
        self.inner
            .read()
            .map_err(|_| TilesError::Storage("layout store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreInner>> {
        self.inner
            .write()
            .map_err(|_| TilesError::Storage("layout store lock poisoned".to_string()))
    }
}

impl LayoutStore for MemoryStore {
    fn load_by_selector(&self, selector: &str, container: &str) -> Result<Option<TileLayout>> {
        let inner = self.read()?;
        let found = inner
            .layouts
            .iter()
            .find(|(_, (kind, sel))| kind == container && sel == selector)
            .map(|(id, _)| *id);

        let Some(id) = found else {
            return Ok(None);
        };

        let mut layout = TileLayout::new(container, selector);
        layout.id = Some(id);
        if let Some(rows) = inner.rows.get(&id) {
            for row in rows {
                layout.add_tile(row.to_tile());
            }
        }
        Ok(Some(layout))
    }

    fn save_layout(&self, layout: &mut TileLayout, config: &GridConfig) -> Result<u64> {
        let mut inner = self.write()?;

        let id = match layout.id {
            Some(id) => id,
            None => {
                inner.next_id += 1;
                let id = inner.next_id;
                layout.id = Some(id);
                id
            }
        };
        inner
            .layouts
            .insert(id, (layout.container.clone(), layout.selector.clone()));

        // Delete-then-reinsert inside the same critical section.
        let rows = rows_for_layout(layout, id, config);
        inner.rows.insert(id, rows);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GridConfig {
        GridConfig::default()
    }

    fn tile(delta: &str, region: &str, breakpoint: &str, width: u16, weight: i32) -> Tile {
        let mut tile = Tile::new(&config());
        tile.module = "bean".to_string();
        tile.delta = delta.to_string();
        tile.region = region.to_string();
        tile.breakpoint = breakpoint.to_string();
        tile.width = width;
        tile.weight = weight;
        tile
    }

    #[test]
    fn save_assigns_identity_once() {
        let store = MemoryStore::new();
        let config = config();
        let mut layout = TileLayout::new("region", "front");
        layout.add_tile(tile("promo", "content", "default", 6, 0));

        let first = store.save_layout(&mut layout, &config).unwrap();
        let second = store.save_layout(&mut layout, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(layout.id, Some(first));
    }

    #[test]
    fn save_expands_one_row_per_breakpoint() {
        let store = MemoryStore::new();
        let config = config();
        let mut layout = TileLayout::new("region", "front");
        layout.add_tile(tile("promo", "content", "default", 8, 0));
        layout.add_tile(tile("promo", "content", "mobile", 4, 0));

        let id = store.save_layout(&mut layout, &config).unwrap();
        let mut rows = store.rows(id).unwrap();
        rows.sort_by(|a, b| a.breakpoint.cmp(&b.breakpoint));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].breakpoint, "default");
        assert_eq!(rows[0].width, 8);
        assert_eq!(rows[1].breakpoint, "mobile");
        assert_eq!(rows[1].width, 4);
        assert_eq!(rows[0].weight, rows[1].weight);
    }

    #[test]
    fn save_reassigns_weights_in_consolidation_order() {
        let store = MemoryStore::new();
        let config = config();
        let mut layout = TileLayout::new("region", "front");
        layout.add_tile(tile("last", "content", "default", 6, 40));
        layout.add_tile(tile("first", "content", "default", 6, -3));

        let id = store.save_layout(&mut layout, &config).unwrap();
        let rows = store.rows(id).unwrap();
        let weights: HashMap<&str, i32> = rows
            .iter()
            .map(|row| (row.delta.as_str(), row.weight))
            .collect();

        assert_eq!(weights["first"], 0);
        assert_eq!(weights["last"], 1);
    }

    #[test]
    fn save_then_load_round_trips_consolidation() {
        let store = MemoryStore::new();
        let config = config();
        let mut layout = TileLayout::new("region", "front");
        layout.add_tile(tile("promo", "content", "default", 8, 2));
        layout.add_tile(tile("promo", "content", "mobile", 4, 2));
        layout.add_tile(tile("news", "sidebar", "default", 6, 0));

        let before = layout.all_sorted(&config).clone();
        store.save_layout(&mut layout, &config).unwrap();

        let mut loaded = store.load_by_selector("front", "region").unwrap().unwrap();
        let after = loaded.all_sorted(&config).clone();

        // Weights are recomputed on save, so compare everything else.
        for (region, tiles) in &before {
            let loaded_tiles = after.get(region).unwrap();
            assert_eq!(tiles.len(), loaded_tiles.len());
            for (a, b) in tiles.iter().zip(loaded_tiles) {
                assert_eq!(a.bid(), b.bid());
                assert_eq!(a.width, b.width);
                assert_eq!(a.offset, b.offset);
                assert_eq!(a.breakpoints, b.breakpoints);
            }
        }
    }

    #[test]
    fn load_reconstitutes_raw_rows_not_the_view() {
        let store = MemoryStore::new();
        let config = config();
        let mut layout = TileLayout::new("region", "front");
        layout.add_tile(tile("promo", "content", "default", 8, 0));
        layout.add_tile(tile("promo", "content", "mobile", 4, 0));
        store.save_layout(&mut layout, &config).unwrap();

        let loaded = store.load_by_selector("front", "region").unwrap().unwrap();
        // Two raw records, one per breakpoint row.
        assert_eq!(loaded.tiles().len(), 2);
        assert!(loaded.tiles().iter().all(|t| t.breakpoints.is_empty()));
    }

    #[test]
    fn unknown_selector_loads_nothing() {
        let store = MemoryStore::new();
        assert!(store.load_by_selector("nowhere", "region").unwrap().is_none());
    }

    #[test]
    fn concurrent_writers_are_last_writer_wins() {
        let store = MemoryStore::new();
        let config = config();
        let mut seed = TileLayout::new("region", "front");
        seed.add_tile(tile("promo", "content", "default", 6, 0));
        store.save_layout(&mut seed, &config).unwrap();

        let mut writer_a = store.load_by_selector("front", "region").unwrap().unwrap();
        let mut writer_b = store.load_by_selector("front", "region").unwrap().unwrap();

        writer_a.add_tile(tile("news", "content", "default", 6, 1));
        store.save_layout(&mut writer_a, &config).unwrap();

        // Writer B started from a stale read; its save silently discards
        // writer A's edit.
        store.save_layout(&mut writer_b, &config).unwrap();
        let final_state = store.load_by_selector("front", "region").unwrap().unwrap();
        assert_eq!(final_state.tiles().len(), 1);
    }
}
