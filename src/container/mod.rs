use crate::config::GridConfig;
use crate::error::Result;
use crate::layout::pack::{PageBuild, RegionItem};
use crate::layout::{BlockSource, TileLayout};
use crate::manifest::Manifest;
use crate::render::RegionRenderer;
use crate::store::LayoutStore;
use crate::tile::Tile;

pub mod region;
pub mod section;

pub use region::RegionContainer;
pub use section::SectionContainer;

/// Host collaborator answering whether a selector is a navigable path.
pub trait PathLookup: Send + Sync {
    fn is_valid_path(&self, path: &str) -> bool;
}

/// Host collaborator invalidating page caches after a layout save.
pub trait CacheClear: Send + Sync {
    fn clear_all(&self);
}

/// Host collaborator producing the prerendered page a preview request
/// re-renders one region of.
pub trait PageSource: Send + Sync {
    fn prerender(&self, manifest: &Manifest) -> Result<PageBuild>;
}

/// Collaborators threaded through container operations.
pub struct RenderContext<'a> {
    pub config: &'a GridConfig,
    pub store: &'a dyn LayoutStore,
    pub blocks: &'a dyn BlockSource,
    pub renderer: &'a RegionRenderer,
    pub cache: Option<&'a dyn CacheClear>,
}

/// Strategy defining which regions exist for a context, who may see a
/// layout, and how manifests round-trip for that context.
///
/// Containers are flat strategies: the two variants differ only in region
/// discovery, access policy and the preview path, so everything else lives
/// in default methods.
pub trait Container: Send + Sync {
    /// Short name keyed in layouts and echoed on the wire, e.g. `region`.
    fn kind(&self) -> &str;

    /// Regions this container can place tiles into.
    fn regions(&self) -> Vec<String>;

    /// Whether the layout's tiles should be visible to the current request.
    fn has_access(&self, _layout: &TileLayout) -> bool {
        true
    }

    /// Tile types available for adding to this container.
    fn tile_types(&self, config: &GridConfig) -> Vec<String> {
        config.tile_types.clone()
    }

    /// Look up the layout for a selector, creating a fresh unsaved one when
    /// none exists. An existing layout the request may not see yields
    /// `None` — a negative result, not an error.
    fn get_layout(&self, selector: &str, store: &dyn LayoutStore) -> Result<Option<TileLayout>> {
        match store.load_by_selector(selector, self.kind())? {
            Some(layout) => {
                if self.has_access(&layout) {
                    Ok(Some(layout))
                } else {
                    Ok(None)
                }
            }
            None => Ok(Some(TileLayout::new(self.kind(), selector))),
        }
    }

    /// Merge a layout's renderable tiles into the page's regions.
    ///
    /// Regions that already hold foreign content keep it, with its weights
    /// intact, and lose their sorted flag so render order is recomputed.
    fn build_page(
        &self,
        page: &mut PageBuild,
        layout: &mut TileLayout,
        config: &GridConfig,
        blocks: &dyn BlockSource,
    ) {
        for region in self.regions() {
            let Some(tiles) = layout.renderable_by_region(&region, config, blocks) else {
                continue;
            };
            let build = page.ensure_region(&region);
            let had_foreign = !build.items.is_empty();
            for rendered in tiles {
                let body = if rendered.title.is_empty() {
                    rendered.body
                } else {
                    format!("<h2>{}</h2>\n{}", rendered.title, rendered.body)
                };
                build.push(RegionItem::tile(rendered.tile, body));
            }
            build.sorted = !had_foreign;
        }
    }

    /// Persist an edited manifest.
    ///
    /// Clears only the edited region, re-expands each submitted block
    /// across its breakpoints into separate raw records, saves, and fires
    /// the host cache-clear hook. A manifest without a selector, or one
    /// addressing a layout the request may not see, is a silent no-op.
    fn save_manifest(&self, manifest: &Manifest, ctx: &RenderContext<'_>) -> Result<Option<u64>> {
        let Some(selector) = manifest.selector() else {
            return Ok(None);
        };
        let Some(mut layout) = self.get_layout(selector, ctx.store)? else {
            return Ok(None);
        };

        layout.clear_tiles(Some(&manifest.region));

        for block in &manifest.blocks {
            let region = if block.region.is_empty() {
                manifest.region.as_str()
            } else {
                block.region.as_str()
            };

            let mut overrides: Vec<(&str, u16)> = block
                .breakpoints
                .iter()
                .map(|(breakpoint, width)| (breakpoint.as_str(), *width))
                .collect();
            if overrides.is_empty() {
                overrides.push((ctx.config.default_breakpoint(), block.width));
            }

            for (breakpoint, width) in overrides {
                let mut tile = Tile::new(ctx.config);
                tile.module = block.module.clone();
                tile.delta = block.delta.clone();
                tile.region = region.to_string();
                tile.breakpoint = breakpoint.to_string();
                tile.weight = block.weight;
                tile.width = width.max(1);
                tile.offset = block.offset;
                tile.indexable = ctx.config.is_indexable(&block.module, &block.delta);
                layout.add_tile(tile);
            }
        }

        let id = ctx.store.save_layout(&mut layout, ctx.config)?;
        if let Some(cache) = ctx.cache {
            cache.clear_all();
        }
        Ok(Some(id))
    }

    /// Re-render the manifest's region for a preview response.
    fn render_manifest(
        &self,
        page: Option<PageBuild>,
        manifest: &Manifest,
        ctx: &RenderContext<'_>,
    ) -> Result<String>;
}
