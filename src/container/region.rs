use crate::container::{Container, PathLookup, RenderContext};
use crate::error::{Result, TilesError};
use crate::layout::TileLayout;
use crate::layout::pack::{PageBuild, wrap_region};
use crate::manifest::Manifest;

/// Container for the host theme's page regions.
///
/// Layout visibility is tied to path access: a layout is only served when
/// its selector is a currently navigable path.
pub struct RegionContainer {
    regions: Vec<String>,
    paths: Box<dyn PathLookup>,
}

impl RegionContainer {
    pub fn new<I, S>(regions: I, paths: Box<dyn PathLookup>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
            paths,
        }
    }
}

impl Container for RegionContainer {
    fn kind(&self) -> &str {
        "region"
    }

    fn regions(&self) -> Vec<String> {
        self.regions.clone()
    }

    fn has_access(&self, layout: &TileLayout) -> bool {
        self.paths.is_valid_path(&layout.selector)
    }

    /// Preview: rewind the edited region of the host-prerendered page to
    /// its retained placements, overlay the manifest, re-pack and render.
    fn render_manifest(
        &self,
        page: Option<PageBuild>,
        manifest: &Manifest,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        let mut page =
            page.ok_or_else(|| TilesError::RegionNotFound(manifest.region.clone()))?;
        let region = page
            .region_mut(&manifest.region)
            .ok_or_else(|| TilesError::RegionNotFound(manifest.region.clone()))?;

        region.restore_original();
        region.apply_manifest(manifest);
        wrap_region(region, ctx.config);
        Ok(ctx.renderer.render_region(&manifest.region, region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::layout::pack::RegionItem;
    use crate::layout::{BlockMeta, BlockSource};
    use crate::manifest::ManifestBlock;
    use crate::render::RegionRenderer;
    use crate::store::MemoryStore;
    use crate::tile::Tile;

    struct AdminOnly;

    impl PathLookup for AdminOnly {
        fn is_valid_path(&self, path: &str) -> bool {
            path.starts_with("admin/")
        }
    }

    struct NoBlocks;

    impl BlockSource for NoBlocks {
        fn meta(&self, _module: &str, _delta: &str) -> Option<BlockMeta> {
            None
        }

        fn render(&self, _module: &str, _delta: &str) -> Option<String> {
            None
        }
    }

    fn tile_item(delta: &str, width: u16, weight: i32) -> RegionItem {
        let config = GridConfig::default();
        let mut tile = Tile::new(&config);
        tile.module = "bean".to_string();
        tile.delta = delta.to_string();
        tile.region = "content".to_string();
        tile.width = width;
        tile.weight = weight;
        RegionItem::tile(tile, format!("<p>{delta}</p>"))
    }

    #[test]
    fn access_follows_path_validity() {
        let container = RegionContainer::new(["content"], Box::new(AdminOnly));
        let visible = TileLayout::new("region", "admin/structure");
        let hidden = TileLayout::new("region", "front");
        assert!(container.has_access(&visible));
        assert!(!container.has_access(&hidden));
    }

    #[test]
    fn denied_layout_lookup_is_negative_not_fresh() {
        let store = MemoryStore::new();
        let config = GridConfig::default();
        let container = RegionContainer::new(["content"], Box::new(AdminOnly));

        let mut layout = TileLayout::new("region", "front");
        let mut tile = Tile::new(&config);
        tile.module = "bean".to_string();
        tile.delta = "promo".to_string();
        tile.region = "content".to_string();
        layout.add_tile(tile);
        use crate::store::LayoutStore;
        store.save_layout(&mut layout, &config).unwrap();

        assert!(container.get_layout("front", &store).unwrap().is_none());
        // Unknown selectors still seed a fresh, unsaved layout.
        let fresh = container.get_layout("admin/new", &store).unwrap().unwrap();
        assert!(fresh.id.is_none());
        assert!(fresh.is_empty());
    }

    #[test]
    fn preview_applies_manifest_edits_to_the_original() {
        let config = GridConfig::default();
        let store = MemoryStore::new();
        let renderer = RegionRenderer::default();
        let container = RegionContainer::new(["content"], Box::new(AdminOnly));
        let ctx = RenderContext {
            config: &config,
            store: &store,
            blocks: &NoBlocks,
            renderer: &renderer,
            cache: None,
        };

        // The host page has already been packed once.
        let mut page = PageBuild::new();
        let region = page.ensure_region("content");
        region.push(tile_item("a", 6, 0));
        region.push(tile_item("b", 6, 1));
        wrap_region(region, &config);

        // The client swaps the two tiles and widens one.
        let manifest = Manifest {
            region: "content".to_string(),
            container: "region".to_string(),
            blocks: vec![
                ManifestBlock {
                    module: "bean".to_string(),
                    delta: "b".to_string(),
                    weight: 0,
                    width: 12,
                    ..Default::default()
                },
                ManifestBlock {
                    module: "bean".to_string(),
                    delta: "a".to_string(),
                    weight: 1,
                    width: 6,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let html = container
            .render_manifest(Some(page), &manifest, &ctx)
            .unwrap();

        let b_at = html.find("data-delta=\"b\"").unwrap();
        let a_at = html.find("data-delta=\"a\"").unwrap();
        assert!(b_at < a_at);
        assert!(html.contains("data-width=\"12\""));
    }

    #[test]
    fn preview_of_unknown_region_errors() {
        let config = GridConfig::default();
        let store = MemoryStore::new();
        let renderer = RegionRenderer::default();
        let container = RegionContainer::new(["content"], Box::new(AdminOnly));
        let ctx = RenderContext {
            config: &config,
            store: &store,
            blocks: &NoBlocks,
            renderer: &renderer,
            cache: None,
        };

        let manifest = Manifest {
            region: "missing".to_string(),
            ..Default::default()
        };
        let err = container
            .render_manifest(Some(PageBuild::new()), &manifest, &ctx)
            .unwrap_err();
        assert!(matches!(err, TilesError::RegionNotFound(_)));
    }
}
