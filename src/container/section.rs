use crate::container::{Container, RenderContext};
use crate::error::Result;
use crate::layout::pack::{PageBuild, wrap_region};
use crate::manifest::Manifest;

/// Container for tiles embedded in reusable page sections.
///
/// Sections expose a single `content` region and are always visible:
/// access is scoped by whatever embeds the section, not by path. The legacy
/// client addresses sections through the manifest's `activeContext` field.
pub struct SectionContainer;

impl SectionContainer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SectionContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for SectionContainer {
    fn kind(&self) -> &str {
        "section"
    }

    fn regions(&self) -> Vec<String> {
        vec!["content".to_string()]
    }

    /// Preview: sections own their content, so the page is rebuilt from the
    /// section's stored layout rather than taken from the host. A manifest
    /// that names no section renders nothing.
    fn render_manifest(
        &self,
        _page: Option<PageBuild>,
        manifest: &Manifest,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        let Some(selector) = manifest.selector() else {
            return Ok(String::new());
        };
        let Some(mut layout) = self.get_layout(selector, ctx.store)? else {
            return Ok(String::new());
        };

        let mut page = PageBuild::new();
        self.build_page(&mut page, &mut layout, ctx.config, ctx.blocks);

        let region_key = if manifest.region.is_empty() {
            "content"
        } else {
            manifest.region.as_str()
        };
        let Some(region) = page.region_mut(region_key) else {
            return Ok(String::new());
        };

        region.apply_manifest(manifest);
        wrap_region(region, ctx.config);
        Ok(ctx.renderer.render_region(region_key, region))
    }
}
