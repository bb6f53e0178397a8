use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::GridConfig;
use crate::container::{CacheClear, Container, PageSource, RenderContext};
use crate::error::{Result, TilesError};
use crate::layout::BlockSource;
use crate::layout::pack::PageBuild;
use crate::logging::{Logger, LogLevel, json_kv};
use crate::manifest::Manifest;
use crate::metrics::{LayoutMetrics, MetricSnapshot};
use crate::render::{RegionRegistry, RegionRenderer};
use crate::store::LayoutStore;

pub mod socket;

/// Result of the host's page callback for a tiles request.
#[derive(Debug)]
pub enum PageResult {
    /// Host-level status constant; dispatched unchanged.
    Status(u16),
    /// Already-rendered page content.
    Content(String),
    /// A renderable page the preview path re-renders one region of.
    Page(PageBuild),
}

/// Abstract response surface for a tiles request.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status: u16,
    headers: Vec<(String, String)>,
    pub body: String,
    finalized: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
            finalized: false,
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Set a header only when it is not already present. Returns whether the
    /// header was written.
    pub fn set_header_once(&mut self, name: &str, value: &str) -> bool {
        if self.header(name).is_some() {
            return false;
        }
        self.headers.push((name.to_string(), value.to_string()));
        true
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

/// Dispatch a page callback result onto a response.
///
/// The charset header is emitted once and never overrides one already set.
/// Status results pass through unchanged for the host to handle; everything
/// else is printed, with renderable pages going through the container's
/// preview path. The response is always finalized.
pub fn handle_delivery(
    container: &dyn Container,
    result: Option<PageResult>,
    manifest: &Manifest,
    ctx: &RenderContext<'_>,
    response: &mut Response,
) -> Result<()> {
    if result.is_some() {
        response.set_header_once("Content-Type", "text/html; charset=utf-8");
    }

    match result {
        Some(PageResult::Status(code)) => response.status = code,
        Some(PageResult::Content(content)) => response.body = content,
        Some(PageResult::Page(page)) => {
            response.body = container.render_manifest(Some(page), manifest, ctx)?;
        }
        None => {}
    }

    response.finalize();
    Ok(())
}

/// One decoded client request.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum TilesRequest {
    /// Ephemeral re-render of the edited region.
    Preview { manifest: Manifest },
    /// Persist the edited region.
    Save { manifest: Manifest },
}

/// Wires containers, storage and host collaborators into one request
/// handler. This is the server-side entry point the transport drivers call.
pub struct TilesService {
    containers: HashMap<String, Box<dyn Container>>,
    store: Box<dyn LayoutStore>,
    blocks: Box<dyn BlockSource + Send + Sync>,
    pages: Box<dyn PageSource>,
    cache: Option<Box<dyn CacheClear>>,
    config: GridConfig,
    renderer: RegionRenderer,
    registry: Mutex<RegionRegistry>,
    metrics: Mutex<LayoutMetrics>,
    logger: Option<Logger>,
}

impl TilesService {
    pub fn new(
        config: GridConfig,
        store: Box<dyn LayoutStore>,
        blocks: Box<dyn BlockSource + Send + Sync>,
        pages: Box<dyn PageSource>,
    ) -> Self {
        Self {
            containers: HashMap::new(),
            store,
            blocks,
            pages,
            cache: None,
            config,
            renderer: RegionRenderer::default(),
            registry: Mutex::new(RegionRegistry::new()),
            metrics: Mutex::new(LayoutMetrics::new()),
            logger: None,
        }
    }

    pub fn register_container(&mut self, container: Box<dyn Container>) {
        self.containers
            .insert(container.kind().to_string(), container);
    }

    pub fn with_cache(mut self, cache: Box<dyn CacheClear>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn metrics_snapshot(&self) -> MetricSnapshot {
        match self.metrics.lock() {
            Ok(metrics) => metrics.snapshot(),
            Err(_) => LayoutMetrics::new().snapshot(),
        }
    }

    pub fn handle(&self, request: TilesRequest) -> Result<Response> {
        match request {
            TilesRequest::Preview { manifest } => self.preview(&manifest),
            TilesRequest::Save { manifest } => self.save(&manifest),
        }
    }

    /// Re-render the edited region without persisting anything.
    pub fn preview(&self, manifest: &Manifest) -> Result<Response> {
        let container = self.container(&manifest.container)?;
        let page = self.pages.prerender(manifest)?;

        let ctx = self.render_context(None);
        let mut response = Response::new();
        response.set_header("X-TILES", container.kind());
        handle_delivery(
            container,
            Some(PageResult::Page(page)),
            manifest,
            &ctx,
            &mut response,
        )?;

        let changed = match self.registry.lock() {
            Ok(mut registry) => registry.record(&manifest.region, response.body.clone()),
            Err(_) => true,
        };
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.record_preview();
            metrics.record_pack();
        }
        self.log(
            LogLevel::Debug,
            "preview_rendered",
            [
                json_kv("region", json!(manifest.region)),
                json_kv("blocks", json!(manifest.blocks.len())),
                json_kv("changed", json!(changed)),
            ],
        );
        Ok(response)
    }

    /// Persist the edited region and confirm with an empty JSON object.
    pub fn save(&self, manifest: &Manifest) -> Result<Response> {
        let container = self.container(&manifest.container)?;
        let ctx = self.render_context(self.cache.as_deref());
        let saved = container.save_manifest(manifest, &ctx)?;

        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.record_save(manifest.blocks.len());
        }
        self.log(
            LogLevel::Info,
            "layout_saved",
            [
                json_kv("selector", json!(manifest.selector().unwrap_or_default())),
                json_kv("region", json!(manifest.region)),
                json_kv("layout_id", json!(saved)),
                json_kv("blocks", json!(manifest.blocks.len())),
            ],
        );

        let mut response = Response::new();
        response.set_header("X-TILES", container.kind());
        response.set_header("Content-Type", "application/json");
        response.body = "{}".to_string();
        response.finalize();
        Ok(response)
    }

    fn container(&self, kind: &str) -> Result<&dyn Container> {
        self.containers
            .get(kind)
            .map(|container| container.as_ref())
            .ok_or_else(|| TilesError::UnknownContainer(kind.to_string()))
    }

    fn render_context<'a>(&'a self, cache: Option<&'a dyn CacheClear>) -> RenderContext<'a> {
        RenderContext {
            config: &self.config,
            store: self.store.as_ref(),
            blocks: self.blocks.as_ref(),
            renderer: &self.renderer,
            cache,
        }
    }

    fn log(
        &self,
        level: LogLevel,
        message: &str,
        fields: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) {
        if let Some(logger) = &self.logger {
            logger
                .log_with_fields(level, "tiles::service", message, fields)
                .ok();
        }
    }
}
