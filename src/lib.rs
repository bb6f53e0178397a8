//! Tile grid layout engine for region-based content management.
//!
//! Site editors place and resize tiles (blocks of content) inside page
//! regions; this crate owns the placement data model, the consolidation and
//! row-packing algorithm that turns an unordered bag of placement records
//! into deterministic rows, and the JSON manifest protocol the editing
//! client speaks. The host system supplies storage, block rendering and
//! page prerendering through the collaborator traits re-exported below.

pub mod config;
pub mod container;
pub mod delivery;
pub mod error;
pub mod layout;
pub mod logging;
pub mod manifest;
pub mod metrics;
pub mod render;
pub mod store;
pub mod tile;

pub use config::{BreakpointSet, GridConfig};
pub use container::{
    CacheClear, Container, PageSource, PathLookup, RegionContainer, RenderContext,
    SectionContainer,
};
pub use delivery::socket::{DriverResult, SocketDriver, SocketDriverError};
pub use delivery::{PageResult, Response, TilesRequest, TilesService, handle_delivery};
pub use error::{Result, TilesError};
pub use layout::{
    BlockMeta, BlockSource, CachePolicy, PageBuild, RegionBuild, RegionItem, RenderTile,
    SortedTiles, TileLayout, wrap_region,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, json_kv,
};
pub use manifest::{Manifest, ManifestBlock};
pub use metrics::{LayoutMetrics, MetricSnapshot};
pub use render::{RegionRegistry, RegionRenderer, RendererSettings};
pub use store::{LayoutStore, MemoryStore, TileRow, rows_for_layout};
pub use tile::Tile;
