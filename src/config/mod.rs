use std::collections::HashSet;

/// Ordered set of responsive breakpoints with a distinguished default.
///
/// The default breakpoint is the widest/primary tier; consolidated tiles
/// report the width stored for it. The order of `names` is the order the
/// editing client cycles through when setting per-breakpoint widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointSet {
    names: Vec<String>,
    default_index: usize,
}

impl BreakpointSet {
    /// Build a breakpoint set. `default` is added to the set if absent.
    pub fn new<I, S>(names: I, default: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        let default_index = match names.iter().position(|name| name == default) {
            Some(idx) => idx,
            None => {
                names.push(default.to_string());
                names.len() - 1
            }
        };
        Self {
            names,
            default_index,
        }
    }

    pub fn default_breakpoint(&self) -> &str {
        &self.names[self.default_index]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| known == name)
    }
}

impl Default for BreakpointSet {
    fn default() -> Self {
        Self::new(["mobile", "narrow", "standard", "default"], "default")
    }
}

/// Configuration consumed by the layout engine.
///
/// All knobs are externally supplied and passed explicitly; nothing here is
/// read from process-wide state.
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Maximum grid columns available per row.
    pub max_step: u16,
    /// Breakpoint tiers known to the hosting theme.
    pub breakpoints: BreakpointSet,
    /// Tile types (`module-delta` keys, or bare module names) available for
    /// placement. Empty means the host exposes none.
    pub tile_types: Vec<String>,
    /// Tile types whose content may be indexed by search. `None` means every
    /// type is indexable.
    indexable_types: Option<HashSet<String>>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_step: 12,
            breakpoints: BreakpointSet::default(),
            tile_types: Vec::new(),
            indexable_types: None,
        }
    }
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_step(mut self, max_step: u16) -> Self {
        self.max_step = max_step.max(1);
        self
    }

    pub fn with_breakpoints(mut self, breakpoints: BreakpointSet) -> Self {
        self.breakpoints = breakpoints;
        self
    }

    pub fn with_tile_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tile_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict indexing to the given tile type keys.
    pub fn restrict_indexing_to<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexable_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn default_breakpoint(&self) -> &str {
        self.breakpoints.default_breakpoint()
    }

    /// Whether a tile of the given type should be indexed along with its
    /// parent layout. Matches the composite `module-delta` key first, then
    /// the bare module name.
    pub fn is_indexable(&self, module: &str, delta: &str) -> bool {
        match &self.indexable_types {
            None => true,
            Some(types) => {
                types.contains(&format!("{module}-{delta}")) || types.contains(module)
            }
        }
    }
}
