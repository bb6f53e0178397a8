use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GridConfig;

/// One tile placement record.
///
/// Holds metadata about how a content block sits in the tile grid: the
/// region it lands in, the breakpoint the width applies to, and its weight
/// and offset within the region. Multiple records may exist for the same
/// block differing only in `breakpoint`; consolidation folds those into one
/// canonical record whose `breakpoints` map carries every override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Source system the block originates from, e.g. `user` for a login
    /// block or `bean` for custom content.
    pub module: String,
    /// Unique ID for the block within its module.
    pub delta: String,
    /// Region key within the owning container.
    pub region: String,
    /// Breakpoint at which `width` applies for this record.
    pub breakpoint: String,
    /// Order within the region; ties keep insertion order.
    pub weight: i32,
    /// Columns occupied at `breakpoint`.
    pub width: u16,
    /// Leading empty columns before the tile.
    pub offset: u16,
    /// Whether this tile's content is indexed along with the parent layout.
    pub indexable: bool,
    /// Per-breakpoint width overrides, populated during consolidation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakpoints: BTreeMap<String, u16>,
}

impl Tile {
    /// New tile with engine defaults: the config's default breakpoint,
    /// full-row width, zero offset and weight.
    pub fn new(config: &GridConfig) -> Self {
        Self {
            module: String::new(),
            delta: String::new(),
            region: String::new(),
            breakpoint: config.default_breakpoint().to_string(),
            weight: 0,
            width: config.max_step,
            offset: 0,
            indexable: true,
            breakpoints: BTreeMap::new(),
        }
    }

    /// Hydrate a tile from an untyped key/value structure.
    ///
    /// Used when decoding client manifests or external storage rows. Only
    /// known fields are copied and unknown fields are ignored. Falsy values
    /// (null, `false`, 0, `""`, `"0"`) never override the defaults already
    /// present, so an explicit `width: 0` reads as absent.
    pub fn from_value(value: &Value, config: &GridConfig) -> Self {
        let mut tile = Self::new(config);
        tile.load_from(value);
        tile
    }

    /// Permissive field-by-field copy from a JSON object. See
    /// [`Tile::from_value`] for the falsy-skips-default contract.
    pub fn load_from(&mut self, value: &Value) {
        let Some(fields) = value.as_object() else {
            return;
        };

        if let Some(module) = fields.get("module").and_then(truthy_str) {
            self.module = module.to_string();
        }
        if let Some(delta) = fields.get("delta").and_then(truthy_str) {
            self.delta = delta.to_string();
        }
        if let Some(region) = fields.get("region").and_then(truthy_str) {
            self.region = region.to_string();
        }
        if let Some(breakpoint) = fields.get("breakpoint").and_then(truthy_str) {
            self.breakpoint = breakpoint.to_string();
        }
        if let Some(weight) = fields.get("weight").and_then(truthy_int) {
            self.weight = weight as i32;
        }
        if let Some(width) = fields.get("width").and_then(truthy_int) {
            self.width = width.clamp(1, u16::MAX as i64) as u16;
        }
        if let Some(offset) = fields.get("offset").and_then(truthy_int) {
            self.offset = offset.clamp(0, u16::MAX as i64) as u16;
        }
        if let Some(indexable) = fields.get("indexable") {
            // Only an affirmative value sticks; falsy input keeps the
            // default, matching the other fields.
            if truthy_int(indexable).is_some() {
                self.indexable = true;
            }
        }
        if let Some(Value::Object(map)) = fields.get("breakpoints") {
            for (key, width) in map {
                if let Some(width) = truthy_int(width) {
                    self.breakpoints
                        .insert(key.clone(), width.clamp(1, u16::MAX as i64) as u16);
                }
            }
        }
    }

    /// Stable composite key for the block this record places.
    pub fn bid(&self) -> String {
        format!("{}-{}", self.module, self.delta)
    }
}

fn truthy_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) if !text.is_empty() && text != "0" => Some(text),
        _ => None,
    }
}

fn truthy_int(value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.parse::<i64>().ok(),
        Value::Bool(true) => Some(1),
        _ => None,
    };
    parsed.filter(|n| *n != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> GridConfig {
        GridConfig::default()
    }

    #[test]
    fn new_tile_carries_defaults() {
        let tile = Tile::new(&config());
        assert_eq!(tile.breakpoint, "default");
        assert_eq!(tile.width, 12);
        assert_eq!(tile.offset, 0);
        assert_eq!(tile.weight, 0);
    }

    #[test]
    fn load_from_copies_known_fields() {
        let tile = Tile::from_value(
            &json!({
                "module": "user",
                "delta": "online",
                "region": "sidebar",
                "breakpoint": "mobile",
                "weight": 3,
                "width": 4,
                "offset": 2,
            }),
            &config(),
        );
        assert_eq!(tile.bid(), "user-online");
        assert_eq!(tile.region, "sidebar");
        assert_eq!(tile.breakpoint, "mobile");
        assert_eq!(tile.weight, 3);
        assert_eq!(tile.width, 4);
        assert_eq!(tile.offset, 2);
    }

    #[test]
    fn falsy_values_keep_defaults() {
        let tile = Tile::from_value(
            &json!({
                "module": "bean",
                "delta": "promo",
                "width": 0,
                "offset": "",
                "breakpoint": "0",
                "weight": null,
            }),
            &config(),
        );
        assert_eq!(tile.width, 12);
        assert_eq!(tile.offset, 0);
        assert_eq!(tile.breakpoint, "default");
        assert_eq!(tile.weight, 0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let tile = Tile::from_value(
            &json!({"module": "bean", "delta": "promo", "color": "red"}),
            &config(),
        );
        assert_eq!(tile.bid(), "bean-promo");
    }

    #[test]
    fn numeric_strings_parse() {
        let tile = Tile::from_value(
            &json!({"module": "bean", "delta": "promo", "width": "6", "weight": "-2"}),
            &config(),
        );
        assert_eq!(tile.width, 6);
        assert_eq!(tile.weight, -2);
    }
}
