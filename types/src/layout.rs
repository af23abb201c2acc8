//! Layout metadata attached to tables on the canvas.
//!
//! The sync engine treats layout as opaque: it never reads or derives
//! anything from it, it only carries it across parse/reconcile cycles so a
//! round trip through DDL text does not scatter the diagram.

use serde::{Deserialize, Serialize};

/// Canvas position of a table node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visual metadata for one table node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLayout {
    /// Position on the canvas
    #[serde(default)]
    pub position: Position,

    /// Header color override (CSS color string), if the user picked one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Whether the node is collapsed to its header row
    #[serde(default)]
    pub collapsed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_defaults() {
        let layout = NodeLayout::default();
        assert_eq!(layout.position, Position::new(0.0, 0.0));
        assert_eq!(layout.color, None);
        assert!(!layout.collapsed);
    }

    #[test]
    fn test_layout_json_shape() {
        let layout = NodeLayout {
            position: Position::new(10.0, 20.0),
            color: Some("#ff7a59".to_string()),
            collapsed: false,
        };
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["position"]["x"], 10.0);
        assert_eq!(json["color"], "#ff7a59");
    }
}
