use serde::{Deserialize, Serialize};

use crate::element::LayoutElement;

/// Version string written to `info.version`.
pub const FORMAT_VERSION: &str = "0.6.1";

/// One exported layout: canvas metadata plus the compiled element tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub info: DocumentInfo,
    pub root: LayoutElement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub version: String,
    pub canvas: Canvas,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub image: CanvasRect,
    pub size: CanvasRect,
    /// Where the canvas sits inside its container, center-anchored.
    pub base: CanvasRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    pub w: f64,
    pub h: f64,
}

impl CanvasRect {
    pub fn sized(w: f64, h: f64) -> Self {
        Self {
            x: None,
            y: None,
            w,
            h,
        }
    }

    pub fn placed(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            w,
            h,
        }
    }
}

impl LayoutDocument {
    /// Canvas whose image and logical size both equal the root's size.
    pub fn new(base: CanvasRect, root: LayoutElement) -> Self {
        Self {
            info: DocumentInfo {
                version: FORMAT_VERSION.to_string(),
                canvas: Canvas {
                    image: CanvasRect::sized(base.w, base.h),
                    size: CanvasRect::sized(base.w, base.h),
                    base,
                },
            },
            root,
        }
    }

    /// Pretty-printed JSON as written to `<name>.layout.txt`.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use serde_json::json;

    #[test]
    fn canvas_shape_matches_wire_contract() {
        let root = LayoutElement::new(ElementKind::Root { artboard: true }, "Screen")
            .with_elements(vec![]);
        let doc = LayoutDocument::new(CanvasRect::placed(0.0, 0.0, 1080.0, 1920.0), root);
        let value = serde_json::to_value(&doc).unwrap_or_default();
        assert_eq!(
            value["info"],
            json!({
                "version": "0.6.1",
                "canvas": {
                    "image": {"w": 1080.0, "h": 1920.0},
                    "size": {"w": 1080.0, "h": 1920.0},
                    "base": {"x": 0.0, "y": 0.0, "w": 1080.0, "h": 1920.0}
                }
            })
        );
        assert_eq!(value["root"]["type"], "Root");
        assert_eq!(value["root"]["artboard"], true);
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let root = LayoutElement::new(ElementKind::Group, "Popup");
        let doc = LayoutDocument::new(CanvasRect::placed(0.0, 0.0, 10.0, 10.0), root);
        let text = doc.to_pretty_json().unwrap_or_default();
        assert!(text.starts_with("{\n  \"info\""));
    }
}
