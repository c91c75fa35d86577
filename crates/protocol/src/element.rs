use serde::{Deserialize, Serialize};

use crate::pivot::Pivot;

/// One node of a compiled layout tree.
///
/// Geometry is expressed in the export root's center-anchored space and is
/// already multiplied by the export scale. Fields that a given element type
/// does not carry are left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    #[serde(flatten)]
    pub kind: ElementKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Pivot>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stretchx: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stretchy: bool,
    /// Nested elements, front-to-back. Containers always carry a (possibly
    /// empty) list; leaves only when something compiled beneath them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<LayoutElement>>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl LayoutElement {
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            x: None,
            y: None,
            w: None,
            h: None,
            opacity: None,
            pivot: None,
            stretchx: false,
            stretchy: false,
            elements: None,
        }
    }

    /// Set position and size, with full opacity.
    pub fn with_frame(mut self, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.w = Some(w);
        self.h = Some(h);
        self.opacity = Some(100);
        self
    }

    /// Set the informational size hint only.
    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.w = Some(w);
        self.h = Some(h);
        self
    }

    pub fn with_elements(mut self, elements: Vec<LayoutElement>) -> Self {
        self.elements = Some(elements);
        self
    }

    pub fn children(&self) -> &[LayoutElement] {
        self.elements.as_deref().unwrap_or(&[])
    }

    /// First direct child with exactly this name.
    pub fn child(&self, name: &str) -> Option<&LayoutElement> {
        self.children().iter().find(|e| e.name == name)
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// The element's `type` tag plus the fields specific to that type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementKind {
    Root {
        #[serde(default)]
        artboard: bool,
    },
    Group,
    Button,
    Slider,
    Scrollbar,
    Toggle,
    List {
        scroll: ScrollDirection,
    },
    Scroller(ScrollerLayout),
    Image {
        /// Rendition file name, without extension.
        image: String,
    },
    Text(TextContent),
    TextMeshPro(TextContent),
    Input(TextContent),
}

impl ElementKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Root { .. } => "Root",
            Self::Group => "Group",
            Self::Button => "Button",
            Self::Slider => "Slider",
            Self::Scrollbar => "Scrollbar",
            Self::Toggle => "Toggle",
            Self::List { .. } => "List",
            Self::Scroller(_) => "Scroller",
            Self::Image { .. } => "Image",
            Self::Text(_) => "Text",
            Self::TextMeshPro(_) => "TextMeshPro",
            Self::Input(_) => "Input",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Vertical,
    Horizontal,
}

/// Scroll viewport parameters. Padding and spacing are only present when the
/// scroller was synthesized from a repeated grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollerLayout {
    pub scroll: ScrollDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
}

impl ScrollerLayout {
    pub fn explicit(scroll: ScrollDirection) -> Self {
        Self {
            scroll,
            padding_left: None,
            padding_right: None,
            padding_top: None,
            spacing: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    /// Anchored at a point, grows with its content.
    Point,
    /// Constrained to an area box.
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    pub text_type: TextType,
    pub font: String,
    pub size: f64,
    /// Six lowercase hex digits, alpha dropped.
    pub color: String,
    pub align: String,
    pub vh: f64,
}
