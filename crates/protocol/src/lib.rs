pub mod document;
pub mod element;
pub mod pivot;

pub use document::{Canvas, CanvasRect, DocumentInfo, FORMAT_VERSION, LayoutDocument};
pub use element::{
    ElementKind, LayoutElement, ScrollDirection, ScrollerLayout, TextContent, TextType,
};
pub use pivot::{HorizontalAnchor, Pivot, PivotParseError, VerticalAnchor};
