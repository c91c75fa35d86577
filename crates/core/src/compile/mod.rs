pub mod scroller;

use baumkit_protocol::{
    ElementKind, LayoutDocument, LayoutElement, ScrollDirection, ScrollerLayout, TextContent,
    TextType,
};

use crate::context::ExportContext;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::layout::{self, Frame};
use crate::names::{OptionKey, OptionSet, ParsedName, parse_name, sanitize_file_name};
use crate::renditions::RenditionManifest;
use crate::responsive::ResponsiveMap;
use crate::scene::{DesignDocument, NodeId, NodeKind};

/// Name of the child that marks an explicit scroll viewport.
pub const AREA_NAME: &str = "Area";

/// One export root compiled into its layout document.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRoot {
    pub node: NodeId,
    /// Parsed display name of the root.
    pub name: String,
    /// Sanitized folder name; images go in this folder and the layout file is
    /// `<folder>.layout.txt`.
    pub folder: String,
    pub document: LayoutDocument,
}

impl CompiledRoot {
    pub fn layout_file_name(&self) -> String {
        format!("{}.layout.txt", self.folder)
    }
}

#[derive(Debug, Clone, Copy)]
struct Scope<'s> {
    root: NodeId,
    folder: &'s str,
}

/// Walks one document. Rendition requests and diagnostics accumulate across
/// every root compiled with the same instance.
pub struct Compiler<'a, D: DesignDocument> {
    doc: &'a D,
    ctx: &'a ExportContext,
    responsive: &'a ResponsiveMap,
    manifest: &'a mut RenditionManifest,
    diagnostics: &'a mut Diagnostics,
}

impl<'a, D: DesignDocument> Compiler<'a, D> {
    pub fn new(
        doc: &'a D,
        ctx: &'a ExportContext,
        responsive: &'a ResponsiveMap,
        manifest: &'a mut RenditionManifest,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            doc,
            ctx,
            responsive,
            manifest,
            diagnostics,
        }
    }

    pub fn compile_root(&mut self, root: NodeId) -> CompiledRoot {
        let ParsedName { name, .. } = self.parse(root);
        let folder = sanitize_file_name(&name, false);
        let scope = Scope {
            root,
            folder: &folder,
        };

        let element = self.compile(scope, root, 0).unwrap_or_else(|| {
            LayoutElement::new(ElementKind::Root { artboard: false }, name.as_str())
                .with_elements(Vec::new())
        });
        let document = layout::build_document(self.doc, root, self.ctx.scale, element);
        tracing::debug!(root = %name, renditions = self.manifest.len(), "compiled root");

        CompiledRoot {
            node: root,
            name,
            folder,
            document,
        }
    }

    fn parse(&self, id: NodeId) -> ParsedName {
        let parent_is_grid = matches!(self.doc.parent_kind(id), Some(NodeKind::RepeatGrid));
        parse_name(
            &self.doc.node(id).name,
            parent_is_grid,
            self.ctx.options.enable_extended,
        )
    }

    fn compile(&mut self, scope: Scope<'_>, id: NodeId, depth: usize) -> Option<LayoutElement> {
        let doc = self.doc;
        let node = doc.node(id);
        let ParsedName { name, mut options } = self.parse(id);

        tracing::debug!(
            "{:indent$}{name:?}: {} {options} {:?}",
            "",
            node.kind,
            self.responsive.parameter(id),
            indent = depth * 2,
        );

        if options.is_set(OptionKey::CommentOut) {
            return None;
        }
        if depth > 0 && self.ctx.options.is_active(&options, OptionKey::SubPrefab) {
            return None;
        }

        let element = match &node.kind {
            NodeKind::Artboard => {
                let children = self.compile_children(scope, id, depth);
                Some(
                    LayoutElement::new(ElementKind::Root { artboard: true }, name)
                        .with_elements(children),
                )
            }
            NodeKind::BooleanGroup => {
                options.set(OptionKey::Image);
                Some(self.compile_group(scope, id, depth, name, &options))
            }
            NodeKind::Group | NodeKind::RepeatGrid | NodeKind::SymbolInstance => {
                Some(self.compile_group(scope, id, depth, name, &options))
            }
            NodeKind::Rectangle | NodeKind::Ellipse | NodeKind::Line | NodeKind::Path => {
                let mut image = self.rasterize(scope, id, name);
                let children = self.compile_children(scope, id, depth);
                if !children.is_empty() {
                    image.elements = Some(children);
                }
                Some(image)
            }
            NodeKind::Text => Some(self.compile_text(scope, id, name, &options)),
            NodeKind::Other(kind) => {
                self.diagnostics.push(Diagnostic::UnknownKind {
                    node: name.clone(),
                    kind: kind.clone(),
                });
                let children = self.compile_children(scope, id, depth);
                (!children.is_empty())
                    .then(|| LayoutElement::new(ElementKind::Group, name).with_elements(children))
            }
        };

        element.map(|e| self.with_responsive(id, e))
    }

    fn compile_children(
        &mut self,
        scope: Scope<'_>,
        id: NodeId,
        depth: usize,
    ) -> Vec<LayoutElement> {
        let doc = self.doc;
        doc.node(id)
            .children
            .iter()
            .rev()
            .filter_map(|&child| self.compile(scope, child, depth + 1))
            .collect()
    }

    fn compile_group(
        &mut self,
        scope: Scope<'_>,
        id: NodeId,
        depth: usize,
        name: String,
        options: &OptionSet,
    ) -> LayoutElement {
        let ctx = self.ctx;
        let active = |key| ctx.options.is_active(options, key);

        if active(OptionKey::Image) {
            return self.rasterize(scope, id, name);
        }

        let role = if active(OptionKey::Button) {
            Some(ElementKind::Button)
        } else if active(OptionKey::Slider) {
            Some(ElementKind::Slider)
        } else if active(OptionKey::Scrollbar) {
            Some(ElementKind::Scrollbar)
        } else if active(OptionKey::Toggle) {
            Some(ElementKind::Toggle)
        } else if active(OptionKey::List) {
            Some(ElementKind::List {
                scroll: ScrollDirection::Vertical,
            })
        } else {
            None
        };

        if let Some(kind) = role {
            let is_list = matches!(kind, ElementKind::List { .. });
            let element = self.container(kind, scope, id, depth, name);
            if is_list && element.child(AREA_NAME).is_none() {
                self.diagnostics.push(Diagnostic::MissingArea {
                    element: element.name.clone(),
                });
            }
            return element;
        }

        if active(OptionKey::Scroller) {
            return self.compile_scroller(scope, id, depth, name);
        }

        self.container(ElementKind::Group, scope, id, depth, name)
    }

    /// Container carrying its draw size as an informational hint.
    fn container(
        &mut self,
        kind: ElementKind,
        scope: Scope<'_>,
        id: NodeId,
        depth: usize,
        name: String,
    ) -> LayoutElement {
        let doc = self.doc;
        let size = doc.node(id).draw_bounds.scaled(self.ctx.scale);
        let children = self.compile_children(scope, id, depth);
        LayoutElement::new(kind, name)
            .with_size(size.width, size.height)
            .with_elements(children)
    }

    fn compile_scroller(
        &mut self,
        scope: Scope<'_>,
        id: NodeId,
        depth: usize,
        name: String,
    ) -> LayoutElement {
        let doc = self.doc;
        let node = doc.node(id);
        let children = self.compile_children(scope, id, depth);
        let frame = self.frame(scope, id);

        if children.iter().any(|c| c.name == AREA_NAME) {
            return framed(
                LayoutElement::new(
                    ElementKind::Scroller(ScrollerLayout::explicit(ScrollDirection::Vertical)),
                    name,
                ),
                frame,
            )
            .with_elements(children);
        }

        match (&node.kind, node.grid) {
            (NodeKind::RepeatGrid, Some(grid)) => {
                let cell_offset = node
                    .children
                    .first()
                    .map(|&cell| {
                        let cell = doc.node(cell).bounds;
                        (cell.x - node.bounds.x, cell.y - node.bounds.y)
                    })
                    .unwrap_or((0.0, 0.0));
                let synthesized =
                    scroller::synthesize(&grid, cell_offset, frame.w, self.ctx.scale, children);
                framed(
                    LayoutElement::new(ElementKind::Scroller(synthesized.layout), name),
                    frame,
                )
                .with_elements(synthesized.items)
            }
            _ => {
                self.diagnostics.push(Diagnostic::ScrollerWithoutGrid { node: name.clone() });
                LayoutElement::new(ElementKind::Group, name)
                    .with_size(frame.w, frame.h)
                    .with_elements(children)
            }
        }
    }

    fn compile_text(
        &mut self,
        scope: Scope<'_>,
        id: NodeId,
        name: String,
        options: &OptionSet,
    ) -> LayoutElement {
        let (doc, ctx) = (self.doc, self.ctx);
        let settings = &ctx.options;
        let input = settings.is_active(options, OptionKey::Input);
        let as_text = options.is_set(OptionKey::Text) || input;
        let node = doc.node(id);

        let text = match &node.text {
            Some(text)
                if as_text
                    && !settings.force_text_to_image
                    && !options.is_set(OptionKey::Image) =>
            {
                text
            }
            _ => return self.rasterize(scope, id, name),
        };

        let frame = self.frame(scope, id);
        let (text_type, align) = if text.area_box {
            (TextType::Paragraph, format!("{}upper", text.align))
        } else {
            (TextType::Point, text.align.clone())
        };
        let content = TextContent {
            text: text.content.clone(),
            text_type,
            font: text.font_family.clone(),
            size: text.font_size * ctx.scale,
            color: format!("{:06x}", text.fill & 0x00ff_ffff),
            align,
            vh: frame.h,
        };

        let kind = if input {
            ElementKind::Input(content)
        } else if settings.text_to_rich_text {
            ElementKind::TextMeshPro(content)
        } else {
            ElementKind::Text(content)
        };
        framed(LayoutElement::new(kind, name), frame)
    }

    /// Queue `id` for rasterization and emit the Image element pointing at it.
    fn rasterize(&mut self, scope: Scope<'_>, id: NodeId, name: String) -> LayoutElement {
        let doc = self.doc;
        let node = doc.node(id);
        let parent_label = node.parent.map_or("", |p| doc.node(p).name.as_str());
        let image = self.manifest.register(
            id,
            &node.guid,
            parent_label,
            &name,
            scope.folder,
            self.ctx.scale,
        );
        framed(
            LayoutElement::new(ElementKind::Image { image }, name),
            self.frame(scope, id),
        )
    }

    fn frame(&self, scope: Scope<'_>, id: NodeId) -> Frame {
        layout::frame_in_root(self.doc, id, scope.root, self.ctx.scale)
    }

    fn with_responsive(&self, id: NodeId, mut element: LayoutElement) -> LayoutElement {
        if !self.ctx.options.responsive_parameters {
            return element;
        }
        if let Some(parameter) = self.responsive.parameter(id) {
            element.pivot = parameter.pivot;
            element.stretchx = parameter.stretch_x;
            element.stretchy = parameter.stretch_y;
        }
        element
    }
}

fn framed(element: LayoutElement, frame: Frame) -> LayoutElement {
    element.with_frame(frame.x, frame.y, frame.w, frame.h)
}
