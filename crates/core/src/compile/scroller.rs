use baumkit_protocol::{ElementKind, LayoutElement, Pivot, ScrollDirection, ScrollerLayout};

use crate::names::GRID_CELL_NAME;
use crate::scene::GridMetrics;

/// Padding, spacing and template items of a synthesized scroller.
#[derive(Debug, Clone, PartialEq)]
pub struct GridScroller {
    pub layout: ScrollerLayout,
    pub items: Vec<LayoutElement>,
}

/// Build the scroller for `grid`.
///
/// `cells` are the grid's compiled children, front-to-back (the reverse of
/// the source order). `cell_offset` is the first source cell's offset from
/// the grid origin, unscaled; `frame_width` is the grid's scaled draw width.
pub fn synthesize(
    grid: &GridMetrics,
    cell_offset: (f64, f64),
    frame_width: f64,
    scale: f64,
    cells: Vec<LayoutElement>,
) -> GridScroller {
    let (scroll, mut items) = if grid.columns == 1 {
        (ScrollDirection::Vertical, vertical_template(cells))
    } else if grid.rows == 1 {
        (
            ScrollDirection::Horizontal,
            cells.into_iter().take(1).collect(),
        )
    } else {
        (ScrollDirection::Vertical, vec![row_template(grid, cells)])
    };

    for item in &mut items {
        for element in item.elements.iter_mut().flatten() {
            element.pivot = Some(Pivot::LEFT_TOP);
        }
    }

    let cell_width = grid.cell_width * scale;
    let pad_x = grid.padding_x * scale;
    let pad_y = grid.padding_y * scale;
    let padding_left = cell_offset.0 * scale;
    let padding_top = cell_offset.1 * scale;
    let item_width = padding_left + (cell_width + pad_x) * f64::from(grid.columns);
    let padding_right = if item_width < frame_width {
        frame_width - item_width
    } else {
        0.0
    };
    let spacing = match scroll {
        ScrollDirection::Vertical => pad_y,
        ScrollDirection::Horizontal => pad_x,
    };

    GridScroller {
        layout: ScrollerLayout {
            scroll,
            padding_left: Some(padding_left),
            padding_right: Some(padding_right),
            padding_top: Some(padding_top),
            spacing: Some(spacing),
        },
        items,
    }
}

/// Prefer the `…Item` elements inside the first cell; otherwise the cell.
fn vertical_template(cells: Vec<LayoutElement>) -> Vec<LayoutElement> {
    let Some(first) = cells.into_iter().next() else {
        return Vec::new();
    };
    let items: Vec<LayoutElement> = first
        .children()
        .iter()
        .filter(|e| e.name.ends_with("Item") || e.name.ends_with("_item"))
        .cloned()
        .collect();
    if items.is_empty() { vec![first] } else { items }
}

/// One synthetic item holding the first row, labelled left-to-right.
///
/// Assumes every row looks like the first one.
fn row_template(grid: &GridMetrics, cells: Vec<LayoutElement>) -> LayoutElement {
    let columns = grid.columns as usize;
    let row: Vec<LayoutElement> = cells
        .into_iter()
        .take(columns)
        .enumerate()
        .map(|(i, mut cell)| {
            cell.name = format!("{GRID_CELL_NAME}-{}", columns - i - 1);
            cell
        })
        .collect();
    LayoutElement::new(ElementKind::Group, GRID_CELL_NAME).with_elements(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: u32, columns: u32) -> GridMetrics {
        GridMetrics {
            rows,
            columns,
            cell_width: 100.0,
            cell_height: 50.0,
            padding_x: 10.0,
            padding_y: 20.0,
        }
    }

    fn cell(children: &[&str]) -> LayoutElement {
        LayoutElement::new(ElementKind::Group, GRID_CELL_NAME).with_elements(
            children
                .iter()
                .map(|name| LayoutElement::new(ElementKind::Group, *name).with_elements(Vec::new()))
                .collect(),
        )
    }

    #[test]
    fn single_row_scrolls_horizontally() {
        let cells = vec![cell(&["icon"]), cell(&["icon"]), cell(&["icon"])];
        let scroller = synthesize(&grid(1, 3), (0.0, 0.0), 400.0, 1.0, cells);

        assert_eq!(scroller.layout.scroll, ScrollDirection::Horizontal);
        assert_eq!(scroller.items.len(), 1);
        assert_eq!(scroller.layout.spacing, Some(10.0));
        assert_eq!(scroller.items[0].children()[0].pivot, Some(Pivot::LEFT_TOP));
        // 3 * (100 + 10) = 330, leftover 70
        assert_eq!(scroller.layout.padding_right, Some(70.0));
    }

    #[test]
    fn single_column_prefers_item_children() {
        let cells = vec![cell(&["bg", "rowItem", "other_item"]), cell(&["bg"])];
        let scroller = synthesize(&grid(4, 1), (5.0, 8.0), 100.0, 2.0, cells);

        assert_eq!(scroller.layout.scroll, ScrollDirection::Vertical);
        let names: Vec<&str> = scroller.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["rowItem", "other_item"]);
        assert_eq!(scroller.layout.padding_left, Some(10.0));
        assert_eq!(scroller.layout.padding_top, Some(16.0));
        assert_eq!(scroller.layout.spacing, Some(40.0));
        // wider than the frame
        assert_eq!(scroller.layout.padding_right, Some(0.0));
    }

    #[test]
    fn single_column_falls_back_to_first_cell() {
        let cells = vec![cell(&["bg", "label"]), cell(&["bg"])];
        let scroller = synthesize(&grid(2, 1), (0.0, 0.0), 100.0, 1.0, cells);

        assert_eq!(scroller.items.len(), 1);
        assert_eq!(scroller.items[0].name, GRID_CELL_NAME);
        assert!(
            scroller.items[0]
                .children()
                .iter()
                .all(|e| e.pivot == Some(Pivot::LEFT_TOP))
        );
    }

    #[test]
    fn grid_template_is_first_row_only() {
        // Later rows are ignored even when they differ from the first one.
        let cells = vec![
            cell(&["c"]),
            cell(&["b"]),
            cell(&["a"]),
            cell(&["odd", "extra"]),
        ];
        let scroller = synthesize(&grid(2, 3), (0.0, 0.0), 500.0, 1.0, cells);

        assert_eq!(scroller.layout.scroll, ScrollDirection::Vertical);
        assert_eq!(scroller.items.len(), 1);
        let template = &scroller.items[0];
        assert_eq!(template.name, GRID_CELL_NAME);
        let names: Vec<&str> = template.children().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["item0-2", "item0-1", "item0-0"]);
        assert!(template.children().iter().all(|e| e.pivot == Some(Pivot::LEFT_TOP)));
        assert_eq!(template.children()[2].children()[0].name, "a");
        assert_eq!(template.children()[2].children()[0].pivot, None);
    }

    #[test]
    fn empty_grid_yields_no_items() {
        let scroller = synthesize(&grid(3, 1), (0.0, 0.0), 100.0, 1.0, Vec::new());
        assert!(scroller.items.is_empty());
    }
}
