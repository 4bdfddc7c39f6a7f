/// Grid geometry inputs: fixed cell size, outer margins and inter-cell
/// spacing in pixels, and the column cap.
#[derive(Clone, Copy, Debug)]
pub struct GridSpec {
    pub cell_width: u32,
    pub cell_height: u32,
    /// Outer margins: top, right, bottom, left.
    pub margins: [u32; 4],
    pub spacing: u32,
    pub max_columns: u32,
}

impl GridSpec {
    pub fn new(cell_width: u32, cell_height: u32, margins: [u32; 4]) -> Self {
        Self {
            cell_width,
            cell_height,
            margins,
            spacing: 20,
            max_columns: 12,
        }
    }

    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_max_columns(mut self, max_columns: u32) -> Self {
        self.max_columns = max_columns.max(1);
        self
    }

    fn top(&self) -> u32 {
        self.margins[0]
    }

    fn right(&self) -> u32 {
        self.margins[1]
    }

    fn bottom(&self) -> u32 {
        self.margins[2]
    }

    fn left(&self) -> u32 {
        self.margins[3]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPosition {
    pub item_index: usize,
    pub x: u32,
    pub y: u32,
}

/// Pure, immutable layout result: canvas size plus one position per item.
#[derive(Clone, Debug)]
pub struct GridLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub columns: u32,
    pub rows: u32,
    pub positions: Vec<CellPosition>,
}

/// Map `(item count, cell size, margins)` to canvas size and placements.
///
/// Total over all non-negative counts: zero items produce a margins-only
/// canvas and no positions. The column count targets the canvas aspect
/// closest to 4:3; ties prefer fewer wasted trailing-row cells, then fewer
/// columns.
pub fn compute_layout(item_count: usize, spec: &GridSpec) -> GridLayout {
    if item_count == 0 {
        return GridLayout {
            canvas_width: spec.left() + spec.right(),
            canvas_height: spec.top() + spec.bottom(),
            columns: 0,
            rows: 0,
            positions: Vec::new(),
        };
    }

    let (columns, rows) = best_grid_dimensions(item_count, spec);
    let canvas_width =
        spec.left() + spec.right() + columns * spec.cell_width + (columns - 1) * spec.spacing;
    let canvas_height =
        spec.top() + spec.bottom() + rows * spec.cell_height + (rows - 1) * spec.spacing;

    let mut positions = Vec::with_capacity(item_count);
    for i in 0..item_count {
        let col = (i as u32) % columns;
        let row = (i as u32) / columns;
        positions.push(CellPosition {
            item_index: i,
            x: spec.left() + col * (spec.cell_width + spec.spacing),
            y: spec.top() + row * (spec.cell_height + spec.spacing),
        });
    }

    GridLayout {
        canvas_width,
        canvas_height,
        columns,
        rows,
        positions,
    }
}

const TARGET_ASPECT: f64 = 4.0 / 3.0;

fn best_grid_dimensions(item_count: usize, spec: &GridSpec) -> (u32, u32) {
    let count = item_count as u32;
    let limit = spec.max_columns.max(1).min(count);

    let mut best = (1u32, count);
    let mut best_waste = u32::MAX;
    let mut best_ratio_diff = f64::MAX;

    for columns in 1..=limit {
        let rows = count.div_ceil(columns);
        let waste = columns * rows - count;

        let grid_width =
            spec.left() + spec.right() + columns * spec.cell_width + (columns - 1) * spec.spacing;
        let grid_height =
            spec.top() + spec.bottom() + rows * spec.cell_height + (rows - 1) * spec.spacing;
        let ratio_diff = if grid_height == 0 {
            f64::MAX
        } else {
            (f64::from(grid_width) / f64::from(grid_height) - TARGET_ASPECT).abs()
        };

        if ratio_diff < best_ratio_diff || (ratio_diff == best_ratio_diff && waste < best_waste) {
            best_waste = waste;
            best_ratio_diff = ratio_diff;
            best = (columns, rows);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> GridSpec {
        GridSpec::new(300, 180, [120, 50, 50, 50])
    }

    #[test]
    fn zero_items_is_margins_only() {
        let layout = compute_layout(0, &spec());
        assert_eq!(layout.canvas_width, 100);
        assert_eq!(layout.canvas_height, 170);
        assert!(layout.positions.is_empty());
    }

    #[test]
    fn one_item_is_single_cell() {
        let layout = compute_layout(1, &spec());
        assert_eq!((layout.columns, layout.rows), (1, 1));
        assert_eq!(layout.canvas_width, 50 + 300 + 50);
        assert_eq!(layout.canvas_height, 120 + 180 + 50);
        assert_eq!(
            layout.positions[0],
            CellPosition {
                item_index: 0,
                x: 50,
                y: 120
            }
        );
    }

    #[test]
    fn aspect_target_picks_the_squarish_grid() {
        // 12 tiles of 300x180 under these margins: 3 columns x 4 rows lands
        // closest to the 4:3 target (1040x950).
        let layout = compute_layout(12, &spec());
        assert_eq!((layout.columns, layout.rows), (3, 4));
        assert!(layout.columns * layout.rows >= 12);
    }

    #[test]
    fn positions_are_in_bounds_and_disjoint_for_many_counts() {
        let spec = spec();
        for count in 0..60 {
            let layout = compute_layout(count, &spec);
            assert_eq!(layout.positions.len(), count);
            let mut seen = std::collections::BTreeSet::new();
            for pos in &layout.positions {
                assert!(pos.x + spec.cell_width <= layout.canvas_width);
                assert!(pos.y + spec.cell_height <= layout.canvas_height);
                // cell origins are unique; given the fixed cell size this
                // implies non-overlap
                assert!(seen.insert((pos.x, pos.y)));
            }
        }
    }

    #[test]
    fn max_columns_caps_the_grid() {
        let layout = compute_layout(40, &spec().with_max_columns(4));
        assert_eq!(layout.columns, 4);
        assert_eq!(layout.rows, 10);
    }

    #[test]
    fn row_major_order() {
        let layout = compute_layout(7, &spec().with_max_columns(3));
        assert_eq!(layout.columns, 3);
        let p = &layout.positions;
        assert_eq!(p[0].y, p[1].y);
        assert_eq!(p[0].y, p[2].y);
        assert!(p[3].y > p[2].y);
        assert_eq!(p[3].x, p[0].x);
    }
}
