//! Honeycomb (brick) tessellation.
//!
//! Even rows hold `columns` cells starting at `x = 0`; odd rows hold one fewer, shifted right by
//! half a cell so they interlock with the rows around them.

use crate::config::require_positive;
use crate::flow::validate_item_sizes;
use crate::model::{Block, FlowItem, GridPosition, PlacedItem, Row};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    pub columns: usize,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl GridOptions {
    pub fn new(columns: usize, cell_width: f64, cell_height: f64) -> Self {
        Self {
            columns,
            cell_width,
            cell_height,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            return Err(Error::InvalidRequest {
                message: "grid needs at least one column".to_string(),
            });
        }
        require_positive("grid.cellWidth", self.cell_width)?;
        require_positive("grid.cellHeight", self.cell_height)?;
        Ok(())
    }

    /// Cells in `row`. A single-column grid keeps one cell per row so the fill always advances.
    pub fn row_capacity(&self, row: usize) -> usize {
        if row % 2 == 0 {
            self.columns
        } else {
            (self.columns - 1).max(1)
        }
    }

    fn row_offset(&self, row: usize) -> f64 {
        if row % 2 == 0 {
            0.0
        } else {
            self.cell_width / 2.0
        }
    }
}

/// Largest number of cells a single grid section may hold.
pub const MAX_GRID_ITEMS: usize = 10_000;

pub fn honeycomb_positions(count: usize, options: &GridOptions) -> Result<Vec<GridPosition>> {
    options.validate()?;
    if count > MAX_GRID_ITEMS {
        return Err(Error::InvalidRequest {
            message: format!("grid count {count} exceeds the limit of {MAX_GRID_ITEMS}"),
        });
    }

    let mut positions = Vec::new();
    let mut row = 0usize;
    while positions.len() < count {
        let take = options.row_capacity(row).min(count - positions.len());
        let offset = options.row_offset(row);
        for col in 0..take {
            positions.push(GridPosition {
                index: positions.len(),
                row,
                col,
                x: offset + col as f64 * options.cell_width,
                y: row as f64 * options.cell_height,
            });
        }
        row += 1;
    }

    tracing::debug!(
        count,
        columns = options.columns,
        rows = row,
        "honeycomb positions"
    );
    Ok(positions)
}

/// Places `items` on honeycomb cells and wraps them in a block for canvas sizing.
///
/// Items keep their own size and sit at the top-left corner of their cell. The block spans the
/// rightmost cell edge and `rows × cell_height`.
pub fn honeycomb_block(items: Vec<FlowItem>, options: &GridOptions) -> Result<Block> {
    validate_item_sizes(&items)?;
    let positions = honeycomb_positions(items.len(), options)?;

    let mut rows: Vec<Row> = Vec::new();
    let mut block_width: f64 = 0.0;
    for (pos, item) in positions.into_iter().zip(items) {
        if rows.len() <= pos.row {
            rows.push(Row {
                x: pos.x,
                y: pos.y,
                width: 0.0,
                height: options.cell_height,
                items: Vec::new(),
            });
        }
        let Some(row) = rows.last_mut() else {
            continue;
        };
        row.width = pos.x + options.cell_width - row.x;
        block_width = block_width.max(pos.x + options.cell_width);
        row.items.push(PlacedItem {
            index: pos.index,
            x: pos.x,
            y: pos.y,
            item,
        });
    }

    let height = rows.len() as f64 * options.cell_height;
    Ok(Block {
        rows,
        width: block_width,
        height,
    })
}
