use comfy_table::presets::ASCII_FULL;
use comfy_table::Table as Grid;

use super::Table;

/// Render the first `n` rows as a fixed-width, pipe-delimited grid.
/// Inspection output only, not a machine-readable contract.
pub(super) fn render(table: &Table, n: usize) -> String {
    let mut grid = Grid::new();
    grid.load_preset(ASCII_FULL);
    grid.set_header(table.columns().iter().map(|c| c.name.clone()));

    for row in table.raw_rows().iter().take(n) {
        grid.add_row(row.iter().map(|v| v.to_string()));
    }

    grid.to_string()
}
