// Example: photo gallery grid with measured rows and a column change.
use virtual_window::{Align, Viewport};
use virtual_window_grid::{GridOptions, GridVirtualizer};

fn main() {
    // 10k thumbnails, 6 per row, rows estimated at 120px.
    let mut grid = GridVirtualizer::new(GridOptions::uniform(10_000, 6, 120)).unwrap();
    println!(
        "rows={} total_extent={}",
        grid.row_count(),
        grid.total_extent()
    );

    let viewport = Viewport::new(0, 480);
    let window = grid.query(viewport);
    println!(
        "rows={:?} items={:?}",
        window.row_range().as_range(),
        window.item_range()
    );

    // Captions wrap, so some rows end up taller than estimated.
    for row in window.iter() {
        let height = if row.row % 3 == 0 { 150 } else { 120 };
        grid.report_row_measurement(row.row, height);
    }
    println!("total_extent after measuring={}", grid.total_extent());

    // Jump to item 4_321 and render from there.
    let offset = grid.scroll_to_item_offset(4_321, Align::Center, viewport);
    let viewport = Viewport::new(offset, viewport.extent);
    grid.for_each_row(viewport, |row| {
        println!("row {} at {} holds {:?}", row.row, row.start, row.items);
    });

    // The window got wider: columns change, rows are rebuilt.
    grid.set_column_count(8).unwrap();
    println!(
        "columns=8 rows={} total_extent={}",
        grid.row_count(),
        grid.total_extent()
    );
}
