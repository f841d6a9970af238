// Example: minimal usage and scroll-to helper.
use virtual_window::{Align, Viewport, Virtualizer, VirtualizerOptions};

fn main() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(1_000_000, |_| 24).with_overscan(2));
    let view = Viewport::new(123_456, 480);

    let window = v.query(view);
    println!("total_extent={}", v.total_extent());
    println!("window={:?}", window.range());
    println!("first={:?}", window.placements.first());

    let off = v.scroll_to_index_offset(999_999, Align::End, view);
    let window = v.query(Viewport::new(off, view.extent));
    println!("after scroll_to_index: offset={off} window={:?}", window.range());
}
