// Example: render/measure cycle with estimates refined by real sizes.
use virtual_window::{Viewport, Virtualizer, VirtualizerOptions};

fn main() {
    // Rows are estimated at 20 units; every third row really is taller.
    let real_size = |i: usize| if i % 3 == 0 { 45 } else { 20 };
    let mut v = Virtualizer::new(VirtualizerOptions::new(10_000, |_| 20).with_overscan(3));
    let view = Viewport::new(0, 300);

    for frame in 0..3 {
        let window = v.query(view);
        println!(
            "frame {frame}: window={:?} total_extent={}",
            window.range(),
            v.total_extent()
        );

        // The host lays out the mounted rows and reports what it observed.
        for p in &window {
            v.report_measurement(p.index, real_size(p.index));
        }
    }

    // Late reports for rows that no longer exist are dropped.
    let outcome = v.report_measurement(20_000, 10);
    println!("stale report: {outcome:?}");

    // Hosts with fractional layout round up.
    let outcome = v.report_measurement_f32(1, 20.4);
    println!("fractional report: {outcome:?} size={:?}", v.item_size(1));
}
