// Example: export and import the measurement cache.
use virtual_window::{Virtualizer, VirtualizerOptions};

fn main() {
    // Moving measurements to a fresh engine (for example when a view is remounted) lets it
    // start from real sizes instead of estimates.
    let mut v1 = Virtualizer::new(VirtualizerOptions::new(10, |_| 1));
    v1.report_measurement(2, 10);
    v1.report_measurement(5, 42);

    let snapshot = v1.export_measurement_cache();
    println!("exported_cache_len={}", snapshot.len());

    let mut v2 = Virtualizer::new(VirtualizerOptions::new(10, |_| 1));
    println!(
        "before import: size2={:?} size5={:?}",
        v2.item_size(2),
        v2.item_size(5)
    );

    v2.import_measurement_cache(snapshot);
    println!(
        "after import: cache_len={} size2={:?} size5={:?} total_extent={}",
        v2.measurement_cache_len(),
        v2.item_size(2),
        v2.item_size(5),
        v2.total_extent()
    );
}
