// Example: measurements follow stable keys across inserts.
use std::sync::Arc;

use virtual_window::{Virtualizer, VirtualizerOptions};

fn main() {
    let ids: Arc<Vec<u64>> = Arc::new(vec![100, 101, 102]);
    let keys = Arc::clone(&ids);
    let mut v = Virtualizer::new(VirtualizerOptions::new_with_key(3, |_| 1, move |i| keys[i]));
    v.report_measurement(0, 10);
    println!(
        "before insert: size0={:?} size1={:?}",
        v.item_size(0),
        v.item_size(1)
    );

    // A new item is inserted at the front; id 100 moves to index 1.
    let ids: Arc<Vec<u64>> = Arc::new(vec![42, 100, 101, 102]);
    v.update_options(|o| {
        o.count = ids.len();
        o.get_item_key = Arc::new(move |i| ids[i]);
    });

    println!(
        "after insert: size0={:?} size1={:?}",
        v.item_size(0),
        v.item_size(1)
    );
}
