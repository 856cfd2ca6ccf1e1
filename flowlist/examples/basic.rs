//! Minimal tour of the core engine: build a cache, mutate it, window it.
//!
//! Run with: `cargo run -p flowlist --example basic`

use flowlist::{PositionCache, PositionRecord, ScrollDirection, WindowParams, compute_range};

fn main() {
    let mut cache = PositionCache::<u64>::new();

    // 10k rows, all at the 40-unit estimate until measured.
    let default_height = 40u32;
    let mut offset = 0u64;
    for index in 0..10_000usize {
        cache.set(
            index as u64,
            PositionRecord {
                index,
                height: default_height,
                offset,
                measured: false,
            },
        );
        offset += default_height as u64;
    }
    println!("estimated extent: {}", cache.total_extent());

    // A few real measurements arrive; offsets downstream are corrected.
    cache.set_item_height(&3, 90);
    cache.set_item_height(&4, 12);
    println!("corrected extent: {}", cache.total_extent());

    // Prepend one row; everything renumbers and shifts.
    cache.insert(0, 999_999, default_height);
    println!("row 3 now sits at index {:?}", cache.index_of(&3));

    let range = compute_range(
        &cache,
        &WindowParams {
            scroll_offset: 1_000,
            viewport_size: 300,
            direction: ScrollDirection::Forward,
            overscan: 3,
        },
    )
    .unwrap();
    println!(
        "mount rows {}..={} ({} cells)",
        range.start_index,
        range.end_index,
        range.mounted_count()
    );
}
