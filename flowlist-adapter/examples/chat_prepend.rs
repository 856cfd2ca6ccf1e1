//! A chat-style timeline: scroll near the top, load older messages, and keep
//! the viewport anchored so nothing jumps.
//!
//! Run with: `cargo run -p flowlist-adapter --example chat_prepend`

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flowlist_adapter::{ControllerOptions, ListController};

fn main() {
    let wants_older = Arc::new(AtomicBool::new(false));

    let mut chat: ListController<u64, String> = ListController::new(
        ControllerOptions::new(40)
            .with_viewport_height(200)
            .with_load_more_top(Some({
                let wants_older = Arc::clone(&wants_older);
                move || wants_older.store(true, Ordering::Relaxed)
            })),
    );
    chat.update_dataset((100..120u64).map(|id| (id, format!("message #{id}"))));

    // The user scrolls up toward the oldest loaded message.
    chat.on_scroll(400, 0);
    chat.on_scroll(45, 16);
    assert!(wants_older.load(Ordering::Relaxed));

    // The loader answers with three older messages, prepended.
    for (slot, id) in (97..100u64).enumerate() {
        chat.insert_item(slot, id, format!("message #{id}"));
    }

    // The controller owes a scroll command that keeps the old top message
    // exactly where the user left it.
    if let Some(target) = chat.take_pending_scroll() {
        println!("restore scroll to {target}");
        chat.on_scroll(target, 32);
    }

    chat.for_each_window_item(|cell| {
        println!(
            "row {:>2} @ {:>4} (h {:>2}) {}",
            cell.index, cell.offset, cell.height, cell.item
        );
    });
}
