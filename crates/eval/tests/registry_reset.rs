//! Registry lifecycle reset. Lives in its own integration test binary so
//! `clear()` cannot race with unit tests sharing the process-wide
//! registry.

use palisade_eval::registry;

#[test]
fn clear_removes_all_entries() {
    registry::register("reset_a", |_, _| true);
    registry::register("reset_b", |_, _| false);
    assert!(registry::exists("reset_a"));
    assert!(registry::exists("reset_b"));

    registry::clear();

    assert!(!registry::exists("reset_a"));
    assert!(!registry::exists("reset_b"));
    assert!(registry::get("reset_a").is_none());
}
