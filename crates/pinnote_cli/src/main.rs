//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pinnote_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("pinnote_core ping={}", pinnote_core::ping());
    println!("pinnote_core version={}", pinnote_core::core_version());
}
