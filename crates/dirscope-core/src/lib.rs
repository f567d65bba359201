/// dirscope core — concurrent folder-size scanning with a two-tier cache.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, GUI, TUI).
///
/// # Modules
///
/// - [`model`] — Immutable scan result records and size formatting.
/// - [`scanner`] — Worker-pool scan engine with progress reporting.
/// - [`cache`] — Keyed scan cache with TTL checks and a durable JSON store.
/// - [`session`] — One-scan-at-a-time orchestration over cache and scanner.
/// - [`settings`] — Operator-facing knobs consumed at scan start.
/// - [`error`] — Request-level error taxonomy.
pub mod cache;
pub mod error;
pub mod model;
pub mod scanner;
pub mod session;
pub mod settings;
