//! Domain models of the indicator:
//! - `registry` — the shared, versioned symbol list.
//! - `measure` — pixel width measurement of label text.
//! - `layout` — cached layout metrics and the aligned label format.
pub mod layout;
pub mod measure;
pub mod registry;
