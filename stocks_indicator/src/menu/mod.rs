//! Menu projection:
//! - `surface` — the row surface of the host toolkit and an in-memory one.
//! - `projector` — binds symbols to rows and renders aligned labels.
pub mod projector;
pub mod surface;
