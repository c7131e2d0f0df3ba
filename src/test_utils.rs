//! In-memory test double for the driver contract.
//!
//! Ships with the library (like the rest of the driver seam) so dependent
//! crates can exercise code that takes a [`Connection`](crate::driver::Connection)
//! without a running server: scripted results, an ordered event journal,
//! and captured bulk-copy payloads.

mod mock;

pub use mock::{MockConnection, MockCursor, MockEvent, ScriptedResult};
