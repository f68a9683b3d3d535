//! Top-level facade crate for metrix.
//!
//! Re-exports the core types and the server library so users can depend on a single crate.

pub mod core {
    pub use metrix_core::*;
}

pub mod server {
    pub use metrix_server::*;
}
