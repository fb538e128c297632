//! Tunnel Cat (workspace facade crate).
//!
//! A cooperative tunnel-building card game: players extend a tunnel network
//! out from the central house and win together by sealing every open exit
//! before the 50-card deck runs out. This package keeps the
//! `tunnel_cat::{core,adapter,types}` public API stable while the
//! implementation lives in dedicated crates under `crates/`.

pub use tunnel_cat_adapter as adapter;
pub use tunnel_cat_core as core;
pub use tunnel_cat_types as types;
