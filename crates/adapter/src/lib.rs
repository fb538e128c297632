//! Adapter module - multiplayer access via TCP socket with JSON protocol
//!
//! This crate exposes the rules engine to remote players over a TCP socket.
//! Any line-based client works, from a hand-written bot to plain netcat.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Join**: Client sends `join`, server responds with `welcome` carrying
//!    the assigned player id
//! 3. **State Streaming**: After every accepted action the server broadcasts
//!    the full match `state` to every connected client
//! 4. **Commanding**: Any joined client may send commands; the rules engine
//!    decides whether it is that player's turn
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **join**: Enter the match with a display name
//! - **command**: Play a tunnel tile or action card, draw, or restart
//!
//! ## Server → Client
//!
//! - **welcome**: Response to join with the assigned player id
//! - **state**: Full public match snapshot (board, hands, turn, status)
//! - **error**: Rejection with machine-readable code, sent only to the
//!   offending client
//!
//! # Identity
//!
//! The connection is the player: the id assigned at accept time is the
//! engine's player id for every action on that socket, and disconnecting
//! removes the player from the match.
//!
//! # Environment Variables
//!
//! Configure the adapter using environment variables:
//!
//! - `TUNNELCAT_HOST`: Bind address (default: "127.0.0.1")
//! - `TUNNELCAT_PORT`: Port number (default: 7878, 0 = ephemeral)
//! - `TUNNELCAT_MAX_PENDING`: Command queue bound (default: 64)
//! - `TUNNELCAT_SEED`: Fixed match seed for reproducible games
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"join","name":"Alice"}
//! Server -> Client: {"type":"welcome","seq":0,"ts":1234567890,"player_id":1,"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"state","seq":1,"ts":1234567890,"tiles":[...],"players":[...],"status":"Waiting for players...",...}
//! Client -> Server: {"type":"command","seq":1,"play":{"kind":"playTunnel","card":0,"x":0,"y":-1,"rotation":0}}
//! Server -> Client: {"type":"state","seq":2,"ts":1234567891,...}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking
//! - A single match-loop task owns the `Match`; every client command funnels
//!   through one bounded channel into it, so actions apply strictly one at
//!   a time
//! - Per-client `seq` numbers on commands must be strictly increasing;
//!   violations are rejected without touching match state
//! - See [`protocol`] for message structure definitions
//! - See [`server`] for the TCP server implementation
//! - See [`runtime`] for the match loop
//!
//! # Testing
//!
//! Connect to the adapter using netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"join","name":"manual-test"}
//! {"type":"command","seq":1,"play":{"kind":"draw"}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tunnel_cat_core as core;
pub use tunnel_cat_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{run_match_loop, InboundCommand, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerState};
