//! # Duelforge
//!
//! Server-authoritative backend for a two-player dice duel.
//!
//! Duelforge ties the layers together: transport → protocol → engine.
//! Clients connect over WebSocket with a stable `clientId`, submit
//! intents as JSON events, and the server resolves matchmaking and
//! combat with no trust in client-reported outcomes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duelforge::DuelServerBuilder;
//!
//! # async fn run() -> Result<(), duelforge::DuelforgeError> {
//! let server = DuelServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod gateway;
mod server;

pub use error::DuelforgeError;
pub use server::{DuelServer, DuelServerBuilder};
