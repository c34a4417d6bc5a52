//! # jobboard
//!
//! Data-access and session core for the job-board client. Views (the
//! `jobboard-cli` front-end, or any other UI) talk to the resource hooks in
//! [`state`]; hooks talk to [`net::api::ApiClient`]; the client talks to the
//! REST backend through a [`net::transport::Transport`].
//!
//! Identity lives in [`state::session::SessionStore`], which is independent of
//! the resource hooks. [`util::guard`] reads it to gate routes.

pub mod config;
pub mod error;
pub mod net;
pub mod state;
pub mod util;

pub use config::ClientConfig;
pub use error::ClientError;
