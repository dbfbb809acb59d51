//! metanet-cli: explorer state, configuration and persistence around
//! metanet-core.
//!
//! Loads a model from JSON, applies settings from TOML, keeps the explorer
//! state behind a reducer, and reads and writes state archives. The
//! `metanet` binary drives it from the command line.

pub mod archive;
pub mod config;
pub mod error;
pub mod load;
pub mod state;
pub mod status;
pub mod traverse;
pub mod util;

pub use archive::StateArchive;
pub use config::{Filter, Filters, Settings, TraversalLimits};
pub use error::{ExplorerError, Result};
pub use load::{filter_model, prepare_model, read_model, FilteredModel};
pub use state::{reduce, Action, ExplicitSimplifications, ExplorerState};
pub use status::{status, Status};
pub use traverse::{collect_traversal_nodes, resolve_node, TraversalRequest};
