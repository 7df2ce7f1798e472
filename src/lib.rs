//! Feelings iceberg - faux feelings explorer
//!
//! Helps someone get from what they say they feel ("overwhelmed", "ignored")
//! to the feelings and needs underneath.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use feelings_iceberg::{Action, Config, IcebergApp};
//!
//! let config = Config::load(&args)?;
//! let mut app = IcebergApp::load(&config).await?;
//!
//! let results = app.search("overwh");
//! app.toggle_faux_feeling("Overwhelmed");
//! let needs = app.get_selected_needs();
//! let graph = app.get_graph();
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   Adapter (REPL / JSON-RPC)                  │
//! └─────────────┬───────────────▲────────────────┘
//!               │ Action        │ ViewModel
//!               ▼               │
//! ┌──────────────────────────────────────────────┐
//! │   IcebergApp                                 │
//! │   SelectionState::apply()  → reducer         │
//! │   search / derive_needs / build_graph → pure │
//! └─────────────┬────────────────────────────────┘
//!               │ read-only
//!               ▼
//!   Dataset · SynonymTable · Categories
//! ```

pub mod app;
pub mod categories;
pub mod config;
pub mod dataset;
pub mod derive;
pub mod error;
pub mod mcp;
pub mod render;
pub mod search;
pub mod selection;
pub mod server;
pub mod synonyms;
pub mod types;

// Controller
pub use app::IcebergApp;
pub use config::Config;
pub use error::LoadError;
pub use types::*;

// Stores
pub use categories::{Categories, CategoryFeeling, CategoryView};
pub use dataset::{Dataset, Source};
pub use synonyms::SynonymTable;

// Pure core
pub use derive::{build_graph, derive_needs};
pub use search::{FeelingIndex, SearchEngine};
pub use selection::{Action, SelectionState};
