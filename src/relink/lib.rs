//! # Relink Architecture
//!
//! Relink rewrites the file paths held by nodes of a compositing scene, keeps
//! an append-only log of every relink, and saves named snapshots of node paths
//! that can be restored later. It is a library that happens to ship a CLI.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - Installs the logger, saves the scene file                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - RelinkApi: owns store, node adapter and config           │
//! │  - Turns version kinds and selections into plain arguments  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Relink, redirect, snapshot and history logic             │
//! │  - Per-node failures collected, never fatal to a batch      │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                         │
//!                    ▼                         ▼
//! ┌───────────────────────────┐   ┌─────────────────────────────┐
//! │  Storage (store/)         │   │  Nodes (nodes/)             │
//! │  - DataStore trait        │   │  - NodeAdapter trait        │
//! │  - SqliteStore, InMemory  │   │  - NukeScript, InMemory     │
//! └───────────────────────────┘   └─────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits.
//! Outcomes are returned as [`commands::CmdResult`] and logged through the
//! `log` facade; installing a logger is the binary's business.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit tests against `InMemoryStore` and `InMemoryNodes`.
//!    Most of the testing lives here.
//! 2. **API**: dispatch tests.
//! 3. **Stores and adapters**: `SqliteStore` against in-memory and temp-file
//!    databases, `NukeScript` against script text.
//! 4. **CLI**: end-to-end tests in `tests/` with `assert_cmd`.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade, entry point for all operations
//! - [`commands`]: business logic for each operation
//! - [`store`]: history and snapshot persistence
//! - [`nodes`]: access to the scene's path nodes
//! - [`pattern`]: path matching and rewriting
//! - [`version`]: snapshot label strategies
//! - [`config`]: `config.json` directory redirect
//! - [`model`]: core data types
//! - [`error`]: error types
//! - `cli`: argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod nodes;
pub mod pattern;
pub mod store;
pub mod version;
