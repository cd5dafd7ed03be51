//! # Devpost Architecture
//!
//! Devpost is a **UI-agnostic library** for posting and browsing questions and
//! articles. The command-line client is one UI on top of it; a web or TUI
//! front end would sit at the same level.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders lists, prompts for confirmation│
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the gateway, dates submissions                      │
//! │  - Turns failed user actions into error notifications       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Form state, submission workflow, list view models        │
//! │  - Pure Rust in, Rust out                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Gateway Layer (gateway/)                                   │
//! │  - Gateway trait: records, live snapshots, blobs            │
//! │  - FsGateway (production), MemGateway (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! Submission runs one way: form → workflow → gateway. Retrieval runs the
//! other: gateway → board → rendered list, with filtering and expand state
//! kept in the board.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Forms, submission, filtering and the two list boards
//! - [`gateway`]: Backend capability trait and implementations
//! - [`model`]: `Question`, `Article`, `Tags`, `Record`
//! - [`config`]: `config.json` handling
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
