//! # CLI Layer
//!
//! This module is **one possible UI client** for devpost, standing in for
//! the browser front end: each subcommand is one screen.
//!
//! | Screen          | Subcommand                         |
//! |-----------------|------------------------------------|
//! | Home            | `devpost` / `devpost home`         |
//! | New post        | `devpost new question\|article`    |
//! | Find questions  | `devpost questions [--watch]`      |
//! | Find articles   | `devpost articles`                 |
//!
//! The CLI layer is the **only** place that:
//! - Knows about terminal I/O (stdout, stderr, stdin prompts)
//! - Uses `std::process::exit`
//! - Installs the tracing subscriber
//!
//! ## Structure
//!
//! - `setup.rs`: clap definitions
//! - `commands.rs`: context setup and per-command handlers
//! - `print.rs`: rendering of lists and messages

mod commands;
mod print;
mod setup;

pub use commands::run;
