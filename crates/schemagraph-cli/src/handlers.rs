//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

mod check;
mod utils;
mod validate;

pub use check::handle_check;
pub use validate::handle_validate;
