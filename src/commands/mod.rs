// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command handlers for the CLI binary

pub mod index;
pub mod search;
