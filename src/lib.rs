// SPDX-License-Identifier: MIT OR Apache-2.0

//! codematch - Java declaration and reference search library
//!
//! A query is a [`pattern::Pattern`]. The [`engine::SearchEngine`] turns it
//! into index lookups, parses and binds the candidate documents in batches,
//! and reports every located node as a [`matching::MatchRecord`].

pub mod ast;
pub mod binding;
pub mod cancel;
pub mod compiler;
pub mod config;
pub mod element;
pub mod engine;
pub mod errors;
pub mod index;
pub mod java;
pub mod level;
pub mod locator;
pub mod matching;
pub mod modifiers;
pub mod output;
pub mod pattern;
pub mod scanner;
pub mod scope;
pub mod utils;
