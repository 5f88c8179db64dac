#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

pub mod cli;
pub mod core;
pub mod error;
pub mod prelude;
pub mod quantity;
pub mod service;
pub mod settings;
pub mod store;
pub mod tables;
