//! Library crate for lending-admin.
//!
//! This crate exposes the building blocks of the TUI:
//! - The book-acquisition workflow state machine (`workflow`)
//! - The lending backend contract and its HTTP client (`api`)
//! - Ticketed request dispatch off the UI thread (`dispatch`)
//! - Session context and the admin access gate (`session`)
//! - Application state and update loop (`app`)
//! - In-memory search helpers (`search`)
//! - Error and result types (`error`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `lending-admin` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod dispatch;
pub mod error;
pub mod search;
pub mod session;
pub mod ui;
pub mod workflow;

/// Convenient error and result types shared across the crate.
pub use error::{AppError, Result};
