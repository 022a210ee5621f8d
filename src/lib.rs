//! Bookmark transcoder: reads and writes Netscape bookmark HTML files.
//!
//! The pure core is `services::html_parser`, `services::tree_converter` and
//! `services::html_serializer`. The record store, settings and RPC layers sit
//! around it and are never called by it.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
