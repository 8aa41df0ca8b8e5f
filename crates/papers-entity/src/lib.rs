//! # papers-entity
//!
//! Domain entity models for Papers. A [`node::Node`] is either a file or a
//! folder, modelled as one struct with a [`node::NodeKind`] variant so that
//! folder-only fields never appear on files. Folders carry a
//! [`node::Tag`], the materialized path used for ancestry tests.

pub mod node;
pub mod user;
