//! Backup and restore for a hierarchical note workspace.
//!
//! A workspace (folders + files) is serialized into a versioned [`model::Snapshot`]
//! by the [`codec`], carried by a storage [`adapter`] (local file or a hosted
//! backend), and replayed into a live [`repo::Repository`] by the
//! [`reconcile`] engine, which remaps every identifier along the way.

pub mod adapter;
pub mod codec;
pub mod model;
pub mod reconcile;
pub mod repo;
