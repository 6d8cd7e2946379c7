//! Domain types shared across the workspace.

pub mod collections;
pub mod demande;
pub mod identifiers;
pub mod produit;
pub mod role;
pub mod time;
pub mod user;
