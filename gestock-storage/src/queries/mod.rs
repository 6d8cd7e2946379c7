//! Per-table query modules. `prepare_cached` + positional params throughout.

pub mod demandes;
pub mod produits;
pub mod users;
