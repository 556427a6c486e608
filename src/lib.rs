//! shieldgen: Default-Allow tRPC Shield Generator
//!
//! Reads a data model description (the DMMF `modelOperations` table), classifies
//! every operation as a query or mutation, and writes a deterministic `shield.ts`
//! that grants `allow` to each one. Runs either under a schema host speaking
//! line-delimited JSON-RPC or as a one-shot CLI.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod host;
pub mod logging;
pub mod model;
