//! lodcensus - census of the SPARQL endpoints listed in the LOD Cloud.
//!
//! Reads the LOD Cloud dataset registry, probes every SPARQL endpoint it
//! references with a battery of analytical queries and stores one record
//! per endpoint for later reporting.

pub mod cli;
pub mod config;
pub mod dump;
pub mod duplicates;
pub mod http_client;
pub mod import;
pub mod models;
pub mod probe;
pub mod report;
pub mod repository;
pub mod schema;
pub mod sparql;
