//! Great-circle distances and pole-vector bearing angles between locations.
//!
//! The geometry lives in [`geo`]; the remaining modules make up the
//! `sitedist` command-line tool.

pub mod cli;
pub mod compute;
pub mod data;
pub mod error;
pub mod geo;
pub mod output;
#[cfg(feature = "parquet")]
pub mod parquet;
pub mod planner;
pub mod table_format;
