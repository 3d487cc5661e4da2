pub mod ask;
pub mod config_cmd;
pub mod ingest;
pub mod remember;
pub mod reset;
pub mod serve;
pub mod stats;
