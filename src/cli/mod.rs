//! CLI subcommand implementations for the kargo-takip binary.

pub mod doctor;
pub mod providers_cmd;
pub mod track_cmd;
