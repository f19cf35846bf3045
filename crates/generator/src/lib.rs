//! Synthetic ad-performance history: channel profiles, the campaign
//! catalog, daily record synthesis, and the flat CSV snapshot.

pub mod export;
pub mod generator;
pub mod profile;
pub mod sampler;

pub use export::{export_csv, stage_csv, write_csv, StagedExport};
pub use generator::{seasonality, window, DataGenerator};
pub use profile::{default_campaigns, default_profiles, ChannelProfile, UniformRange};
pub use sampler::{RandomSampler, Sampler};
