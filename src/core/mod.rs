//! Core module - generation, sampling and grouping

pub mod clock;
pub mod config;
pub mod dataset;
pub mod grouping;
pub mod lot_id;
pub mod sampler;
pub mod summary;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError, DatasetConfig, OutputConfig};
pub use dataset::{checked_count, generate_dataset, DatasetError, Synthesizer};
pub use grouping::{
    flatten_groups, group_by, group_by_multi, group_by_multi_with, group_by_with, FieldAccess,
    GroupError, GroupNode, Grouper, Groups, KeySpec, MissingKey, NestedGroups,
};
pub use lot_id::generate_lot_id;
pub use sampler::{sample, Limits, Regime, SampleError};
pub use summary::{count, GroupSummary};
