#![forbid(unsafe_code)]

pub mod feed;
pub mod output;
pub mod producer;
pub mod snapshot;
pub mod velocity;

pub use feed::{load_feed, write_feed, FeedPaths, ForceConstantFeed};
pub use output::{write_result_json, write_table};
pub use producer::{
    prepare_inputs, CommandCalculator, CommandCompactor, ForceConstantCalculator,
    VelocityCompactor,
};
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use velocity::{VelocityHeader, VelocityReader};
