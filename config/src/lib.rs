//! Model deployment configuration records.
//!
//! A [`ModelConfig`] holds the ordered mapping that describes how a
//! model is served: batching limits, input/output schema, and instance
//! placement. It converts to and from the on-disk `config.pbtxt` text
//! form, summarizes instance placement across GPU and CPU devices, and
//! materializes itself into a model repository next to symlinked model
//! artifacts.
//!
//! # Example
//!
//! ```rust
//! use modelrepo_config::ModelConfig;
//!
//! let config = ModelConfig::from_serialized(r#"
//! name: "resnet50"
//! instance_group [
//!   { count: 2, kind: KIND_GPU }
//! ]
//! "#).unwrap();
//!
//! // Two replicas on each of three devices.
//! assert_eq!(config.instance_group_string(Some(3)), "6:GPU");
//! ```

mod device;
mod error;
mod fsutil;
mod model_config;

pub use device::{AcceleratorProbe, SystemProbe};
pub use error::ConfigError;
pub use fsutil::copy_tree;
pub use model_config::{
    CONFIG_FILE_NAME, DEFAULT_INSTANCE_COUNT, DEFAULT_INSTANCE_KIND, ModelConfig,
};
