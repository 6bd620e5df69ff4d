//! Schema-less protobuf text format codec.
//!
//! Model configurations are stored on disk in protobuf text format
//! (`config.pbtxt`). This crate reads and writes that format without a
//! compiled schema: a config decodes into an ordered
//! [`serde_json::Map`] and encodes back from one.
//!
//! Bare enum identifiers (`KIND_GPU`, `TYPE_FP32`) decode to strings;
//! `true`/`false` decode to booleans. The decoded mapping is the unit
//! of equality: re-encoding quotes enum spellings, but decoding the
//! result yields an equal mapping.
//!
//! # Example
//!
//! ```rust
//! let config = modelrepo_pbtxt::decode(r#"
//! name: "resnet50"
//! max_batch_size: 8
//! "#).unwrap();
//! assert_eq!(config["max_batch_size"], 8);
//!
//! let text = modelrepo_pbtxt::encode(&config).unwrap();
//! assert_eq!(modelrepo_pbtxt::decode(&text).unwrap(), config);
//! ```

mod decode;
mod encode;
mod error;

pub use decode::decode;
pub use encode::encode;
pub use error::FormatError;
