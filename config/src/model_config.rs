//! The model deployment configuration record.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::device::{AcceleratorProbe, SystemProbe};
use crate::error::ConfigError;
use crate::fsutil::{copy_tree, make_symlink, relative_to};

/// File name the serving system expects inside a model version directory.
pub const CONFIG_FILE_NAME: &str = "config.pbtxt";

/// Replica count assumed when a placement rule omits `count`.
pub const DEFAULT_INSTANCE_COUNT: i64 = 1;

/// Device kind assumed when a placement rule omits `kind`.
pub const DEFAULT_INSTANCE_KIND: &str = "KIND_GPU";

const CPU_KIND: &str = "KIND_CPU";

/// A model's deployment configuration: batching limits, input/output
/// schema, and instance placement.
///
/// The backing mapping is the single source of truth; nothing derived
/// is cached. Construct one from a mapping or from a model directory
/// holding a `config.pbtxt`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    config: Map<String, Value>,
}

impl ModelConfig {
    /// Wrap a mapping as-is. `get_config` returns exactly this value.
    pub fn new(config: Map<String, Value>) -> Self {
        Self { config }
    }

    /// Decode a configuration from serialized text.
    pub fn from_serialized(text: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            config: modelrepo_pbtxt::decode(text)?,
        })
    }

    /// Read the configuration stored inside a model directory.
    ///
    /// The path must exist and be a directory; the config itself lives
    /// at the well-known [`CONFIG_FILE_NAME`] inside it.
    pub fn from_model_directory(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingModelPath(path.to_path_buf()));
        }
        if path.is_file() {
            return Err(ConfigError::NotADirectory(path.to_path_buf()));
        }
        let text = fs::read_to_string(path.join(CONFIG_FILE_NAME))?;
        Self::from_serialized(&text)
    }

    /// Borrow the current mapping.
    pub fn get_config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Overlay a partial mapping onto this one.
    ///
    /// Every top-level key in `partial` replaces the existing value
    /// wholesale; sub-mappings are not merged. Keys absent from
    /// `partial` stay untouched.
    pub fn set_config(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.config.insert(key, value);
        }
    }

    /// Summarize instance placement as `"<n>:GPU"`, `"<n>:CPU"`, or
    /// `"<g>:GPU + <c>:CPU"`, probing the host for accelerators when
    /// the config has no placement rules.
    ///
    /// `gpu_count` is the number of GPU-class devices in the target
    /// system; it defaults to 1 when omitted.
    pub fn instance_group_string(&self, gpu_count: Option<i64>) -> String {
        self.instance_group_string_with(&SystemProbe, gpu_count)
    }

    /// [`Self::instance_group_string`] with an explicit probe.
    pub fn instance_group_string_with(
        &self,
        probe: &dyn AcceleratorProbe,
        gpu_count: Option<i64>,
    ) -> String {
        let gpu_count = gpu_count.unwrap_or(1);

        let groups = self
            .config
            .get("instance_group")
            .and_then(Value::as_array)
            .filter(|groups| !groups.is_empty());
        let Some(groups) = groups else {
            // No rules: one instance per device, or one CPU instance
            // when the system has no accelerator at all.
            return if probe.is_available() {
                format!("{gpu_count}:GPU")
            } else {
                "1:CPU".to_string()
            };
        };

        let mut gpu_total = 0i64;
        let mut cpu_total = 0i64;
        for rule in groups {
            let count = rule
                .get("count")
                .and_then(Value::as_i64)
                .unwrap_or(DEFAULT_INSTANCE_COUNT);
            let kind = rule
                .get("kind")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_INSTANCE_KIND);
            if kind == CPU_KIND {
                cpu_total += count;
            } else {
                match rule.get("gpus").and_then(Value::as_array) {
                    // Pinned to explicit devices: one replica set per
                    // listed device, regardless of system size.
                    Some(gpus) => gpu_total += count * gpus.len() as i64,
                    None => gpu_total += count * gpu_count,
                }
            }
        }

        match (gpu_total > 0, cpu_total > 0) {
            (true, true) => format!("{gpu_total}:GPU + {cpu_total}:CPU"),
            (false, true) => format!("{cpu_total}:CPU"),
            _ => format!("{gpu_total}:GPU"),
        }
    }

    /// Materialize this configuration into `target`, linking the model
    /// artifacts found in `source` instead of copying them.
    ///
    /// Version directories and auxiliary files become relative
    /// symlinks. When `previous_target` names the target of the
    /// preceding run, link targets are expressed through it
    /// (`../<previous>/<entry>`), which keeps every link valid when the
    /// whole output tree is relocated as a unit; otherwise they are
    /// expressed relative to `source`. Other directories are copied.
    ///
    /// No rollback on failure: a failed call may leave `target`
    /// partially populated.
    pub fn write_to_repository(
        &self,
        target: &Path,
        source: &Path,
        previous_target: Option<&Path>,
    ) -> Result<(), ConfigError> {
        fs::create_dir_all(target)?;

        let text = modelrepo_pbtxt::encode(&self.config)?;
        fs::write(target.join(CONFIG_FILE_NAME), text)?;
        debug!(target_path = %target.display(), "wrote model configuration");

        for entry in fs::read_dir(source)? {
            let entry = entry?;
            let name = entry.file_name();
            if name == CONFIG_FILE_NAME {
                continue;
            }
            let destination = target.join(&name);
            let file_type = entry.file_type()?;
            let is_version_dir = file_type.is_dir()
                && name
                    .to_string_lossy()
                    .chars()
                    .all(|ch| ch.is_ascii_digit());

            if is_version_dir || !file_type.is_dir() {
                let link_target = match previous_target {
                    Some(previous) => {
                        let previous_name = previous.file_name().ok_or_else(|| {
                            io::Error::new(
                                io::ErrorKind::InvalidInput,
                                "previous target has no directory name",
                            )
                        })?;
                        Path::new("..").join(previous_name).join(&name)
                    }
                    None => relative_to(&entry.path(), target)?,
                };
                make_symlink(&link_target, &destination)?;
            } else {
                copy_tree(&entry.path(), &destination)?;
            }
        }
        Ok(())
    }
}
