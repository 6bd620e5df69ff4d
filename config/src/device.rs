//! Accelerator availability probing.

use std::path::Path;

/// Answers whether any GPU-class device is usable on this system.
///
/// Consulted only as a fallback, when a config carries no placement
/// rules: it decides whether the default placement lands on GPU or CPU.
pub trait AcceleratorProbe {
    fn is_available(&self) -> bool;
}

/// Probe backed by the host system.
///
/// Honors `CUDA_VISIBLE_DEVICES` (empty or `-1` hides all devices),
/// then checks for NVIDIA device nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl AcceleratorProbe for SystemProbe {
    fn is_available(&self) -> bool {
        if let Ok(visible) = std::env::var("CUDA_VISIBLE_DEVICES") {
            let visible = visible.trim();
            if visible.is_empty() || visible == "-1" {
                return false;
            }
        }
        Path::new("/dev/nvidiactl").exists() || Path::new("/dev/nvidia0").exists()
    }
}
