//! Device scopes for weight loading.

use crate::config::HubConfig;
use crate::error::{HubError, Result};
use crate::runtime::Runtime;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Where loaded weights should live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceScope {
    Cpu,
    Gpu,
    Xpu,
    Npu,
    /// Plain arrays, no device binding.
    Numpy,
}

impl DeviceScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceScope::Cpu => "cpu",
            DeviceScope::Gpu => "gpu",
            DeviceScope::Xpu => "xpu",
            DeviceScope::Npu => "npu",
            DeviceScope::Numpy => "numpy",
        }
    }

    /// Device string to select, or `None` for [`DeviceScope::Numpy`].
    pub fn device(&self) -> Option<String> {
        match self {
            DeviceScope::Cpu => Some("cpu".to_string()),
            DeviceScope::Gpu | DeviceScope::Xpu | DeviceScope::Npu => Some(format!(
                "{}:{}",
                self.as_str(),
                HubConfig::DEFAULT_DEVICE_ID
            )),
            DeviceScope::Numpy => None,
        }
    }
}

impl FromStr for DeviceScope {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cpu" => Ok(DeviceScope::Cpu),
            "gpu" => Ok(DeviceScope::Gpu),
            "xpu" => Ok(DeviceScope::Xpu),
            "npu" => Ok(DeviceScope::Npu),
            "numpy" | "np" => Ok(DeviceScope::Numpy),
            other => Err(HubError::UnsupportedDevice(other.to_string())),
        }
    }
}

impl fmt::Display for DeviceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects a device for its lifetime and restores the previous one on drop.
///
/// Restoration also happens when the guarded load fails or panics.
pub struct DeviceGuard<'r, R: Runtime + ?Sized> {
    runtime: &'r R,
    previous: String,
}

impl<'r, R: Runtime + ?Sized> DeviceGuard<'r, R> {
    /// Switch `runtime` to `device`, remembering the current selection.
    pub fn enter(runtime: &'r R, device: &str) -> Result<Self> {
        let previous = runtime.current_device();
        runtime.set_device(device)?;
        debug!("Switched device {} -> {}", previous, device);
        Ok(Self { runtime, previous })
    }
}

impl<R: Runtime + ?Sized> Drop for DeviceGuard<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.runtime.set_device(&self.previous) {
            warn!("Failed to restore device {}: {}", self.previous, e);
        }
    }
}
