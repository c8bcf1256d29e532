//! Runtime used by the command line front end.
//!
//! There is no model framework behind the CLI, so building a model or loading
//! weights produces a JSON description of what would have been handed to one.

use pumas_hub::{HubError, Kwargs, Result, Runtime};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Mutex;

pub struct DescribingRuntime {
    packages: Vec<String>,
    device: Mutex<String>,
}

impl DescribingRuntime {
    pub fn new(packages: Vec<String>) -> Self {
        Self {
            packages,
            device: Mutex::new("cpu".to_string()),
        }
    }
}

impl Runtime for DescribingRuntime {
    type Model = Value;
    type Weights = Value;

    fn has_package(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p == name)
    }

    fn build(&self, builder: &str, kwargs: &Kwargs) -> Result<Value> {
        Ok(json!({
            "builder": builder,
            "kwargs": kwargs,
        }))
    }

    fn current_device(&self) -> String {
        match self.device.lock() {
            Ok(device) => device.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_device(&self, device: &str) -> Result<()> {
        let mut current = self
            .device
            .lock()
            .map_err(|_| HubError::Runtime("device state poisoned".to_string()))?;
        *current = device.to_string();
        Ok(())
    }

    fn load_weights(&self, path: &Path, return_numpy: bool) -> Result<Value> {
        let metadata = std::fs::metadata(path).map_err(|e| HubError::io_with_path(e, path))?;
        Ok(json!({
            "path": path.display().to_string(),
            "size": metadata.len(),
            "return_numpy": return_numpy,
            "device": self.current_device(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_package() {
        let runtime = DescribingRuntime::new(vec!["numpy".to_string()]);
        assert!(runtime.has_package("numpy"));
        assert!(!runtime.has_package("scipy"));
    }

    #[test]
    fn test_build_describes_call() {
        let runtime = DescribingRuntime::new(Vec::new());
        let mut kwargs = Kwargs::new();
        kwargs.insert("depth".into(), json!(18));

        let model = runtime.build("vision.resnet", &kwargs).unwrap();
        assert_eq!(model["builder"], "vision.resnet");
        assert_eq!(model["kwargs"]["depth"], 18);
    }

    #[test]
    fn test_set_device() {
        let runtime = DescribingRuntime::new(Vec::new());
        assert_eq!(runtime.current_device(), "cpu");
        runtime.set_device("gpu:0").unwrap();
        assert_eq!(runtime.current_device(), "gpu:0");
    }
}
