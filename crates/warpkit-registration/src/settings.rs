//! Configuration for cost evaluation.
//!
//! Plain serde structs so a pipeline can load them from whatever format it
//! already uses.

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use warpkit_core::{DeviceDisplacementField, DisplacementField, UpdateRule};
use crate::error::{RegistrationError, Result};
use crate::stream::Stream;

/// Worker configuration of a [`Stream`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Name of the worker thread; also tags log records and errors.
    pub name: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: "warpkit-stream".into(),
        }
    }
}

impl StreamConfig {
    /// Create a new stream config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Reject configurations a worker cannot be started with.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RegistrationError::invalid_configuration("stream name must not be empty"));
        }
        if self.name.contains('\0') {
            return Err(RegistrationError::invalid_configuration(
                "stream name must not contain NUL bytes",
            ));
        }
        Ok(())
    }
}

/// Settings shared by the cost terms of one registration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationSettings {
    /// Merge rule applied to trial perturbations and field updates.
    pub update_rule: UpdateRule,
    /// Stream the cost terms are evaluated on.
    pub stream: StreamConfig,
}

impl RegistrationSettings {
    /// Create new settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the update rule.
    pub fn with_update_rule(mut self, rule: UpdateRule) -> Self {
        self.update_rule = rule;
        self
    }

    /// Set the stream configuration.
    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<()> {
        self.stream.validate()
    }

    /// Upload `field` for cost evaluation under the configured update rule.
    pub fn upload<B: Backend>(
        &self,
        field: &DisplacementField,
        device: &B::Device,
    ) -> Result<DeviceDisplacementField<B>> {
        Ok(DeviceDisplacementField::from_host(field, self.update_rule, device)?)
    }

    /// Merge an accepted update into `field` under the configured update rule.
    pub fn apply_update(&self, field: &mut DisplacementField, update: &DisplacementField) -> Result<()> {
        Ok(field.update(update, self.update_rule)?)
    }

    /// Start a stream from the validated settings.
    pub fn create_stream(&self) -> Result<Stream> {
        self.validate()?;
        Stream::with_config(self.stream.clone())
    }
}
