use crate::descriptor::{DescriptorParser, ParseReport};
use crate::error::{ModelError, Result};
use crate::model_index::resolve_name;
use crate::source::ModelSource;
use crate::types::{
    BaudRateTable, ControlTable, ControlTableEntry, DeviceDescriptor, ModelIdentity, TypeInfo,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Static description of one servo on the bus: its id, model and tables.
#[derive(Debug, Clone)]
pub struct DynamixelTool {
    id: u8,
    identity: ModelIdentity,
    descriptor: Arc<DeviceDescriptor>,
}

impl DynamixelTool {
    /// Resolves `model_number` through the source's model index, then loads
    /// that model's descriptor.
    pub fn from_model_number(
        id: u8,
        model_number: u16,
        source: &impl ModelSource,
    ) -> Result<Self> {
        Self::from_model_number_with_report(id, model_number, source).map(|(tool, _)| tool)
    }

    /// Like [`from_model_number`](Self::from_model_number), also returning the
    /// rows dropped while parsing the descriptor.
    pub fn from_model_number_with_report(
        id: u8,
        model_number: u16,
        source: &impl ModelSource,
    ) -> Result<(Self, ParseReport)> {
        let index = source.model_index()?;
        let Some(name) = resolve_name(&index, model_number) else {
            warn!(id, model_number, "model number not in index");
            return Err(ModelError::UnknownModelNumber(model_number));
        };
        let identity = ModelIdentity {
            number: Some(model_number),
            name,
        };
        Self::load(id, identity, source)
    }

    /// Loads the descriptor for a model given by name; the model number is
    /// left unknown.
    pub fn from_model_name(
        id: u8,
        model_name: impl Into<String>,
        source: &impl ModelSource,
    ) -> Result<Self> {
        Self::from_model_name_with_report(id, model_name, source).map(|(tool, _)| tool)
    }

    pub fn from_model_name_with_report(
        id: u8,
        model_name: impl Into<String>,
        source: &impl ModelSource,
    ) -> Result<(Self, ParseReport)> {
        let identity = ModelIdentity {
            number: None,
            name: model_name.into(),
        };
        Self::load(id, identity, source)
    }

    /// Builds a tool around an already parsed descriptor, so that servos of
    /// the same model can share one copy.
    pub fn from_descriptor(
        id: u8,
        identity: ModelIdentity,
        descriptor: Arc<DeviceDescriptor>,
    ) -> Self {
        Self {
            id,
            identity,
            descriptor,
        }
    }

    fn load(
        id: u8,
        identity: ModelIdentity,
        source: &impl ModelSource,
    ) -> Result<(Self, ParseReport)> {
        let text = source.device_descriptor(&identity.name)?;
        let (descriptor, report) = DescriptorParser::default().parse(&text);
        info!(
            id,
            model = %identity.name,
            items = descriptor.control_table.len(),
            skipped = report.skipped.len(),
            "loaded device descriptor"
        );
        let tool = Self::from_descriptor(id, identity, Arc::new(descriptor));
        Ok((tool, report))
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn identity(&self) -> &ModelIdentity {
        &self.identity
    }

    pub fn model_name(&self) -> &str {
        &self.identity.name
    }

    pub fn model_number(&self) -> Option<u16> {
        self.identity.number
    }

    pub fn descriptor(&self) -> &Arc<DeviceDescriptor> {
        &self.descriptor
    }

    pub fn control_table(&self) -> &ControlTable {
        &self.descriptor.control_table
    }

    pub fn control_item(&self, name: &str) -> Option<&ControlTableEntry> {
        self.descriptor.control_table.get(name)
    }

    pub fn control_item_or_err(&self, name: &str) -> Result<&ControlTableEntry> {
        self.control_item(name)
            .ok_or_else(|| ModelError::UnknownControlItem(name.to_string()))
    }

    pub fn baud_rates(&self) -> &BaudRateTable {
        &self.descriptor.baud_rates
    }

    pub fn baud_rate(&self, code: u8) -> Option<u32> {
        self.descriptor.baud_rates.get(code)
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.descriptor.type_info
    }
}
