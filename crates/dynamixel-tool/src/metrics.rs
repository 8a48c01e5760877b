use crate::descriptor::ParseReport;
use crate::types::DeviceDescriptor;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct LoadMetrics {
    pub descriptors_parsed: IntCounter,
    pub rows_skipped: IntCounter,
    pub control_items_loaded: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub load: LoadMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let load = LoadMetrics {
            descriptors_parsed: IntCounter::new(
                "dxl_descriptors_parsed",
                "Device descriptors parsed",
            )?,
            rows_skipped: IntCounter::new(
                "dxl_rows_skipped",
                "Descriptor rows dropped as malformed",
            )?,
            control_items_loaded: IntGauge::new(
                "dxl_control_items_loaded",
                "Control table items in the most recently parsed descriptor",
            )?,
        };
        registry.register(Box::new(load.descriptors_parsed.clone()))?;
        registry.register(Box::new(load.rows_skipped.clone()))?;
        registry.register(Box::new(load.control_items_loaded.clone()))?;
        Ok(Self { registry, load })
    }

    pub fn record(&self, desc: &DeviceDescriptor, report: &ParseReport) {
        self.load.descriptors_parsed.inc();
        self.load.rows_skipped.inc_by(report.skipped.len() as u64);
        self.load
            .control_items_loaded
            .set(desc.control_table.len() as i64);
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
