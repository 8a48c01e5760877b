//! dynamixel-tool: model index and device descriptor tables for Dynamixel servos
//!
//! Parses the `model_info.list` index and per-model `.device` descriptors into
//! typed control tables, baud rate maps and unit conversion constants. The
//! parsers only see text; a [`ModelSource`] decides where that text comes from.

mod error;
pub use error::{ModelError, Result, RowError};

pub mod line;

mod types;
pub use types::*;

mod model_index;
pub use model_index::{resolve_name, ModelIndex};

mod descriptor;
pub use descriptor::{parse_descriptor, DescriptorParser, ParseReport, Section, SkippedRow};

mod source;
pub use source::{FileSource, ModelSource, SourceConfig, StaticSource};

mod tool;
pub use tool::DynamixelTool;

mod metrics;
pub use metrics::{LoadMetrics, MetricsHub};
