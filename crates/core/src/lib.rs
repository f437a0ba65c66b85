pub mod error;
pub mod health;
pub mod report;
pub mod sample;

pub use error::{PulseError, Result};
pub use health::{HealthScore, HealthScorer, HealthStatus, HealthThresholds, HealthWeights};
pub use report::{ContainerInfo, DeploymentInfo, HealthReport, ReportMeta, Resources, RuntimeInfo};
pub use sample::{round2, Sample};
