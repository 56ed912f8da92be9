pub mod error_handling;
pub mod pipeline;
pub mod request_logging;
pub mod stages;

pub use error_handling::{format_errors, panic_response, ErrorFormatting};
pub use pipeline::{run_pipeline, JsonBody, Stage, StageContext, StagePipeline};
pub use request_logging::log_requests;
pub use stages::{ApiKeyStage, JsonBodyStage, ProductValidationStage};
