pub mod constants;
pub mod detection_result;
pub mod endpoint;
