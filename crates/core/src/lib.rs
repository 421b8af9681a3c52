pub mod preview;
pub mod results;
pub mod shared;
pub mod transfer;
pub mod upload;
