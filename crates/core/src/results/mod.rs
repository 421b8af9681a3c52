pub mod pagination;
pub mod results_controller;
