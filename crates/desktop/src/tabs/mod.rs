pub mod home_tab;
pub mod results_tab;
pub mod settings_tab;
