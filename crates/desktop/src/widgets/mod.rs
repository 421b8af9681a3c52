pub mod file_card;
pub mod image_view;
pub mod preview_modal;
