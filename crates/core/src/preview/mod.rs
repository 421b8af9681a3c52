pub mod preview_overlay;
