use iced::mouse::Interaction;
use iced::widget::{image, mouse_area, text};
use iced::{Element, Length};

use person_detector_core::preview::preview_overlay::ImageRef;

use crate::app::Message;
use crate::image_cache::ImageState;

/// Fetched image that opens the preview when clicked. Shows a placeholder
/// while the download is pending and the failure text if it failed.
pub fn clickable_image<'a>(
    state: Option<&'a ImageState>,
    image_ref: ImageRef,
    width: f32,
) -> Element<'a, Message> {
    match state {
        Some(ImageState::Ready(handle)) => mouse_area(image(handle.clone()).width(Length::Fixed(width)))
            .on_press(Message::OpenPreview(image_ref))
            .interaction(Interaction::Pointer)
            .into(),
        Some(ImageState::Failed(message)) => text(message.as_str())
            .size(11)
            .style(text::danger)
            .width(Length::Fixed(width))
            .into(),
        Some(ImageState::Loading) | None => text("Loading...").size(11).into(),
    }
}
