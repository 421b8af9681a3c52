use iced::widget::{button, center, column, container, image, mouse_area, opaque, row, text};
use iced::{Alignment, Color, Element, Length, Theme};

use person_detector_core::preview::preview_overlay::{ClickTarget, ImageRef};

use crate::app::Message;
use crate::image_cache::ImageState;

const MAX_IMAGE_HEIGHT: f32 = 480.0;

/// Dimmed overlay with the enlarged image. Clicks on the card are swallowed;
/// clicks on the backdrop close it.
pub fn view<'a>(image_ref: &'a ImageRef, state: Option<&'a ImageState>) -> Element<'a, Message> {
    let body: Element<'a, Message> = match state {
        Some(ImageState::Ready(handle)) => image(handle.clone())
            .height(Length::Fixed(MAX_IMAGE_HEIGHT))
            .into(),
        Some(ImageState::Failed(message)) => text(message.as_str()).style(text::danger).into(),
        Some(ImageState::Loading) | None => text("Loading image...").into(),
    };

    let controls = row![
        button(text("Open in Browser").size(13))
            .style(button::secondary)
            .on_press(Message::OpenPreviewInBrowser),
        button(text("Close").size(13)).on_press(Message::PreviewClicked(ClickTarget::CloseButton)),
    ]
    .spacing(10);

    let card = container(
        column![body, text(image_ref.as_str()).size(11), controls]
            .spacing(12)
            .align_x(Alignment::Center),
    )
    .padding(16)
    .style(container::rounded_box);

    let backdrop = center(opaque(
        mouse_area(card).on_press(Message::PreviewClicked(ClickTarget::Image)),
    ))
    .style(|_theme: &Theme| container::Style {
        background: Some(
            Color {
                a: 0.7,
                ..Color::BLACK
            }
            .into(),
        ),
        ..container::Style::default()
    });

    opaque(mouse_area(backdrop).on_press(Message::PreviewClicked(ClickTarget::Backdrop)))
}
