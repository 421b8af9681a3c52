use iced::widget::{button, column, container, row, text, Space};
use iced::{Element, Length, Theme};

use person_detector_core::preview::preview_overlay::ImageRef;
use person_detector_core::shared::endpoint::BaseEndpoint;
use person_detector_core::upload::upload_controller::{UploadController, UploadPhase};

use crate::app::{image_key, Message};
use crate::image_cache::{ImageCache, ImageState};
use crate::theme::{muted_color, tertiary_color};
use crate::widgets::file_card::file_card;
use crate::widgets::image_view::clickable_image;

const RESULT_IMAGE_WIDTH: f32 = 420.0;

pub fn view<'a>(
    upload: &'a UploadController,
    pick_error: Option<&'a str>,
    endpoint: Option<&BaseEndpoint>,
    images: &'a ImageCache,
    theme: &Theme,
) -> Element<'a, Message> {
    let muted = muted_color(theme);

    let submit = button(text(upload.button_label()).size(14))
        .style(button::primary)
        .padding([10, 24])
        .on_press_maybe(upload.can_submit().then_some(Message::SubmitUpload));

    let mut actions = row![submit].spacing(10);
    if matches!(upload.phase(), UploadPhase::Succeeded | UploadPhase::Failed) {
        actions = actions.push(
            button(text("Clear").size(14))
                .style(button::secondary)
                .padding([10, 18])
                .on_press(Message::ClearUpload),
        );
    }

    let mut content = column![
        text("Person Detection").size(20).font(iced::Font {
            weight: iced::font::Weight::Bold,
            ..iced::Font::DEFAULT
        }),
        Space::new().height(4),
        text("Upload an image and the backend will count the people in it.")
            .size(13)
            .color(muted),
        Space::new().height(16),
        file_card(upload.selected_file(), !upload.is_submitting(), theme),
    ];

    if let Some(message) = pick_error {
        content = content.push(Space::new().height(6));
        content = content.push(text(message).size(12).style(text::danger));
    }

    content = content.push(Space::new().height(16));
    content = content.push(actions);

    if let Some(message) = upload.error_message() {
        content = content.push(Space::new().height(12));
        content = content.push(text(message).size(13).style(text::danger));
    }

    if let Some(outcome) = upload.outcome() {
        let key = image_key(endpoint, &outcome.image_url);
        content = content.push(Space::new().height(20));
        content = content.push(outcome_view(
            outcome.headline(),
            images.get(&key),
            ImageRef(key),
            theme,
        ));
    }

    content.width(Length::Fill).into()
}

fn outcome_view<'a>(
    headline: String,
    image_state: Option<&'a ImageState>,
    image_ref: ImageRef,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    container(
        column![
            text(headline).size(17).font(iced::Font {
                weight: iced::font::Weight::Semibold,
                ..iced::Font::DEFAULT
            }),
            Space::new().height(10),
            clickable_image(image_state, image_ref, RESULT_IMAGE_WIDTH),
            Space::new().height(6),
            text("Click the image to enlarge it").size(11).color(tertiary),
        ]
        .align_x(iced::Alignment::Center),
    )
    .center_x(Length::Fill)
    .into()
}
