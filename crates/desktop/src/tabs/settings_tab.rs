use iced::widget::{button, column, pick_list, row, slider, text, text_input, Space};
use iced::{Element, Theme};

use person_detector_core::shared::constants::BACKEND_URL_ENV;

use crate::app::Message;
use crate::settings::{Appearance, Settings, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
use crate::theme::tertiary_color;

pub fn view<'a>(
    settings: &'a Settings,
    backend_url_draft: &'a str,
    settings_error: Option<&'a str>,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let mut connection = column![
        text("Backend").size(16),
        Space::new().height(8),
        text_input("http://localhost:8000", backend_url_draft)
            .on_input(Message::BackendUrlEdited)
            .on_submit(Message::ApplyConnection)
            .size(13),
        Space::new().height(4),
        text(format!("Defaults to ${BACKEND_URL_ENV} when no URL is saved."))
            .size(11)
            .color(tertiary),
        Space::new().height(12),
        row![
            text("Timeout").size(13),
            slider(
                MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS,
                settings.timeout_secs,
                Message::TimeoutChanged
            ),
            text(format!("{} s", settings.timeout_secs)).size(13),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(12),
        button(text("Apply").size(13))
            .style(button::primary)
            .padding([6, 18])
            .on_press(Message::ApplyConnection),
    ];

    if let Some(message) = settings_error {
        connection = connection.push(Space::new().height(8));
        connection = connection.push(text(message).size(12).style(text::danger));
    }

    column![
        connection,
        Space::new().height(24),
        text("Theme").size(16),
        Space::new().height(8),
        row![
            text("Mode").size(13),
            pick_list(Appearance::ALL, Some(settings.appearance), |a| {
                Message::AppearanceChanged(a)
            })
            .text_size(13),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
    ]
    .into()
}
