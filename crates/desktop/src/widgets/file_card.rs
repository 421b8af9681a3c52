use iced::widget::{button, column, container, row, text, Space};
use iced::{Element, Length, Theme};

use person_detector_core::transfer::domain::image_upload::ImageUpload;

use crate::app::Message;
use crate::theme::{border_color, surface_color, tertiary_color};

const CORNER_RADIUS: f32 = 12.0;

/// Summary of the chosen image with a button to pick another one.
pub fn file_card<'a>(
    upload: Option<&ImageUpload>,
    can_change: bool,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);
    let surface = surface_color(theme);
    let border = border_color(theme);

    let display_text: Element<'a, Message> = match upload {
        Some(upload) => column![
            text(upload.file_name().to_string()).size(15).font(iced::Font {
                weight: iced::font::Weight::Medium,
                ..iced::Font::DEFAULT
            }),
            text(format!("{} \u{00B7} {}", upload.mime_type(), human_size(upload.len())))
                .size(12)
                .color(tertiary),
        ]
        .spacing(2)
        .into(),
        None => text("No file selected").size(15).color(tertiary).into(),
    };

    let label = if upload.is_some() { "Change" } else { "Browse" };
    let btn = button(text(label).size(13))
        .style(button::secondary)
        .padding([6, 14])
        .on_press_maybe(can_change.then_some(Message::PickFile));

    let info = column![
        text("IMAGE").size(11).color(tertiary),
        Space::new().height(2),
        display_text
    ]
    .width(Length::Fill);

    container(row![info, btn].spacing(8).align_y(iced::Alignment::Center))
        .padding([14, 16])
        .width(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(iced::Background::Color(surface)),
            border: iced::border::Border {
                color: border,
                width: 1.0,
                radius: CORNER_RADIUS.into(),
            },
            ..container::Style::default()
        })
        .into()
}

fn human_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KB", b / KIB)
    } else {
        format!("{:.1} MB", b / (KIB * KIB))
    }
}
