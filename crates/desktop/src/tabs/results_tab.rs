use iced::widget::{button, column, container, row, rule, text, Space};
use iced::{Alignment, Element, Length, Theme};

use person_detector_core::preview::preview_overlay::ImageRef;
use person_detector_core::results::results_controller::{LoadPhase, ResultsController};
use person_detector_core::shared::detection_result::DetectionResult;
use person_detector_core::shared::endpoint::BaseEndpoint;

use crate::app::{image_key, Message};
use crate::image_cache::ImageCache;
use crate::theme::tertiary_color;
use crate::widgets::image_view::clickable_image;

const THUMBNAIL_WIDTH: f32 = 96.0;
const HEADERS: [&str; 5] = ["ID", "Timestamp", "Detected Persons", "Image", "Action"];

pub fn view<'a>(
    results: &'a ResultsController,
    endpoint: Option<&BaseEndpoint>,
    images: &'a ImageCache,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let refresh = button(text("Refresh").size(13))
        .style(button::secondary)
        .padding([6, 14])
        .on_press_maybe((!results.is_loading()).then_some(Message::RefreshResults));

    let header = row![
        text("Detection Results").size(20).width(Length::Fill),
        refresh
    ]
    .align_y(Alignment::Center);

    let body: Element<'a, Message> = match results.load_phase() {
        LoadPhase::Inactive | LoadPhase::Loading => text("Loading...").size(14).into(),
        LoadPhase::Failed => text(results.list_error().unwrap_or_default())
            .size(14)
            .style(text::danger)
            .into(),
        LoadPhase::Loaded if results.is_empty() => {
            text("No results found.").size(14).color(tertiary).into()
        }
        LoadPhase::Loaded => table(results, endpoint, images),
    };

    column![header, Space::new().height(16), body]
        .width(Length::Fill)
        .into()
}

fn table<'a>(
    results: &'a ResultsController,
    endpoint: Option<&BaseEndpoint>,
    images: &'a ImageCache,
) -> Element<'a, Message> {
    let heading = row(HEADERS
        .iter()
        .map(|h| cell(text(*h).size(12).font(iced::Font {
            weight: iced::font::Weight::Semibold,
            ..iced::Font::DEFAULT
        })))
        .collect::<Vec<_>>())
    .spacing(8);

    let mut rows = column![heading, rule::horizontal(1)].spacing(8);
    for result in results.page_items() {
        rows = rows.push(result_row(result, results, endpoint, images));
        rows = rows.push(rule::horizontal(1));
    }

    column![rows, Space::new().height(16), pager(results)].into()
}

fn result_row<'a>(
    result: &'a DetectionResult,
    results: &'a ResultsController,
    endpoint: Option<&BaseEndpoint>,
    images: &'a ImageCache,
) -> Element<'a, Message> {
    let key = image_key(endpoint, &result.image_url);
    let thumbnail = clickable_image(images.get(&key), ImageRef(key), THUMBNAIL_WIDTH);

    let deleting = results.is_deleting(result.id);
    let delete = button(text(if deleting { "Deleting..." } else { "Delete" }).size(13))
        .style(button::danger)
        .padding([4, 12])
        .on_press_maybe((!deleting).then_some(Message::DeleteResult(result.id)));

    let mut action = column![delete].spacing(4).align_x(Alignment::Center);
    if let Some(message) = results.row_error(result.id) {
        action = action.push(text(message).size(11).style(text::danger));
    }

    row![
        cell(text(result.id.to_string()).size(13)),
        cell(text(result.display_timestamp()).size(13)),
        cell(text(result.count.to_string()).size(13)),
        cell(thumbnail),
        cell(action),
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}

fn cell<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content).center_x(Length::FillPortion(1)).into()
}

fn pager<'a>(results: &ResultsController) -> Element<'a, Message> {
    let current = results.current_page();
    let last = results.total_pages();

    let mut controls = row![button(text("Previous").size(13))
        .style(button::secondary)
        .on_press_maybe((current > 1).then_some(Message::GoToPage(current - 1)))]
    .spacing(4)
    .align_y(Alignment::Center);

    for page in results.page_numbers() {
        let style = if page == current {
            button::primary
        } else {
            button::text
        };
        controls = controls.push(
            button(text(page.to_string()).size(13))
                .style(style)
                .on_press(Message::GoToPage(page)),
        );
    }

    controls = controls.push(
        button(text("Next").size(13))
            .style(button::secondary)
            .on_press_maybe((current < last).then_some(Message::GoToPage(current + 1))),
    );

    container(controls).center_x(Length::Fill).into()
}
