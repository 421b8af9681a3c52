mod app;
mod image_cache;
mod settings;
mod tabs;
mod theme;
mod widgets;
mod workers;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("Person Detector")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(900.0, 680.0),
            min_size: Some(iced::Size::new(640.0, 480.0)),
            ..Default::default()
        })
        .run()
}
