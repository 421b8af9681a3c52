use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use crate::settings::Appearance;

pub fn resolve_theme(appearance: Appearance) -> Theme {
    let palette = match appearance {
        Appearance::Light => light_palette(),
        Appearance::Dark => dark_palette(),
    };
    Theme::custom("Person Detector", palette)
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xff, 0xff, 0xff),
        text: color!(0x37, 0x41, 0x51),
        primary: color!(0x16, 0xa3, 0x4a),
        success: color!(0x16, 0xa3, 0x4a),
        warning: color!(0xea, 0xb3, 0x08),
        danger: color!(0xdc, 0x26, 0x26),
    }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x18, 0x1b, 0x1f),
        text: color!(0xe5, 0xe7, 0xeb),
        primary: color!(0x22, 0xc5, 0x5e),
        success: color!(0x22, 0xc5, 0x5e),
        warning: color!(0xfa, 0xcc, 0x15),
        danger: color!(0xf8, 0x71, 0x71),
    }
}

/// Card background, a step off the page background.
pub fn surface_color(theme: &Theme) -> Color {
    let p = theme.palette();
    let luma = p.background.r * 0.299 + p.background.g * 0.587 + p.background.b * 0.114;
    let shift = if luma > 0.5 { -0.03 } else { 0.06 };
    Color {
        r: (p.background.r + shift).clamp(0.0, 1.0),
        g: (p.background.g + shift).clamp(0.0, 1.0),
        b: (p.background.b + shift).clamp(0.0, 1.0),
        a: 1.0,
    }
}

pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.75,
        ..theme.palette().text
    }
}

pub fn tertiary_color(theme: &Theme) -> Color {
    Color {
        a: 0.5,
        ..theme.palette().text
    }
}

pub fn border_color(theme: &Theme) -> Color {
    Color {
        a: 0.15,
        ..theme.palette().text
    }
}
