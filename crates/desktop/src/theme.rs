use iced::theme::Palette;
use iced::{color, Color, Theme};

use crate::settings::Appearance;

/// Builds the window theme. The accent follows the green of the face outlines.
pub fn resolve_theme(appearance: Appearance, high_contrast: bool) -> Theme {
    Theme::custom("FaceCam", palette(is_dark(appearance), high_contrast))
}

fn is_dark(appearance: Appearance) -> bool {
    match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    }
}

fn palette(dark: bool, high_contrast: bool) -> Palette {
    let (background, text, primary) = match (dark, high_contrast) {
        (true, false) => (
            color!(0x18, 0x1a, 0x1b),
            color!(0xd0, 0xd4, 0xd2),
            color!(0x3d, 0xb8, 0x6a),
        ),
        (false, false) => (
            color!(0xf4, 0xf6, 0xf5),
            color!(0x1b, 0x1f, 0x1d),
            color!(0x1f, 0x8f, 0x4e),
        ),
        (true, true) => (Color::BLACK, Color::WHITE, color!(0x5c, 0xe0, 0x8a)),
        (false, true) => (Color::WHITE, Color::BLACK, color!(0x00, 0x6b, 0x2e)),
    };
    let (success, warning, danger) = if dark {
        (
            color!(0x30, 0xd1, 0x58),
            color!(0xff, 0xcc, 0x00),
            color!(0xff, 0x5a, 0x4f),
        )
    } else {
        (
            color!(0x24, 0x8a, 0x3d),
            color!(0xb2, 0x5c, 0x00),
            color!(0xd7, 0x00, 0x15),
        )
    };

    Palette {
        background,
        text,
        primary,
        success,
        warning,
        danger,
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains("dark"))
            .unwrap_or(true)
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        true
    }
}
