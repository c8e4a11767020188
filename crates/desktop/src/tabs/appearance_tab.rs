use iced::widget::{checkbox, column, pick_list, row, slider, text, Space};
use iced::{Alignment, Element};

use crate::app::{scaled, Message};
use crate::settings::{Appearance, Settings};

pub fn view<'a>(settings: &Settings) -> Element<'a, Message> {
    let fs = settings.font_scale;

    let mode = pick_list(Appearance::ALL, Some(settings.appearance), Message::AppearanceChanged)
        .text_size(scaled(13.0, fs));
    let font_scale = slider(0.8..=1.5, settings.font_scale, Message::FontScaleChanged).step(0.05);

    column![
        text("Theme").size(scaled(16.0, fs)),
        Space::new().height(8),
        labeled(fs, "Mode", mode.into()),
        Space::new().height(12),
        checkbox(settings.high_contrast)
            .label("High contrast")
            .on_toggle(Message::HighContrastChanged)
            .text_size(scaled(13.0, fs)),
        Space::new().height(20),
        text("Text").size(scaled(16.0, fs)),
        Space::new().height(8),
        labeled(fs, "Size", font_scale.into()),
        text(format!("{:.0}%", settings.font_scale * 100.0)).size(scaled(12.0, fs)),
    ]
    .spacing(0)
    .into()
}

fn labeled<'a>(fs: f32, label: &'a str, control: Element<'a, Message>) -> Element<'a, Message> {
    row![text(label).size(scaled(13.0, fs)), control]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
}
