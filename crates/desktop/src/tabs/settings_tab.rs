use iced::widget::{button, column, row, slider, text, Space};
use iced::Element;

use crate::app::{scaled, Message};
use crate::settings::Settings;

pub fn view<'a>(settings: &Settings, running: bool) -> Element<'a, Message> {
    let fs = settings.font_scale;

    let mut content = column![
        text("Camera").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            text("Device index").size(scaled(13.0, fs)),
            slider(0..=9, settings.camera_index, Message::CameraIndexChanged),
            text(settings.camera_index.to_string()).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(20),
        text("Detection").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            text("Scale factor").size(scaled(13.0, fs)),
            slider(1.05..=2.0, settings.scale_factor, Message::ScaleFactorChanged).step(0.05),
            text(format!("{:.2}", settings.scale_factor)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(8),
        row![
            text("Min neighbors").size(scaled(13.0, fs)),
            slider(0..=10, settings.min_neighbors, Message::MinNeighborsChanged),
            text(settings.min_neighbors.to_string()).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(8),
        row![
            text("Min face size").size(scaled(13.0, fs)),
            slider(5..=50, settings.min_face_percent, Message::MinFacePercentChanged),
            text(format!("{}% of frame height", settings.min_face_percent)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(20),
        button(text("Restore Defaults").size(scaled(13.0, fs)))
            .on_press(Message::RestoreDefaults)
            .padding([8, 16])
            .style(button::secondary),
    ]
    .spacing(0);

    if running {
        content = content.push(Space::new().height(12)).push(
            text("Changes take effect when the camera is stopped.").size(scaled(12.0, fs)),
        );
    }

    content.into()
}
