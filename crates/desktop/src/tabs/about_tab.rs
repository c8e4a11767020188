use iced::widget::{button, column, text, Space};
use iced::Element;

use crate::app::{scaled, Message};

pub fn view(fs: f32) -> Element<'static, Message> {
    let version = env!("CARGO_PKG_VERSION");

    column![
        text("Face Detection and Tracking").size(scaled(22.0, fs)),
        Space::new().height(4),
        text(format!("Version {version}")).size(scaled(13.0, fs)),
        Space::new().height(12),
        text(
            "Shows live video from a camera and outlines every detected face. \
             Detection runs an OpenCV cascade classifier: the built-in Haar or \
             LBP frontal-face cascade, or any trained cascade file you choose."
        )
        .size(scaled(13.0, fs)),
        Space::new().height(16),
        button(text("About cascade classifiers").size(scaled(13.0, fs)))
            .on_press(Message::OpenDocs)
            .padding([8, 16]),
    ]
    .spacing(0)
    .into()
}
