use iced::widget::{button, checkbox, column, container, image, progress_bar, row, text, Space};
use iced::{Color, ContentFit, Element, Length};

use facecam_core::detection::domain::classifier_kind::ClassifierKind;

use crate::app::{scaled, Message, PendingLoad};
use crate::widgets::primary_button::primary_button;

const PREVIEW_WIDTH: f32 = 600.0;
const PREVIEW_HEIGHT: f32 = 400.0;

/// Everything the camera tab shows.
pub struct CameraView<'a> {
    pub fs: f32,
    pub frame: Option<&'a image::Handle>,
    pub face_count: usize,
    pub running: bool,
    pub can_start: bool,
    pub can_change_classifier: bool,
    pub selected: Option<&'a ClassifierKind>,
    pub pending: Option<&'a PendingLoad>,
    pub status: Option<&'a str>,
    pub toggle_hovered: bool,
}

pub fn view<'a>(state: CameraView<'a>) -> Element<'a, Message> {
    let fs = state.fs;

    let preview: Element<'a, Message> = match state.frame {
        Some(handle) => image(handle.clone())
            .width(PREVIEW_WIDTH)
            .content_fit(ContentFit::Contain)
            .into(),
        None => container(text(placeholder(state.running)).size(scaled(14.0, fs)))
        .width(PREVIEW_WIDTH)
        .height(PREVIEW_HEIGHT)
        .center_x(PREVIEW_WIDTH)
        .center_y(PREVIEW_HEIGHT)
        .style(container::bordered_box)
        .into(),
    };

    let shown = state.pending.map(|p| &p.kind).or(state.selected);
    let classifier_row = row![
        classifier_checkbox(
            "Haar Classifier",
            shown == Some(&ClassifierKind::Haar),
            &state,
            Message::HaarToggled,
        ),
        classifier_checkbox(
            "LBP Classifier",
            shown == Some(&ClassifierKind::Lbp),
            &state,
            Message::LbpToggled,
        ),
        custom_cascade_button(&state, shown),
    ]
    .spacing(16)
    .align_y(iced::Alignment::Center);

    let mut content = column![
        preview,
        Space::new().height(12),
        classifier_row,
        Space::new().height(12),
        toggle_button(&state),
    ]
    .spacing(0)
    .align_x(iced::Alignment::Center);

    if let Some(pending) = state.pending {
        if let Some((downloaded, total)) = pending.progress.filter(|&(_, total)| total > 0) {
            content = content
                .push(Space::new().height(8))
                .push(text(format!("Downloading {}", pending.kind)).size(scaled(12.0, fs)))
                .push(progress_bar(0.0..=total as f32, downloaded as f32));
        }
    }

    if state.running && state.frame.is_some() {
        let faces = match state.face_count {
            1 => "1 face".to_string(),
            n => format!("{n} faces"),
        };
        content = content
            .push(Space::new().height(8))
            .push(text(faces).size(scaled(12.0, fs)));
    }

    if let Some(status) = state.status {
        content = content.push(Space::new().height(8)).push(
            text(status.to_owned())
                .size(scaled(12.0, fs))
                .color(Color::from_rgb(0.85, 0.35, 0.3)),
        );
    }

    container(content).width(Length::Fill).center_x(Length::Fill).into()
}

fn placeholder(running: bool) -> &'static str {
    if running {
        "Waiting for camera\u{2026}"
    } else {
        "Camera is off"
    }
}

fn classifier_checkbox<'a>(
    label: &'a str,
    checked: bool,
    state: &CameraView<'a>,
    on_toggle: fn(bool) -> Message,
) -> Element<'a, Message> {
    let cb = checkbox(checked)
        .label(label)
        .text_size(scaled(13.0, state.fs));
    if state.can_change_classifier {
        cb.on_toggle(on_toggle).into()
    } else {
        cb.into()
    }
}

fn custom_cascade_button<'a>(
    state: &CameraView<'a>,
    shown: Option<&ClassifierKind>,
) -> Element<'a, Message> {
    let label = match shown {
        Some(kind @ ClassifierKind::Custom(_)) => format!("Custom: {kind}"),
        _ => "Custom\u{2026}".to_string(),
    };
    let btn = button(text(label).size(scaled(13.0, state.fs)))
        .padding([6, 12])
        .style(button::secondary);
    if state.can_change_classifier {
        btn.on_press(Message::PickCustomCascade).into()
    } else {
        btn.into()
    }
}

fn toggle_button<'a>(state: &CameraView<'a>) -> Element<'a, Message> {
    let fs = state.fs;
    let label = if state.running { "Stop Camera" } else { "Start Camera" };

    // Start stays disabled until a classifier has loaded.
    let enabled = state.running || state.can_start;

    primary_button(
        move || {
            text(label)
                .size(scaled(14.0, fs))
                .color(Color::WHITE)
                .into()
        },
        enabled.then_some(Message::ToggleCamera),
        state.toggle_hovered,
        Message::ToggleHovered,
        [10, 24],
    )
}
