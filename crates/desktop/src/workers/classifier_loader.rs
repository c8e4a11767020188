use std::path::PathBuf;
use std::thread;

use crossbeam_channel::Receiver;

use facecam_core::detection::domain::classifier_kind::ClassifierKind;
use facecam_core::detection::infrastructure::classifier_resolver;

/// Messages sent from the loader thread to the UI.
#[derive(Debug, Clone)]
pub enum LoaderMessage {
    DownloadProgress(u64, u64),
    Resolved(PathBuf),
    Error(String),
}

/// Resolve the cascade file for `kind` in the background, downloading it if
/// needed. The last message is always `Resolved` or `Error`.
pub fn spawn(kind: ClassifierKind) -> Receiver<LoaderMessage> {
    let (tx, rx) = crossbeam_channel::unbounded::<LoaderMessage>();

    thread::spawn(move || {
        let progress_tx = tx.clone();
        let result = classifier_resolver::resolve(
            &kind,
            Some(Box::new(move |downloaded, total| {
                let _ = progress_tx.send(LoaderMessage::DownloadProgress(downloaded, total));
            })),
        );
        let message = match result {
            Ok(path) => LoaderMessage::Resolved(path),
            Err(e) => {
                log::error!("Failed to resolve {kind}: {e}");
                LoaderMessage::Error(e.to_string())
            }
        };
        let _ = tx.send(message);
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn last_message(rx: &Receiver<LoaderMessage>) -> LoaderMessage {
        let mut last = None;
        while let Ok(msg) = rx.recv_timeout(Duration::from_secs(5)) {
            last = Some(msg);
        }
        last.expect("loader sent nothing")
    }

    #[test]
    fn test_existing_custom_cascade_resolves_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces.xml");
        std::fs::write(&path, "<opencv_storage/>").unwrap();

        let rx = spawn(ClassifierKind::Custom(path.clone()));
        match last_message(&rx) {
            LoaderMessage::Resolved(resolved) => assert_eq!(resolved, path),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_custom_cascade_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let rx = spawn(ClassifierKind::Custom(dir.path().join("missing.xml")));
        assert!(matches!(last_message(&rx), LoaderMessage::Error(_)));
    }
}
