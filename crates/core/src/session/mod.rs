pub mod camera_session;
