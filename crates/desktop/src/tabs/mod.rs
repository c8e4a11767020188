pub mod about_tab;
pub mod appearance_tab;
pub mod camera_tab;
pub mod settings_tab;
