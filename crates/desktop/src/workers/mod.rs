pub mod classifier_loader;
