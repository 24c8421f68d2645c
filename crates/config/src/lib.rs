// Configuration loading

pub mod settings;

pub use settings::{load_annotations, ExtractSettings, Settings, SnapshotSettings, UploadSettings};
