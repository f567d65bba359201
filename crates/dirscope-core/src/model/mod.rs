/// Data model — immutable scan records and size formatting.
pub mod folder_record;
pub mod size;

pub use folder_record::FolderRecord;
