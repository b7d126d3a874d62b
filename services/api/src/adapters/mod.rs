pub mod extraction;
pub mod file_store;
pub mod pdf_render;

pub use extraction::HttpExtractionAdapter;
pub use file_store::FileStorage;
pub use pdf_render::MupdfConverter;
