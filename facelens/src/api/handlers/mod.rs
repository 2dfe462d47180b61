pub mod faces;
pub mod health;
pub mod text;
mod upload;

pub use faces::compare_faces;
pub use health::health_check;
pub use text::extract_text;
