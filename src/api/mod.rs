//! JSON endpoints mounted under `/api/v1`.

mod seo;
mod settings;
mod todos;

pub use seo::SeoController;
pub use settings::SettingController;
pub use todos::TodoController;
