pub mod i18n;
pub mod loader;
pub mod tree;
pub mod types;

pub use i18n::{translate_schema, TranslationCatalog};
pub use loader::{embedded_schema, load_schema, load_schema_for_api, SchemaVersion};
pub use tree::{extend_with_linear_advance, SettingsContainer};
pub use types::{SettingType, SettingView, SettingsSchema};
