//! Optional machine-translation augmentation (LibreTranslate HTTP contract).

pub mod api;

pub use api::{TranslationResult, Translator};
