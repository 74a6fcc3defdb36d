//! Dioxus UI components for anki-export.
//!
//! Provides the deck picker with drag-and-drop and the export form that
//! owns the hidden download link.

mod deck_picker;
mod export_form;

pub use deck_picker::{DeckPicker, PickedDeck};
pub use export_form::ExportForm;
