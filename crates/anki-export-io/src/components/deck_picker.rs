//! Deck selection by drag-and-drop or file dialog.

use anki_export_form::endpoint::SOURCE_SUFFIX;
use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;

/// A deck file read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedDeck {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PickedDeck {
    /// Whether the name carries the Anki package suffix.
    #[must_use]
    pub fn looks_like_deck(&self) -> bool {
        self.name
            .len()
            .checked_sub(SOURCE_SUFFIX.len())
            .and_then(|start| self.name.get(start..))
            .is_some_and(|tail| tail.eq_ignore_ascii_case(SOURCE_SUFFIX))
    }

    /// Human-readable size, e.g. `1.4 MiB`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // display only
    pub fn size_label(&self) -> String {
        let len = self.bytes.len();
        match len {
            0..1024 => format!("{len} B"),
            1024..1_048_576 => format!("{:.1} KiB", len as f64 / 1024.0),
            _ => format!("{:.1} MiB", len as f64 / 1_048_576.0),
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct DeckPickerProps {
    /// Fired once the chosen file has been read.
    on_pick: EventHandler<PickedDeck>,
}

/// Drop zone plus a "Choose deck" button backed by a hidden file input.
///
/// Other file types are accepted with a warning; the server decides
/// what it can convert.
#[component]
pub fn DeckPicker(props: DeckPickerProps) -> Element {
    let mut hovering = use_signal(|| false);
    let mut picked = use_signal(|| Option::<(String, String, bool)>::None);
    let mut read_error = use_signal(|| Option::<String>::None);

    let take_first = move |files: Vec<FileData>| async move {
        let Some(file) = files.into_iter().next() else {
            return;
        };
        let name = file.name();
        let bytes = match file.read_bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                read_error.set(Some(format!("Could not read {name}: {e}")));
                return;
            }
        };

        let deck = PickedDeck { name, bytes };
        picked.set(Some((
            deck.name.clone(),
            deck.size_label(),
            deck.looks_like_deck(),
        )));
        read_error.set(None);
        props.on_pick.call(deck);
    };

    let on_input = move |evt: FormEvent| async move {
        take_first(evt.files()).await;
    };

    let on_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        hovering.set(false);
        take_first(evt.files()).await;
    };

    let zone_class = if hovering() {
        "drop-zone drop-zone-active"
    } else {
        "drop-zone"
    };

    rsx! {
        div {
            class: zone_class,
            ondragover: move |evt| {
                evt.prevent_default();
                hovering.set(true);
            },
            ondragleave: move |_| hovering.set(false),
            ondrop: on_drop,

            match picked() {
                Some((name, size, true)) => rsx! {
                    p { class: "text-success", "{name} ({size})" }
                },
                Some((name, size, false)) => rsx! {
                    p { class: "text-success", "{name} ({size})" }
                    p { class: "text-warning", "This does not look like an Anki deck ({SOURCE_SUFFIX})." }
                },
                None => rsx! {
                    p { class: "text-secondary", "Drop an Anki deck here, or" }
                },
            }

            if let Some(err) = read_error() {
                p { class: "text-error", "{err}" }
            }

            label { class: "button",
                input {
                    r#type: "file",
                    name: "file",
                    accept: SOURCE_SUFFIX,
                    class: "hidden",
                    onchange: on_input,
                }
                "Choose deck"
            }
        }
    }
}
