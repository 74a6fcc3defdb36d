//! Upload form that converts a deck and downloads the result.

use std::rc::Rc;

use anki_export_form::{ExportFormat, SubmitError, SubmitEvent, SubmitGuard, begin_submit};
use dioxus::prelude::*;

use crate::components::{DeckPicker, PickedDeck};
use crate::console;
use crate::link::{DownloadLink, page_origin};
use crate::payload::FormFields;
use crate::transport::FetchTransport;

/// What the line under the submit button shows.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Ready,
    Exporting(String),
    Downloaded(String),
    Failed(String),
}

impl Status {
    /// Status after a new deck is picked. A running export keeps its line
    /// until it finishes.
    fn picked(self) -> Self {
        match self {
            Self::Exporting(name) => Self::Exporting(name),
            Self::Ready | Self::Downloaded(_) | Self::Failed(_) => Self::Ready,
        }
    }

    /// CSS class and text of the status line, if any.
    fn line(&self, busy_notice: bool) -> Option<(&'static str, String)> {
        match self {
            Self::Ready => None,
            Self::Exporting(name) if busy_notice => Some((
                "text-warning",
                format!("Still exporting {name}; wait for it to finish"),
            )),
            Self::Exporting(name) => Some(("text-secondary", format!("Exporting {name}..."))),
            Self::Downloaded(name) => Some(("text-success", format!("Downloading {name}"))),
            Self::Failed(message) => Some(("text-error", message.clone())),
        }
    }
}

struct FormSubmit<'a>(&'a FormEvent);

impl SubmitEvent for FormSubmit<'_> {
    fn prevent_default(&self) {
        self.0.prevent_default();
    }
}

/// Deck picker, format selector and submit button.
///
/// Submitting POSTs the deck and format to the export endpoint. When
/// the server accepts it, the hidden anchor is pointed at the converted
/// file and clicked. Failures are shown under the button and leave the
/// anchor alone. The button is disabled while the submit guard is in
/// flight.
#[component]
pub fn ExportForm() -> Element {
    let mut deck = use_signal(|| Option::<PickedDeck>::None);
    let mut format = use_signal(|| ExportFormat::default().token().to_owned());
    let mut status = use_signal(|| Status::Ready);
    let guard = use_hook(|| Rc::new(SubmitGuard::new()));
    // Mirrors `guard.is_in_flight()` so the button re-renders with it.
    let mut in_flight = use_signal(|| false);
    let mut busy_notice = use_signal(|| false);
    let mut link = use_signal(|| Option::<DownloadLink>::None);

    let on_pick = move |picked: PickedDeck| {
        deck.set(Some(picked));
        let current = status.peek().clone();
        status.set(current.picked());
    };

    let on_link_mounted = move |evt: MountedEvent| {
        let Some(element) = evt.data().downcast::<web_sys::Element>().cloned() else {
            console::warn("download link mounted without a DOM element");
            return;
        };
        match DownloadLink::from_element(element) {
            Ok(anchor) => link.set(Some(anchor)),
            Err(e) => console::warn(&e.to_string()),
        }
    };

    let onsubmit = move |evt: FormEvent| {
        let payload = {
            let deck = deck.peek();
            let format = format.peek();
            FormFields::build(
                Option::as_ref(&deck).map(|d| (d.bytes.as_slice(), d.name.as_str())),
                &format,
            )
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                evt.prevent_default();
                status.set(Status::Failed(e.to_string()));
                return;
            }
        };

        let pending = match begin_submit(&FormSubmit(&evt), &guard, payload) {
            Ok(pending) => pending,
            Err(SubmitError::Busy) => {
                console::warn("submit ignored: an export is already in progress");
                busy_notice.set(true);
                return;
            }
            Err(e) => {
                status.set(Status::Failed(e.to_string()));
                return;
            }
        };

        let target = link.peek().clone();
        let (origin, target) = match (page_origin(), target) {
            (Ok(origin), Some(target)) => (origin, target),
            (Err(e), _) => {
                status.set(Status::Failed(e.to_string()));
                return;
            }
            (Ok(_), None) => {
                status.set(Status::Failed("download link is not mounted".into()));
                return;
            }
        };

        let file_name = pending.submission().file_name.clone();
        console::info(&format!(
            "exporting {file_name} as {}",
            pending.submission().format
        ));
        status.set(Status::Exporting(file_name));
        in_flight.set(guard.is_in_flight());
        busy_notice.set(false);

        let guard = Rc::clone(&guard);
        spawn(async move {
            match pending.run(&FetchTransport, &target, &origin).await {
                Ok(descriptor) => {
                    console::info(&format!("downloading {}", descriptor.url()));
                    status.set(Status::Downloaded(descriptor.filename().to_owned()));
                }
                Err(e) => {
                    console::warn(&format!("export failed: {e}"));
                    status.set(Status::Failed(e.to_string()));
                }
            }
            in_flight.set(guard.is_in_flight());
            busy_notice.set(false);
        });
    };

    let exporting = in_flight();
    let line = status().line(busy_notice());

    rsx! {
        form { class: "export-form", onsubmit: onsubmit,
            DeckPicker { on_pick: on_pick }

            label { class: "field",
                span { "Output format" }
                select {
                    name: "format",
                    onchange: move |evt| format.set(evt.value()),
                    for f in ExportFormat::ALL {
                        option {
                            key: "{f}",
                            value: f.token(),
                            selected: f.token() == format(),
                            "{f.label()}"
                        }
                    }
                }
            }

            button {
                r#type: "submit",
                class: "button button-primary",
                disabled: exporting,
                if exporting { "Exporting..." } else { "Export" }
            }

            if let Some((class, text)) = line {
                p { class: class, "{text}" }
            }

            a {
                class: "hidden",
                download: "",
                aria_hidden: "true",
                onmounted: on_link_mounted,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picking_a_deck_keeps_a_running_export() {
        let status = Status::Exporting("MyDeck.apkg".into()).picked();
        assert_eq!(status, Status::Exporting("MyDeck.apkg".into()));
        assert_eq!(
            status.line(false),
            Some(("text-secondary", "Exporting MyDeck.apkg...".to_owned()))
        );
    }

    #[test]
    fn picking_a_deck_clears_finished_results() {
        assert_eq!(Status::Downloaded("a.xlsx".into()).picked(), Status::Ready);
        assert_eq!(Status::Failed("HTTP 500".into()).picked(), Status::Ready);
        assert_eq!(Status::Ready.picked(), Status::Ready);
        assert_eq!(Status::Ready.line(false), None);
    }

    #[test]
    fn busy_submit_is_visible_while_exporting() {
        let (class, text) = Status::Exporting("MyDeck.apkg".into())
            .line(true)
            .unwrap_or_default();
        assert_eq!(class, "text-warning");
        assert!(text.contains("Still exporting MyDeck.apkg"), "{text}");
    }

    #[test]
    fn button_follows_guard_not_status() {
        let guard = SubmitGuard::new();
        assert!(guard.try_begin());
        let status = Status::Exporting("MyDeck.apkg".into()).picked();
        // A pick mid-export must neither reset the line nor free the guard.
        assert!(guard.is_in_flight());
        assert!(matches!(status, Status::Exporting(_)));
        guard.finish();
        assert!(!guard.is_in_flight());
    }
}
