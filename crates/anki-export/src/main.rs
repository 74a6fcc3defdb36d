use anki_export_io::ExportForm;
use dioxus::prelude::*;

fn main() {
    dioxus::launch(app);
}

/// Root application component.
///
/// The form owns its own state (selected deck, format, request status),
/// so the root only lays out the page around it.
fn app() -> Element {
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/main.css") }

        div { class: "page",
            header { class: "page-header",
                h1 { "anki-export" }
                p { class: "text-secondary",
                    "Convert an Anki deck (.apkg) into a spreadsheet"
                }
            }

            main { class: "page-main",
                ExportForm {}
            }
        }
    }
}
