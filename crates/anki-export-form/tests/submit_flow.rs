//! Integration test: drive the submit flow end to end with fake browser pieces.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anki_export_form::{
    DownloadDescriptor, DownloadTarget, EXPORT_PATH, ExportTransport, FormPayload,
    ResponseStatus, SubmitError, SubmitEvent, SubmitGuard, SubmitState, TransportError,
    begin_submit,
};
use futures::executor::block_on;

const ORIGIN: &str = "http://localhost:5173";

#[derive(Default)]
struct Event {
    prevented: Cell<bool>,
}

impl SubmitEvent for Event {
    fn prevent_default(&self) {
        self.prevented.set(true);
    }
}

#[derive(Debug, Clone)]
struct Form {
    file: Option<String>,
    format: Option<String>,
}

impl Form {
    fn new(file: &str, format: &str) -> Self {
        Self {
            file: Some(file.to_owned()),
            format: Some(format.to_owned()),
        }
    }
}

impl FormPayload for Form {
    fn file_name(&self) -> Option<String> {
        self.file.clone()
    }

    fn format(&self) -> Option<String> {
        self.format.clone()
    }
}

/// Records every POST and answers with a fixed outcome.
struct Server {
    reply: Result<u16, TransportError>,
    posts: RefCell<Vec<(String, Option<String>)>>,
}

impl Server {
    fn answering(status: u16) -> Self {
        Self {
            reply: Ok(status),
            posts: RefCell::default(),
        }
    }

    fn unreachable() -> Self {
        Self {
            reply: Err(TransportError("connection refused".into())),
            posts: RefCell::default(),
        }
    }
}

impl ExportTransport<Form> for Server {
    async fn post(&self, path: &str, payload: &Form) -> Result<ResponseStatus, TransportError> {
        self.posts
            .borrow_mut()
            .push((path.to_owned(), payload.file.clone()));
        self.reply.clone().map(ResponseStatus::new)
    }
}

#[derive(Default)]
struct Anchor {
    href: RefCell<Option<String>>,
    download: RefCell<Option<String>>,
    clicks: Cell<u32>,
}

impl DownloadTarget for Anchor {
    fn assign(&self, descriptor: &DownloadDescriptor) {
        *self.href.borrow_mut() = Some(descriptor.url().to_string());
        *self.download.borrow_mut() = Some(descriptor.filename().to_owned());
    }

    fn activate(&self) {
        self.clicks.set(self.clicks.get() + 1);
    }
}

fn submit(
    guard: &Rc<SubmitGuard>,
    form: Form,
    server: &Server,
    anchor: &Anchor,
) -> (Event, Result<DownloadDescriptor, SubmitError>) {
    let event = Event::default();
    let result = begin_submit(&event, guard, form)
        .and_then(|pending| block_on(pending.run(server, anchor, ORIGIN)));
    (event, result)
}

#[test]
fn success_assigns_and_clicks_anchor() {
    let guard = Rc::new(SubmitGuard::new());
    let server = Server::answering(201);
    let anchor = Anchor::default();

    let (event, result) = submit(&guard, Form::new("MyDeck.apkg", "csv"), &server, &anchor);

    assert!(event.prevented.get());
    let descriptor = result.unwrap();
    assert_eq!(descriptor.filename(), "MyDeck.csv");
    assert_eq!(
        anchor.href.borrow().as_deref(),
        Some("http://localhost:5173/api/anki-export?file=MyDeck.apkg&format=csv")
    );
    assert_eq!(anchor.download.borrow().as_deref(), Some("MyDeck.csv"));
    assert_eq!(anchor.clicks.get(), 1);
    assert_eq!(
        *server.posts.borrow(),
        vec![(EXPORT_PATH.to_owned(), Some("MyDeck.apkg".to_owned()))]
    );
    assert_eq!(guard.state(), SubmitState::Done);
}

#[test]
fn failure_status_leaves_anchor_untouched() {
    for status in [301, 400, 404, 500] {
        let guard = Rc::new(SubmitGuard::new());
        let server = Server::answering(status);
        let anchor = Anchor::default();

        let (event, result) = submit(&guard, Form::new("MyDeck.apkg", "xlsx"), &server, &anchor);

        assert!(event.prevented.get());
        match result {
            Err(SubmitError::Rejected { status: got }) => assert_eq!(got.code(), status),
            other => panic!("expected rejection for {status}, got {other:?}"),
        }
        assert!(anchor.href.borrow().is_none());
        assert!(anchor.download.borrow().is_none());
        assert_eq!(anchor.clicks.get(), 0);
        assert_eq!(server.posts.borrow().len(), 1);
        assert_eq!(guard.state(), SubmitState::Done);
    }
}

#[test]
fn transport_error_leaves_anchor_untouched() {
    let guard = Rc::new(SubmitGuard::new());
    let server = Server::unreachable();
    let anchor = Anchor::default();

    let (event, result) = submit(&guard, Form::new("MyDeck.apkg", "xlsx"), &server, &anchor);

    assert!(event.prevented.get());
    assert!(matches!(result, Err(SubmitError::Transport(_))));
    assert_eq!(anchor.clicks.get(), 0);
    assert!(anchor.href.borrow().is_none());
    assert_eq!(guard.state(), SubmitState::Done);
}

#[test]
fn missing_fields_prevent_default_and_send_nothing() {
    let guard = Rc::new(SubmitGuard::new());
    let server = Server::answering(200);
    let anchor = Anchor::default();

    let no_file = Form {
        file: None,
        format: Some("xlsx".into()),
    };
    let (event, result) = submit(&guard, no_file, &server, &anchor);
    assert!(event.prevented.get());
    assert!(matches!(result, Err(SubmitError::MissingField("file"))));

    let no_format = Form {
        file: Some("d.apkg".into()),
        format: None,
    };
    let (event, result) = submit(&guard, no_format, &server, &anchor);
    assert!(event.prevented.get());
    assert!(matches!(result, Err(SubmitError::MissingField("format"))));

    assert!(server.posts.borrow().is_empty());
    assert_eq!(anchor.clicks.get(), 0);
    assert_eq!(guard.state(), SubmitState::Idle);
}

#[test]
fn second_submit_while_in_flight_is_rejected() {
    let guard = Rc::new(SubmitGuard::new());
    let server = Server::answering(200);
    let anchor = Anchor::default();

    let first_event = Event::default();
    let pending = begin_submit(&first_event, &guard, Form::new("a.apkg", "xlsx")).unwrap();
    assert!(guard.is_in_flight());

    let second_event = Event::default();
    let err = begin_submit(&second_event, &guard, Form::new("b.apkg", "json")).unwrap_err();
    assert!(matches!(err, SubmitError::Busy));
    assert!(second_event.prevented.get());

    block_on(pending.run(&server, &anchor, ORIGIN)).unwrap();
    assert_eq!(anchor.clicks.get(), 1);
    assert_eq!(anchor.download.borrow().as_deref(), Some("a.xlsx"));
    assert_eq!(server.posts.borrow().len(), 1);

    // Resolved: the form accepts a new submission.
    let (_, result) = submit(&guard, Form::new("b.apkg", "json"), &server, &anchor);
    assert_eq!(result.unwrap().filename(), "b.json");
    assert_eq!(anchor.clicks.get(), 2);
}

#[test]
fn dropping_a_pending_submit_releases_the_guard() {
    let guard = Rc::new(SubmitGuard::new());
    let pending = begin_submit(&Event::default(), &guard, Form::new("a.apkg", "xlsx")).unwrap();
    assert_eq!(pending.submission().file_name, "a.apkg");
    drop(pending);
    assert_eq!(guard.state(), SubmitState::Done);
}

#[test]
fn unusable_origin_is_reported_without_clicking() {
    let guard = Rc::new(SubmitGuard::new());
    let server = Server::answering(200);
    let anchor = Anchor::default();

    let pending = begin_submit(&Event::default(), &guard, Form::new("a.apkg", "xlsx")).unwrap();
    let result = block_on(pending.run(&server, &anchor, "null"));

    assert!(matches!(result, Err(SubmitError::Descriptor(_))));
    assert_eq!(anchor.clicks.get(), 0);
}

#[test]
fn one_captured_anchor_serves_every_submission() {
    let guard = Rc::new(SubmitGuard::new());
    let anchor = Anchor::default();

    let (_, rejected) = submit(&guard, Form::new("a.apkg", "xlsx"), &Server::answering(500), &anchor);
    assert!(matches!(rejected, Err(SubmitError::Rejected { .. })));
    assert!(anchor.href.borrow().is_none());

    let (_, first) = submit(&guard, Form::new("a.apkg", "xlsx"), &Server::answering(200), &anchor);
    assert_eq!(first.unwrap().filename(), "a.xlsx");
    let (_, second) = submit(&guard, Form::new("b.APKG", "json"), &Server::answering(200), &anchor);
    assert_eq!(second.unwrap().filename(), "b.json");

    assert_eq!(
        anchor.href.borrow().as_deref(),
        Some("http://localhost:5173/api/anki-export?file=b.APKG&format=json")
    );
    assert_eq!(anchor.download.borrow().as_deref(), Some("b.json"));
    assert_eq!(anchor.clicks.get(), 2);
}
