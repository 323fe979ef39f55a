use std::rc::Rc;

use futures_util::FutureExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, Event, HtmlInputElement, Response, Storage};

use crate::connection::{collection_url, FetchCollection, FetchFuture, ParentFilter, DEFAULT_API_BASE};
use crate::entities::{Comment, Id, Post, PostDraft, PostPatch, UserPatch};
use crate::error::FetchError;
use crate::markup;
use crate::persisted::KeyValue;
use crate::render::{Column, DashboardCounts, Notify, Render, Severity, UiEvent, UserRow};
use crate::router::View;
use crate::session::{Capabilities, Session, SessionConfig};
use crate::theme::Theme;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(contents: &str);
}

fn js_error(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

pub fn get_local_storage() -> Result<Storage, String> {
    web_sys::window()
        .ok_or("no window")?
        .local_storage()
        .map_err(js_error)?
        .ok_or_else(|| "localStorage is unavailable".to_owned())
}

/// `window.localStorage` as a [`KeyValue`].
pub struct LocalStorage;

impl KeyValue for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        get_local_storage()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        get_local_storage()?.set_item(key, value).map_err(js_error)
    }
}

/// Fetches collections with `window.fetch`.
pub struct BrowserFetch {
    base: String,
}

impl BrowserFetch {
    pub fn new(base: &str) -> Self {
        BrowserFetch { base: base.to_owned() }
    }
}

impl FetchCollection for BrowserFetch {
    fn fetch_collection(&self, resource: &str, filter: Option<ParentFilter>) -> FetchFuture {
        let url = collection_url(&self.base, resource, filter);

        async move {
            let network = |value: JsValue| FetchError::Network(js_error(value));
            let window = web_sys::window().ok_or_else(|| FetchError::Network("no window".into()))?;

            let response: Response = JsFuture::from(window.fetch_with_str(&url))
                .await
                .map_err(network)?
                .dyn_into()
                .map_err(network)?;
            if !response.ok() {
                return Err(FetchError::Status(response.status()));
            }

            let text = JsFuture::from(response.text().map_err(network)?)
                .await
                .map_err(network)?
                .as_string()
                .ok_or_else(|| FetchError::Decode("response body is not text".into()))?;
            serde_json::from_str(&text).map_err(|err| FetchError::Decode(err.to_string()))
        }
        .boxed_local()
    }
}

/// Draws into the dashboard page through element ids.
pub struct DomRender {
    document: Document,
}

impl DomRender {
    pub fn new(document: Document) -> Self {
        DomRender { document }
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        let element = self.document.get_element_by_id(id);
        if element.is_none() {
            log(&format!("missing element #{}", id));
        }
        element
    }

    fn set_html(&self, id: &str, html: &str) {
        if let Some(element) = self.by_id(id) {
            element.set_inner_html(html);
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(element) = self.by_id(id) {
            element.set_text_content(Some(text));
        }
    }

    fn set_hidden(&self, element: &Element, hidden: bool) {
        let _ = element.class_list().toggle_with_force("hidden", hidden);
    }
}

impl Render for DomRender {
    fn show_view(&self, view: View) {
        for candidate in View::ALL {
            if let Some(section) = self.by_id(candidate.name()) {
                self.set_hidden(&section, candidate != view);
            }
        }
        self.set_text("viewTitle", view.title());

        if let Ok(buttons) = self.document.query_selector_all(".menu button") {
            for index in 0..buttons.length() {
                let Some(button) = buttons.item(index).and_then(|node| node.dyn_into::<Element>().ok()) else {
                    continue;
                };
                let active = button.get_attribute("data-view").as_deref() == Some(view.name());
                let _ = button.class_list().toggle_with_force("active", active);
            }
        }
    }

    fn theme(&self, theme: Theme) {
        if let Some(root) = self.document.document_element() {
            let _ = root.set_attribute("data-theme", theme.name());
        }
        self.set_text("themeToggle", theme.toggle_label());
    }

    fn loading(&self, busy: bool) {
        if let Some(loader) = self.by_id("loader") {
            self.set_hidden(&loader, !busy);
        }
    }

    fn counts(&self, counts: &DashboardCounts) {
        let show = |count: Option<usize>| count.map_or_else(|| "…".to_owned(), |count| count.to_string());
        self.set_text("usersCount", &show(counts.users));
        self.set_text("postsCount", &show(counts.posts));
        self.set_text("commentsCount", &show(counts.comments));
    }

    fn users(&self, columns: &[Column], rows: &[UserRow]) {
        self.set_html("usersTable", &markup::users_table(columns, rows));
    }

    fn posts(&self, posts: &[Post]) {
        self.set_html("postsContainer", &markup::posts_list(posts));
    }

    fn post_comments(&self, post_id: Id, comments: Option<&[Comment]>) {
        let Some(panel) = self.by_id(&format!("comments-{}", post_id)) else {
            return;
        };
        match comments {
            Some(comments) => {
                panel.set_inner_html(&markup::comment_preview(comments));
                let _ = panel.set_attribute("style", "display:block");
            }
            None => {
                let _ = panel.set_attribute("style", "display:none");
            }
        }
    }

    fn comments(&self, comments: &[Comment]) {
        self.set_html("commentsList", &markup::comments_list(comments));
    }
}

/// Shows the latest notification in `#toast` and mirrors it to the console.
pub struct ConsoleToast {
    document: Document,
}

impl ConsoleToast {
    pub fn new(document: Document) -> Self {
        ConsoleToast { document }
    }
}

impl Notify for ConsoleToast {
    fn notify(&self, severity: Severity, message: &str) {
        log(&format!("{:?}: {}", severity, message));
        if let Some(toast) = self.document.get_element_by_id("toast") {
            toast.set_text_content(Some(message));
            let _ = toast.set_attribute("class", &format!("toast {:?}", severity).to_lowercase());
        }
    }
}

fn prompt(message: &str, default: &str) -> Option<String> {
    web_sys::window()?
        .prompt_with_message_and_default(message, default)
        .ok()
        .flatten()
}

fn data_id(target: &Element, attribute: &str) -> Option<Id> {
    let selector = format!("[{}]", attribute);
    target
        .closest(&selector)
        .ok()
        .flatten()?
        .get_attribute(attribute)?
        .parse()
        .ok()
}

/// Maps a click to an event. Edit prompts run here, so a cancelled prompt
/// never reaches the session.
fn click_event(session: &Session, target: &Element) -> Option<UiEvent> {
    if let Ok(Some(button)) = target.closest("[data-view]") {
        let view = button.get_attribute("data-view")?.parse().ok()?;
        return Some(UiEvent::SelectView(view));
    }
    if let Ok(Some(button)) = target.closest("button[id]") {
        match button.id().as_str() {
            "themeToggle" => return Some(UiEvent::ToggleTheme),
            "showFavs" => return Some(UiEvent::ShowFavorites),
            "clearFavs" => return Some(UiEvent::ClearFavorites),
            "addPost" => {
                let title = prompt("Post title", "")?;
                let body = prompt("Post body", "").unwrap_or_default();
                return Some(UiEvent::AddPost(PostDraft { title, body }));
            }
            _ => {}
        }
    }
    if let Some(id) = data_id(target, "data-fav") {
        return Some(UiEvent::ToggleFavorite(id));
    }
    if let Some(id) = data_id(target, "data-id") {
        let user = session.current_user(id)?;
        let name = prompt("Edit name", &user.name)?;
        let email = prompt("Edit email", &user.email)?;
        return Some(UiEvent::EditUser {
            id,
            patch: UserPatch { name, email },
        });
    }
    if let Some(id) = data_id(target, "data-edit") {
        let post = session.current_post(id)?;
        let title = prompt("Edit title", &post.title)?;
        let body = prompt("Edit body", &post.body)?;
        return Some(UiEvent::EditPost {
            id,
            patch: PostPatch { title, body },
        });
    }
    if let Some(id) = data_id(target, "data-del") {
        return Some(UiEvent::DeletePost(id));
    }
    data_id(target, "data-comments").map(UiEvent::ToggleComments)
}

fn search_event(target: &HtmlInputElement) -> Option<UiEvent> {
    let view = match target.id().as_str() {
        "searchUser" => View::Users,
        "searchPost" => View::Posts,
        "searchComment" => View::Comments,
        _ => return None,
    };
    Some(UiEvent::Search {
        view,
        query: target.value(),
    })
}

fn dispatch(session: &Rc<Session>, event: UiEvent) {
    let session = session.clone();
    spawn_local(async move { session.handle(event).await });
}

fn wire_events(document: &Document, session: &Rc<Session>) -> Result<(), JsValue> {
    let click_session = session.clone();
    let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(target) = event.target().and_then(|target| target.dyn_into::<Element>().ok()) else {
            return;
        };
        if let Some(ui_event) = click_event(&click_session, &target) {
            dispatch(&click_session, ui_event);
        }
    });
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let input_session = session.clone();
    let on_input = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(input) = event
            .target()
            .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        if let Some(ui_event) = search_event(&input) {
            dispatch(&input_session, ui_event);
        }
    });
    document.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
    on_input.forget();

    Ok(())
}

#[wasm_bindgen]
pub fn bootstrap() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        log("no document to attach the dashboard to");
        return;
    };

    let session = Rc::new(Session::new(
        SessionConfig::default(),
        Capabilities {
            fetcher: Rc::new(BrowserFetch::new(DEFAULT_API_BASE)),
            storage: Rc::new(LocalStorage),
            render: Rc::new(DomRender::new(document.clone())),
            notify: Rc::new(ConsoleToast::new(document.clone())),
        },
    ));

    if let Err(err) = wire_events(&document, &session) {
        log(&format!("could not wire dashboard events: {}", js_error(err)));
        return;
    }

    spawn_local(async move { session.start().await });
}
