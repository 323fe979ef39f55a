extern crate dashboard_frontend;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use dashboard_frontend::load_slot::LoadState;
use dashboard_frontend::persisted::FAVORITE_USERS_KEY;
use dashboard_frontend::render::{Column, DashboardCounts, UserRow};
use dashboard_frontend::test_support::FakeFetch;
use dashboard_frontend::theme::Theme;
use dashboard_frontend::{
    Capabilities, Comment, FetchError, Id, MemoryStore, Notify, Post, PostDraft, PostPatch,
    Render, Session, SessionConfig, Severity, UiEvent, UserPatch, View,
};

#[derive(Clone, Debug, PartialEq)]
enum Frame {
    View(View),
    Theme(Theme),
    Loading(bool),
    Counts(DashboardCounts),
    Users(Vec<(Id, bool)>),
    Posts(Vec<Id>),
    PostComments(Id, Option<usize>),
    Comments(Vec<Id>),
}

#[derive(Default)]
struct Recorder {
    frames: RefCell<Vec<Frame>>,
    toasts: RefCell<Vec<(Severity, String)>>,
}

impl Recorder {
    fn last_users(&self) -> Option<Vec<(Id, bool)>> {
        self.frames.borrow().iter().rev().find_map(|frame| match frame {
            Frame::Users(rows) => Some(rows.clone()),
            _ => None,
        })
    }

    fn last_posts(&self) -> Option<Vec<Id>> {
        self.frames.borrow().iter().rev().find_map(|frame| match frame {
            Frame::Posts(ids) => Some(ids.clone()),
            _ => None,
        })
    }

    fn last_counts(&self) -> Option<DashboardCounts> {
        self.frames.borrow().iter().rev().find_map(|frame| match frame {
            Frame::Counts(counts) => Some(*counts),
            _ => None,
        })
    }

    fn last_toast(&self) -> Option<(Severity, String)> {
        self.toasts.borrow().last().cloned()
    }

    fn toast_count(&self) -> usize {
        self.toasts.borrow().len()
    }

    fn push(&self, frame: Frame) {
        self.frames.borrow_mut().push(frame);
    }
}

impl Render for Recorder {
    fn show_view(&self, view: View) {
        self.push(Frame::View(view));
    }

    fn theme(&self, theme: Theme) {
        self.push(Frame::Theme(theme));
    }

    fn loading(&self, busy: bool) {
        self.push(Frame::Loading(busy));
    }

    fn counts(&self, counts: &DashboardCounts) {
        self.push(Frame::Counts(*counts));
    }

    fn users(&self, columns: &[Column], rows: &[UserRow]) {
        assert_eq!(columns.len(), 6);
        self.push(Frame::Users(
            rows.iter().map(|row| (row.user.id, row.favorite)).collect(),
        ));
    }

    fn posts(&self, posts: &[Post]) {
        self.push(Frame::Posts(posts.iter().map(|post| post.id).collect()));
    }

    fn post_comments(&self, post_id: Id, comments: Option<&[Comment]>) {
        self.push(Frame::PostComments(post_id, comments.map(|c| c.len())));
    }

    fn comments(&self, comments: &[Comment]) {
        self.push(Frame::Comments(comments.iter().map(|c| c.id).collect()));
    }
}

impl Notify for Recorder {
    fn notify(&self, severity: Severity, message: &str) {
        self.toasts.borrow_mut().push((severity, message.to_owned()));
    }
}

struct Harness {
    fetch: Rc<FakeFetch>,
    storage: Rc<MemoryStore>,
    recorder: Rc<Recorder>,
    session: Session,
}

fn users(count: u64) -> Value {
    let users: Vec<Value> = (1..=count)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("User {}", id),
                "email": format!("user{}@example.com", id),
                "address": { "city": if id % 2 == 0 { "Evenville" } else { "Oddtown" } }
            })
        })
        .collect();
    json!(users)
}

fn posts(count: u64) -> Value {
    let posts: Vec<Value> = (1..=count)
        .map(|id| json!({"userId": 1, "id": id, "title": format!("Post {}", id), "body": format!("body {}", id)}))
        .collect();
    json!(posts)
}

fn comments(count: u64, post_id: u64) -> Value {
    let comments: Vec<Value> = (1..=count)
        .map(|id| json!({"postId": post_id, "id": id, "name": "n", "email": "e@x.io", "body": "b"}))
        .collect();
    json!(comments)
}

fn harness_from(fetch: FakeFetch, storage: MemoryStore) -> Harness {
    fetch.respond("users", users(10));
    fetch.respond("posts", posts(100));
    fetch.respond("comments", comments(500, 1));

    let fetch = Rc::new(fetch);
    let storage = Rc::new(storage);
    let recorder = Rc::new(Recorder::default());
    let session = Session::new(
        SessionConfig::default(),
        Capabilities {
            fetcher: fetch.clone(),
            storage: storage.clone(),
            render: recorder.clone(),
            notify: recorder.clone(),
        },
    );

    Harness {
        fetch,
        storage,
        recorder,
        session,
    }
}

fn harness_with(storage: MemoryStore) -> Harness {
    harness_from(FakeFetch::new(), storage)
}

fn harness() -> Harness {
    harness_with(MemoryStore::new())
}

#[tokio::test]
async fn start_counts_every_collection() {
    let h = harness();
    h.session.start().await;

    let mut calls = h.fetch.calls();
    calls.sort();
    assert_eq!(calls, vec!["comments", "posts", "users"]);
    assert_eq!(
        h.session.counts(),
        DashboardCounts {
            users: Some(10),
            posts: Some(100),
            comments: Some(500)
        }
    );
    assert!(h.recorder.frames.borrow().contains(&Frame::Theme(Theme::Light)));
    assert_eq!(h.session.users().load_state(), LoadState::NotLoaded);
    assert_eq!(h.session.posts().load_state(), LoadState::NotLoaded);
    assert!(!h.session.is_busy());
}

#[tokio::test]
async fn first_activation_loads_and_revisits_only_redraw() {
    let h = harness();
    h.session.start().await;

    h.session.handle(UiEvent::SelectView(View::Users)).await;
    assert_eq!(h.fetch.calls().len(), 4);
    assert_eq!(h.fetch.calls().last().map(String::as_str), Some("users"));
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Success, "Users loaded".to_owned()))
    );
    assert_eq!(h.session.active_view(), View::Users);

    h.session.handle(UiEvent::SelectView(View::Dashboard)).await;
    h.session.handle(UiEvent::SelectView(View::Users)).await;

    assert_eq!(h.fetch.calls().len(), 4);
    assert_eq!(h.recorder.toast_count(), 1);
    assert_eq!(h.recorder.last_users().map(|rows| rows.len()), Some(10));

    h.session.handle(UiEvent::SelectView(View::Posts)).await;
    h.session.handle(UiEvent::SelectView(View::Comments)).await;
    assert_eq!(h.fetch.calls().len(), 6);
    assert_eq!(h.recorder.last_posts().map(|ids| ids.len()), Some(20));
    assert_eq!(h.recorder.frames.borrow().last(), Some(&Frame::Comments((1..=12).collect())));
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Success, "Posts loaded".to_owned()))
    );
    assert_eq!(h.session.counts().posts, Some(100));
}

#[tokio::test]
async fn dashboard_recounts_what_failed_at_start() {
    let h = harness();
    h.fetch.fail("users", FetchError::Status(502));
    h.session.start().await;

    assert_eq!(h.session.counts().users, None);
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Error, "could not load users: unexpected status 502".to_owned()))
    );

    h.fetch.respond("users", users(10));
    h.session.handle(UiEvent::SelectView(View::Posts)).await;
    h.session.handle(UiEvent::SelectView(View::Dashboard)).await;

    assert_eq!(
        h.session.counts(),
        DashboardCounts {
            users: Some(10),
            posts: Some(100),
            comments: Some(500)
        }
    );
    assert_eq!(h.recorder.last_counts(), Some(h.session.counts()));
    // posts were counted at start and loaded on entry; only users is retried
    assert_eq!(h.fetch.calls().iter().filter(|call| *call == "users").count(), 2);
    assert_eq!(h.fetch.calls().iter().filter(|call| *call == "posts").count(), 2);
    assert_eq!(h.fetch.calls().len(), 5);
}

#[tokio::test]
async fn concurrent_view_entries_share_the_fetch() {
    let h = harness_from(FakeFetch::new().gated(), MemoryStore::new());

    futures_util::join!(
        h.session.handle(UiEvent::SelectView(View::Posts)),
        h.session.handle(UiEvent::SelectView(View::Posts)),
        async {
            assert!(h.session.is_busy());
            h.fetch.release();
        }
    );

    assert_eq!(h.fetch.calls(), vec!["posts"]);
    assert_eq!(h.session.posts().load_state(), LoadState::Loaded);
    assert!(!h.session.is_busy());
    assert_eq!(h.recorder.frames.borrow().last(), Some(&Frame::Posts((1..=20).collect())));
}

#[tokio::test]
async fn search_filters_without_refetching() {
    let h = harness();
    h.session.handle(UiEvent::SelectView(View::Posts)).await;

    h.session
        .handle(UiEvent::Search {
            view: View::Posts,
            query: "POST 1".into(),
        })
        .await;
    assert_eq!(
        h.recorder.last_posts(),
        Some(vec![1, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19])
    );

    h.session
        .handle(UiEvent::Search {
            view: View::Posts,
            query: String::new(),
        })
        .await;
    assert_eq!(h.recorder.last_posts().map(|ids| ids.len()), Some(20));

    h.session.handle(UiEvent::SelectView(View::Users)).await;
    h.session
        .handle(UiEvent::Search {
            view: View::Users,
            query: "evenville".into(),
        })
        .await;
    assert_eq!(
        h.recorder.last_users(),
        Some(vec![(2, false), (4, false), (6, false), (8, false), (10, false)])
    );

    assert_eq!(h.fetch.calls(), vec!["posts", "users"]);
    assert_eq!(h.session.posts().snapshot().len(), 20);
}

#[tokio::test]
async fn local_post_mutations() {
    let h = harness();
    h.session.handle(UiEvent::SelectView(View::Posts)).await;

    h.session
        .handle(UiEvent::AddPost(PostDraft {
            title: "New".into(),
            body: "B".into(),
        }))
        .await;
    assert_eq!(h.recorder.last_posts().unwrap()[0], 100_000);
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Success, "Post added (local)".to_owned()))
    );

    h.session
        .handle(UiEvent::EditPost {
            id: 100_000,
            patch: PostPatch {
                title: "Renamed".into(),
                body: "B2".into(),
            },
        })
        .await;
    assert_eq!(h.session.current_post(100_000).unwrap().title, "Renamed");

    h.session.handle(UiEvent::DeletePost(3)).await;
    h.session.handle(UiEvent::DeletePost(3)).await;
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Warning, "Post deleted (local)".to_owned()))
    );
    // posts loaded, add, edit, one delete
    assert_eq!(h.recorder.toast_count(), 4);
    assert!(!h.recorder.last_posts().unwrap().contains(&3));

    h.session
        .handle(UiEvent::AddPost(PostDraft {
            title: "  ".into(),
            body: "ignored".into(),
        }))
        .await;
    assert_eq!(h.session.posts().snapshot().len(), 20);
    assert_eq!(h.fetch.calls(), vec!["posts"]);
}

#[tokio::test]
async fn editing_a_missing_entity_reports_not_found() {
    let h = harness();
    h.session.handle(UiEvent::SelectView(View::Users)).await;
    let frames_before = h.recorder.frames.borrow().len();

    h.session
        .handle(UiEvent::EditUser {
            id: 99,
            patch: UserPatch {
                name: "x".into(),
                email: "x".into(),
            },
        })
        .await;

    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Error, "no entity with id 99".to_owned()))
    );
    assert_eq!(h.recorder.frames.borrow().len(), frames_before);

    h.session
        .handle(UiEvent::EditUser {
            id: 2,
            patch: UserPatch {
                name: "Ervin".into(),
                email: "ervin@example.com".into(),
            },
        })
        .await;
    assert_eq!(h.session.current_user(2).unwrap().name, "Ervin");
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Success, "User updated locally".to_owned()))
    );
}

#[tokio::test]
async fn favorites_are_persisted_and_filter_the_table() {
    let h = harness_with(MemoryStore::with_items([(FAVORITE_USERS_KEY, "[3,7]")]));
    h.session.handle(UiEvent::SelectView(View::Users)).await;

    h.session.handle(UiEvent::ToggleFavorite(3)).await;
    assert_eq!(h.storage.raw(FAVORITE_USERS_KEY).as_deref(), Some("[7]"));
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Info, "Removed favorite".to_owned()))
    );

    h.session.handle(UiEvent::ToggleFavorite(3)).await;
    assert_eq!(h.storage.raw(FAVORITE_USERS_KEY).as_deref(), Some("[7,3]"));
    assert_eq!(h.session.favorite_ids(), vec![7, 3]);

    h.session.handle(UiEvent::ShowFavorites).await;
    assert_eq!(h.recorder.last_users(), Some(vec![(3, true), (7, true)]));

    h.session.handle(UiEvent::ClearFavorites).await;
    assert_eq!(h.storage.raw(FAVORITE_USERS_KEY).as_deref(), Some("[]"));
    assert_eq!(h.recorder.last_users().map(|rows| rows.len()), Some(10));
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Info, "Favorites cleared".to_owned()))
    );

    h.session.handle(UiEvent::ShowFavorites).await;
    assert_eq!(
        h.recorder.last_toast(),
        Some((Severity::Warning, "No favorites".to_owned()))
    );
}

#[tokio::test]
async fn storage_failures_leave_state_unchanged() {
    let h = harness();
    h.session.handle(UiEvent::SelectView(View::Users)).await;
    h.storage.fail_writes(true);

    h.session.handle(UiEvent::ToggleFavorite(1)).await;
    assert!(h.session.favorite_ids().is_empty());
    assert_eq!(h.recorder.last_toast().map(|(severity, _)| severity), Some(Severity::Error));

    h.session.handle(UiEvent::ToggleTheme).await;
    assert_eq!(h.session.theme(), Theme::Light);

    h.storage.fail_writes(false);
    h.session.handle(UiEvent::ToggleTheme).await;
    assert_eq!(h.session.theme(), Theme::Dark);
    assert_eq!(h.storage.raw("theme").as_deref(), Some("\"dark\""));
}

#[tokio::test]
async fn failed_view_load_is_reported_and_retried() {
    let h = harness();
    h.fetch.fail("posts", FetchError::Network("connection reset".into()));

    h.session.handle(UiEvent::SelectView(View::Posts)).await;
    assert_eq!(
        h.recorder.last_toast(),
        Some((
            Severity::Error,
            "could not load posts: network error: connection reset".to_owned()
        ))
    );
    assert_eq!(h.session.posts().load_state(), LoadState::NotLoaded);
    assert_eq!(h.recorder.last_posts(), None);

    h.fetch.respond("posts", posts(3));
    h.session.handle(UiEvent::SelectView(View::Users)).await;
    h.session.handle(UiEvent::SelectView(View::Posts)).await;

    assert_eq!(h.fetch.calls(), vec!["posts", "users", "posts"]);
    assert_eq!(h.recorder.last_posts(), Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn comments_load_once_per_post() {
    let h = harness();
    h.fetch.respond("comments?postId=1", comments(8, 1));
    h.session.handle(UiEvent::SelectView(View::Posts)).await;

    h.session.handle(UiEvent::ToggleComments(1)).await;
    assert_eq!(
        h.recorder.frames.borrow().last(),
        Some(&Frame::PostComments(1, Some(5)))
    );

    h.session.handle(UiEvent::ToggleComments(1)).await;
    assert_eq!(
        h.recorder.frames.borrow().last(),
        Some(&Frame::PostComments(1, None))
    );

    h.session.handle(UiEvent::ToggleComments(1)).await;
    h.session.handle(UiEvent::DeletePost(2)).await;

    // the redraw after the delete restores the open panel
    let frames = h.recorder.frames.borrow();
    let tail: Vec<&Frame> = frames.iter().rev().take(2).collect();
    assert_eq!(tail[0], &Frame::PostComments(1, Some(5)));
    assert!(matches!(tail[1], Frame::Posts(_)));
    drop(frames);

    assert_eq!(h.fetch.calls(), vec!["posts", "comments?postId=1"]);
}

#[tokio::test]
async fn missing_comment_payload_is_an_error_toast() {
    let h = harness();
    h.session.handle(UiEvent::SelectView(View::Posts)).await;

    h.session.handle(UiEvent::ToggleComments(42)).await;
    assert_eq!(
        h.recorder.last_toast(),
        Some((
            Severity::Error,
            "could not load comments: unexpected status 404".to_owned()
        ))
    );
}
