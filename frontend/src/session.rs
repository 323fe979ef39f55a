use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::collection_cache::RemoteCollection;
use crate::connection::FetchCollection;
use crate::entities::{Comment, Entity, Id, Post, PostDraft, PostPatch, User, UserPatch};
use crate::error::DashboardError;
use crate::favorites::{FavoriteSet, FavoritesView, Toggled};
use crate::load_slot::LoadState;
use crate::overlay::LOCAL_ID_SEED;
use crate::persisted::{KeyValue, PersistentStore, FAVORITE_USERS_KEY, THEME_KEY};
use crate::render::{DashboardCounts, Notify, Render, Severity, UiEvent, UserRow, USER_COLUMNS};
use crate::router::{View, ViewRouter};
use crate::sub_resource::{Expansion, SubResourceLoader};
use crate::theme::{Theme, ThemeSetting};
use crate::view_filter::filter;

/// How many fetched entities each collection keeps. `None` keeps all.
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadLimits {
    pub users: Option<usize>,
    pub posts: Option<usize>,
    pub comments: Option<usize>,
    /// Comments shown under an expanded post.
    pub comment_preview: Option<usize>,
}

impl Default for LoadLimits {
    fn default() -> Self {
        LoadLimits {
            users: None,
            posts: Some(20),
            comments: Some(12),
            comment_preview: Some(5),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub local_id_seed: Id,
    pub limits: LoadLimits,
    pub theme_key: &'static str,
    pub favorites_key: &'static str,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            local_id_seed: LOCAL_ID_SEED,
            limits: LoadLimits::default(),
            theme_key: THEME_KEY,
            favorites_key: FAVORITE_USERS_KEY,
        }
    }
}

/// The collaborators a session talks to.
#[derive(Clone)]
pub struct Capabilities {
    pub fetcher: Rc<dyn FetchCollection>,
    pub storage: Rc<dyn KeyValue>,
    pub render: Rc<dyn Render>,
    pub notify: Rc<dyn Notify>,
}

/// All state of one dashboard session.
///
/// Created when the page starts and dropped when it goes away; nothing
/// survives it except what the favorites and theme write to storage.
pub struct Session {
    render: Rc<dyn Render>,
    notify: Rc<dyn Notify>,
    router: RefCell<ViewRouter>,
    theme: RefCell<ThemeSetting>,
    favorites: RefCell<FavoriteSet>,
    users: RemoteCollection<User>,
    posts: RemoteCollection<Post>,
    comments: RemoteCollection<Comment>,
    post_comments: SubResourceLoader<Comment>,
    queries: RefCell<HashMap<View, String>>,
    favorites_only: Cell<bool>,
}

impl Session {
    pub fn new(config: SessionConfig, capabilities: Capabilities) -> Self {
        let Capabilities {
            fetcher,
            storage,
            render,
            notify,
        } = capabilities;
        let store = PersistentStore::new(storage);
        let limits = config.limits;
        let seed = config.local_id_seed;

        Session {
            render,
            notify,
            router: RefCell::new(ViewRouter::new()),
            theme: RefCell::new(ThemeSetting::load(store.clone(), config.theme_key)),
            favorites: RefCell::new(FavoriteSet::load(store, config.favorites_key)),
            users: RemoteCollection::new(fetcher.clone(), limits.users, seed),
            posts: RemoteCollection::new(fetcher.clone(), limits.posts, seed),
            comments: RemoteCollection::new(fetcher.clone(), limits.comments, seed),
            post_comments: SubResourceLoader::new(fetcher, "postId", limits.comment_preview),
            queries: RefCell::new(HashMap::new()),
            favorites_only: Cell::new(false),
        }
    }

    /// Draws the initial dashboard and counts the three collections. The
    /// collections themselves load when their views are first opened.
    pub async fn start(&self) {
        self.render.theme(self.theme());
        self.render.show_view(View::Dashboard);
        self.load_counts().await;
    }

    pub fn active_view(&self) -> View {
        self.router.borrow().active()
    }

    pub fn theme(&self) -> Theme {
        self.theme.borrow().current()
    }

    pub fn favorite_ids(&self) -> Vec<Id> {
        self.favorites.borrow().ids()
    }

    pub fn users(&self) -> &RemoteCollection<User> {
        &self.users
    }

    pub fn posts(&self) -> &RemoteCollection<Post> {
        &self.posts
    }

    pub fn comments(&self) -> &RemoteCollection<Comment> {
        &self.comments
    }

    /// Current values of a user, to prefill an edit form.
    pub fn current_user(&self, id: Id) -> Option<User> {
        self.users.find(id)
    }

    /// Current values of a post, to prefill an edit form.
    pub fn current_post(&self, id: Id) -> Option<Post> {
        self.posts.find(id)
    }

    /// True while any fetch is in flight.
    pub fn is_busy(&self) -> bool {
        [
            self.users.load_state(),
            self.posts.load_state(),
            self.comments.load_state(),
            self.users.count_state(),
            self.posts.count_state(),
            self.comments.count_state(),
        ]
        .contains(&LoadState::Loading)
            || self.post_comments.any_loading()
    }

    pub async fn handle(&self, event: UiEvent) {
        debug!("handling {:?}", event);

        match event {
            UiEvent::SelectView(view) => self.select_view(view).await,
            UiEvent::ToggleTheme => self.toggle_theme(),
            UiEvent::Search { view, query } => {
                self.queries.borrow_mut().insert(view, query);
                self.redraw(view);
            }
            UiEvent::ToggleFavorite(id) => self.toggle_favorite(id),
            UiEvent::ShowFavorites => self.show_favorites(),
            UiEvent::ClearFavorites => self.clear_favorites(),
            UiEvent::EditUser { id, patch } => self.edit_user(id, patch),
            UiEvent::AddPost(draft) => self.add_post(draft),
            UiEvent::EditPost { id, patch } => self.edit_post(id, patch),
            UiEvent::DeletePost(id) => self.delete_post(id),
            UiEvent::ToggleComments(post_id) => self.toggle_comments(post_id).await,
        }
    }

    async fn select_view(&self, view: View) {
        let transition = self.router.borrow_mut().select(view);
        self.render.show_view(view);

        if view == View::Dashboard {
            // counts that failed earlier are fetched again
            if self.counts().is_complete() {
                self.render.counts(&self.counts());
            } else {
                self.load_counts().await;
            }
            return;
        }

        // a view whose first load failed gets another attempt; a loaded one
        // is only redrawn
        let needs_load = transition.first_activation || self.load_state(view) == LoadState::NotLoaded;
        if needs_load {
            self.load_view(view).await;
        } else {
            self.redraw(view);
        }
    }

    fn load_state(&self, view: View) -> LoadState {
        match view {
            View::Users => self.users.load_state(),
            View::Posts => self.posts.load_state(),
            View::Comments => self.comments.load_state(),
            View::Dashboard => LoadState::Loaded,
        }
    }

    async fn load_view(&self, view: View) {
        let outcome = match view {
            View::Users => self.ensure(&self.users).await,
            View::Posts => self.ensure(&self.posts).await,
            View::Comments => self.ensure(&self.comments).await,
            View::Dashboard => Ok(false),
        };

        match outcome {
            Ok(fetched) => {
                if fetched {
                    match view {
                        View::Users => self.notify.notify(Severity::Success, "Users loaded"),
                        View::Posts => self.notify.notify(Severity::Success, "Posts loaded"),
                        _ => {}
                    }
                }
                self.redraw(view);
            }
            Err(err) => self.report(&err),
        }
    }

    /// Loads `collection` if needed. `Ok(true)` when this call had to wait
    /// for the network.
    async fn ensure<T: Entity>(&self, collection: &RemoteCollection<T>) -> Result<bool, DashboardError> {
        if collection.load_state() == LoadState::Loaded {
            return Ok(false);
        }
        self.busy(collection.ensure_loaded()).await.map(|_| true)
    }

    async fn load_counts(&self) {
        let (users, posts, comments) = self
            .busy(async {
                futures_util::join!(
                    self.users.ensure_counted(),
                    self.posts.ensure_counted(),
                    self.comments.ensure_counted()
                )
            })
            .await;

        for outcome in [users, posts, comments] {
            if let Err(err) = outcome {
                self.report(&err);
            }
        }
        self.render.counts(&self.counts());
    }

    pub fn counts(&self) -> DashboardCounts {
        DashboardCounts {
            users: self.users.remote_total(),
            posts: self.posts.remote_total(),
            comments: self.comments.remote_total(),
        }
    }

    async fn busy<F: Future>(&self, work: F) -> F::Output {
        self.render.loading(true);
        let output = work.await;
        self.render.loading(self.is_busy());
        output
    }

    fn toggle_theme(&self) {
        let toggled = self.theme.borrow_mut().toggle();
        match toggled {
            Ok(theme) => {
                info!("theme set to {}", theme.name());
                self.render.theme(theme);
            }
            Err(err) => self.report(&err),
        }
    }

    fn toggle_favorite(&self, id: Id) {
        let toggled = self.favorites.borrow_mut().toggle(id);
        match toggled {
            Ok(Toggled::Added) => self.notify.notify(Severity::Success, "Added favorite"),
            Ok(Toggled::Removed) => self.notify.notify(Severity::Info, "Removed favorite"),
            Err(err) => return self.report(&err),
        }
        self.draw_users();
    }

    fn show_favorites(&self) {
        if self.favorites.borrow().is_empty() {
            self.notify.notify(Severity::Warning, "No favorites");
            return;
        }
        self.favorites_only.set(true);
        self.draw_users();
    }

    fn clear_favorites(&self) {
        let cleared = self.favorites.borrow_mut().clear();
        if let Err(err) = cleared {
            return self.report(&err);
        }
        self.favorites_only.set(false);
        self.queries.borrow_mut().remove(&View::Users);
        self.draw_users();
        self.notify.notify(Severity::Info, "Favorites cleared");
    }

    fn edit_user(&self, id: Id, patch: UserPatch) {
        if let Err(err) = self.users.edit(id, patch) {
            return self.report(&err);
        }
        self.draw_users();
        self.notify.notify(Severity::Success, "User updated locally");
    }

    fn add_post(&self, draft: PostDraft) {
        if draft.title.trim().is_empty() {
            debug!("ignoring post without a title");
            return;
        }
        let id = self.posts.add(draft);
        debug!("added local post {}", id);
        self.draw_posts();
        self.notify.notify(Severity::Success, "Post added (local)");
    }

    fn edit_post(&self, id: Id, patch: PostPatch) {
        if let Err(err) = self.posts.edit(id, patch) {
            return self.report(&err);
        }
        self.draw_posts();
        self.notify.notify(Severity::Info, "Post updated (local)");
    }

    fn delete_post(&self, id: Id) {
        if !self.posts.delete(id) {
            debug!("post {} already gone", id);
            return;
        }
        self.draw_posts();
        self.notify.notify(Severity::Warning, "Post deleted (local)");
    }

    async fn toggle_comments(&self, post_id: Id) {
        let expansion = if self.post_comments.load_state(post_id) == LoadState::Loaded {
            self.post_comments.toggle(post_id).await
        } else {
            self.busy(self.post_comments.toggle(post_id)).await
        };

        match expansion {
            Ok(Expansion::Expanded(comments)) => self.render.post_comments(post_id, Some(&comments)),
            Ok(Expansion::Collapsed) => self.render.post_comments(post_id, None),
            Err(err) => self.report(&err),
        }
    }

    fn query(&self, view: View) -> String {
        self.queries.borrow().get(&view).cloned().unwrap_or_default()
    }

    fn redraw(&self, view: View) {
        match view {
            View::Dashboard => self.render.counts(&self.counts()),
            View::Users => self.draw_users(),
            View::Posts => self.draw_posts(),
            View::Comments => self
                .render
                .comments(&filter(&self.comments.snapshot(), &self.query(View::Comments))),
        }
    }

    fn draw_users(&self) {
        let mut users = filter(&self.users.snapshot(), &self.query(View::Users));

        let favorites = self.favorites.borrow();
        if self.favorites_only.get() {
            match favorites.filter_by_favorites(&users) {
                FavoritesView::Matches(matches) => users = matches,
                FavoritesView::NothingToFilter => self.favorites_only.set(false),
            }
        }

        let rows: Vec<UserRow> = users
            .into_iter()
            .map(|user| UserRow {
                favorite: favorites.contains(user.id),
                user,
            })
            .collect();
        drop(favorites);

        self.render.users(&USER_COLUMNS, &rows);
    }

    fn draw_posts(&self) {
        let posts = filter(&self.posts.snapshot(), &self.query(View::Posts));
        self.render.posts(&posts);

        // expanded comment panels survive a redraw
        for post_id in self.post_comments.expanded() {
            if posts.iter().any(|post| post.id == post_id) {
                if let Some(comments) = self.post_comments.cached(post_id) {
                    self.render.post_comments(post_id, Some(&comments));
                }
            }
        }
    }

    fn report(&self, err: &DashboardError) {
        warn!("{}", err);
        self.notify.notify(Severity::Error, &err.to_string());
    }
}
