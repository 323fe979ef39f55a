use crate::entities::{Comment, Id, Post, PostDraft, PostPatch, User, UserPatch};
use crate::router::View;
use crate::theme::Theme;

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient user notifications (toasts). Fire and forget.
pub trait Notify {
    fn notify(&self, severity: Severity, message: &str);
}

/// Declarative description of one table column.
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub field: &'static str,
}

pub const USER_COLUMNS: [Column; 6] = [
    Column { title: "Fav", field: "id" },
    Column { title: "ID", field: "id" },
    Column { title: "Name", field: "name" },
    Column { title: "Email", field: "email" },
    Column { title: "City", field: "address.city" },
    Column { title: "Actions", field: "" },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user: User,
    pub favorite: bool,
}

/// Remote totals shown on the dashboard; `None` until known.
#[derive(Hash, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub users: Option<usize>,
    pub posts: Option<usize>,
    pub comments: Option<usize>,
}

impl DashboardCounts {
    /// True once every total is known.
    pub fn is_complete(&self) -> bool {
        self.users.is_some() && self.posts.is_some() && self.comments.is_some()
    }
}

/// Presentation side of the dashboard. Implementations draw what they are
/// given and report interactions back as [`UiEvent`]s; the session never
/// reads presentation state.
pub trait Render {
    fn show_view(&self, view: View);
    fn theme(&self, theme: Theme);
    fn loading(&self, busy: bool);
    fn counts(&self, counts: &DashboardCounts);
    fn users(&self, columns: &[Column], rows: &[UserRow]);
    fn posts(&self, posts: &[Post]);
    /// `None` hides the comments of `post_id`.
    fn post_comments(&self, post_id: Id, comments: Option<&[Comment]>);
    fn comments(&self, comments: &[Comment]);
}

/// Interactions reported by the presentation layer.
///
/// Edits carry values the user already confirmed; a cancelled edit produces
/// no event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    SelectView(View),
    ToggleTheme,
    Search { view: View, query: String },
    ToggleFavorite(Id),
    ShowFavorites,
    ClearFavorites,
    EditUser { id: Id, patch: UserPatch },
    AddPost(PostDraft),
    EditPost { id: Id, patch: PostPatch },
    DeletePost(Id),
    ToggleComments(Id),
}
