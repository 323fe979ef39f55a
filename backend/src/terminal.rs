use std::cell::RefCell;
use std::io::Write;

use dashboard_frontend::render::{Column, DashboardCounts, UserRow};
use dashboard_frontend::theme::Theme;
use dashboard_frontend::{
    Comment, Id, Notify, Post, PostDraft, PostPatch, Render, Severity, UiEvent, UserPatch, View,
};

pub const HELP: &str = "\
commands:
  view <dashboard|users|posts|comments>
  theme
  search <users|posts|comments> [text]
  fav <user id>            toggle a favorite
  favs                     show favorite users only
  clear-favs
  edit-user <id> <name> | <email>
  add-post <title> | <body>
  edit-post <id> <title> | <body>
  delete-post <id>
  comments <post id>       show or hide a post's comments
  help
  quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Event(UiEvent),
    Help,
    Quit,
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0:?} is not an id")]
    BadId(String),

    #[error(transparent)]
    View(#[from] dashboard_frontend::router::UnknownView),
}

fn parse_id(text: &str) -> Result<Id, CommandError> {
    text.trim()
        .parse()
        .map_err(|_| CommandError::BadId(text.trim().to_owned()))
}

/// Splits `<id> <rest>`.
fn id_and_rest(args: &str, usage: &'static str) -> Result<(Id, String), CommandError> {
    let (id, rest) = args.trim().split_once(' ').ok_or(CommandError::Usage(usage))?;
    Ok((parse_id(id)?, rest.to_owned()))
}

/// Splits `<first> | <second>`, both required.
fn pair(text: &str, usage: &'static str) -> Result<(String, String), CommandError> {
    let (first, second) = text.split_once('|').ok_or(CommandError::Usage(usage))?;
    let (first, second) = (first.trim(), second.trim());
    if first.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok((first.to_owned(), second.to_owned()))
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, args) = line.split_once(' ').unwrap_or((line, ""));
    let args = args.trim();

    let event = match name {
        "help" => return Ok(Some(Command::Help)),
        "quit" | "exit" => return Ok(Some(Command::Quit)),
        "view" => UiEvent::SelectView(args.parse()?),
        "theme" => UiEvent::ToggleTheme,
        "search" => {
            let (view, query) = args.split_once(' ').unwrap_or((args, ""));
            if view.is_empty() {
                return Err(CommandError::Usage("search <users|posts|comments> [text]"));
            }
            UiEvent::Search {
                view: view.parse()?,
                query: query.to_owned(),
            }
        }
        "fav" => UiEvent::ToggleFavorite(parse_id(args)?),
        "favs" => UiEvent::ShowFavorites,
        "clear-favs" => UiEvent::ClearFavorites,
        "edit-user" => {
            const USAGE: &str = "edit-user <id> <name> | <email>";
            let (id, rest) = id_and_rest(args, USAGE)?;
            let (name, email) = pair(&rest, USAGE)?;
            UiEvent::EditUser {
                id,
                patch: UserPatch { name, email },
            }
        }
        "add-post" => {
            let (title, body) = match args.split_once('|') {
                Some(_) => pair(args, "add-post <title> | <body>")?,
                None => (args.to_owned(), String::new()),
            };
            UiEvent::AddPost(PostDraft { title, body })
        }
        "edit-post" => {
            const USAGE: &str = "edit-post <id> <title> | <body>";
            let (id, rest) = id_and_rest(args, USAGE)?;
            let (title, body) = pair(&rest, USAGE)?;
            UiEvent::EditPost {
                id,
                patch: PostPatch { title, body },
            }
        }
        "delete-post" => UiEvent::DeletePost(parse_id(args)?),
        "comments" => UiEvent::ToggleComments(parse_id(args)?),
        other => return Err(CommandError::Unknown(other.to_owned())),
    };

    Ok(Some(Command::Event(event)))
}

/// Plain text renderer and notifier writing to `out`.
pub struct Terminal<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Terminal {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn line(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

fn count(value: Option<usize>) -> String {
    value.map_or_else(|| "-".to_owned(), |value| value.to_string())
}

impl<W: Write> Render for Terminal<W> {
    fn show_view(&self, view: View) {
        self.line(&format!("== {} ==", view.title()));
    }

    fn theme(&self, theme: Theme) {
        self.line(&format!("theme: {}", theme.name()));
    }

    fn loading(&self, busy: bool) {
        if busy {
            self.line("loading…");
        }
    }

    fn counts(&self, counts: &DashboardCounts) {
        self.line(&format!(
            "users: {}  posts: {}  comments: {}",
            count(counts.users),
            count(counts.posts),
            count(counts.comments)
        ));
    }

    fn users(&self, columns: &[Column], rows: &[UserRow]) {
        let header: Vec<&str> = columns
            .iter()
            .map(|column| column.title)
            .filter(|title| *title != "Actions")
            .collect();
        self.line(&header.join(" | "));
        for row in rows {
            let user = &row.user;
            self.line(&format!(
                "{} | {} | {} | {} | {}",
                if row.favorite { "*" } else { " " },
                user.id,
                user.name,
                user.email,
                user.address.city
            ));
        }
        if rows.is_empty() {
            self.line("(no users)");
        }
    }

    fn posts(&self, posts: &[Post]) {
        for post in posts {
            self.line(&format!("#{} {}", post.id, post.title));
            if !post.body.is_empty() {
                self.line(&format!("    {}", post.body.replace('\n', "\n    ")));
            }
        }
        if posts.is_empty() {
            self.line("(no posts)");
        }
    }

    fn post_comments(&self, post_id: Id, comments: Option<&[Comment]>) {
        match comments {
            Some([]) => self.line(&format!("  #{} has no comments", post_id)),
            Some(comments) => {
                self.line(&format!("  comments on #{}:", post_id));
                for comment in comments {
                    self.line(&format!("    {}: {}", comment.email, comment.body.replace('\n', " ")));
                }
            }
            None => self.line(&format!("  comments on #{} hidden", post_id)),
        }
    }

    fn comments(&self, comments: &[Comment]) {
        for comment in comments {
            self.line(&format!("{} <{}>", comment.name, comment.email));
            self.line(&format!("    {}", comment.body.replace('\n', " ")));
        }
    }
}

impl<W: Write> Notify for Terminal<W> {
    fn notify(&self, severity: Severity, message: &str) {
        let tag = match severity {
            Severity::Success => "ok",
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error => "error",
        };
        self.line(&format!("[{}] {}", tag, message));
    }
}
