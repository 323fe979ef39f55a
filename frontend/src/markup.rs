//! HTML fragments for the browser renderer.
//!
//! Every piece of entity text goes through [`escape_html`]; buttons carry the
//! entity id in a `data-*` attribute that the click handlers read back.

use crate::entities::{Comment, Post};
use crate::render::{Column, UserRow};

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn favorite_label(favorite: bool) -> &'static str {
    if favorite {
        "⭐"
    } else {
        "☆"
    }
}

pub fn users_table(columns: &[Column], rows: &[UserRow]) -> String {
    let head: String = columns
        .iter()
        .map(|column| format!("<th>{}</th>", escape_html(column.title)))
        .collect();
    let body: String = rows.iter().map(user_row).collect();
    format!("<thead><tr>{}</tr></thead><tbody>{}</tbody>", head, body)
}

fn user_row(row: &UserRow) -> String {
    let user = &row.user;
    format!(
        "<tr><td><button data-fav=\"{id}\">{fav}</button></td><td>{id}</td><td>{name}</td><td>{email}</td><td>{city}</td><td><button class=\"edit\" data-id=\"{id}\">Edit</button></td></tr>",
        id = user.id,
        fav = favorite_label(row.favorite),
        name = escape_html(&user.name),
        email = escape_html(&user.email),
        city = escape_html(&user.address.city),
    )
}

pub fn posts_list(posts: &[Post]) -> String {
    posts.iter().map(post_card).collect()
}

fn post_card(post: &Post) -> String {
    format!(
        "<div class=\"post\"><h3>{title}</h3><p>{body}</p><div class=\"btns\"><button data-edit=\"{id}\">Edit</button><button data-comments=\"{id}\">Comments</button><button class=\"danger\" data-del=\"{id}\">Delete</button></div><div id=\"comments-{id}\" class=\"comments\" style=\"display:none\"></div></div>",
        id = post.id,
        title = escape_html(&post.title),
        body = escape_html(&post.body),
    )
}

/// Contents of the comment box under a post.
pub fn comment_preview(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "<em>No comments</em>".into();
    }
    comments
        .iter()
        .map(|comment| {
            format!(
                "<div><strong>{}</strong>: {}</div>",
                escape_html(&comment.email),
                escape_html(&comment.body)
            )
        })
        .collect()
}

pub fn comments_list(comments: &[Comment]) -> String {
    comments
        .iter()
        .map(|comment| {
            format!(
                "<div class=\"post\"><strong>{}</strong><br><small>{}</small><p>{}</p></div>",
                escape_html(&comment.name),
                escape_html(&comment.email),
                escape_html(&comment.body)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::User;
    use crate::render::USER_COLUMNS;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn post_text_is_escaped() {
        let html = posts_list(&[Post {
            id: 7,
            user_id: None,
            title: "<script>".into(),
            body: "a & b".into(),
        }]);

        assert!(html.contains("<h3>&lt;script&gt;</h3>"));
        assert!(html.contains("<p>a &amp; b</p>"));
        assert!(html.contains("data-del=\"7\""));
        assert!(html.contains("id=\"comments-7\""));
    }

    #[test]
    fn empty_preview_says_so() {
        assert_eq!(comment_preview(&[]), "<em>No comments</em>");
    }

    #[test]
    fn user_rows_show_favorite_state() {
        let row = UserRow {
            user: User {
                id: 2,
                name: "Ervin".into(),
                username: String::new(),
                email: "e@x.io".into(),
                address: Default::default(),
                phone: String::new(),
                website: String::new(),
            },
            favorite: true,
        };

        let html = users_table(&USER_COLUMNS, &[row]);
        assert!(html.contains("<th>City</th>"));
        assert!(html.contains("<button data-fav=\"2\">⭐</button>"));
    }
}
