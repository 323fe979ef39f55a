use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum View {
    Dashboard,
    Users,
    Posts,
    Comments,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Users, View::Posts, View::Comments];

    pub fn name(self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Users => "users",
            View::Posts => "posts",
            View::Comments => "comments",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Users => "Users",
            View::Posts => "Posts",
            View::Comments => "Comments",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("unknown view {0:?}")]
pub struct UnknownView(pub String);

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|view| view.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| UnknownView(name.to_owned()))
    }
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub previous: View,
    pub active: View,
    /// Set only the first time `active` is entered; the view's one-time load
    /// runs then.
    pub first_activation: bool,
}

/// Tracks the single visible view and which views were ever opened.
#[derive(Clone, Debug)]
pub struct ViewRouter {
    active: View,
    visited: HashSet<View>,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    /// Starts on the dashboard, which counts as visited.
    pub fn new() -> Self {
        ViewRouter {
            active: View::Dashboard,
            visited: HashSet::from([View::Dashboard]),
        }
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn has_visited(&self, view: View) -> bool {
        self.visited.contains(&view)
    }

    pub fn select(&mut self, view: View) -> Transition {
        let previous = std::mem::replace(&mut self.active, view);
        Transition {
            previous,
            active: view,
            first_activation: self.visited.insert(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_entry_triggers_loading() {
        let mut router = ViewRouter::new();

        let first = router.select(View::Posts);
        assert_eq!(first.previous, View::Dashboard);
        assert!(first.first_activation);

        router.select(View::Users);
        let again = router.select(View::Posts);
        assert_eq!(again.previous, View::Users);
        assert!(!again.first_activation);
        assert_eq!(router.active(), View::Posts);
    }

    #[test]
    fn dashboard_is_visited_from_the_start() {
        let mut router = ViewRouter::new();
        assert!(router.has_visited(View::Dashboard));
        assert!(!router.select(View::Dashboard).first_activation);
    }

    #[test]
    fn views_parse_from_their_names() {
        assert_eq!("posts".parse::<View>(), Ok(View::Posts));
        assert_eq!(" Users ".parse::<View>(), Ok(View::Users));
        assert_eq!("feed".parse::<View>(), Err(UnknownView("feed".into())));
    }
}
