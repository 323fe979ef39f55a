use std::fmt;

use serde::de::DeserializeOwned;

pub type Id = u64;

/// Remote collections exposed by the placeholder API.
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CollectionKind {
    Users,
    Posts,
    Comments,
}

impl CollectionKind {
    pub fn resource_name(self) -> &'static str {
        match self {
            CollectionKind::Users => "users",
            CollectionKind::Posts => "posts",
            CollectionKind::Comments => "comments",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

/// A record with a stable id, fetched as part of a collection.
pub trait Entity: Clone + fmt::Debug + DeserializeOwned + 'static {
    const KIND: CollectionKind;

    fn id(&self) -> Id;

    /// Only used to move a local entity out of the way of a remote one.
    fn set_id(&mut self, id: Id);
}

/// Entities whose domain fields may be replaced locally. The id never changes.
pub trait Editable: Entity {
    type Patch;

    fn apply_patch(&mut self, patch: Self::Patch);
}

/// Entities that can be created locally from a draft.
pub trait Creatable: Editable {
    type Draft;

    fn from_draft(id: Id, draft: Self::Draft) -> Self;
}

#[derive(Hash, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
}

#[derive(Hash, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
}

#[derive(Hash, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id,
    // local posts have no author
    #[serde(default)]
    pub user_id: Option<Id>,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Hash, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub post_id: Id,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPatch {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostPatch {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl Entity for User {
    const KIND: CollectionKind = CollectionKind::Users;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }
}

impl Editable for User {
    type Patch = UserPatch;

    fn apply_patch(&mut self, patch: UserPatch) {
        self.name = patch.name;
        self.email = patch.email;
    }
}

impl Entity for Post {
    const KIND: CollectionKind = CollectionKind::Posts;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }
}

impl Editable for Post {
    type Patch = PostPatch;

    fn apply_patch(&mut self, patch: PostPatch) {
        self.title = patch.title;
        self.body = patch.body;
    }
}

impl Creatable for Post {
    type Draft = PostDraft;

    fn from_draft(id: Id, draft: PostDraft) -> Self {
        Post {
            id,
            user_id: None,
            title: draft.title,
            body: draft.body,
        }
    }
}

impl Entity for Comment {
    const KIND: CollectionKind = CollectionKind::Comments;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }
}
