use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Status,
    User,
    SearchResult,
    Timeline,
    FollowerList,
    FriendList,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Id(u64),
    /// A screen name or other string handle, stored lowercase.
    Handle(String),
    /// One page of a cursored list owned by `handle`.
    Page { handle: String, cursor: i64 },
}

impl Identifier {
    pub fn handle(handle: &str) -> Self {
        Identifier::Handle(handle.to_lowercase())
    }

    pub fn page(handle: &str, cursor: i64) -> Self {
        Identifier::Page {
            handle: handle.to_lowercase(),
            cursor,
        }
    }
}

/// Composite key of the cache: what kind of entity, and which one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: EntityKind,
    id: Identifier,
}

impl CacheKey {
    pub fn new(kind: EntityKind, id: Identifier) -> Self {
        CacheKey { kind, id }
    }

    pub fn status(id: u64) -> Self {
        Self::new(EntityKind::Status, Identifier::Id(id))
    }

    pub fn user(id: u64) -> Self {
        Self::new(EntityKind::User, Identifier::Id(id))
    }

    pub fn user_by_screen_name(screen_name: &str) -> Self {
        Self::new(EntityKind::User, Identifier::handle(screen_name))
    }

    pub fn search_result(id: u64) -> Self {
        Self::new(EntityKind::SearchResult, Identifier::Id(id))
    }

    pub fn followers(screen_name: &str, cursor: i64) -> Self {
        Self::new(EntityKind::FollowerList, Identifier::page(screen_name, cursor))
    }

    pub fn friends(screen_name: &str, cursor: i64) -> Self {
        Self::new(EntityKind::FriendList, Identifier::page(screen_name, cursor))
    }

    pub fn public_timeline() -> Self {
        Self::new(EntityKind::Timeline, Identifier::handle("public"))
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Identifier::Id(id) => write!(f, "{:?}:{}", self.kind, id),
            Identifier::Handle(handle) => write!(f, "{:?}:@{}", self.kind, handle),
            Identifier::Page { handle, cursor } => write!(f, "{:?}:@{}#{}", self.kind, handle, cursor),
        }
    }
}
