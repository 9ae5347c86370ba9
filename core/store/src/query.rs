//! Warden persistent store operations to query records.
use anyhow::Result;
use futures::Stream;

use warden_models::Entity;
use warden_models::Group;
use warden_models::GroupAlias;
use warden_models::Token;

use self::seal::SealQueryOp;
use crate::ids::AliasID;

/// Internal trait to enable query operations on the persistent store.
pub trait QueryOp: Into<QueryOps> + SealQueryOp {
    /// Type returned by the matching query operation.
    type Response: From<QueryResponses>;
}

/// List of all query operations the persistent store must implement.
pub enum QueryOps {
    /// Query an entity by ID.
    Entity(LookupEntity),

    /// Query the entity owning an alias for the given mount and principal name.
    EntityByAlias(AliasID),

    /// Query a group by ID.
    Group(LookupGroup),

    /// Query a group alias by mount and external group name.
    GroupAlias(AliasID),

    /// List all known groups, sorted by ID.
    ListGroups,

    /// List internal groups listing the entity as a direct member, sorted by ID.
    ListGroupsByMemberEntity(String),

    /// List internal groups listing the group as a direct member (its parents), sorted by ID.
    ListGroupsByMemberGroup(String),

    /// List all known tokens, sorted by ID.
    ListTokens,

    /// Query a token by ID.
    Token(LookupToken),
}

/// List of all responses from query operations.
pub enum QueryResponses {
    /// Return an [`Entity`], if one was found matching the query.
    Entity(Option<Entity>),

    /// Return a [`Group`], if one was found matching the query.
    Group(Option<Group>),

    /// Return a [`GroupAlias`], if one was found matching the query.
    GroupAlias(Option<GroupAlias>),

    /// Return a [`Stream`] of [`Group`] records.
    Groups(GroupStream),

    /// Return a [`Token`], if one was found matching the query.
    Token(Option<Token>),

    /// Return a [`Stream`] of [`Token`] records.
    Tokens(TokenStream),
}

// --- Operations return types -- //
/// Alias for a heap-allocated [`Stream`] of groups.
pub type GroupStream = std::pin::Pin<Box<dyn Stream<Item = Result<Group>> + Send>>;

/// Alias for a heap-allocated [`Stream`] of tokens.
pub type TokenStream = std::pin::Pin<Box<dyn Stream<Item = Result<Token>> + Send>>;

// --- High level query operations --- //
/// List all known groups, sorted by ID.
pub struct ListGroups;

/// List internal groups listing the entity as a direct member, sorted by ID.
pub struct ListGroupsByMemberEntity(pub String);

/// List internal groups listing the group as a direct member, sorted by ID.
///
/// These are the parents of the group in the membership graph.
pub struct ListGroupsByMemberGroup(pub String);

/// List all known tokens, sorted by ID.
///
/// Revoked and expired tokens are included.
pub struct ListTokens;

/// Lookup an [`Entity`] record by ID.
#[derive(Clone, Debug)]
pub struct LookupEntity(pub String);
impl From<&str> for LookupEntity {
    fn from(value: &str) -> Self {
        LookupEntity(value.to_string())
    }
}
impl From<String> for LookupEntity {
    fn from(value: String) -> Self {
        LookupEntity(value)
    }
}

/// Lookup the [`Entity`] record owning an alias.
#[derive(Clone, Debug)]
pub struct LookupEntityByAlias(pub AliasID);

/// Lookup a [`Group`] record by ID.
#[derive(Clone, Debug)]
pub struct LookupGroup(pub String);
impl From<&str> for LookupGroup {
    fn from(value: &str) -> Self {
        LookupGroup(value.to_string())
    }
}
impl From<String> for LookupGroup {
    fn from(value: String) -> Self {
        LookupGroup(value)
    }
}

/// Lookup a [`GroupAlias`] record by mount and external group name.
#[derive(Clone, Debug)]
pub struct LookupGroupAlias(pub AliasID);

/// Lookup a [`Token`] record by ID.
#[derive(Clone, Debug)]
pub struct LookupToken(pub String);
impl From<&str> for LookupToken {
    fn from(value: &str) -> Self {
        LookupToken(value.to_string())
    }
}
impl From<String> for LookupToken {
    fn from(value: String) -> Self {
        LookupToken(value)
    }
}

// --- Internal implementation details follow --- //
/// Private module to seal implementation details.
mod seal {
    /// Super-trait to seal the [`QueryOp`](super::QueryOp) trait.
    pub trait SealQueryOp {}
}

// --- Implement QueryOp and super traits on types for transparent operations --- //
impl SealQueryOp for ListGroups {}
impl QueryOp for ListGroups {
    type Response = GroupStream;
}
impl From<ListGroups> for QueryOps {
    fn from(_: ListGroups) -> Self {
        QueryOps::ListGroups
    }
}

impl SealQueryOp for ListGroupsByMemberEntity {}
impl QueryOp for ListGroupsByMemberEntity {
    type Response = GroupStream;
}
impl From<ListGroupsByMemberEntity> for QueryOps {
    fn from(value: ListGroupsByMemberEntity) -> Self {
        QueryOps::ListGroupsByMemberEntity(value.0)
    }
}

impl SealQueryOp for ListGroupsByMemberGroup {}
impl QueryOp for ListGroupsByMemberGroup {
    type Response = GroupStream;
}
impl From<ListGroupsByMemberGroup> for QueryOps {
    fn from(value: ListGroupsByMemberGroup) -> Self {
        QueryOps::ListGroupsByMemberGroup(value.0)
    }
}

impl SealQueryOp for ListTokens {}
impl QueryOp for ListTokens {
    type Response = TokenStream;
}
impl From<ListTokens> for QueryOps {
    fn from(_: ListTokens) -> Self {
        QueryOps::ListTokens
    }
}

impl SealQueryOp for LookupEntity {}
impl QueryOp for LookupEntity {
    type Response = Option<Entity>;
}
impl From<LookupEntity> for QueryOps {
    fn from(value: LookupEntity) -> Self {
        QueryOps::Entity(value)
    }
}

impl SealQueryOp for LookupEntityByAlias {}
impl QueryOp for LookupEntityByAlias {
    type Response = Option<Entity>;
}
impl From<LookupEntityByAlias> for QueryOps {
    fn from(value: LookupEntityByAlias) -> Self {
        QueryOps::EntityByAlias(value.0)
    }
}

impl SealQueryOp for LookupGroup {}
impl QueryOp for LookupGroup {
    type Response = Option<Group>;
}
impl From<LookupGroup> for QueryOps {
    fn from(value: LookupGroup) -> Self {
        QueryOps::Group(value)
    }
}

impl SealQueryOp for LookupGroupAlias {}
impl QueryOp for LookupGroupAlias {
    type Response = Option<GroupAlias>;
}
impl From<LookupGroupAlias> for QueryOps {
    fn from(value: LookupGroupAlias) -> Self {
        QueryOps::GroupAlias(value.0)
    }
}

impl SealQueryOp for LookupToken {}
impl QueryOp for LookupToken {
    type Response = Option<Token>;
}
impl From<LookupToken> for QueryOps {
    fn from(value: LookupToken) -> Self {
        QueryOps::Token(value)
    }
}

// --- Implement QueryResponses conversions on return types for transparent operations --- //
impl From<QueryResponses> for Option<Entity> {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Entity(entity) => entity,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
impl From<QueryResponses> for Option<Group> {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Group(group) => group,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
impl From<QueryResponses> for Option<GroupAlias> {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::GroupAlias(alias) => alias,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
impl From<QueryResponses> for GroupStream {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Groups(stream) => stream,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
impl From<QueryResponses> for Option<Token> {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Token(token) => token,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
impl From<QueryResponses> for TokenStream {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Tokens(stream) => stream,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
