//! Role based access policy.
//!
//! Every role holds a set of capabilities `(resource, action, scope)`. A
//! request on the caller's own record is satisfied by an `Own` or `Any`
//! capability, a request on someone else's record needs `Any`. Public reads
//! (dish catalog, reviews) never reach the policy.

use uuid::Uuid;

use super::extractors::AuthenticatedUser;
use crate::{error::ApiError, models::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource{
    Dish,
    Order,
    Review,
    ReviewReply,
    // Account administration
    User,
    // The caller's own account
    Profile
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action{
    Read,
    Create,
    Update,
    Delete,
    // Order status changes
    UpdateStatus,
    // Review status and featured flag
    Moderate
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope{
    Own,
    Any
}

// Relation between the caller and the record acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership{
    Own,
    Other
}

impl Ownership {
    pub fn of(actor: &AuthenticatedUser, owner_id: Uuid) -> Self {
        if actor.user_id == owner_id { Ownership::Own } else { Ownership::Other }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability{
    pub resource: Resource,
    pub action: Action,
    pub scope: Scope
}

const fn grant(resource: Resource, action: Action, scope: Scope) -> Capability {
    Capability{ resource, action, scope }
}

// Every authenticated caller
const BASE: &[Capability] = &[
    grant(Resource::Dish, Action::Create, Scope::Any),
    grant(Resource::Dish, Action::Update, Scope::Any),
    grant(Resource::Dish, Action::Delete, Scope::Any),
    grant(Resource::Order, Action::Read, Scope::Own),
    grant(Resource::Order, Action::Create, Scope::Own),
    grant(Resource::Review, Action::Create, Scope::Own),
    grant(Resource::Review, Action::Update, Scope::Own),
    grant(Resource::Review, Action::Delete, Scope::Own),
    grant(Resource::Profile, Action::Read, Scope::Own),
    grant(Resource::Profile, Action::Update, Scope::Own),
];

const STAFF: &[Capability] = &[
    grant(Resource::Order, Action::Read, Scope::Any),
    grant(Resource::Order, Action::UpdateStatus, Scope::Any),
];

const ADMIN: &[Capability] = &[
    grant(Resource::Order, Action::Delete, Scope::Any),
    grant(Resource::Review, Action::Update, Scope::Any),
    grant(Resource::Review, Action::Delete, Scope::Any),
    grant(Resource::Review, Action::Moderate, Scope::Any),
    grant(Resource::ReviewReply, Action::Create, Scope::Any),
    grant(Resource::User, Action::Read, Scope::Any),
    grant(Resource::User, Action::Create, Scope::Any),
    grant(Resource::User, Action::Update, Scope::Any),
    grant(Resource::User, Action::Delete, Scope::Any),
];

fn grants(role: Role) -> &'static [&'static [Capability]] {
    match role {
        Role::User => &[BASE],
        Role::Staff => &[BASE, STAFF],
        Role::Admin | Role::SuperAdmin => &[BASE, STAFF, ADMIN]
    }
}

pub fn is_allowed(role: Role, resource: Resource, action: Action, ownership: Ownership) -> bool {
    grants(role)
        .iter()
        .flat_map(|capabilities| capabilities.iter())
        .any(|capability| {
            capability.resource == resource
                && capability.action == action
                && (capability.scope == Scope::Any || ownership == Ownership::Own)
        })
}

pub fn authorize(
    actor: &AuthenticatedUser,
    resource: Resource,
    action: Action,
    ownership: Ownership
) -> Result<(), ApiError> {
    if is_allowed(actor.role, resource, action, ownership) {
        Ok(())
    } else {
        tracing::info!(?resource, ?action, ?ownership, role = %actor.role, "Access denied");
        Err(ApiError::Forbidden("Access denied".into()))
    }
}
