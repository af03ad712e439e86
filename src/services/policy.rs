//! Hierarchical role-scoped access policy
//!
//! Resources form a tree; each node may declare a required-role set. The
//! effective set for a path is the intersection of every declared set from
//! the root down, with undeclared nodes inheriting their parent's constraint
//! unchanged. Evaluation walks root-to-leaf and the first failing ancestor
//! short-circuits.
//!
//! The evaluator is re-entrant: it holds no mutable state and only reads the
//! session it is handed.

use std::collections::HashMap;

use crate::models::user::{Role, Session};

/// Where a denied caller should be sent
pub const LOGIN_RESOURCE: &str = "/login";
pub const LANDING_RESOURCE: &str = "/home";

/// Small bitmask over the closed role set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);
    pub const ALL: RoleSet = RoleSet(0b111);

    fn bit(role: Role) -> u8 {
        match role {
            Role::Admin => 0b001,
            Role::Client => 0b010,
            Role::Technician => 0b100,
        }
    }

    pub fn only(role: Role) -> Self {
        RoleSet(Self::bit(role))
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & Self::bit(role) != 0
    }

    pub fn intersect(&self, other: RoleSet) -> RoleSet {
        RoleSet(self.0 & other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        RoleSet::only(role)
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RoleSet::EMPTY, |set, role| RoleSet(set.0 | RoleSet::bit(role)))
    }
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No session: send the caller to login, preserving the destination for
    /// post-login continuation
    Unauthenticated { return_to: String },
    /// Valid session, wrong role: send to the landing resource, never back to
    /// login
    Forbidden,
}

impl DenyReason {
    /// The resource the navigation collaborator should redirect to
    pub fn redirect(&self) -> &str {
        match self {
            DenyReason::Unauthenticated { .. } => LOGIN_RESOURCE,
            DenyReason::Forbidden => LANDING_RESOURCE,
        }
    }
}

#[derive(Debug, Default)]
struct Node {
    roles: Option<RoleSet>,
    children: HashMap<String, Node>,
}

/// Tree of protected resources and their declared role constraints.
///
/// Only protected resources are evaluated through this tree; public ones
/// (login itself) never reach the evaluator.
#[derive(Debug, Default)]
pub struct ResourceTree {
    root: Node,
}

impl ResourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the required-role set for a resource path. Intermediate nodes
    /// are created undeclared and inherit their parent's constraint.
    pub fn declare<I>(mut self, path: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.roles = Some(roles.into_iter().collect());
        self
    }

    /// The effective required-role set for a path: the intersection of every
    /// declared set along it, or `None` when nothing on the path declares one
    /// (authentication alone suffices).
    pub fn effective_roles(&self, path: &str) -> Option<RoleSet> {
        let mut effective: Option<RoleSet> = None;
        let mut node = &self.root;
        merge(&mut effective, node.roles);
        for segment in segments(path) {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    merge(&mut effective, node.roles);
                }
                // undeclared tail inherits what is already accumulated
                None => break,
            }
        }
        effective
    }

    /// Admit or deny the session for the given resource path
    pub fn authorize(&self, session: Option<&Session>, path: &str) -> Access {
        let Some(session) = session else {
            return Access::Denied(DenyReason::Unauthenticated {
                return_to: path.to_string(),
            });
        };

        let mut effective: Option<RoleSet> = None;
        let mut node = &self.root;
        if let Some(denied) = check(&mut effective, node.roles, session) {
            return denied;
        }
        for segment in segments(path) {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    if let Some(denied) = check(&mut effective, node.roles, session) {
                        return denied;
                    }
                }
                None => break,
            }
        }
        Access::Granted
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn merge(effective: &mut Option<RoleSet>, declared: Option<RoleSet>) {
    if let Some(declared) = declared {
        *effective = Some(match *effective {
            None => declared,
            Some(current) => current.intersect(declared),
        });
    }
}

/// Folds the node's declaration in and returns the first failing ancestor's
/// denial, short-circuiting deeper evaluation
fn check(
    effective: &mut Option<RoleSet>,
    declared: Option<RoleSet>,
    session: &Session,
) -> Option<Access> {
    merge(effective, declared);
    match *effective {
        Some(set) if !set.contains(session.role) => Some(Access::Denied(DenyReason::Forbidden)),
        _ => None,
    }
}
