//! # Role Registry
//!
//! Identity → role-set membership. Roles are independent capabilities: the
//! registry never infers one role from another.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shared_types::{Identity, Role};

use crate::error::{WorkflowError, WorkflowResult};

/// Role membership table.
///
/// Mutated only through [`RoleRegistry::grant_role`] and
/// [`RoleRegistry::revoke_role`], both of which require the caller to hold
/// [`Role::Admin`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    members: BTreeMap<Identity, BTreeSet<Role>>,
}

impl RoleRegistry {
    /// Creates a registry whose only member is the initial admin.
    pub fn with_admin(admin: Identity) -> Self {
        let mut members = BTreeMap::new();
        members.insert(admin, BTreeSet::from([Role::Admin]));
        Self { members }
    }

    pub fn has_role(&self, identity: &Identity, role: Role) -> bool {
        self.members
            .get(identity)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// All roles held by `identity` (empty when unknown).
    pub fn roles_of(&self, identity: &Identity) -> BTreeSet<Role> {
        self.members.get(identity).cloned().unwrap_or_default()
    }

    /// Identities currently holding `role`.
    pub fn holders(&self, role: Role) -> Vec<Identity> {
        self.members
            .iter()
            .filter(|(_, roles)| roles.contains(&role))
            .map(|(identity, _)| identity.clone())
            .collect()
    }

    /// Grants `role` to `identity`. Returns `false` if it was already held.
    pub fn grant_role(
        &mut self,
        caller: &Identity,
        identity: Identity,
        role: Role,
    ) -> WorkflowResult<bool> {
        self.require_admin(caller)?;
        Ok(self.members.entry(identity).or_default().insert(role))
    }

    /// Revokes `role` from `identity`. Returns `false` if it was not held.
    ///
    /// Admins may revoke any role, including their own admin role.
    pub fn revoke_role(
        &mut self,
        caller: &Identity,
        identity: &Identity,
        role: Role,
    ) -> WorkflowResult<bool> {
        self.require_admin(caller)?;
        let Some(roles) = self.members.get_mut(identity) else {
            return Ok(false);
        };
        let removed = roles.remove(&role);
        if roles.is_empty() {
            self.members.remove(identity);
        }
        Ok(removed)
    }

    /// Membership as a sorted map, for persistence and display.
    pub fn membership(&self) -> &BTreeMap<Identity, BTreeSet<Role>> {
        &self.members
    }

    fn require_admin(&self, caller: &Identity) -> WorkflowResult<()> {
        if self.has_role(caller, Role::Admin) {
            Ok(())
        } else {
            Err(WorkflowError::MissingRole {
                caller: caller.clone(),
                required: Role::Admin,
            })
        }
    }
}
