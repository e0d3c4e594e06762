use chrono::Utc;
use tracing::{debug, info};

use super::AppStore;
use crate::db::{MemberStatus, NewTeamMember, TeamMember, TeamMemberPatch};
use crate::error::{EntityKind, StoreError, StoreResult};
use crate::utils::{avatar_url, generate_id};

impl AppStore {
    pub fn team_members(&self) -> &[TeamMember] {
        &self.state.team_members
    }

    pub fn team_member(&self, id: &str) -> Option<&TeamMember> {
        self.state.team_member(id)
    }

    /// Record an invitation. New members start out `pending`.
    pub fn add_team_member(&mut self, new: NewTeamMember) -> StoreResult<TeamMember> {
        let avatar = new.avatar.unwrap_or_else(|| avatar_url(&new.name));
        let member = TeamMember {
            id: generate_id(),
            email: new.email,
            name: new.name,
            avatar: Some(avatar),
            role: new.role,
            status: MemberStatus::Pending,
            joined_at: Utc::now(),
        };

        self.state.team_members.push(member.clone());
        info!(member_id = %member.id, email = %member.email, role = %member.role, "Team member invited");

        self.persist()?;
        Ok(member)
    }

    pub fn update_team_member(
        &mut self,
        id: &str,
        patch: TeamMemberPatch,
    ) -> StoreResult<TeamMember> {
        let member = self
            .state
            .team_members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::TeamMember, id))?;
        member.apply(patch);
        let updated = member.clone();
        debug!(member_id = %id, status = %updated.status, "Team member updated");

        self.persist()?;
        Ok(updated)
    }

    /// Remove a member. Project membership lists are left as they are.
    pub fn remove_team_member(&mut self, id: &str) -> StoreResult<TeamMember> {
        let index = self
            .state
            .team_members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::TeamMember, id))?;
        let member = self.state.team_members.remove(index);
        info!(member_id = %id, "Team member removed");

        self.persist()?;
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::UserRole;

    fn invite(name: &str, role: UserRole) -> NewTeamMember {
        NewTeamMember {
            email: format!("{}@taskflow.com", name.to_lowercase()),
            name: name.to_string(),
            avatar: None,
            role,
        }
    }

    #[test]
    fn test_new_member_is_pending_with_default_avatar() {
        let mut store = AppStore::in_memory();
        let member = store.add_team_member(invite("Kavya", UserRole::Member)).unwrap();

        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.avatar.as_deref(), Some(avatar_url("Kavya").as_str()));
        assert_eq!(store.team_members(), &[member]);
    }

    #[test]
    fn test_update_member_status_and_role() {
        let mut store = AppStore::in_memory();
        let member = store.add_team_member(invite("Farhan", UserRole::Member)).unwrap();

        let updated = store
            .update_team_member(
                &member.id,
                TeamMemberPatch {
                    status: Some(MemberStatus::Active),
                    role: Some(UserRole::Manager),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, MemberStatus::Active);
        assert_eq!(updated.role, UserRole::Manager);
        assert_eq!(updated.joined_at, member.joined_at);
    }

    #[test]
    fn test_remove_member() {
        let mut store = AppStore::in_memory();
        let a = store.add_team_member(invite("Anjali", UserRole::Member)).unwrap();
        let b = store.add_team_member(invite("Deepak", UserRole::Admin)).unwrap();

        let removed = store.remove_team_member(&a.id).unwrap();
        assert_eq!(removed.id, a.id);
        assert_eq!(store.team_members(), &[b]);

        let err = store.remove_team_member(&a.id).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::TeamMember, .. }
        ));
        assert!(store
            .update_team_member(&a.id, TeamMemberPatch::default())
            .unwrap_err()
            .is_not_found());
    }
}
