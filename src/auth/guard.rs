//! Authorization decisions for project operations.
//!
//! The predicates are pure. The `require_*` helpers turn a denial into the
//! matching error: [`Error::Forbidden`] for a role that may never perform the
//! operation, [`Error::Unauthorized`] for a caller who is not the owner or client.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{ProjectRecord, Role};

/// Admins and designers may create projects.
pub fn can_create(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Designer)
}

/// Only the owning designer may modify a project.
pub fn can_modify(caller: Uuid, record: &ProjectRecord) -> bool {
    record.designer.id == caller
}

/// The owning designer and the assigned client may read a project.
pub fn can_read(caller: Uuid, record: &ProjectRecord) -> bool {
    can_modify(caller, record) || record.client.as_ref().is_some_and(|c| c.id == caller)
}

pub fn require_create(caller: Uuid, role: Role) -> Result<()> {
    if can_create(role) {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "user {} with role {} cannot create projects",
            caller, role
        )))
    }
}

pub fn require_modify(caller: Uuid, record: &ProjectRecord) -> Result<()> {
    if can_modify(caller, record) {
        Ok(())
    } else {
        Err(Error::Unauthorized(format!(
            "not allowed to modify the project with id {}",
            record.id()
        )))
    }
}

pub fn require_read(caller: Uuid, record: &ProjectRecord) -> Result<()> {
    if can_read(caller, record) {
        Ok(())
    } else {
        Err(Error::Unauthorized(format!(
            "not allowed to access the project with id {}",
            record.id()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Project, UserSummary};

    fn summary(role: Role) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            username: format!("{}", role),
            role,
        }
    }

    fn record(designer: &UserSummary, client: Option<&UserSummary>) -> ProjectRecord {
        let mut project = Project::new("Alpha".to_string(), "00".repeat(32), designer.id);
        project.client_id = client.map(|c| c.id);
        ProjectRecord {
            project,
            designer: designer.clone(),
            client: client.cloned(),
        }
    }

    #[test]
    fn test_can_create_by_role() {
        assert!(can_create(Role::Admin));
        assert!(can_create(Role::Designer));
        assert!(!can_create(Role::Client));
    }

    #[test]
    fn test_modify_only_designer() {
        let designer = summary(Role::Designer);
        let client = summary(Role::Client);
        let admin = summary(Role::Admin);
        let rec = record(&designer, Some(&client));

        assert!(can_modify(designer.id, &rec));
        assert!(!can_modify(client.id, &rec));
        // admins get no implicit ownership
        assert!(!can_modify(admin.id, &rec));
    }

    #[test]
    fn test_read_designer_or_client() {
        let designer = summary(Role::Designer);
        let client = summary(Role::Client);
        let stranger = summary(Role::Client);

        let without_client = record(&designer, None);
        assert!(can_read(designer.id, &without_client));
        assert!(!can_read(client.id, &without_client));

        let with_client = record(&designer, Some(&client));
        assert!(can_read(client.id, &with_client));
        assert!(!can_read(stranger.id, &with_client));
    }

    #[test]
    fn test_denials_use_distinct_kinds() {
        let designer = summary(Role::Designer);
        let stranger = summary(Role::Client);
        let rec = record(&designer, None);

        assert!(matches!(
            require_create(stranger.id, Role::Client),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            require_modify(stranger.id, &rec),
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            require_read(stranger.id, &rec),
            Err(Error::Unauthorized(_))
        ));
        assert!(require_read(designer.id, &rec).is_ok());
    }
}
