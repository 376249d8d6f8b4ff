//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Project;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    Err(ProjectError::Migration {
        what: format!("No migration path from version {}", project.version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_before_first_release_are_rejected() {
        let project = Project {
            version: 0,
            name: "legacy".into(),
            pumps: vec![],
            system_curves: vec![],
            scenarios: vec![],
        };
        let err = migrate_to_latest(project).unwrap_err();
        assert!(matches!(err, ProjectError::Migration { ref what } if what.contains("version 0")));
    }

    #[test]
    fn latest_is_untouched() {
        let project = Project {
            version: LATEST_VERSION,
            name: "current".into(),
            pumps: vec![],
            system_curves: vec![],
            scenarios: vec![],
        };
        assert_eq!(migrate_to_latest(project.clone()).unwrap(), project);
    }
}
