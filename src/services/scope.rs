//! Role-based visibility for read-side queries.
//!
//! One policy function decides which employees an actor may see; callers
//! restrict the query population with it before any aggregation runs, so
//! scoping never happens by filtering output.

use uuid::Uuid;

use crate::database::models::{Employee, EmployeeRole};
use crate::database::repositories::EmployeeRepository;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    All,
    Only(Vec<Uuid>),
}

impl Visibility {
    /// Narrows the visible set by an explicit employee filter. Asking for an
    /// employee outside the visible set is refused rather than silently
    /// returning empty data.
    pub fn restrict(&self, requested: Option<Uuid>) -> Result<Option<Vec<Uuid>>, AppError> {
        match (self, requested) {
            (Visibility::All, None) => Ok(None),
            (Visibility::All, Some(id)) => Ok(Some(vec![id])),
            (Visibility::Only(ids), None) => Ok(Some(ids.clone())),
            (Visibility::Only(ids), Some(id)) => {
                if ids.contains(&id) {
                    Ok(Some(vec![id]))
                } else {
                    Err(AppError::Forbidden(
                        "employee is outside your visibility".to_string(),
                    ))
                }
            }
        }
    }
}

/// Admins see everyone; department heads see employees of the departments
/// they manage (plus themselves); employees see only themselves.
pub async fn visible_employees(
    actor: &Employee,
    employees: &EmployeeRepository,
) -> Result<Visibility, AppError> {
    match actor.role {
        EmployeeRole::Admin => Ok(Visibility::All),
        EmployeeRole::DepartmentHead => {
            let departments = employees.managed_departments(actor.id).await?;
            let mut visible = employees.employees_in_departments(&departments).await?;
            if !visible.contains(&actor.id) {
                visible.push(actor.id);
            }
            Ok(Visibility::Only(visible))
        }
        EmployeeRole::Employee => Ok(Visibility::Only(vec![actor.id])),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn admin_scope_passes_filter_through() {
        let id = Uuid::new_v4();
        assert_eq!(Visibility::All.restrict(None).unwrap(), None);
        assert_eq!(Visibility::All.restrict(Some(id)).unwrap(), Some(vec![id]));
    }

    #[test]
    fn limited_scope_defaults_to_visible_set() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let visibility = Visibility::Only(ids.clone());
        assert_eq!(visibility.restrict(None).unwrap(), Some(ids));
    }

    #[test]
    fn limited_scope_narrows_to_requested_member() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let visibility = Visibility::Only(vec![a, b]);
        assert_eq!(visibility.restrict(Some(b)).unwrap(), Some(vec![b]));
    }

    #[test]
    fn requesting_outside_visibility_is_forbidden() {
        let visibility = Visibility::Only(vec![Uuid::new_v4()]);
        let err = visibility.restrict(Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
