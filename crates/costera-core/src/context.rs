//! Request context
//!
//! Session and role authentication live outside the engine. Every engine
//! call receives an explicit context identifying the caller instead of
//! reading ambient state.

use crate::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Direct customer booking for themselves
    Customer,
    /// Travel company booking blocks of rooms
    TravelCompany,
    /// Front-desk clerk (check-in/out, billing statements)
    Clerk,
    /// Branch manager (financial summaries)
    Manager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::TravelCompany => write!(f, "travel_company"),
            Role::Clerk => write!(f, "clerk"),
            Role::Manager => write!(f, "manager"),
        }
    }
}

impl Role {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "customer" => Some(Role::Customer),
            "travel_company" => Some(Role::TravelCompany),
            "clerk" => Some(Role::Clerk),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }

    /// Staff roles act on any reservation
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Clerk | Role::Manager)
    }
}

/// Identity of the caller, passed explicitly into every engine operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl RequestContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Reject callers that neither own the resource nor hold a staff role
    pub fn authorize_owner(&self, owner_id: Uuid) -> AppResult<()> {
        if self.role.is_staff() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "reservation does not belong to caller".to_string(),
            ))
        }
    }

    /// Reject callers without a staff role
    pub fn authorize_staff(&self) -> AppResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "operation requires a staff role, caller is {}",
                self.role
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_authorization() {
        let owner = Uuid::new_v4();
        let ctx = RequestContext::new(owner, Role::Customer);
        assert!(ctx.authorize_owner(owner).is_ok());
        assert!(ctx.authorize_owner(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_staff_bypasses_ownership() {
        let ctx = RequestContext::new(Uuid::new_v4(), Role::Clerk);
        assert!(ctx.authorize_owner(Uuid::new_v4()).is_ok());
        assert!(ctx.authorize_staff().is_ok());
    }

    #[test]
    fn test_customer_is_not_staff() {
        let ctx = RequestContext::new(Uuid::new_v4(), Role::TravelCompany);
        assert!(ctx.authorize_staff().is_err());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            Role::Customer,
            Role::TravelCompany,
            Role::Clerk,
            Role::Manager,
        ] {
            assert_eq!(Role::from_str(&role.to_string()), Some(role));
        }
        assert_eq!(Role::from_str("wizard"), None);
    }
}
