use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub vendor_status: ApprovalStatus,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Seller,
    Admin,
    SuperAdmin,
    Manager,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Seller => "seller",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
            UserRole::Manager => "manager",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "seller" => Some(UserRole::Seller),
            "admin" => Some(UserRole::Admin),
            "super_admin" => Some(UserRole::SuperAdmin),
            "manager" => Some(UserRole::Manager),
            _ => None,
        }
    }

    /// Admin, manager and super admin.
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin | UserRole::Manager)
    }
}

/// Shared by vendor accounts and plant listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

// Capability checks. Super admins are admin tier, so they pass every check.
impl User {
    pub fn can_manage_platform(&self) -> bool {
        self.role.is_admin_tier()
    }

    /// Listing plants requires an approved vendor account unless the caller is admin tier.
    pub fn can_sell(&self) -> bool {
        self.can_manage_platform() || self.vendor_status == ApprovalStatus::Approved
    }

    /// Buyer or seller of the order, or platform staff.
    pub fn can_manage_order(&self, buyer_id: Uuid, seller_id: Uuid) -> bool {
        self.can_manage_platform() || self.id == buyer_id || self.id == seller_id
    }

    pub fn can_manage_plant(&self, seller_id: Uuid) -> bool {
        self.can_manage_platform() || self.id == seller_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Admin-created accounts may start with any role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub account: CreateUserRequest,
    pub role: Option<UserRole>,
}

/// Profile fields plus the admin-only role and flags. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    /// Substring of the name or email.
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, vendor_status: ApprovalStatus) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            role,
            vendor_status,
            phone: None,
            address: None,
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_tier_includes_manager() {
        assert!(user(UserRole::Manager, ApprovalStatus::Pending).can_manage_platform());
        assert!(user(UserRole::Admin, ApprovalStatus::Pending).can_manage_platform());
        assert!(user(UserRole::SuperAdmin, ApprovalStatus::Pending).can_manage_platform());
        assert!(!user(UserRole::Seller, ApprovalStatus::Approved).can_manage_platform());
        assert!(!user(UserRole::User, ApprovalStatus::Pending).can_manage_platform());
    }

    #[test]
    fn test_can_sell_requires_approval() {
        assert!(!user(UserRole::Seller, ApprovalStatus::Pending).can_sell());
        assert!(user(UserRole::Seller, ApprovalStatus::Approved).can_sell());
        assert!(user(UserRole::Admin, ApprovalStatus::Rejected).can_sell());
    }

    #[test]
    fn test_order_participants() {
        let buyer = user(UserRole::User, ApprovalStatus::Pending);
        let seller = user(UserRole::Seller, ApprovalStatus::Approved);
        let stranger = user(UserRole::User, ApprovalStatus::Pending);
        assert!(buyer.can_manage_order(buyer.id, seller.id));
        assert!(seller.can_manage_order(buyer.id, seller.id));
        assert!(!stranger.can_manage_order(buyer.id, seller.id));
    }

    #[test]
    fn test_role_round_trip_names() {
        assert_eq!(UserRole::from_str("super_admin"), Some(UserRole::SuperAdmin));
        assert_eq!(UserRole::SuperAdmin.as_str(), "super_admin");
        assert_eq!(UserRole::from_str("root"), None);
    }
}
