//! Shared enumerations for the Tessera API surface

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Subscription plan assigned to a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TenantPlan {
    #[default]
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl TenantPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantPlan::Free => "free",
            TenantPlan::Starter => "starter",
            TenantPlan::Professional => "professional",
            TenantPlan::Enterprise => "enterprise",
        }
    }
}

/// Built-in tenant roles seeded for every workspace
///
/// A membership `role` is a free-form string so tenants can point it at a
/// custom role; this enum covers the four names every tenant starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl BuiltinRole {
    pub const ALL: [BuiltinRole; 4] = [
        BuiltinRole::Owner,
        BuiltinRole::Admin,
        BuiltinRole::Member,
        BuiltinRole::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinRole::Owner => "owner",
            BuiltinRole::Admin => "admin",
            BuiltinRole::Member => "member",
            BuiltinRole::Viewer => "viewer",
        }
    }

    /// Parse a membership role string into a built-in role, if it names one
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "owner" => Some(BuiltinRole::Owner),
            "admin" => Some(BuiltinRole::Admin),
            "member" => Some(BuiltinRole::Member),
            "viewer" => Some(BuiltinRole::Viewer),
            _ => None,
        }
    }

    /// Owners and admins get implicit access to every enabled app
    pub fn is_privileged(&self) -> bool {
        matches!(self, BuiltinRole::Owner | BuiltinRole::Admin)
    }
}

impl std::fmt::Display for BuiltinRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field types supported by tenant-defined entity schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Currency,
    Date,
    DateTime,
    Checkbox,
    Select,
    MultiSelect,
    Email,
    Phone,
    Url,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Date => "date",
            FieldType::DateTime => "date_time",
            FieldType::Checkbox => "checkbox",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multi_select",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
        }
    }

    /// Whether values of this type carry an option list
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::MultiSelect)
    }
}

/// Actions a role matrix can grant or deny per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    Read,
    Write,
    Delete,
}

impl PermissionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::Read => "read",
            PermissionAction::Write => "write",
            PermissionAction::Delete => "delete",
        }
    }
}

/// Tri-state write permission: denied, allowed, or allowed on own records only
///
/// Serializes to the wire shape roles are authored in: `false`, `true`, or
/// the string `"own"`. The ownership comparison for `Own` is the caller's
/// responsibility; the matrix only reports the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePermission {
    #[default]
    Denied,
    Allowed,
    Own,
}

impl WritePermission {
    /// Whether the matrix permits a write at all (ownership not yet applied)
    pub fn permits(&self) -> bool {
        !matches!(self, WritePermission::Denied)
    }

    /// Whether the write is scoped to records the actor owns
    pub fn is_own_only(&self) -> bool {
        matches!(self, WritePermission::Own)
    }
}

impl Serialize for WritePermission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WritePermission::Denied => serializer.serialize_bool(false),
            WritePermission::Allowed => serializer.serialize_bool(true),
            WritePermission::Own => serializer.serialize_str("own"),
        }
    }
}

impl<'de> Deserialize<'de> for WritePermission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Tag(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(WritePermission::Allowed),
            Raw::Flag(false) => Ok(WritePermission::Denied),
            Raw::Tag(tag) if tag == "own" => Ok(WritePermission::Own),
            Raw::Tag(tag) => Err(serde::de::Error::custom(format!(
                "unknown write permission value: {tag:?} (expected true, false or \"own\")"
            ))),
        }
    }
}

/// Events that can start a tenant workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowTrigger {
    RecordCreated,
    RecordUpdated,
    RecordDeleted,
    Manual,
}

/// Dashboard widget kinds a template can provision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Stat,
    Chart,
    List,
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_role_parse() {
        assert_eq!(BuiltinRole::parse("owner"), Some(BuiltinRole::Owner));
        assert_eq!(BuiltinRole::parse("viewer"), Some(BuiltinRole::Viewer));
        assert_eq!(BuiltinRole::parse("god"), None);
        assert_eq!(BuiltinRole::parse("sales_rep"), None);
    }

    #[test]
    fn test_privileged_roles() {
        assert!(BuiltinRole::Owner.is_privileged());
        assert!(BuiltinRole::Admin.is_privileged());
        assert!(!BuiltinRole::Member.is_privileged());
        assert!(!BuiltinRole::Viewer.is_privileged());
    }

    #[test]
    fn test_write_permission_wire_shape() {
        assert_eq!(
            serde_json::to_value(WritePermission::Allowed).unwrap(),
            serde_json::json!(true)
        );
        assert_eq!(
            serde_json::to_value(WritePermission::Denied).unwrap(),
            serde_json::json!(false)
        );
        assert_eq!(
            serde_json::to_value(WritePermission::Own).unwrap(),
            serde_json::json!("own")
        );
    }

    #[test]
    fn test_write_permission_parse() {
        let own: WritePermission = serde_json::from_value(serde_json::json!("own")).unwrap();
        assert!(own.permits());
        assert!(own.is_own_only());

        let denied: WritePermission = serde_json::from_value(serde_json::json!(false)).unwrap();
        assert!(!denied.permits());

        let bad = serde_json::from_value::<WritePermission>(serde_json::json!("all"));
        assert!(bad.is_err());
    }
}
