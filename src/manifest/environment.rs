//! Environment (playground) schema shared by content manifests, environment
//! manifests and fetched base environments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::task::TaskSpec;

/// Sentinel that marks a user welcome message as "use the environment default".
pub const WELCOME_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSpec {
    /// For content this names the base environment; for base environments it
    /// is the environment's own name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub welcome: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub machines: Vec<MachineSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub init_tasks: BTreeMap<String, TaskSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_conditions: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub registry_auth: String,
    #[serde(default, skip_serializing_if = "AccessControl::is_empty")]
    pub access_control: AccessControl,
}

impl EnvironmentSpec {
    pub fn machine(&self, name: &str) -> Option<&MachineSpec> {
        self.machines.iter().find(|m| m.name == name)
    }

    pub fn machine_names(&self) -> Vec<String> {
        self.machines.iter().map(|m| m.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    pub name: String,
    /// Only meaningful before inheritance; it is turned into startup files.
    #[serde(default, skip_serializing)]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserSpec>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kernel: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drives: Vec<DriveSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Resources::is_empty")]
    pub resources: Resources,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub startup_files: Vec<StartupFileSpec>,
    #[serde(default, rename = "noSSH", skip_serializing_if = "std::ops::Not::not")]
    pub no_ssh: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub welcome: String,
}

impl UserSpec {
    /// Whether an environment-level welcome message applies to this user.
    pub fn accepts_default_welcome(&self) -> bool {
        self.default && (self.welcome.is_empty() || self.welcome == WELCOME_PLACEHOLDER)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cpu_count: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ram_size: String,
}

impl Resources {
    pub fn is_empty(&self) -> bool {
        self.cpu_count == 0 && self.ram_size.is_empty()
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveSpec {
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mount: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filesystem: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupFileSpec {
    pub path: String,
    #[serde(default)]
    pub content: String,
    /// Path inside the content tree whose text replaces `content`.
    #[serde(default, skip_serializing)]
    pub from_file: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub append: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControl {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub can_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub can_read: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub can_start: Vec<String>,
}

impl AccessControl {
    /// Access control that lets anyone list, read and start the environment.
    pub fn public() -> Self {
        let anyone = vec!["anyone".to_string()];
        Self {
            can_list: anyone.clone(),
            can_read: anyone.clone(),
            can_start: anyone,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.can_list.is_empty() && self.can_read.is_empty() && self.can_start.is_empty()
    }
}
