//! Publish-ready manifest types.
//!
//! These are what ends up in the front matter of index pages and in the
//! `manifest.yaml` of environment-only content. Fields that do not apply to a
//! kind are `None` or empty and are left out when serialized.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AccessControl, ContentKind, Embed, MachineSpec};

/// One concrete task: a single machine and a single user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TaskInstance {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub machine: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub init: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(default)]
    pub run: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<serde_yaml::Value>,
}

/// Name-keyed map of task instances.
pub type TaskMap = BTreeMap<String, TaskInstance>;

/// The environment of a content unit, as published.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEnvironment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub machines: Vec<MachineSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<serde_yaml::Value>,
}

/// A content manifest as published in front matter.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedContent {
    pub kind: ContentKind,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, rename = "tagz", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playground: Option<ContentEnvironment>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tasks: TaskMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub challenges: BTreeMap<String, Embed>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tutorials: BTreeMap<String, Embed>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub courses: BTreeMap<String, Embed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_title: Option<String>,
}

/// The environment section of a published environment-only manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEnvironmentSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<serde_yaml::Value>,
    #[serde(default)]
    pub machines: Vec<MachineSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub init_tasks: TaskMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_conditions: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub registry_auth: String,
    #[serde(default, skip_serializing_if = "AccessControl::is_empty")]
    pub access_control: AccessControl,
}

/// An environment-only manifest as published.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEnvironment {
    pub kind: ContentKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cover: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub markdown: String,
    pub playground: PublishedEnvironmentSpec,
}
