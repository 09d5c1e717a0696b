//! Document store models
//!
//! Raw documents as the store sees them, typed records as the access layer
//! hands them out, and the fixed field schema of every entity kind.
//! Field names are camelCase on the wire, matching what the admin frontend
//! reads and writes.

use crate::config::{
    ADMINS_COLLECTION, BLOGS_COLLECTION, BLOGS_FOLDER, INSTITUTIONS_COLLECTION,
    INSTITUTIONS_FOLDER, PARTNERS_COLLECTION, PARTNERS_FOLDER, RESOURCES_COLLECTION,
    RESOURCES_FOLDER, STUDENTS_COLLECTION,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Schemaless field map of a stored document
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Keys owned by the access layer, never accepted from callers
pub const RESERVED_KEYS: &[&str] = &["id", "createdAt", "updatedAt"];

/// A document as persisted in a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A typed entity instance with its identity and timestamps.
///
/// Serializes flat: `{ "id": .., ...fields, "createdAt": .., "updatedAt": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub fields: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entity kind: a fixed field schema stored in its own collection
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    /// Partial update; fields left as `None` are not sent to the store
    type Patch: Serialize + Send + Sync;
}

/// An entity kind carrying one uploaded image
pub trait WithImage: Entity {
    const IMAGE_FOLDER: &'static str;

    fn image_url(&self) -> Option<&str>;

    fn set_image_url(&mut self, url: Option<String>);
}

/// Split comma-separated form input into trimmed, non-empty tags
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

// ===== Enumerated field values =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Pdf,
    Video,
    #[default]
    Article,
    Course,
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerType {
    University,
    #[default]
    Company,
    Organization,
    Government,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnershipType {
    Academic,
    #[default]
    Industry,
    Research,
    Funding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

impl PartnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerType::University => "university",
            PartnerType::Company => "company",
            PartnerType::Organization => "organization",
            PartnerType::Government => "government",
        }
    }
}

impl PartnershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnershipType::Academic => "academic",
            PartnershipType::Industry => "industry",
            PartnershipType::Research => "research",
            PartnershipType::Funding => "funding",
        }
    }
}

// ===== Students =====

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Student {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub institution: String,
    pub field_of_study: String,
    pub status: ActiveStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActiveStatus>,
}

impl Entity for Student {
    const COLLECTION: &'static str = STUDENTS_COLLECTION;
    type Patch = StudentPatch;
}

// ===== Institutions =====

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Institution {
    pub name: String,
    /// Free-form: "university", "college", "community college", ...
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub website: String,
    pub phone: String,
    pub email: String,
    pub description: String,
    pub logo_url: Option<String>,
    pub status: ActiveStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Some(None)` clears the logo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActiveStatus>,
}

impl Entity for Institution {
    const COLLECTION: &'static str = INSTITUTIONS_COLLECTION;
    type Patch = InstitutionPatch;
}

impl WithImage for Institution {
    const IMAGE_FOLDER: &'static str = INSTITUTIONS_FOLDER;

    fn image_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    fn set_image_url(&mut self, url: Option<String>) {
        self.logo_url = url;
    }
}

// ===== Resources =====

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub url: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub status: ActiveStatus,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActiveStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<Option<String>>,
}

impl Entity for Resource {
    const COLLECTION: &'static str = RESOURCES_COLLECTION;
    type Patch = ResourcePatch;
}

impl WithImage for Resource {
    const IMAGE_FOLDER: &'static str = RESOURCES_FOLDER;

    fn image_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    fn set_image_url(&mut self, url: Option<String>) {
        self.thumbnail_url = url;
    }
}

// ===== Blogs =====

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Blog {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub status: BlogStatus,
    pub featured: bool,
    /// As entered in the admin form, e.g. "2024-03-15"
    pub publish_date: String,
    pub featured_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BlogStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image_url: Option<Option<String>>,
}

impl Entity for Blog {
    const COLLECTION: &'static str = BLOGS_COLLECTION;
    type Patch = BlogPatch;
}

impl WithImage for Blog {
    const IMAGE_FOLDER: &'static str = BLOGS_FOLDER;

    fn image_url(&self) -> Option<&str> {
        self.featured_image_url.as_deref()
    }

    fn set_image_url(&mut self, url: Option<String>) {
        self.featured_image_url = url;
    }
}

// ===== Partners =====

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Partner {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: PartnerType,
    pub website: String,
    pub email: String,
    pub phone: String,
    pub logo_url: Option<String>,
    pub contact_person: String,
    pub partnership_type: PartnershipType,
    pub status: PartnerStatus,
    pub start_date: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PartnerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partnership_type: Option<PartnershipType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PartnerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

impl Entity for Partner {
    const COLLECTION: &'static str = PARTNERS_COLLECTION;
    type Patch = PartnerPatch;
}

impl WithImage for Partner {
    const IMAGE_FOLDER: &'static str = PARTNERS_FOLDER;

    fn image_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    fn set_image_url(&mut self, url: Option<String>) {
        self.logo_url = url;
    }
}

// ===== Admin accounts =====

/// Stored back-office account; `password_hash` is an Argon2id PHC string
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminAccount {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccountPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl Entity for AdminAccount {
    const COLLECTION: &'static str = ADMINS_COLLECTION;
    type Patch = AdminAccountPatch;
}
