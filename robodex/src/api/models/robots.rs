//! API request/response models for robots.

use crate::db::handlers::robots::RobotFilter;
use crate::db::models::robots::{RobotDBResponse, RobotType};
use crate::types::{RobotId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Robot request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RobotCreate {
    pub name: String,
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub robot_type: RobotType,
    /// Length in mm
    pub length: Option<i32>,
    /// Width in mm
    pub width: Option<i32>,
    /// Height in mm
    pub height: Option<i32>,
    /// Weight in kg
    pub weight: Option<i32>,
    /// Carrying capacity of the platform in kg
    pub usable_payload: Option<i32>,
    /// Comma-separated capability tags
    pub functions: Option<String>,
    /// Reach in mm
    pub reach: Option<i32>,
    pub drive_system: Option<String>,
    /// Comma-separated certification names (cleanroom, ISO, etc.)
    pub certifications: Option<String>,
    pub ros_compatible: Option<bool>,
    /// Comma-separated list of supported ROS distros
    pub ros_distros: Option<String>,
    pub sdk_available: Option<bool>,
    pub api_available: Option<bool>,
    /// Runtime on one charge in minutes
    pub operation_time: Option<i32>,
    /// Battery life in minutes
    pub battery_life: Option<i32>,
    /// Maximum speed in mm/s
    pub max_speed: Option<i32>,
    pub force_sensor: Option<bool>,
    /// End-of-arm tooling compatibility notes
    pub eoat_compatibility: Option<String>,
    /// Arm payload in kg
    pub arm_payload: Option<i32>,
    /// Arm reach in mm
    pub arm_reach: Option<i32>,
    /// Arm degrees of freedom
    pub arm_dof: Option<i32>,
    pub website_url: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RobotUpdate {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub robot_type: Option<RobotType>,
    pub length: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub usable_payload: Option<i32>,
    pub functions: Option<String>,
    pub reach: Option<i32>,
    pub drive_system: Option<String>,
    pub certifications: Option<String>,
    pub ros_compatible: Option<bool>,
    pub ros_distros: Option<String>,
    pub sdk_available: Option<bool>,
    pub api_available: Option<bool>,
    pub operation_time: Option<i32>,
    pub battery_life: Option<i32>,
    pub max_speed: Option<i32>,
    pub force_sensor: Option<bool>,
    pub eoat_compatibility: Option<String>,
    pub arm_payload: Option<i32>,
    pub arm_reach: Option<i32>,
    pub arm_dof: Option<i32>,
    pub website_url: Option<String>,
    pub remarks: Option<String>,
}

// Robot response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RobotResponse {
    pub id: RobotId,
    pub name: String,
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub robot_type: RobotType,
    pub length: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub usable_payload: Option<i32>,
    pub functions: Option<String>,
    pub reach: Option<i32>,
    pub drive_system: Option<String>,
    pub certifications: Option<String>,
    pub ros_compatible: Option<bool>,
    pub ros_distros: Option<String>,
    pub sdk_available: Option<bool>,
    pub api_available: Option<bool>,
    pub operation_time: Option<i32>,
    pub battery_life: Option<i32>,
    pub max_speed: Option<i32>,
    pub force_sensor: Option<bool>,
    pub eoat_compatibility: Option<String>,
    pub arm_payload: Option<i32>,
    pub arm_reach: Option<i32>,
    pub arm_dof: Option<i32>,
    pub website_url: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub created_by: Option<UserId>,
}

impl From<RobotDBResponse> for RobotResponse {
    fn from(db: RobotDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            manufacturer: db.manufacturer,
            robot_type: db.robot_type,
            length: db.length,
            width: db.width,
            height: db.height,
            weight: db.weight,
            usable_payload: db.usable_payload,
            functions: db.functions,
            reach: db.reach,
            drive_system: db.drive_system,
            certifications: db.certifications,
            ros_compatible: db.ros_compatible,
            ros_distros: db.ros_distros,
            sdk_available: db.sdk_available,
            api_available: db.api_available,
            operation_time: db.operation_time,
            battery_life: db.battery_life,
            max_speed: db.max_speed,
            force_sensor: db.force_sensor,
            eoat_compatibility: db.eoat_compatibility,
            arm_payload: db.arm_payload,
            arm_reach: db.arm_reach,
            arm_dof: db.arm_dof,
            website_url: db.website_url,
            remarks: db.remarks,
            created_at: db.created_at,
            updated_at: db.updated_at,
            created_by: db.created_by,
        }
    }
}

/// Capability filters for searching the catalog.
///
/// Doubles as the structured output contract for the natural-language query
/// endpoint, which is why `type` is a free-form string here rather than the
/// strict enum: an extractor may hand back a tag we do not recognize, and
/// that should select nothing instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct RobotSearchQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub robot_type: Option<String>,
    /// Minimum usable payload in kg (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_payload: Option<f64>,
    /// Maximum usable payload in kg (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<f64>,
    /// Minimum reach in mm (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_reach: Option<f64>,
    /// Maximum reach in mm (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reach: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ros_compatible: Option<bool>,
    /// Substring match on the drive system description (case-sensitive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_system: Option<String>,
    /// Minimum arm degrees of freedom (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_arm_dof: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_sensor: Option<bool>,
}

impl From<RobotSearchQuery> for RobotFilter {
    fn from(query: RobotSearchQuery) -> Self {
        Self {
            robot_type: query.robot_type,
            min_payload: query.min_payload,
            max_payload: query.max_payload,
            min_reach: query.min_reach,
            max_reach: query.max_reach,
            ros_compatible: query.ros_compatible,
            drive_system: query.drive_system,
            min_arm_dof: query.min_arm_dof,
            force_sensor: query.force_sensor,
        }
    }
}

// Natural-language query models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NlQueryRequest {
    /// Free-text description of the robot being looked for
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NlQueryResponse {
    /// The structured filters extracted from the query
    pub filters: RobotSearchQuery,
    pub results: Vec<RobotResponse>,
    pub explanation: String,
}

// Bulk upload models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkUploadRequest {
    /// Candidate entries; items are validated and inserted one at a time
    #[schema(value_type = Vec<Object>)]
    pub robots: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkUploadError {
    /// Name of the rejected robot, or "unknown" when the entry had none
    pub robot: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkUploadResponse {
    /// Number of entries inserted
    pub success: usize,
    /// Number of entries rejected
    pub failed: usize,
    pub errors: Vec<BulkUploadError>,
}
