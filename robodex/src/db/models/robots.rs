//! Database models for robot catalog entries.
//!
//! A robot row mixes three blocks of columns: physical dimensions, software
//! integration flags, and a manipulator-arm block that is only meaningful for
//! arm-bearing subtypes. Every column except `name` and `type` is nullable;
//! NULL means "not specified" and is never matched by search predicates.

use crate::api::models::robots::{RobotCreate, RobotUpdate};
use crate::types::{RobotId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Robot subtype tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "robot_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RobotType {
    MobileManipulator,
    MobileBase,
    ManipulatorArm,
}

impl RobotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotType::MobileManipulator => "mobile_manipulator",
            RobotType::MobileBase => "mobile_base",
            RobotType::ManipulatorArm => "manipulator_arm",
        }
    }
}

/// Database request for creating a robot
#[derive(Debug, Clone)]
pub struct RobotCreateDBRequest {
    pub name: String,
    pub manufacturer: Option<String>,
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
    pub created_by: Option<UserId>,
}

impl RobotCreateDBRequest {
    /// Creates a robot insert request from API creation data
    pub fn from_api_create(created_by: Option<UserId>, create: RobotCreate) -> Self {
        Self {
            name: create.name,
            manufacturer: create.manufacturer,
            robot_type: create.robot_type,
            length: create.length,
            width: create.width,
            height: create.height,
            weight: create.weight,
            usable_payload: create.usable_payload,
            functions: create.functions,
            reach: create.reach,
            drive_system: create.drive_system,
            certifications: create.certifications,
            ros_compatible: create.ros_compatible,
            ros_distros: create.ros_distros,
            sdk_available: create.sdk_available,
            api_available: create.api_available,
            operation_time: create.operation_time,
            battery_life: create.battery_life,
            max_speed: create.max_speed,
            force_sensor: create.force_sensor,
            eoat_compatibility: create.eoat_compatibility,
            arm_payload: create.arm_payload,
            arm_reach: create.arm_reach,
            arm_dof: create.arm_dof,
            website_url: create.website_url,
            remarks: create.remarks,
            created_by,
        }
    }
}

/// Database request for partially updating a robot.
///
/// Absent fields leave the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct RobotUpdateDBRequest {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
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

impl From<RobotUpdate> for RobotUpdateDBRequest {
    fn from(update: RobotUpdate) -> Self {
        Self {
            name: update.name,
            manufacturer: update.manufacturer,
            robot_type: update.robot_type,
            length: update.length,
            width: update.width,
            height: update.height,
            weight: update.weight,
            usable_payload: update.usable_payload,
            functions: update.functions,
            reach: update.reach,
            drive_system: update.drive_system,
            certifications: update.certifications,
            ros_compatible: update.ros_compatible,
            ros_distros: update.ros_distros,
            sdk_available: update.sdk_available,
            api_available: update.api_available,
            operation_time: update.operation_time,
            battery_life: update.battery_life,
            max_speed: update.max_speed,
            force_sensor: update.force_sensor,
            eoat_compatibility: update.eoat_compatibility,
            arm_payload: update.arm_payload,
            arm_reach: update.arm_reach,
            arm_dof: update.arm_dof,
            website_url: update.website_url,
            remarks: update.remarks,
        }
    }
}

/// Database response for a robot
#[derive(Debug, Clone)]
pub struct RobotDBResponse {
    pub id: RobotId,
    pub name: String,
    pub manufacturer: Option<String>,
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
    pub created_by: Option<UserId>,
}
