//! Database repository for robots.
//!
//! Search predicates are conjunctive and only ever constrain rows where the
//! relevant column is non-NULL: a robot with no recorded payload never
//! satisfies a payload bound, in either direction.

use crate::types::{RobotId, UserId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::robots::{RobotCreateDBRequest, RobotDBResponse, RobotType, RobotUpdateDBRequest},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing robots.
///
/// Every field is optional; the default filter matches the whole catalog.
/// String fields are ignored when empty so that a blank form submission
/// behaves like no filter at all.
#[derive(Debug, Clone, Default)]
pub struct RobotFilter {
    /// Matched against the subtype tag as text, so an unrecognized value
    /// selects nothing rather than failing the query.
    pub robot_type: Option<String>,
    pub min_payload: Option<f64>,
    pub max_payload: Option<f64>,
    pub min_reach: Option<f64>,
    pub max_reach: Option<f64>,
    pub ros_compatible: Option<bool>,
    /// Case-sensitive substring match on the drive system description.
    pub drive_system: Option<String>,
    pub min_arm_dof: Option<f64>,
    pub force_sensor: Option<bool>,
}

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Robot {
    pub id: RobotId,
    pub name: String,
    pub manufacturer: Option<String>,
    #[sqlx(rename = "type")]
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

pub struct Robots<'c> {
    db: &'c mut PgConnection,
}

impl From<Robot> for RobotDBResponse {
    fn from(robot: Robot) -> Self {
        Self {
            id: robot.id,
            name: robot.name,
            manufacturer: robot.manufacturer,
            robot_type: robot.robot_type,
            length: robot.length,
            width: robot.width,
            height: robot.height,
            weight: robot.weight,
            usable_payload: robot.usable_payload,
            functions: robot.functions,
            reach: robot.reach,
            drive_system: robot.drive_system,
            certifications: robot.certifications,
            ros_compatible: robot.ros_compatible,
            ros_distros: robot.ros_distros,
            sdk_available: robot.sdk_available,
            api_available: robot.api_available,
            operation_time: robot.operation_time,
            battery_life: robot.battery_life,
            max_speed: robot.max_speed,
            force_sensor: robot.force_sensor,
            eoat_compatibility: robot.eoat_compatibility,
            arm_payload: robot.arm_payload,
            arm_reach: robot.arm_reach,
            arm_dof: robot.arm_dof,
            website_url: robot.website_url,
            remarks: robot.remarks,
            created_at: robot.created_at,
            updated_at: robot.updated_at,
            created_by: robot.created_by,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Robots<'c> {
    type CreateRequest = RobotCreateDBRequest;
    type UpdateRequest = RobotUpdateDBRequest;
    type Response = RobotDBResponse;
    type Id = RobotId;
    type Filter = RobotFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let robot = sqlx::query_as::<_, Robot>(
            r#"
            INSERT INTO robots (
                name, manufacturer, type,
                length, width, height, weight, usable_payload,
                functions, reach, drive_system, certifications,
                ros_compatible, ros_distros, sdk_available, api_available,
                operation_time, battery_life, max_speed,
                force_sensor, eoat_compatibility, arm_payload, arm_reach, arm_dof,
                website_url, remarks, created_by
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
            )
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.manufacturer)
        .bind(request.robot_type)
        .bind(request.length)
        .bind(request.width)
        .bind(request.height)
        .bind(request.weight)
        .bind(request.usable_payload)
        .bind(&request.functions)
        .bind(request.reach)
        .bind(&request.drive_system)
        .bind(&request.certifications)
        .bind(request.ros_compatible)
        .bind(&request.ros_distros)
        .bind(request.sdk_available)
        .bind(request.api_available)
        .bind(request.operation_time)
        .bind(request.battery_life)
        .bind(request.max_speed)
        .bind(request.force_sensor)
        .bind(&request.eoat_compatibility)
        .bind(request.arm_payload)
        .bind(request.arm_reach)
        .bind(request.arm_dof)
        .bind(&request.website_url)
        .bind(&request.remarks)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(RobotDBResponse::from(robot))
    }

    #[instrument(skip(self), fields(robot_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let robot = sqlx::query_as::<_, Robot>("SELECT * FROM robots WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(robot.map(RobotDBResponse::from))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM robots WHERE 1=1");

        // Compare the enum column as text so an unknown tag matches no rows
        // instead of erroring on the cast
        if let Some(ref robot_type) = filter.robot_type
            && !robot_type.is_empty()
        {
            query.push(" AND type::text = ");
            query.push_bind(robot_type);
        }

        if let Some(min_payload) = filter.min_payload {
            query.push(" AND usable_payload >= ");
            query.push_bind(min_payload);
        }

        if let Some(max_payload) = filter.max_payload {
            query.push(" AND usable_payload <= ");
            query.push_bind(max_payload);
        }

        if let Some(min_reach) = filter.min_reach {
            query.push(" AND reach >= ");
            query.push_bind(min_reach);
        }

        if let Some(max_reach) = filter.max_reach {
            query.push(" AND reach <= ");
            query.push_bind(max_reach);
        }

        if let Some(ros_compatible) = filter.ros_compatible {
            query.push(" AND ros_compatible = ");
            query.push_bind(ros_compatible);
        }

        // Substring match, deliberately case-sensitive
        if let Some(ref drive_system) = filter.drive_system
            && !drive_system.is_empty()
        {
            query.push(" AND drive_system LIKE ");
            query.push_bind(format!("%{drive_system}%"));
        }

        if let Some(min_arm_dof) = filter.min_arm_dof {
            query.push(" AND arm_dof >= ");
            query.push_bind(min_arm_dof);
        }

        if let Some(force_sensor) = filter.force_sensor {
            query.push(" AND force_sensor = ");
            query.push_bind(force_sensor);
        }

        // Newest first, with the id as a stable tie-break
        query.push(" ORDER BY created_at DESC, id DESC");

        let robots = query.build_query_as::<Robot>().fetch_all(&mut *self.db).await?;

        Ok(robots.into_iter().map(RobotDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(robot_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM robots WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(robot_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let robot = sqlx::query_as::<_, Robot>(
            r#"
            UPDATE robots SET
                name = COALESCE($2, name),
                manufacturer = COALESCE($3, manufacturer),
                type = COALESCE($4, type),
                length = COALESCE($5, length),
                width = COALESCE($6, width),
                height = COALESCE($7, height),
                weight = COALESCE($8, weight),
                usable_payload = COALESCE($9, usable_payload),
                functions = COALESCE($10, functions),
                reach = COALESCE($11, reach),
                drive_system = COALESCE($12, drive_system),
                certifications = COALESCE($13, certifications),
                ros_compatible = COALESCE($14, ros_compatible),
                ros_distros = COALESCE($15, ros_distros),
                sdk_available = COALESCE($16, sdk_available),
                api_available = COALESCE($17, api_available),
                operation_time = COALESCE($18, operation_time),
                battery_life = COALESCE($19, battery_life),
                max_speed = COALESCE($20, max_speed),
                force_sensor = COALESCE($21, force_sensor),
                eoat_compatibility = COALESCE($22, eoat_compatibility),
                arm_payload = COALESCE($23, arm_payload),
                arm_reach = COALESCE($24, arm_reach),
                arm_dof = COALESCE($25, arm_dof),
                website_url = COALESCE($26, website_url),
                remarks = COALESCE($27, remarks),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.manufacturer)
        .bind(request.robot_type)
        .bind(request.length)
        .bind(request.width)
        .bind(request.height)
        .bind(request.weight)
        .bind(request.usable_payload)
        .bind(&request.functions)
        .bind(request.reach)
        .bind(&request.drive_system)
        .bind(&request.certifications)
        .bind(request.ros_compatible)
        .bind(&request.ros_distros)
        .bind(request.sdk_available)
        .bind(request.api_available)
        .bind(request.operation_time)
        .bind(request.battery_life)
        .bind(request.max_speed)
        .bind(request.force_sensor)
        .bind(&request.eoat_compatibility)
        .bind(request.arm_payload)
        .bind(request.arm_reach)
        .bind(request.arm_dof)
        .bind(&request.website_url)
        .bind(&request.remarks)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(RobotDBResponse::from(robot))
    }
}

impl<'c> Robots<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use sqlx::PgPool;

    fn sample_robot(name: &str, robot_type: RobotType) -> RobotCreateDBRequest {
        RobotCreateDBRequest {
            name: name.to_string(),
            manufacturer: Some("Acme Robotics".to_string()),
            robot_type,
            length: Some(900),
            width: Some(600),
            height: Some(1200),
            weight: Some(150),
            usable_payload: Some(90),
            functions: Some("transport,picking".to_string()),
            reach: Some(1300),
            drive_system: Some("Differential drive".to_string()),
            certifications: Some("ISO 3691-4".to_string()),
            ros_compatible: Some(true),
            ros_distros: Some("humble,jazzy".to_string()),
            sdk_available: Some(true),
            api_available: Some(false),
            operation_time: Some(480),
            battery_life: Some(540),
            max_speed: Some(1500),
            force_sensor: Some(false),
            eoat_compatibility: None,
            arm_payload: None,
            arm_reach: None,
            arm_dof: None,
            website_url: Some("https://example.com/robot".to_string()),
            remarks: None,
            created_by: None,
        }
    }

    fn bare_robot(name: &str, robot_type: RobotType) -> RobotCreateDBRequest {
        RobotCreateDBRequest {
            name: name.to_string(),
            manufacturer: None,
            robot_type,
            length: None,
            width: None,
            height: None,
            weight: None,
            usable_payload: None,
            functions: None,
            reach: None,
            drive_system: None,
            certifications: None,
            ros_compatible: None,
            ros_distros: None,
            sdk_available: None,
            api_available: None,
            operation_time: None,
            battery_life: None,
            max_speed: None,
            force_sensor: None,
            eoat_compatibility: None,
            arm_payload: None,
            arm_reach: None,
            arm_dof: None,
            website_url: None,
            remarks: None,
            created_by: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_robot(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        let robot = repo
            .create(&sample_robot("AMR-100", RobotType::MobileBase))
            .await
            .unwrap();

        assert!(robot.id > 0);
        assert_eq!(robot.name, "AMR-100");
        assert_eq!(robot.robot_type, RobotType::MobileBase);
        assert_eq!(robot.usable_payload, Some(90));
        assert_eq!(robot.ros_compatible, Some(true));
        assert!(robot.created_by.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_by_id(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        let created = repo
            .create(&sample_robot("Fetcher", RobotType::MobileManipulator))
            .await
            .unwrap();

        let found = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(found.map(|r| r.name), Some("Fetcher".to_string()));

        let missing = repo.get_by_id(created.id + 1000).await.unwrap();
        assert!(missing.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_orders_newest_first(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        let first = repo.create(&bare_robot("first", RobotType::MobileBase)).await.unwrap();
        let second = repo.create(&bare_robot("second", RobotType::MobileBase)).await.unwrap();
        let third = repo.create(&bare_robot("third", RobotType::MobileBase)).await.unwrap();

        let robots = repo.list(&RobotFilter::default()).await.unwrap();
        let ids: Vec<_> = robots.iter().map(|r| r.id).collect();

        // The id tie-break keeps the order deterministic even when rows share
        // a created_at timestamp
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_filter_by_type(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        repo.create(&bare_robot("arm", RobotType::ManipulatorArm)).await.unwrap();
        repo.create(&bare_robot("base", RobotType::MobileBase)).await.unwrap();

        let filter = RobotFilter {
            robot_type: Some("manipulator_arm".to_string()),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert_eq!(robots.len(), 1);
        assert_eq!(robots[0].name, "arm");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_filter_unknown_type_matches_nothing(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        repo.create(&bare_robot("base", RobotType::MobileBase)).await.unwrap();

        let filter = RobotFilter {
            robot_type: Some("quadruped".to_string()),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert!(robots.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_filter_empty_type_is_ignored(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        repo.create(&bare_robot("base", RobotType::MobileBase)).await.unwrap();

        let filter = RobotFilter {
            robot_type: Some(String::new()),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert_eq!(robots.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_payload_bounds_skip_null_columns(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        // sample_robot carries usable_payload 90, bare_robot carries none
        repo.create(&sample_robot("loaded", RobotType::MobileBase)).await.unwrap();
        repo.create(&bare_robot("unspecified", RobotType::MobileBase)).await.unwrap();

        let filter = RobotFilter {
            min_payload: Some(50.0),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert_eq!(robots.len(), 1);
        assert_eq!(robots[0].name, "loaded");

        // A NULL payload fails the upper bound too
        let filter = RobotFilter {
            max_payload: Some(100.0),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert_eq!(robots.len(), 1);
        assert_eq!(robots[0].name, "loaded");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_payload_bounds_are_inclusive(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        repo.create(&sample_robot("ninety", RobotType::MobileBase)).await.unwrap();

        let filter = RobotFilter {
            min_payload: Some(90.0),
            max_payload: Some(90.0),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert_eq!(robots.len(), 1);

        let filter = RobotFilter {
            min_payload: Some(90.5),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert!(robots.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_drive_system_substring_is_case_sensitive(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        repo.create(&sample_robot("diffbot", RobotType::MobileBase)).await.unwrap();

        let filter = RobotFilter {
            drive_system: Some("Differential".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter).await.unwrap().len(), 1);

        let filter = RobotFilter {
            drive_system: Some("differential".to_string()),
            ..Default::default()
        };
        assert!(repo.list(&filter).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_boolean_filters_only_match_explicit_values(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        // ros_compatible true on the sample, NULL on the bare robot
        repo.create(&sample_robot("ros", RobotType::MobileBase)).await.unwrap();
        repo.create(&bare_robot("unknown", RobotType::MobileBase)).await.unwrap();

        let filter = RobotFilter {
            ros_compatible: Some(true),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert_eq!(robots.len(), 1);
        assert_eq!(robots[0].name, "ros");

        // Asking for false does not surface the NULL row either
        let filter = RobotFilter {
            ros_compatible: Some(false),
            ..Default::default()
        };
        assert!(repo.list(&filter).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_filters_combine_conjunctively(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        repo.create(&sample_robot("match", RobotType::MobileBase)).await.unwrap();

        let mut other = sample_robot("payload-too-small", RobotType::MobileBase);
        other.usable_payload = Some(10);
        repo.create(&other).await.unwrap();

        let filter = RobotFilter {
            robot_type: Some("mobile_base".to_string()),
            min_payload: Some(50.0),
            ros_compatible: Some(true),
            ..Default::default()
        };
        let robots = repo.list(&filter).await.unwrap();
        assert_eq!(robots.len(), 1);
        assert_eq!(robots[0].name, "match");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_partial_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        let created = repo
            .create(&sample_robot("updatable", RobotType::MobileBase))
            .await
            .unwrap();

        let update = RobotUpdateDBRequest {
            name: Some("renamed".to_string()),
            max_speed: Some(2000),
            ..Default::default()
        };
        let updated = repo.update(created.id, &update).await.unwrap();

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.max_speed, Some(2000));
        // Untouched fields keep their stored values
        assert_eq!(updated.usable_payload, created.usable_payload);
        assert_eq!(updated.robot_type, created.robot_type);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_robot(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        let update = RobotUpdateDBRequest {
            name: Some("ghost".to_string()),
            ..Default::default()
        };
        let result = repo.update(424242, &update).await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_robot(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Robots::new(&mut conn);

        let created = repo
            .create(&bare_robot("doomed", RobotType::MobileBase))
            .await
            .unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());

        // Deleting again reports that nothing was removed
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
