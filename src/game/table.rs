//! Table descriptions
//!
//! A table is static data: walls and bumpers, trigger banks, poppers and the
//! ball start. It is authored as JSON, with rectangles given by their top-left
//! corner and angles in degrees.

use serde::{Deserialize, Serialize};

use super::trigger::{TriggerTarget, TriggerType};
use crate::consts::{BALL_MASS, BALL_RADIUS, POPPER_FORCE};
use crate::degrees_to_radians;
use crate::error::{ConfigError, TableError};
use crate::fixed::Fixed;
use crate::settings::PhysicsConfig;
use crate::sim::ActorConfig;
use crate::vector::Vector2;

/// Built-in table used by the headless runner and tests
pub const DEMO_TABLE: &str = include_str!("../../tables/demo.json");

/// A rectangle of table geometry. With `radius` set it becomes a round
/// bumper centered in the rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectDef {
    pub left: Fixed,
    pub top: Fixed,
    pub width: Fixed,
    pub height: Fixed,
    /// Degrees
    #[serde(default)]
    pub angle: Fixed,
    #[serde(default)]
    pub radius: Option<Fixed>,
    #[serde(default)]
    pub restitution: Option<Fixed>,
    #[serde(default)]
    pub friction: Option<Fixed>,
    #[serde(default)]
    pub sensor: bool,
}

impl RectDef {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Fixed::from_f64(left),
            top: Fixed::from_f64(top),
            width: Fixed::from_f64(width),
            height: Fixed::from_f64(height),
            angle: Fixed::ZERO,
            radius: None,
            restitution: None,
            friction: None,
            sensor: false,
        }
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(
            self.left + self.width * Fixed::HALF,
            self.top + self.height * Fixed::HALF,
        )
    }

    pub fn angle_radians(&self) -> Fixed {
        degrees_to_radians(self.angle)
    }

    /// Fixed body for this rect
    pub fn actor_config(&self) -> ActorConfig {
        let mut config = match self.radius {
            Some(radius) => ActorConfig::circle(self.center(), radius),
            None => ActorConfig::rectangle(
                self.center(),
                self.width,
                self.height,
                self.angle_radians(),
            ),
        }
        .fixed();
        if let Some(restitution) = self.restitution {
            config.restitution = restitution;
        }
        if let Some(friction) = self.friction {
            config.friction = friction;
        }
        config.sensor = self.sensor;
        config
    }
}

/// A bank of trigger lights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerGroupDef {
    pub target: TriggerTarget,
    #[serde(rename = "type")]
    pub kind: TriggerType,
    #[serde(default)]
    pub triggers: Vec<RectDef>,
    #[serde(default)]
    pub round_robin: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A sensor that kicks balls touching it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopperDef {
    #[serde(flatten)]
    pub rect: RectDef,
    #[serde(default = "default_popper_force")]
    pub force: Fixed,
    /// Disarm after the first launch
    #[serde(default)]
    pub once: bool,
}

fn default_popper_force() -> Fixed {
    POPPER_FORCE
}

impl PopperDef {
    /// Unit launch direction: straight up, rotated by the popper's angle
    pub fn direction(&self) -> Vector2 {
        (-Vector2::UNIT_Y).rotate(self.rect.angle_radians())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    #[serde(default)]
    pub name: String,
    pub width: Fixed,
    pub height: Fixed,
    pub ball_start: Vector2,
    #[serde(default = "default_ball_radius")]
    pub ball_radius: Fixed,
    #[serde(default = "default_ball_mass")]
    pub ball_mass: Fixed,
    #[serde(default)]
    pub rects: Vec<RectDef>,
    #[serde(default)]
    pub triggers: Vec<TriggerGroupDef>,
    #[serde(default)]
    pub poppers: Vec<PopperDef>,
    #[serde(default)]
    pub physics: PhysicsConfig,
}

fn default_ball_radius() -> Fixed {
    BALL_RADIUS
}

fn default_ball_mass() -> Fixed {
    BALL_MASS
}

impl TableDescriptor {
    /// Parse and validate a table
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        log::info!(
            "Loaded table '{}': {} rects, {} trigger groups, {} poppers",
            table.name,
            table.rects.len(),
            table.triggers.len(),
            table.poppers.len()
        );
        Ok(table)
    }

    pub fn demo() -> Result<Self, TableError> {
        Self::from_json(DEMO_TABLE)
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn ball_config(&self) -> ActorConfig {
        ActorConfig::circle(self.ball_start, self.ball_radius).with_mass(self.ball_mass)
    }

    /// Check every entry without building anything
    pub fn validate(&self) -> Result<(), TableError> {
        self.physics.validate()?;
        for (what, value) in [("table width", self.width), ("table height", self.height)] {
            if !value.is_positive() {
                return Err(TableError::Physics(ConfigError::InvalidDimension {
                    what,
                    value: value.to_f64(),
                }));
            }
        }
        self.ball_config()
            .validate()
            .map_err(|source| TableError::Entry {
                list: "ball",
                index: 0,
                source,
            })?;
        check_rects("rects", &self.rects)?;
        for group in &self.triggers {
            check_rects("triggers", &group.triggers)?;
        }
        for (index, popper) in self.poppers.iter().enumerate() {
            popper
                .rect
                .actor_config()
                .validate()
                .map_err(|source| TableError::Entry {
                    list: "poppers",
                    index,
                    source,
                })?;
        }
        Ok(())
    }
}

fn check_rects(list: &'static str, rects: &[RectDef]) -> Result<(), TableError> {
    for (index, rect) in rects.iter().enumerate() {
        rect.actor_config()
            .validate()
            .map_err(|source| TableError::Entry { list, index, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Shape;

    #[test]
    fn test_demo_table_loads() {
        let table = TableDescriptor::demo().unwrap();
        assert!(!table.rects.is_empty());
        assert!(!table.triggers.is_empty());
        assert!(!table.poppers.is_empty());
        assert!(table.ball_start.y < table.height);
    }

    #[test]
    fn test_minimal_table_takes_defaults() {
        let table = TableDescriptor::from_json(
            r#"{ "width": 200, "height": 400, "ballStart": { "x": 100, "y": 20 } }"#,
        )
        .unwrap();
        assert_eq!(table.ball_radius, BALL_RADIUS);
        assert_eq!(table.physics, PhysicsConfig::default());
        assert!(table.rects.is_empty());
    }

    #[test]
    fn test_rect_with_radius_is_bumper() {
        let mut rect = RectDef::new(10.0, 20.0, 30.0, 30.0);
        rect.radius = Some(Fixed::from_int(15));
        let config = rect.actor_config();
        assert_eq!(config.position, Vector2::from_int(25, 35));
        assert_eq!(config.shape, Shape::circle(Fixed::from_int(15)));
        assert!(config.fixed);
    }

    #[test]
    fn test_trigger_group_fields() {
        let group: TriggerGroupDef = serde_json::from_str(
            r#"{
                "target": "multiball",
                "type": "SERIES",
                "roundRobin": true,
                "message": "MULTIBALL",
                "triggers": [{ "left": 0, "top": 0, "width": 10, "height": 10 }]
            }"#,
        )
        .unwrap();
        assert_eq!(group.target, TriggerTarget::Multiball);
        assert_eq!(group.kind, TriggerType::Series);
        assert!(group.round_robin);
        assert_eq!(group.triggers.len(), 1);
    }

    #[test]
    fn test_popper_direction_follows_angle() {
        let popper: PopperDef = serde_json::from_str(
            r#"{ "left": 0, "top": 0, "width": 10, "height": 4, "angle": 90 }"#,
        )
        .unwrap();
        assert_eq!(popper.force, POPPER_FORCE);
        let direction = popper.direction();
        assert!((direction.x.to_f64() - 1.0).abs() < 0.01);
        assert!(direction.y.to_f64().abs() < 0.01);
    }

    #[test]
    fn test_bad_entry_is_located() {
        let err = TableDescriptor::from_json(
            r#"{
                "width": 200, "height": 400, "ballStart": { "x": 100, "y": 20 },
                "rects": [
                    { "left": 0, "top": 0, "width": 10, "height": 10 },
                    { "left": 0, "top": 0, "width": 0, "height": 10 }
                ]
            }"#,
        )
        .unwrap_err();
        match err {
            TableError::Entry { list, index, .. } => {
                assert_eq!(list, "rects");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = TableDescriptor::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TableError::Parse(_)));
    }

    #[test]
    fn test_round_trips_through_json() {
        let table = TableDescriptor::demo().unwrap();
        let reparsed = TableDescriptor::from_json(&table.to_json().unwrap()).unwrap();
        assert_eq!(table, reparsed);
    }
}
