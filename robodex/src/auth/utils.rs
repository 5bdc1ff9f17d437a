//! Authentication utility functions.

use rand::prelude::RngExt;
use rand::rng;

/// Generate a random robotics-themed display name
/// Format: "{adjective} {noun} {4-digit number}"
/// Example: "Agile Gripper 4729"
pub fn generate_random_display_name() -> String {
    const ADJECTIVES: &[&str] = &[
        "Agile",
        "Sturdy",
        "Precise",
        "Mobile",
        "Adaptive",
        "Dynamic",
        "Compliant",
        "Tireless",
        "Efficient",
        "Dexterous",
        "Calibrated",
        "Autonomous",
        "Articulated",
        "Omnidirectional",
        "Holonomic",
    ];

    const NOUNS: &[&str] = &[
        "Gripper",
        "Actuator",
        "Manipulator",
        "Platform",
        "Chassis",
        "Effector",
        "Servo",
        "Encoder",
        "Gantry",
        "Payload",
        "Waypoint",
        "Odometer",
        "Joint",
        "Linkage",
        "Carriage",
    ];

    let mut rng = rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let number = rng.random_range(1000..10000);

    format!("{} {} {}", adjective, noun, number)
}
