//! Planar kinematic robot that integrates shaped commands.

use std::f64::consts::FRAC_PI_2;

use teleop_core::{rot2d, saturate};
use teleop_traits::{CommandSink, VelocityCommand};

use crate::error::SimError;

/// Rectangular arena in metres; the origin is a corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width_m: f64,
    pub height_m: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width_m: 1000.0 / 15.0,
            height_m: 800.0 / 15.0,
        }
    }
}

impl From<&teleop_config::ArenaCfg> for Arena {
    fn from(c: &teleop_config::ArenaCfg) -> Self {
        Self {
            width_m: c.width_m,
            height_m: c.height_m,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x_m: f64,
    pub y_m: f64,
    pub yaw_rad: f64,
}

/// Integrates body-frame velocity commands into a world pose.
#[derive(Debug, Clone)]
pub struct KinematicRobot {
    arena: Arena,
    pose: Pose,
    last_command: VelocityCommand,
    distance_m: f64,
    commands: u64,
    stops: u64,
}

impl KinematicRobot {
    /// Start at the arena centre, heading `-π/2`.
    pub fn new(arena: Arena) -> Self {
        Self::with_pose(arena, Pose {
            x_m: 0.5 * arena.width_m,
            y_m: 0.5 * arena.height_m,
            yaw_rad: -FRAC_PI_2,
        })
    }

    pub fn with_pose(arena: Arena, pose: Pose) -> Self {
        Self {
            arena,
            pose,
            last_command: VelocityCommand::ZERO,
            distance_m: 0.0,
            commands: 0,
            stops: 0,
        }
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn last_command(&self) -> VelocityCommand {
        self.last_command
    }

    /// Path length actually travelled (after wall clamping).
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn commands(&self) -> u64 {
        self.commands
    }

    pub fn stops(&self) -> u64 {
        self.stops
    }

    /// Advance the pose by one command held for `dt` seconds.
    pub fn integrate(&mut self, cmd: &VelocityCommand, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        self.pose.yaw_rad += cmd.rzd * dt;
        let (dx, dy) = rot2d(self.pose.yaw_rad, (cmd.xd * dt, cmd.yd * dt));
        let x = saturate(self.pose.x_m + dx, 0.0, self.arena.width_m);
        let y = saturate(self.pose.y_m + dy, 0.0, self.arena.height_m);
        self.distance_m += (x - self.pose.x_m).hypot(y - self.pose.y_m);
        self.pose.x_m = x;
        self.pose.y_m = y;
    }
}

impl Default for KinematicRobot {
    fn default() -> Self {
        Self::new(Arena::default())
    }
}

impl CommandSink for KinematicRobot {
    fn send(
        &mut self,
        cmd: &VelocityCommand,
        dt_s: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if ![cmd.xd, cmd.yd, cmd.rzd, dt_s].iter().all(|v| v.is_finite()) {
            return Err(Box::new(SimError::NonFiniteCommand));
        }
        self.integrate(cmd, dt_s);
        self.last_command = *cmd;
        self.commands += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.last_command = VelocityCommand::ZERO;
        self.stops += 1;
        tracing::debug!(
            x_m = self.pose.x_m,
            y_m = self.pose.y_m,
            yaw_rad = self.pose.yaw_rad,
            "robot stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn starts_centred_heading_down_the_screen() {
        let robot = KinematicRobot::default();
        let p = robot.pose();
        assert!(close(p.x_m, 500.0 / 15.0));
        assert!(close(p.y_m, 400.0 / 15.0));
        assert!(close(p.yaw_rad, -FRAC_PI_2));
    }

    #[test]
    fn forward_motion_follows_heading() {
        let mut robot = KinematicRobot::default();
        let start = robot.pose();
        let cmd = VelocityCommand {
            xd: 2.0,
            yd: 0.0,
            rzd: 0.0,
        };
        robot.send(&cmd, 0.5).unwrap();
        let p = robot.pose();
        assert!(close(p.x_m, start.x_m));
        assert!(close(p.y_m, start.y_m - 1.0));
        assert!(close(robot.distance_m(), 1.0));
    }

    #[test]
    fn yaw_is_applied_before_translation() {
        let mut robot = KinematicRobot::with_pose(Arena::default(), Pose {
            x_m: 10.0,
            y_m: 10.0,
            yaw_rad: 0.0,
        });
        let cmd = VelocityCommand {
            xd: 1.0,
            yd: 0.0,
            rzd: FRAC_PI_2,
        };
        robot.integrate(&cmd, 1.0);
        let p = robot.pose();
        assert!(close(p.yaw_rad, FRAC_PI_2));
        assert!(close(p.x_m, 10.0));
        assert!(close(p.y_m, 11.0));
    }

    #[test]
    fn position_is_clamped_to_the_arena() {
        let arena = Arena {
            width_m: 10.0,
            height_m: 5.0,
        };
        let mut robot = KinematicRobot::with_pose(arena, Pose {
            x_m: 9.0,
            y_m: 1.0,
            yaw_rad: 0.0,
        });
        let cmd = VelocityCommand {
            xd: 5.0,
            yd: -5.0,
            rzd: 0.0,
        };
        robot.integrate(&cmd, 1.0);
        assert_eq!(robot.pose().x_m, 10.0);
        assert_eq!(robot.pose().y_m, 0.0);
    }

    #[test]
    fn non_finite_commands_are_refused() {
        let mut robot = KinematicRobot::default();
        let cmd = VelocityCommand {
            xd: f64::NAN,
            yd: 0.0,
            rzd: 0.0,
        };
        assert!(robot.send(&cmd, 0.1).is_err());
        assert_eq!(robot.commands(), 0);
    }
}
