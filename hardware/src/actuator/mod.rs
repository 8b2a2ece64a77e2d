use crate::PortDescriptor;

pub mod magnetorquer;
pub mod reaction_wheel;

/// A device that turns a command into a physical output.
///
/// Actuators never touch the spacecraft. The caller decides what to do with the
/// output, usually adding the resulting torque to the rigid body accumulator.
pub trait Actuator {
    type Command;
    type Output;

    fn port(&self) -> &PortDescriptor;

    fn apply(&mut self, command: Self::Command) -> Self::Output;
}
