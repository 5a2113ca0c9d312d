// SPDX-License-Identifier: Apache-2.0
//! Deterministic fixed-point math (scalars, vectors, boxes, poses).
//!
//! All numeric behavior observable in compiled output lives here. The rest of
//! the crate never performs arithmetic outside these helpers.

pub mod fixed;
pub mod pose;
pub mod vec;

pub use fixed::{clamp_i64_i32, floor_div, Q};
pub use pose::{Pose, QuatQ};
pub use vec::{Aabb, Vec3Q};
