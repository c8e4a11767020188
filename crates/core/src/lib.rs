//! Camera capture, cascade face detection and overlay rendering.
//!
//! Layout follows the `domain` / `infrastructure` split used by every
//! concern: domain modules hold traits and pure logic, infrastructure
//! modules hold the OpenCV, `image` and network adapters.

pub mod capture;
pub mod detection;
pub mod overlay;
pub mod pipeline;
pub mod session;
pub mod shared;
