//! # Camera
//!
//! Produces the view and projection matrices carried by
//! [`SceneParams`](crate::render::shader::SceneParams).
//!
//! Uses OpenGL conventions: right-handed view space, camera looking down
//! -Z, clip depth in [-1, 1].

use crate::foundation::math::{constants, utils, Mat4, Mat4Ext, Vec3};

const FALLBACK_ASPECT: f32 = 1.0;
const FALLBACK_NEAR: f32 = 0.1;
const FALLBACK_FAR: f32 = 100.0;
const FALLBACK_FOV_DEGREES: f32 = 60.0;
const FALLBACK_HALF_HEIGHT: f32 = 1.0;

fn valid_aspect(aspect: f32) -> bool {
    aspect.is_finite() && aspect > f32::EPSILON
}

/// Projection model of a [`Camera`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Half the visible height in world units
        half_height: f32,
    },
}

/// Camera for perspective and orthographic projections
///
/// Matrices are computed on demand rather than cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Projection model
    pub projection: Projection,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    ///
    /// Degenerate values are replaced with defaults and logged.
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Perspective { fov_y: utils::deg_to_rad(fov_degrees) },
            aspect,
            near,
            far,
        };
        camera.sanitize();
        camera
    }

    /// Create an orthographic camera looking at the origin
    ///
    /// `half_height` world units are visible above and below the target;
    /// the horizontal extent follows from `aspect`. Degenerate values are
    /// replaced with defaults and logged.
    pub fn orthographic(position: Vec3, half_height: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Orthographic { half_height },
            aspect,
            near,
            far,
        };
        camera.sanitize();
        camera
    }

    /// Replace values that would make the projection singular
    fn sanitize(&mut self) {
        if !valid_aspect(self.aspect) {
            log::warn!("Invalid camera aspect ratio {}, using {}", self.aspect, FALLBACK_ASPECT);
            self.aspect = FALLBACK_ASPECT;
        }

        let min_near = match self.projection {
            Projection::Perspective { .. } => f32::MIN_POSITIVE,
            Projection::Orthographic { .. } => 0.0,
        };
        let depth_ok = self.near.is_finite() && self.far.is_finite() && self.near >= min_near && self.far - self.near > f32::EPSILON;
        if !depth_ok {
            log::warn!(
                "Invalid camera clip planes near={} far={}, using {}..{}",
                self.near,
                self.far,
                FALLBACK_NEAR,
                FALLBACK_FAR
            );
            self.near = FALLBACK_NEAR;
            self.far = FALLBACK_FAR;
        }

        match &mut self.projection {
            Projection::Perspective { fov_y } => {
                if !(fov_y.is_finite() && *fov_y > 0.0 && *fov_y < constants::PI) {
                    log::warn!("Invalid camera field of view {} rad, using {} degrees", fov_y, FALLBACK_FOV_DEGREES);
                    *fov_y = utils::deg_to_rad(FALLBACK_FOV_DEGREES);
                }
            }
            Projection::Orthographic { half_height } => {
                if !(half_height.is_finite() && *half_height > 0.0) {
                    log::warn!("Invalid orthographic half height {}, using {}", half_height, FALLBACK_HALF_HEIGHT);
                    *half_height = FALLBACK_HALF_HEIGHT;
                }
            }
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Update camera target (look-at point)
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Update the aspect ratio, typically after a viewport resize
    ///
    /// Non-positive or non-finite ratios are ignored.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if valid_aspect(aspect) {
            self.aspect = aspect;
        } else {
            log::warn!("Ignoring invalid camera aspect ratio {}", aspect);
        }
    }

    /// Aspect ratio from a viewport size; zero-height viewports are ignored
    pub fn fit_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            #[allow(clippy::cast_precision_loss)]
            self.set_aspect_ratio(width as f32 / height as f32);
        }
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_gl(self.position, self.target, self.up)
    }

    /// View-to-clip matrix
    ///
    /// Public fields set to degenerate values fall back to defaults here
    /// rather than producing a singular matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        let mut camera = self.clone();
        camera.sanitize();
        match camera.projection {
            Projection::Perspective { fov_y } => Mat4::perspective_gl(fov_y, camera.aspect, camera.near, camera.far),
            Projection::Orthographic { half_height } => {
                let half_width = half_height * camera.aspect;
                Mat4::orthographic_gl(-half_width, half_width, -half_height, half_height, camera.near, camera.far)
            }
        }
    }

    /// `projection * view`
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
