use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Canvas size in CSS pixels plus the capped pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub css_width: f32,
    pub css_height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(css_width: f32, css_height: f32, device_pixel_ratio: f32, cap: f32) -> Self {
        Self {
            css_width: sanitize_extent(css_width),
            css_height: sanitize_extent(css_height),
            pixel_ratio: capped_pixel_ratio(device_pixel_ratio, cap),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.css_width / self.css_height
    }

    /// Backing-store size in device pixels, never below 1×1.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            physical(self.css_width, self.pixel_ratio),
            physical(self.css_height, self.pixel_ratio),
        )
    }
}

/// Device pixel ratio limited by `cap`. Invalid ratios count as 1; ratios
/// below 1 are kept.
pub(crate) fn capped_pixel_ratio(device_pixel_ratio: f32, cap: f32) -> f32 {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    dpr.min(cap.max(f32::MIN_POSITIVE))
}

fn sanitize_extent(v: f32) -> f32 {
    if v.is_finite() && v >= 1.0 {
        v
    } else {
        1.0
    }
}

fn physical(css: f32, ratio: f32) -> u32 {
    ((css * ratio).round() as u32).max(1)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// World units are CSS pixels, origin at the viewport center, y up.
    Orthographic,
    Perspective { fov_y_deg: f32, near: f32, far: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub projection: Projection,
    pub position: Vec3,
    pub target: Vec3,
    width: f32,
    height: f32,
    aspect: f32,
}

impl Camera {
    pub fn orthographic(width: f32, height: f32) -> Self {
        let mut cam = Self {
            projection: Projection::Orthographic,
            position: Vec3::new(0.0, 0.0, 500.0),
            target: Vec3::ZERO,
            width: 1.0,
            height: 1.0,
            aspect: 1.0,
        };
        cam.set_size(width, height);
        cam
    }

    pub fn perspective(fov_y_deg: f32, near: f32, far: f32, distance: f32) -> Self {
        Self {
            projection: Projection::Perspective {
                fov_y_deg,
                near,
                far,
            },
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            width: 1.0,
            height: 1.0,
            aspect: 1.0,
        }
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.set_size(viewport.css_width, viewport.css_height);
    }

    /// Aspect becomes exactly `width / height`.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = sanitize_extent(width);
        self.height = sanitize_extent(height);
        self.aspect = self.width / self.height;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn proj(&self) -> Mat4 {
        match self.projection {
            Projection::Orthographic => {
                let (hw, hh) = (self.width * 0.5, self.height * 0.5);
                Mat4::orthographic_rh(-hw, hw, -hh, hh, 0.1, 2000.0)
            }
            Projection::Perspective {
                fov_y_deg,
                near,
                far,
            } => Mat4::perspective_rh(fov_y_deg.to_radians(), self.aspect, near, far),
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// Maps a CSS-pixel position on the canvas to the world plane z = 0.
    pub fn screen_to_world(&self, px: f32, py: f32) -> Vec3 {
        match self.projection {
            Projection::Orthographic => {
                let offset = self.position.truncate() - self.target.truncate();
                Vec3::new(
                    px - self.width * 0.5 + offset.x,
                    self.height * 0.5 - py + offset.y,
                    0.0,
                )
            }
            Projection::Perspective { .. } => {
                let ndc = Vec2::new(px / self.width * 2.0 - 1.0, 1.0 - py / self.height * 2.0);
                let inv = self.view_proj().inverse();
                let near = inv * ndc.extend(0.0).extend(1.0);
                let far = inv * ndc.extend(1.0).extend(1.0);
                let near = near.xyz() / near.w;
                let far = far.xyz() / far.w;
                let dir = far - near;
                if dir.z.abs() < f32::EPSILON {
                    return near;
                }
                near + dir * (-near.z / dir.z)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_is_rounded_and_capped() {
        let vp = Viewport::new(333.0, 100.0, 3.0, 2.0);
        assert_eq!(vp.pixel_ratio, 2.0);
        assert_eq!(vp.physical_size(), (666, 200));
        let tiny = Viewport::new(0.0, -5.0, 1.0, 2.0);
        assert_eq!(tiny.physical_size(), (1, 1));
    }

    #[test]
    fn orthographic_maps_screen_center_to_origin() {
        let cam = Camera::orthographic(800.0, 600.0);
        assert_eq!(cam.screen_to_world(400.0, 300.0), Vec3::ZERO);
        assert_eq!(cam.screen_to_world(0.0, 0.0), Vec3::new(-400.0, 300.0, 0.0));
    }

    #[test]
    fn perspective_unprojects_center_onto_plane() {
        let mut cam = Camera::perspective(75.0, 0.1, 100.0, 6.0);
        cam.set_size(1000.0, 500.0);
        let p = cam.screen_to_world(500.0, 250.0);
        assert!(p.length() < 1e-3);
    }
}
