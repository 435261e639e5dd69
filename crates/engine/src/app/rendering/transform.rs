use crate::app::Vec2;

/// World-to-local translation of a camera, kept in `f64`.
///
/// Positions and view centers are `f32`; holding their difference in `f64`
/// makes `world_to_local(p, camera_offset(c, p)) == c` exact for every
/// `|p| < 2^53` instead of off by an `f32` ulp for fractional positions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraOffset {
    pub x: f64,
    pub y: f64,
}

impl CameraOffset {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Translation that puts `tracked` on `view_center` when added to world coordinates.
pub fn camera_offset(view_center: Vec2, tracked: Vec2) -> CameraOffset {
    CameraOffset::new(
        view_center.x as f64 - tracked.x as f64,
        view_center.y as f64 - tracked.y as f64,
    )
}

pub fn world_to_local(world: Vec2, offset: CameraOffset) -> Vec2 {
    Vec2::new(
        (world.x as f64 + offset.x) as f32,
        (world.y as f64 + offset.y) as f32,
    )
}

/// Integer destination for blitting the world surface into a camera buffer.
///
/// Snaps the tracked position the same way the scene snaps entity rects, so the
/// tracked entity's top-left pixel always lands on the view centre pixel.
pub fn world_blit_origin_px(view_center: Vec2, tracked: Vec2) -> (i32, i32) {
    let (center_x, center_y) = view_center.to_pixel();
    let (tracked_x, tracked_y) = tracked.to_pixel();
    (
        center_x.saturating_sub(tracked_x),
        center_y.saturating_sub(tracked_y),
    )
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn offset_recenters_tracked_point() {
        let view_center = Vec2::new(320.0, 240.0);
        let tracked = Vec2::new(640.0, 480.0);
        let offset = camera_offset(view_center, tracked);

        assert_eq!(offset, CameraOffset::new(-320.0, -240.0));
        assert_eq!(world_to_local(tracked, offset), view_center);
    }

    #[test]
    fn offset_holds_for_out_of_world_positions() {
        let view_center = Vec2::new(320.0, 120.0);
        for tracked in [
            Vec2::new(-5000.0, 12.5),
            Vec2::new(1.0e6, -1.0e6),
            Vec2::new(0.0, 0.0),
            Vec2::new(-1909.3988, 0.1),
        ] {
            let offset = camera_offset(view_center, tracked);
            assert_eq!(world_to_local(tracked, offset), view_center);
        }
    }

    #[test]
    fn recentering_is_exact_for_random_fractional_positions() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10_000 {
            let view_center = Vec2::new(
                rng.gen_range(0..4096) as f32,
                rng.gen_range(0..4096) as f32,
            );
            let tracked = Vec2::new(
                rng.gen_range(-1.0e6f32..1.0e6),
                rng.gen_range(-1.0e6f32..1.0e6),
            );

            let offset = camera_offset(view_center, tracked);
            assert_eq!(
                world_to_local(tracked, offset),
                view_center,
                "view_center {view_center:?} tracked {tracked:?}"
            );

            let (ox, oy) = world_blit_origin_px(view_center, tracked);
            let (tx, ty) = tracked.to_pixel();
            assert_eq!((tx + ox, ty + oy), view_center.to_pixel());
        }
    }

    #[test]
    fn tiny_fractions_still_land_on_view_center() {
        let view_center = Vec2::new(336.0, 136.0);
        for tracked in [Vec2::new(1.0e-20, -3.0e-9), Vec2::new(-0.062_5, 0.000_1)] {
            let offset = camera_offset(view_center, tracked);
            assert_eq!(world_to_local(tracked, offset), view_center);
        }
    }

    #[test]
    fn blit_origin_snaps_fractional_positions_consistently() {
        let view_center = Vec2::new(320.0, 240.0);
        let tracked = Vec2::new(10.6, -3.2);
        let (ox, oy) = world_blit_origin_px(view_center, tracked);
        let (tx, ty) = tracked.to_pixel();

        assert_eq!((tx + ox, ty + oy), (320, 240));
    }

    #[test]
    fn blit_origin_saturates_instead_of_overflowing() {
        let (ox, oy) = world_blit_origin_px(Vec2::new(10.0, 10.0), Vec2::new(-1.0e12, 1.0e12));
        assert_eq!(ox, i32::MAX);
        assert_eq!(oy, 10 - i32::MAX);
    }
}
