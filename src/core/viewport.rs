use crate::domain::model::{Address, CameraState, LngLat, SavedView};
use crate::domain::view::{Bounds, CameraMove, CameraTransition};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// World width in pixels at zoom 0 (vector tile size).
const TILE_SIZE: f64 = 512.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width_px: f64,
    pub height_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub padding_px: f64,
    pub max_zoom: f64,
    /// Half the docked sidebar width when it is visible, otherwise 0.
    pub horizontal_offset_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrillIn {
    pub zoom: f64,
    pub pitch: f64,
}

/// Normalized Web Mercator coordinates in `[0, 1]`, y growing southwards.
fn project(point: LngLat) -> (f64, f64) {
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn unproject(x: f64, y: f64) -> LngLat {
    let lng = x * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y);
    LngLat::new(lng, n.sinh().atan().to_degrees())
}

/// Smallest box holding every placeable address, or `None` if there is none.
pub fn bounds_of<'a, I: IntoIterator<Item = &'a Address>>(addresses: I) -> Option<Bounds> {
    addresses
        .into_iter()
        .filter(|address| address.is_placeable())
        .map(|address| address.coordinates)
        .fold(None, |bounds: Option<Bounds>, point| {
            Some(match bounds {
                Some(mut bounds) => {
                    bounds.extend(point);
                    bounds
                }
                None => Bounds::from_point(point),
            })
        })
}

/// Camera that frames `bounds` inside the padded viewport. The box is
/// centered in the part of the map the sidebar leaves visible: the visual
/// center moves by `horizontal_offset_px` and the usable width shrinks by
/// twice that.
pub fn camera_for_bounds(
    bounds: Bounds,
    viewport: ViewportSize,
    options: FitOptions,
    min_zoom: f64,
) -> CameraState {
    let (west, north) = project(LngLat::new(bounds.south_west.lng, bounds.north_east.lat));
    let (east, south) = project(LngLat::new(bounds.north_east.lng, bounds.south_west.lat));
    let span_x = (east - west).abs();
    let span_y = (south - north).abs();

    let usable_width =
        (viewport.width_px - 2.0 * options.padding_px - 2.0 * options.horizontal_offset_px.abs())
            .max(1.0);
    let usable_height = (viewport.height_px - 2.0 * options.padding_px).max(1.0);

    let zoom_for = |usable: f64, span: f64| {
        if span <= f64::EPSILON {
            f64::INFINITY
        } else {
            (usable / (span * TILE_SIZE)).log2()
        }
    };
    let zoom = zoom_for(usable_width, span_x)
        .min(zoom_for(usable_height, span_y))
        .min(options.max_zoom)
        .max(min_zoom);

    // Shift the camera so the box lands at screen center + offset.
    let world_px = TILE_SIZE * 2f64.powf(zoom);
    let center_x = (west + east) / 2.0 - options.horizontal_offset_px / world_px;
    let center_y = (north + south) / 2.0;

    CameraState {
        center: unproject(center_x, center_y),
        zoom,
        pitch: 0.0,
    }
}

/// Owns camera bookkeeping for one map session.
#[derive(Debug, Clone)]
pub struct ViewportController {
    camera: CameraState,
    size: ViewportSize,
    min_zoom: f64,
    drill_in: DrillIn,
    next_animation: u64,
    in_flight: Option<u64>,
}

impl ViewportController {
    pub fn new(initial: CameraState, size: ViewportSize, drill_in: DrillIn, min_zoom: f64) -> Self {
        Self {
            camera: initial,
            size,
            min_zoom,
            drill_in,
            next_animation: 1,
            in_flight: None,
        }
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.size = size;
    }

    /// The substrate reports user pans/zooms here.
    pub fn camera_moved(&mut self, camera: CameraState) {
        self.camera = camera;
    }

    pub fn animation_finished(&mut self, id: u64) {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
    }

    /// Frames `addresses`. Returns `None` (camera untouched) when none can be placed.
    pub fn fit_to_addresses<'a, I: IntoIterator<Item = &'a Address>>(
        &mut self,
        addresses: I,
        options: FitOptions,
    ) -> Option<CameraTransition> {
        let bounds = bounds_of(addresses)?;
        let target = camera_for_bounds(bounds, self.size, options, self.min_zoom);
        tracing::debug!(
            "Fitting camera to bounds {:?} -> zoom {:.2}",
            bounds,
            target.zoom
        );
        Some(self.start(CameraMove::FitBounds {
            bounds,
            padding_px: options.padding_px,
            max_zoom: options.max_zoom,
            offset_px: options.horizontal_offset_px,
            target,
        }))
    }

    /// Fixed zoom/pitch recentring on a marker, independent of the current camera.
    pub fn drill_in(&mut self, position: LngLat) -> CameraTransition {
        let target = CameraState {
            center: position,
            zoom: self.drill_in.zoom,
            pitch: self.drill_in.pitch,
        };
        self.start(CameraMove::DrillIn { target })
    }

    pub fn save_view(&self) -> SavedView {
        SavedView::from(self.camera)
    }

    pub fn restore_view(&mut self, view: SavedView) -> CameraTransition {
        let target = CameraState {
            center: view.center,
            zoom: view.zoom,
            pitch: 0.0,
        };
        self.start(CameraMove::Restore { target })
    }

    // A new animation always replaces the running one instead of queueing.
    fn start(&mut self, camera: CameraMove) -> CameraTransition {
        let id = self.next_animation;
        self.next_animation += 1;
        let replaces = self.in_flight.replace(id);
        self.camera = camera.target();
        CameraTransition {
            id,
            replaces,
            camera,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ViewportController {
        ViewportController::new(
            CameraState {
                center: LngLat::new(6.95, 50.94),
                zoom: 12.0,
                pitch: 0.0,
            },
            ViewportSize {
                width_px: 1200.0,
                height_px: 800.0,
            },
            DrillIn {
                zoom: 18.0,
                pitch: 45.0,
            },
            0.0,
        )
    }

    fn at(lng: f64, lat: f64) -> Address {
        Address {
            id: format!("{}/{}", lng, lat),
            coordinates: LngLat::new(lng, lat),
            ..Default::default()
        }
    }

    const FIT: FitOptions = FitOptions {
        padding_px: 50.0,
        max_zoom: 17.0,
        horizontal_offset_px: 0.0,
    };

    #[test]
    fn test_projection_round_trips() {
        let point = LngLat::new(6.9583, 50.9413);
        let (x, y) = project(point);
        let back = unproject(x, y);
        assert!((back.lng - point.lng).abs() < 1e-9);
        assert!((back.lat - point.lat).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_skip_sentinel() {
        let addresses = vec![at(0.0, 0.0), at(6.9, 50.9), at(7.0, 51.0)];
        let bounds = bounds_of(&addresses).unwrap();
        assert_eq!(bounds.south_west, LngLat::new(6.9, 50.9));
        assert_eq!(bounds.north_east, LngLat::new(7.0, 51.0));
        assert!(bounds_of(&[at(0.0, 0.0)]).is_none());
    }

    #[test]
    fn test_empty_fit_is_noop() {
        let mut viewport = controller();
        let before = viewport.camera();
        assert!(viewport.fit_to_addresses(std::iter::empty::<&Address>(), FIT).is_none());
        assert_eq!(viewport.camera(), before);
        assert_eq!(viewport.in_flight(), None);
    }

    #[test]
    fn test_single_point_fit_uses_max_zoom() {
        let mut viewport = controller();
        let transition = viewport.fit_to_addresses(&[at(6.96, 50.94)], FIT).unwrap();
        let target = transition.camera.target();
        assert_eq!(target.zoom, 17.0);
        assert!((target.center.lng - 6.96).abs() < 1e-9);
        assert!((target.center.lat - 50.94).abs() < 1e-9);
    }

    #[test]
    fn test_fit_centers_bounds() {
        let mut viewport = controller();
        let addresses = vec![at(6.90, 50.90), at(7.00, 51.00)];
        let target = viewport
            .fit_to_addresses(&addresses, FIT)
            .unwrap()
            .camera
            .target();
        assert!((target.center.lng - 6.95).abs() < 1e-9);
        assert!(target.zoom < 17.0);

        // the box must fit inside the padded viewport at that zoom
        let world = TILE_SIZE * 2f64.powf(target.zoom);
        let (w, n) = project(LngLat::new(6.90, 51.00));
        let (e, s) = project(LngLat::new(7.00, 50.90));
        assert!((e - w) * world <= 1200.0 - 100.0 + 1e-6);
        assert!((s - n) * world <= 800.0 - 100.0 + 1e-6);
    }

    #[test]
    fn test_sidebar_offset_shifts_center_west() {
        let mut viewport = controller();
        let addresses = vec![at(6.90, 50.90), at(7.00, 51.00)];
        let plain = viewport
            .fit_to_addresses(&addresses, FIT)
            .unwrap()
            .camera
            .target();
        let shifted = viewport
            .fit_to_addresses(
                &addresses,
                FitOptions {
                    horizontal_offset_px: 200.0,
                    ..FIT
                },
            )
            .unwrap()
            .camera
            .target();
        assert!(shifted.zoom <= plain.zoom);
        assert!(shifted.center.lng < 6.95);

        // screen x of the box center = viewport center + offset
        let world = TILE_SIZE * 2f64.powf(shifted.zoom);
        let (cx, _) = project(shifted.center);
        let (bx, _) = project(LngLat::new(6.95, 50.95));
        assert!(((bx - cx) * world - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_changes_fit_zoom() {
        let mut viewport = controller();
        let addresses = vec![at(6.90, 50.90), at(7.00, 51.00)];
        let wide = viewport.fit_to_addresses(&addresses, FIT).unwrap().camera.target();

        let small = ViewportSize {
            width_px: 600.0,
            height_px: 400.0,
        };
        viewport.resize(small);
        assert_eq!(viewport.size(), small);
        let narrow = viewport.fit_to_addresses(&addresses, FIT).unwrap().camera.target();
        assert!(narrow.zoom < wide.zoom);
    }

    #[test]
    fn test_new_animation_replaces_in_flight() {
        let mut viewport = controller();
        let first = viewport.drill_in(LngLat::new(6.9, 50.9));
        assert_eq!(first.replaces, None);
        let second = viewport.fit_to_addresses(&[at(7.0, 51.0)], FIT).unwrap();
        assert_eq!(second.replaces, Some(first.id));

        viewport.animation_finished(first.id);
        assert_eq!(viewport.in_flight(), Some(second.id));
        viewport.animation_finished(second.id);
        assert_eq!(viewport.in_flight(), None);
    }

    #[test]
    fn test_drill_in_ignores_prior_camera() {
        let mut a = controller();
        let mut b = controller();
        b.camera_moved(CameraState {
            center: LngLat::new(13.4, 52.5),
            zoom: 5.0,
            pitch: 10.0,
        });
        let target = LngLat::new(6.9, 50.9);
        assert_eq!(
            a.drill_in(target).camera.target(),
            b.drill_in(target).camera.target()
        );
        assert_eq!(a.camera().pitch, 45.0);
    }

    #[test]
    fn test_save_and_restore_view() {
        let mut viewport = controller();
        let saved = viewport.save_view();
        viewport.drill_in(LngLat::new(7.1, 51.1));
        let restore = viewport.restore_view(saved);
        assert_eq!(restore.camera.target().center, saved.center);
        assert_eq!(viewport.save_view(), saved);
    }
}
