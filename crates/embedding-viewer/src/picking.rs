//! Pointer picking: raycast against the point cloud and click/drag disambiguation.
//!
//! A gesture starts at primary pointer-down (or the first touch) and ends at pointer-up.
//! Pointer-up from a gesture that never dragged is a click and fires the select callback with
//! the current selection's label.

use crate::{
    camera::{CameraState, Ray, Viewport},
    input::{InputEvent, PointerButton, TouchPhase},
    scene::SceneGraph,
};
use embedding_data::PointCloudBuffer;
use glam::{Vec2, Vec3};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    PressedNoDrag,
    PressedDragging,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub index: Option<usize>,
    pub label: String,
    pub world_position: Vec3,
}

/// Nearest point to a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub index: usize,
    /// Perpendicular distance from the point to the ray.
    pub distance_to_ray: f32,
    /// Distance along the ray to the foot of the perpendicular.
    pub distance: f32,
    pub point: Vec3,
}

/// Finds the point closest to `ray` among those within `radius` of it and in front of its
/// origin. Ties go to the lower index. `None` is a miss, including when there is no cloud.
pub fn raycast_points(
    ray: &Ray,
    cloud: Option<&PointCloudBuffer>,
    radius: f32,
) -> Option<PickHit> {
    let cloud = cloud.filter(|c| !c.is_empty())?;

    let bounds = cloud.bounds();
    if ray.distance_to_point(bounds.center) > bounds.radius + radius {
        return None;
    }

    cloud
        .vertices()
        .par_iter()
        .enumerate()
        .filter_map(|(index, v)| {
            let point = Vec3::from(v.position);
            let t = ray.closest_t(point);
            if t < 0.0 {
                return None;
            }
            let distance_to_ray = ray.at(t).distance(point);
            (distance_to_ray < radius).then_some(PickHit {
                index,
                distance_to_ray,
                distance: t,
                point,
            })
        })
        .min_by(|a, b| {
            a.distance_to_ray
                .total_cmp(&b.distance_to_ray)
                .then(a.index.cmp(&b.index))
        })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickSettings {
    /// World units.
    pub pick_radius: f32,
    /// Pixels a pressed pointer must travel before the gesture is a drag. Zero means any move.
    pub drag_threshold_px: f32,
    /// Raycast on unpressed pointer moves too.
    pub hover_pick: bool,
}

impl Default for PickSettings {
    fn default() -> Self {
        Self {
            pick_radius: 1.0,
            drag_threshold_px: 0.0,
            hover_pick: true,
        }
    }
}

pub type SelectHandler = Box<dyn FnMut(&str)>;

pub struct PickingController {
    settings: PickSettings,
    state: GestureState,
    press_position: Vec2,
    /// Touch that owns the current gesture; other touches only mark it as a drag.
    active_touch: Option<u64>,
    selection: Selection,
    on_select: SelectHandler,
}

impl PickingController {
    pub fn new(settings: PickSettings, on_select: SelectHandler) -> Self {
        Self {
            settings,
            state: GestureState::Idle,
            press_position: Vec2::ZERO,
            active_touch: None,
            selection: Selection::default(),
            on_select,
        }
    }

    #[inline]
    pub fn state(&self) -> GestureState {
        self.state
    }

    #[inline]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn handle_input(
        &mut self,
        event: &InputEvent,
        camera: &CameraState,
        viewport: Viewport,
        scene: &mut SceneGraph,
    ) {
        match *event {
            InputEvent::PointerDown {
                button: PointerButton::Primary,
                position,
            } => self.press(position, camera, viewport, scene),
            InputEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } => self.release(),
            InputEvent::PointerMove { position } => self.moved(position, camera, viewport, scene),
            InputEvent::Touch {
                id,
                phase,
                position,
            } => match (phase, self.active_touch) {
                (TouchPhase::Started, None) => {
                    self.active_touch = Some(id);
                    self.press(position, camera, viewport, scene);
                }
                // A second finger turns the gesture into a pan/pinch.
                (TouchPhase::Started, Some(_)) => {
                    if self.state == GestureState::PressedNoDrag {
                        self.state = GestureState::PressedDragging;
                    }
                }
                (TouchPhase::Moved, Some(active)) if active == id => {
                    self.moved(position, camera, viewport, scene)
                }
                (TouchPhase::Ended, Some(active)) if active == id => {
                    self.active_touch = None;
                    self.release();
                }
                (TouchPhase::Cancelled, Some(active)) if active == id => self.cancel(),
                _ => {}
            },
            InputEvent::Cancel => self.cancel(),
            InputEvent::PointerDown { .. }
            | InputEvent::PointerUp { .. }
            | InputEvent::Wheel { .. }
            | InputEvent::Key { .. } => {}
        }
    }

    /// Raycasts through `pixel`. A hit updates the selection and the label; a miss changes nothing.
    pub fn pick_at(
        &mut self,
        pixel: Vec2,
        camera: &CameraState,
        viewport: Viewport,
        scene: &mut SceneGraph,
    ) -> Option<PickHit> {
        if viewport.is_empty() {
            return None;
        }
        let ray = camera.ray_from_ndc(viewport.to_ndc(pixel));
        let hit = raycast_points(&ray, scene.cloud(), self.settings.pick_radius)?;
        let label = scene
            .cloud()
            .and_then(|c| c.label(hit.index))
            .unwrap_or_default()
            .to_owned();

        if self.selection.index != Some(hit.index) {
            log::debug!(
                "Selection -> {} ({label}), {:.4} from ray.",
                hit.index,
                hit.distance_to_ray
            );
        }
        scene.label.show(&label, hit.point);
        self.selection = Selection {
            index: Some(hit.index),
            label,
            world_position: hit.point,
        };
        Some(hit)
    }

    /// Abandons the current gesture without firing the select callback.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
        self.active_touch = None;
    }

    fn press(
        &mut self,
        position: Vec2,
        camera: &CameraState,
        viewport: Viewport,
        scene: &mut SceneGraph,
    ) {
        self.state = GestureState::PressedNoDrag;
        self.press_position = position;
        self.pick_at(position, camera, viewport, scene);
    }

    fn moved(
        &mut self,
        position: Vec2,
        camera: &CameraState,
        viewport: Viewport,
        scene: &mut SceneGraph,
    ) {
        match self.state {
            GestureState::Idle => {
                if !self.settings.hover_pick {
                    return;
                }
            }
            GestureState::PressedNoDrag => {
                if position.distance(self.press_position) > self.settings.drag_threshold_px
                    || self.settings.drag_threshold_px <= 0.0
                {
                    self.state = GestureState::PressedDragging;
                }
            }
            GestureState::PressedDragging => {}
        }
        self.pick_at(position, camera, viewport, scene);
    }

    fn release(&mut self) {
        let was_click = self.state == GestureState::PressedNoDrag;
        self.state = GestureState::Idle;
        if was_click && self.selection.index.is_some() {
            (self.on_select)(&self.selection.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DEFAULT_FOV_DEG;
    use embedding_data::{Palette, PointCloudDataset};
    use rand::{rngs::StdRng, SeedableRng};
    use std::{cell::RefCell, rc::Rc};

    const VP: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    fn cloud(positions: Vec<[f32; 3]>) -> PointCloudBuffer {
        let n = positions.len();
        let labels = (0..n).map(|i| format!("/p{i}")).collect();
        PointCloudDataset::new(positions, vec![1; n], Some(labels))
            .into_buffer_with_rng(&Palette::reference(), &mut StdRng::seed_from_u64(3))
            .unwrap()
    }

    fn scene_with(positions: Vec<[f32; 3]>) -> SceneGraph {
        let mut scene = SceneGraph::new();
        scene.set_cloud(cloud(positions));
        scene
    }

    fn controller(settings: PickSettings) -> (PickingController, Rc<RefCell<Vec<String>>>) {
        let selected = Rc::new(RefCell::new(Vec::new()));
        let sink = selected.clone();
        let c = PickingController::new(
            settings,
            Box::new(move |label: &str| sink.borrow_mut().push(label.to_owned())),
        );
        (c, selected)
    }

    fn centre() -> Vec2 {
        VP.size() * 0.5
    }

    fn down(position: Vec2) -> InputEvent {
        InputEvent::PointerDown {
            button: PointerButton::Primary,
            position,
        }
    }

    fn up(position: Vec2) -> InputEvent {
        InputEvent::PointerUp {
            button: PointerButton::Primary,
            position,
        }
    }

    fn moved(position: Vec2) -> InputEvent {
        InputEvent::PointerMove { position }
    }

    #[test]
    fn nearest_to_ray_wins_over_nearest_to_camera() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        // Index 0 is closer to the camera but farther from the ray.
        let c = cloud(vec![[0.3, 0.0, 5.0], [0.1, 0.0, -5.0], [5.0, 5.0, 0.0]]);
        let hit = raycast_points(&ray, Some(&c), 1.0).unwrap();
        assert_eq!(hit.index, 1);
        assert!((hit.distance_to_ray - 0.1).abs() < 1e-5);
        assert!((hit.distance - 15.0).abs() < 1e-4);
    }

    #[test]
    fn index_zero_is_selectable() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let c = cloud(vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]);
        assert_eq!(raycast_points(&ray, Some(&c), 1.0).unwrap().index, 0);
    }

    #[test]
    fn points_behind_or_outside_radius_miss() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let c = cloud(vec![[0.0, 0.0, 3.0], [2.0, 0.0, -3.0]]);
        assert!(raycast_points(&ray, Some(&c), 1.0).is_none());
        assert!(raycast_points(&ray, None, 1.0).is_none());
    }

    #[test]
    fn ties_break_on_lower_index() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let c = cloud(vec![[5.0, 5.0, 5.0], [0.2, 0.0, 1.0], [-0.2, 0.0, 1.0]]);
        assert_eq!(raycast_points(&ray, Some(&c), 1.0).unwrap().index, 1);
    }

    #[test]
    fn bounds_early_out_matches_full_scan() {
        use rand::Rng;
        let mut rng = StdRng::seed_from_u64(11);
        let positions: Vec<[f32; 3]> = (0..500)
            .map(|_| [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)])
            .collect();
        let c = cloud(positions);
        let far_miss = Ray::new(Vec3::new(50.0, 50.0, 10.0), Vec3::NEG_Z);
        assert!(raycast_points(&far_miss, Some(&c), 0.5).is_none());
        let through = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(raycast_points(&through, Some(&c), 0.5).is_some());
    }

    #[test]
    fn click_fires_select_with_picked_label() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut c, selected) = controller(PickSettings::default());

        c.handle_input(&down(centre()), &cam, VP, &mut scene);
        assert_eq!(c.state(), GestureState::PressedNoDrag);
        c.handle_input(&up(centre()), &cam, VP, &mut scene);

        assert_eq!(c.state(), GestureState::Idle);
        assert_eq!(*selected.borrow(), vec!["/p0".to_owned()]);
        assert_eq!(c.selection().index, Some(0));
        assert!(scene.label.visible);
        assert_eq!(scene.label.text, "/p0");
    }

    #[test]
    fn drag_never_selects() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut c, selected) = controller(PickSettings::default());

        c.handle_input(&down(centre()), &cam, VP, &mut scene);
        c.handle_input(&moved(centre() + Vec2::new(0.5, 0.0)), &cam, VP, &mut scene);
        assert_eq!(c.state(), GestureState::PressedDragging);
        c.handle_input(&up(centre()), &cam, VP, &mut scene);

        assert_eq!(c.state(), GestureState::Idle);
        assert!(selected.borrow().is_empty());
        // The drag still updated the selection.
        assert_eq!(c.selection().index, Some(0));
    }

    #[test]
    fn small_moves_under_threshold_stay_a_click() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut c, selected) = controller(PickSettings {
            drag_threshold_px: 4.0,
            ..Default::default()
        });

        c.handle_input(&down(centre()), &cam, VP, &mut scene);
        c.handle_input(&moved(centre() + Vec2::new(3.0, 0.0)), &cam, VP, &mut scene);
        assert_eq!(c.state(), GestureState::PressedNoDrag);
        c.handle_input(&moved(centre() + Vec2::new(5.0, 0.0)), &cam, VP, &mut scene);
        assert_eq!(c.state(), GestureState::PressedDragging);
        c.handle_input(&up(centre()), &cam, VP, &mut scene);
        assert!(selected.borrow().is_empty());
    }

    #[test]
    fn miss_keeps_previous_selection() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut c, _) = controller(PickSettings { pick_radius: 0.05, ..Default::default() });

        c.pick_at(centre(), &cam, VP, &mut scene).unwrap();
        let before = c.selection().clone();
        assert!(c.pick_at(Vec2::new(5.0, 5.0), &cam, VP, &mut scene).is_none());
        assert_eq!(c.selection(), &before);
        assert_eq!(scene.label.text, "/p0");
    }

    #[test]
    fn no_cloud_click_is_silent() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = SceneGraph::new();
        let (mut c, selected) = controller(PickSettings::default());

        c.handle_input(&moved(centre()), &cam, VP, &mut scene);
        c.handle_input(&down(centre()), &cam, VP, &mut scene);
        c.handle_input(&up(centre()), &cam, VP, &mut scene);
        assert!(selected.borrow().is_empty());
        assert_eq!(c.selection().index, None);
        assert!(!scene.label.visible);
    }

    #[test]
    fn hover_picks_without_pressing() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);

        let (mut hover, _) = controller(PickSettings::default());
        hover.handle_input(&moved(centre()), &cam, VP, &mut scene);
        assert_eq!(hover.state(), GestureState::Idle);
        assert_eq!(hover.selection().index, Some(0));

        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut still, _) = controller(PickSettings { hover_pick: false, ..Default::default() });
        still.handle_input(&moved(centre()), &cam, VP, &mut scene);
        assert_eq!(still.selection().index, None);
    }

    #[test]
    fn secondary_button_is_not_a_gesture() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut c, selected) = controller(PickSettings::default());
        let press = InputEvent::PointerDown {
            button: PointerButton::Secondary,
            position: centre(),
        };
        let release = InputEvent::PointerUp {
            button: PointerButton::Secondary,
            position: centre(),
        };
        c.handle_input(&press, &cam, VP, &mut scene);
        assert_eq!(c.state(), GestureState::Idle);
        c.handle_input(&release, &cam, VP, &mut scene);
        assert!(selected.borrow().is_empty());
    }

    #[test]
    fn tap_selects_and_second_finger_cancels_click() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut c, selected) = controller(PickSettings::default());
        let touch = |id, phase| InputEvent::Touch {
            id,
            phase,
            position: centre(),
        };

        c.handle_input(&touch(7, TouchPhase::Started), &cam, VP, &mut scene);
        c.handle_input(&touch(7, TouchPhase::Ended), &cam, VP, &mut scene);
        assert_eq!(selected.borrow().len(), 1);

        c.handle_input(&touch(7, TouchPhase::Started), &cam, VP, &mut scene);
        c.handle_input(&touch(8, TouchPhase::Started), &cam, VP, &mut scene);
        c.handle_input(&touch(8, TouchPhase::Ended), &cam, VP, &mut scene);
        c.handle_input(&touch(7, TouchPhase::Ended), &cam, VP, &mut scene);
        assert_eq!(selected.borrow().len(), 1);
        assert_eq!(c.state(), GestureState::Idle);
    }

    #[test]
    fn cancelled_touch_never_selects() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut c, selected) = controller(PickSettings::default());
        let touch = |id, phase| InputEvent::Touch {
            id,
            phase,
            position: centre(),
        };

        c.handle_input(&touch(4, TouchPhase::Started), &cam, VP, &mut scene);
        assert_eq!(c.state(), GestureState::PressedNoDrag);
        c.handle_input(&touch(4, TouchPhase::Cancelled), &cam, VP, &mut scene);
        assert_eq!(c.state(), GestureState::Idle);
        assert!(selected.borrow().is_empty());

        // The next touch starts a fresh gesture.
        c.handle_input(&touch(5, TouchPhase::Started), &cam, VP, &mut scene);
        c.handle_input(&touch(5, TouchPhase::Ended), &cam, VP, &mut scene);
        assert_eq!(*selected.borrow(), vec!["/p0".to_owned()]);
    }

    #[test]
    fn focus_loss_drops_a_pressed_gesture() {
        let cam = CameraState::new(DEFAULT_FOV_DEG, VP);
        let mut scene = scene_with(vec![[0.0, 0.0, 0.0]]);
        let (mut c, selected) = controller(PickSettings::default());

        c.handle_input(&down(centre()), &cam, VP, &mut scene);
        c.handle_input(&InputEvent::Cancel, &cam, VP, &mut scene);
        assert_eq!(c.state(), GestureState::Idle);
        c.handle_input(&up(centre()), &cam, VP, &mut scene);
        assert!(selected.borrow().is_empty());
        // The selection survives; only the gesture is dropped.
        assert_eq!(c.selection().index, Some(0));
    }
}
