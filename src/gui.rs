use crate::scene::Scene;

/// A live-tunable number with declared bounds and step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunable {
    pub label: &'static str,
    value: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    /// Set by a user edit, cleared once written into the scene
    dirty: bool,
}

impl Tunable {
    pub fn new(label: &'static str, value: f32, min: f32, max: f32, step: f32) -> Self {
        let mut tunable = Self {
            label,
            value,
            min,
            max,
            step,
            dirty: false,
        };
        tunable.sync(value);
        tunable
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Snap to the nearest step, then clamp into [min, max]; marks the value
    /// for the next `DebugGui::apply`
    pub fn set(&mut self, value: f32) {
        self.sync(value);
        self.dirty = true;
    }

    /// Follow a value the scene changed, without writing it back later
    fn sync(&mut self, value: f32) {
        let snapped = if self.step > 0.0 {
            (value / self.step).round() * self.step
        } else {
            value
        };
        self.value = snapped.clamp(self.min, self.max);
    }

    fn take_edit(&mut self) -> Option<f32> {
        std::mem::take(&mut self.dirty).then_some(self.value)
    }

    fn slider(&mut self, ui: &mut egui::Ui) -> bool {
        let mut value = self.value;
        let changed = ui
            .add(
                egui::Slider::new(&mut value, self.min..=self.max)
                    .step_by(self.step as f64)
                    .text(self.label),
            )
            .changed();
        if changed {
            self.set(value);
        }
        changed
    }
}

/// Debug panel over the scene: point light and z offsets
#[derive(Debug, Clone, PartialEq)]
pub struct DebugGui {
    pub light_intensity: Tunable,
    pub light_range: Tunable,
    pub camera_z: Tunable,
    pub road_z: Tunable,
    pub visible: bool,
}

impl DebugGui {
    pub fn from_scene(scene: &Scene, visible: bool) -> Self {
        Self {
            light_intensity: Tunable::new("light intensity", scene.point_light.intensity, 0.0, 10.0, 0.001),
            light_range: Tunable::new("light range", scene.point_light.range, 0.0, 100.0, 0.01),
            camera_z: Tunable::new("camera z", scene.camera.position.z, -100.0, 100.0, 0.01),
            road_z: Tunable::new("road z", scene.road.transform.position.z, -200.0, 100.0, 0.01),
            visible,
        }
    }

    /// Write the values edited since the last apply into the scene
    pub fn apply(&mut self, scene: &mut Scene) {
        if let Some(intensity) = self.light_intensity.take_edit() {
            scene.point_light.intensity = intensity;
        }
        if let Some(range) = self.light_range.take_edit() {
            scene.point_light.range = range;
        }
        if let Some(z) = self.camera_z.take_edit() {
            scene.camera.position.z = z;
        }
        if let Some(z) = self.road_z.take_edit() {
            scene.road.transform.position.z = z;
        }
    }

    /// Pull values the scene changed on its own (the camera walks)
    pub fn sync_from(&mut self, scene: &Scene) {
        self.camera_z.sync(scene.camera.position.z);
    }

    /// Draw the panel and FPS label; returns true if a value changed
    pub fn show(&mut self, ctx: &egui::Context, fps: f32) -> bool {
        if !self.visible {
            return false;
        }

        egui::Window::new("FPS")
            .title_bar(false)
            .resizable(false)
            .fixed_pos(egui::pos2(10.0, 10.0))
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(format!("{:.0}", fps))
                        .size(32.0)
                        .color(egui::Color32::from_rgb(232, 149, 53)),
                );
            });

        let mut changed = false;
        egui::Window::new("Debug")
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .resizable(false)
            .show(ctx, |ui| {
                for tunable in [
                    &mut self.light_intensity,
                    &mut self.light_range,
                    &mut self.camera_z,
                    &mut self.road_z,
                ] {
                    changed |= tunable.slider(ui);
                }
            });
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneParams;
    use crate::scene::compose_scene;
    use rand::{rngs::StdRng, SeedableRng};

    fn scene() -> Scene {
        let mut params = SceneParams::default();
        params.stars.count = 0;
        compose_scene(&params, 1.0, &mut StdRng::seed_from_u64(0)).scene
    }

    #[test]
    fn tunable_clamps() {
        let mut t = Tunable::new("x", 0.5, 0.0, 1.0, 0.1);
        t.set(5.0);
        assert_eq!(t.value(), 1.0);
        t.set(-3.0);
        assert_eq!(t.value(), 0.0);
    }

    #[test]
    fn tunable_snaps_to_step() {
        let mut t = Tunable::new("x", 0.0, 0.0, 10.0, 0.5);
        t.set(2.3);
        assert!((t.value() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn gui_starts_from_scene_values() {
        let scene = scene();
        let gui = DebugGui::from_scene(&scene, true);
        assert!((gui.light_intensity.value() - 0.4).abs() < 1e-4);
        assert!((gui.light_range.value() - 10.0).abs() < 1e-4);
        assert!((gui.camera_z.value() - 20.0).abs() < 1e-4);
        assert!((gui.road_z.value() - -30.0).abs() < 1e-4);
    }

    #[test]
    fn apply_writes_back() {
        let mut scene = scene();
        let mut gui = DebugGui::from_scene(&scene, true);
        gui.light_intensity.set(2.0);
        gui.road_z.set(-10.0);
        gui.apply(&mut scene);
        assert!((scene.point_light.intensity - 2.0).abs() < 1e-4);
        assert!((scene.road.transform.position.z - -10.0).abs() < 1e-4);
    }

    #[test]
    fn camera_outside_slider_range_survives_other_edits() {
        let mut scene = scene();
        let mut gui = DebugGui::from_scene(&scene, true);
        scene.camera.position.z = 150.0;
        gui.sync_from(&scene);
        assert!((gui.camera_z.value() - 100.0).abs() < 1e-4);

        gui.light_intensity.set(2.0);
        gui.apply(&mut scene);
        assert!((scene.camera.position.z - 150.0).abs() < 1e-4);
        assert!((scene.point_light.intensity - 2.0).abs() < 1e-4);
    }

    #[test]
    fn apply_consumes_edits() {
        let mut scene = scene();
        let mut gui = DebugGui::from_scene(&scene, true);
        gui.road_z.set(-10.0);
        gui.apply(&mut scene);
        scene.road.transform.position.z = -50.0;
        gui.apply(&mut scene);
        assert!((scene.road.transform.position.z - -50.0).abs() < 1e-4);
    }

    #[test]
    fn hidden_gui_draws_nothing() {
        let scene = scene();
        let mut gui = DebugGui::from_scene(&scene, false);
        let ctx = egui::Context::default();
        let mut changed = true;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            changed = gui.show(ctx, 60.0);
        });
        assert!(!changed);
    }
}
