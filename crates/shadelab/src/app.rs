//! # App: Context, Frame Function and Command Submission
//!
//! A run is split three ways:
//!
//! - [`AppContext`] holds what the host owns for the whole run: the config,
//!   the current viewport, the camera and the solid's transform.
//! - [`frame`] is a pure function. Given the context, the previous
//!   [`FrameState`], this frame's [`FrameTime`] and the keyboard state, it
//!   returns the next state and a list of [`DrawCommand`]s. It touches no
//!   graphics objects, so it can be tested without a context.
//! - [`submit`] carries the commands out against a [`GraphicsContext`],
//!   a [`ShaderProgram`] and an uploaded [`GpuMesh`].
//!
//! A host loop is then just:
//!
//! ```ignore
//! let now = time.update();
//! let (next, commands) = frame(&app, &state, now, &input);
//! submit(&commands, &mut ctx, &mut shader, &mut mesh)?;
//! input.end_frame();
//! state = next;
//! ```
//!
//! ## Keys
//!
//! | Key     | Action                  |
//! |---------|-------------------------|
//! | `F`     | flat normals            |
//! | `S`     | smooth normals          |
//! | `N`     | toggle normal mode      |
//! | `Space` | pause / resume the orbit |

use glam::Mat4;

use crate::camera::OrbitCamera;
use crate::config::{SceneConfig, Viewport};
use crate::error::{ConfigError, MeshError};
use crate::input::{KeyCode, Keyboard};
use crate::math::Transform;
use crate::mesh::NormalMode;
use crate::render::{GpuMesh, GraphicsContext, ShaderProgram};
use crate::time::FrameTime;

pub const MODEL_UNIFORM: &str = "u_model";
pub const VIEW_UNIFORM: &str = "u_view";
pub const PROJECTION_UNIFORM: &str = "u_projection";

/// Host-owned state that lives for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct AppContext {
    pub config: SceneConfig,
    pub camera: OrbitCamera,
    /// Placement of the solid. Identity unless the host moves it.
    pub model: Transform,
    viewport: Viewport,
}

impl AppContext {
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            camera: config.camera,
            viewport: config.viewport,
            model: Transform::IDENTITY,
            config,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Fit the square canvas into a `width` x `height` window: the smaller
    /// side wins. A zero-sized window (minimized) is ignored.
    ///
    /// Returns `true` if the viewport changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let side = width.min(height);
        if side == 0 {
            return false;
        }
        let viewport = Viewport::new(side, side);
        if viewport == self.viewport {
            return false;
        }
        log::debug!("viewport resized to {side}x{side}");
        self.viewport = viewport;
        true
    }

    pub fn projection(&self) -> Mat4 {
        self.camera.projection(self.viewport.aspect())
    }
}

/// Everything that carries over from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Animation clock; stands still while paused.
    pub sim_time: f32,
    pub normal_mode: NormalMode,
    pub paused: bool,
    /// Number of frames already produced.
    pub frame: u64,
}

impl FrameState {
    /// State before the first frame, starting in the configured normal mode.
    pub fn new(app: &AppContext) -> Self {
        Self {
            sim_time: 0.0,
            normal_mode: app.config.normal_mode,
            paused: false,
            frame: 0,
        }
    }
}

/// One step of work for [`submit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Clear color and depth.
    Clear([f32; 4]),
    /// Switch the mesh's active normal stream.
    SetNormalMode(NormalMode),
    /// Draw the mesh with these transforms.
    DrawMesh {
        model: Mat4,
        view: Mat4,
        projection: Mat4,
    },
}

fn next_normal_mode(current: NormalMode, input: &Keyboard) -> NormalMode {
    let mut mode = current;
    if input.just_pressed(KeyCode::KeyF) {
        mode = NormalMode::Flat;
    }
    if input.just_pressed(KeyCode::KeyS) {
        mode = NormalMode::Smooth;
    }
    if input.just_pressed(KeyCode::KeyN) {
        mode = mode.toggled();
    }
    mode
}

/// Compute the next state and the commands for one frame.
///
/// `SetNormalMode` is emitted on the first frame, so the mesh picks up the
/// configured mode, and afterwards only when a key changed it.
pub fn frame(
    app: &AppContext,
    state: &FrameState,
    time: FrameTime,
    input: &Keyboard,
) -> (FrameState, Vec<DrawCommand>) {
    let normal_mode = next_normal_mode(state.normal_mode, input);
    let paused = state.paused ^ input.just_pressed(KeyCode::Space);
    let sim_time = if paused {
        state.sim_time
    } else {
        state.sim_time + time.delta_secs
    };

    let next = FrameState {
        sim_time,
        normal_mode,
        paused,
        frame: state.frame + 1,
    };

    let mut commands = Vec::with_capacity(3);
    commands.push(DrawCommand::Clear(app.config.clear_color));
    if state.frame == 0 || normal_mode != state.normal_mode {
        commands.push(DrawCommand::SetNormalMode(normal_mode));
    }
    commands.push(DrawCommand::DrawMesh {
        model: app.model.matrix(),
        view: app.camera.view(sim_time),
        projection: app.projection(),
    });

    (next, commands)
}

/// Carry out `commands` in order.
pub fn submit<C: GraphicsContext, S: ShaderProgram>(
    commands: &[DrawCommand],
    ctx: &mut C,
    shader: &mut S,
    mesh: &mut GpuMesh,
) -> Result<(), MeshError> {
    for command in commands {
        match command {
            DrawCommand::Clear(color) => ctx.clear(*color),
            DrawCommand::SetNormalMode(mode) => mesh.set_normal_mode(ctx, *mode)?,
            DrawCommand::DrawMesh { model, view, projection } => {
                shader.use_program();
                shader.set_mat4(MODEL_UNIFORM, model);
                shader.set_mat4(VIEW_UNIFORM, view);
                shader.set_mat4(PROJECTION_UNIFORM, projection);
                mesh.draw(ctx, shader)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolidConfig;
    use crate::render::{HeadlessContext, RecordingShader, ScopedMesh};

    const DT: f32 = 0.5;

    fn app() -> AppContext {
        AppContext::new(SceneConfig::default()).unwrap()
    }

    fn ft(elapsed: f32) -> FrameTime {
        FrameTime::new(elapsed, DT)
    }

    fn pressed(keys: &[KeyCode]) -> Keyboard {
        let mut input = Keyboard::new();
        for &key in keys {
            input.press(key);
        }
        input
    }

    fn has_set_normal_mode(commands: &[DrawCommand]) -> Option<NormalMode> {
        commands.iter().find_map(|c| match c {
            DrawCommand::SetNormalMode(mode) => Some(*mode),
            _ => None,
        })
    }

    #[test]
    fn frame_is_pure() {
        let app = app();
        let state = FrameState::new(&app);
        let input = pressed(&[KeyCode::KeyN]);

        let a = frame(&app, &state, ft(DT), &input);
        let b = frame(&app, &state, ft(DT), &input);
        assert_eq!(a, b);
        assert_eq!(state, FrameState::new(&app));
    }

    #[test]
    fn first_frame_applies_configured_mode() {
        let config = SceneConfig { normal_mode: NormalMode::Flat, ..Default::default() };
        let app = AppContext::new(config).unwrap();
        let state = FrameState::new(&app);

        let (next, commands) = frame(&app, &state, ft(DT), &Keyboard::new());
        assert_eq!(has_set_normal_mode(&commands), Some(NormalMode::Flat));
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
        assert!(matches!(commands.last(), Some(DrawCommand::DrawMesh { .. })));

        let (_, commands) = frame(&app, &next, ft(2.0 * DT), &Keyboard::new());
        assert_eq!(has_set_normal_mode(&commands), None);
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn keys_select_normal_mode() {
        let app = app();
        let state = FrameState { frame: 5, ..FrameState::new(&app) };

        let (flat, commands) = frame(&app, &state, ft(DT), &pressed(&[KeyCode::KeyF]));
        assert_eq!(flat.normal_mode, NormalMode::Flat);
        assert_eq!(has_set_normal_mode(&commands), Some(NormalMode::Flat));

        let (toggled, _) = frame(&app, &flat, ft(DT), &pressed(&[KeyCode::KeyN]));
        assert_eq!(toggled.normal_mode, NormalMode::Smooth);

        // Already smooth: no switch emitted.
        let (same, commands) = frame(&app, &toggled, ft(DT), &pressed(&[KeyCode::KeyS]));
        assert_eq!(same.normal_mode, NormalMode::Smooth);
        assert_eq!(has_set_normal_mode(&commands), None);
    }

    #[test]
    fn held_key_does_not_retoggle() {
        let app = app();
        let state = FrameState { frame: 1, ..FrameState::new(&app) };
        let mut input = pressed(&[KeyCode::KeyN]);

        let (once, _) = frame(&app, &state, ft(DT), &input);
        input.end_frame();
        input.press(KeyCode::KeyN);
        let (still, _) = frame(&app, &once, ft(DT), &input);
        assert_eq!(once.normal_mode, still.normal_mode);
    }

    #[test]
    fn pause_freezes_sim_time() {
        let app = app();
        let state = FrameState::new(&app);

        let (running, _) = frame(&app, &state, ft(DT), &Keyboard::new());
        assert_eq!(running.sim_time, DT);

        let (paused, _) = frame(&app, &running, ft(2.0 * DT), &pressed(&[KeyCode::Space]));
        assert!(paused.paused);
        assert_eq!(paused.sim_time, DT);

        let (resumed, _) = frame(&app, &paused, ft(3.0 * DT), &pressed(&[KeyCode::Space]));
        assert!(!resumed.paused);
        assert_eq!(resumed.sim_time, 2.0 * DT);
        assert_eq!(resumed.frame, 3);
    }

    #[test]
    fn draw_uses_camera_at_sim_time() {
        let app = app();
        let state = FrameState::new(&app);
        let (next, commands) = frame(&app, &state, ft(DT), &Keyboard::new());

        let Some(DrawCommand::DrawMesh { model, view, projection }) = commands.last().copied() else {
            panic!("last command should draw");
        };
        assert_eq!(model, Mat4::IDENTITY);
        assert_eq!(view, app.camera.view(next.sim_time));
        assert_eq!(projection, app.camera.projection(1.0));
    }

    #[test]
    fn resize_keeps_canvas_square() {
        let mut app = app();
        assert!(app.resize(1200, 800));
        assert_eq!(app.viewport(), Viewport::new(800, 800));
        assert!(!app.resize(900, 800));
        assert!(!app.resize(0, 600));
        assert_eq!(app.viewport(), Viewport::new(800, 800));
        assert_eq!(app.viewport().aspect(), 1.0);
    }

    #[test]
    fn submit_sets_uniforms_and_draws() {
        let app = AppContext::new(SceneConfig { solid: SolidConfig::Pyramid, ..Default::default() }).unwrap();
        let mut ctx = HeadlessContext::new();
        let mut shader = RecordingShader::new();
        let mut mesh = GpuMesh::upload(&mut ctx, app.config.solid.build().unwrap()).unwrap();
        ctx.clear_log();

        let state = FrameState::new(&app);
        let (next, commands) = frame(&app, &state, ft(DT), &pressed(&[KeyCode::KeyF]));
        submit(&commands, &mut ctx, &mut shader, &mut mesh).unwrap();

        assert_eq!(ctx.clears(), &[app.config.clear_color]);
        assert_eq!(ctx.draws().len(), 1);
        assert_eq!(ctx.draws()[0].count, 18);
        assert_eq!(ctx.sub_uploads().len(), 1);
        assert_eq!(mesh.normal_mode(), NormalMode::Flat);
        assert_eq!(shader.mat4(MODEL_UNIFORM), Some(Mat4::IDENTITY));
        assert_eq!(shader.mat4(VIEW_UNIFORM), Some(app.camera.view(next.sim_time)));
        assert_eq!(shader.mat4(PROJECTION_UNIFORM), Some(app.projection()));

        mesh.dispose(&mut ctx);
        assert_eq!(ctx.live_buffers(), 0);
    }

    #[test]
    fn headless_loop_with_scoped_mesh() {
        let app = app();
        let mut ctx = HeadlessContext::new();
        let mut shader = RecordingShader::new();
        let mut state = FrameState::new(&app);
        let mut input = Keyboard::new();

        {
            let mut scoped = ScopedMesh::upload(&mut ctx, app.config.solid.build().unwrap()).unwrap();
            for i in 0..4u64 {
                if i == 2 {
                    input.press(KeyCode::KeyN);
                }
                let (next, commands) = frame(&app, &state, ft(DT * (i + 1) as f32), &input);
                let (ctx, mesh) = scoped.parts();
                submit(&commands, ctx, &mut shader, mesh).unwrap();
                input.end_frame();
                state = next;
            }
            assert_eq!(scoped.normal_mode(), NormalMode::Flat);
            assert_eq!(scoped.context().draws().len(), 4);
        }

        assert_eq!(state.frame, 4);
        assert_eq!(ctx.live_buffers(), 0);
        assert_eq!(ctx.live_vertex_arrays(), 0);
    }
}
