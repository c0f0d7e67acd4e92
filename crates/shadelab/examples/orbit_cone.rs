//! Orbiting cone: a scripted headless run of the frame loop.
//!
//! Loads a scene config from the first argument (or uses the default cone),
//! then runs four seconds at 60 fps, pressing `F`, `N` and `Space` along the
//! way. Run with `RUST_LOG=debug` to see uploads and normal switches.

use std::time::Duration;

use shadelab::prelude::*;

const FRAMES: u64 = 240;
const STEP: Duration = Duration::from_micros(16_667);

/// Keys pressed on a given frame.
fn script(frame: u64) -> &'static [KeyCode] {
    match frame {
        60 => &[KeyCode::KeyF],
        120 => &[KeyCode::KeyN],
        180 => &[KeyCode::Space],
        _ => &[],
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig {
            solid: SolidConfig::Cone(ConeOptions::default().capped(true)),
            ..Default::default()
        },
    };

    let mut app = AppContext::new(config)?;
    app.resize(1280, 720);

    let mut ctx = HeadlessContext::new();
    let mut shader = RecordingShader::new();
    let mut time = Time::new();
    let mut input = Keyboard::new();
    let mut state = FrameState::new(&app);

    let mesh = app.config.solid.build()?;
    log::info!(
        "built {} triangles, {} vertex-instances",
        mesh.triangle_count(),
        mesh.vertex_count()
    );

    let mut scoped = ScopedMesh::upload(&mut ctx, mesh)?;
    scoped.context().clear_log();
    for n in 0..FRAMES {
        for &key in script(n) {
            input.press(key);
        }

        let now = time.advance(STEP);
        let (next, commands) = frame(&app, &state, now, &input);
        let (ctx, mesh) = scoped.parts();
        submit(&commands, ctx, &mut shader, mesh)?;

        if next.normal_mode != state.normal_mode || next.paused != state.paused {
            log::info!(
                "frame {}: {:?} normals{}",
                next.frame,
                next.normal_mode,
                if next.paused { ", paused" } else { "" }
            );
        }

        for &key in script(n) {
            input.release(key);
        }
        input.end_frame();
        state = next;
    }

    let draws = scoped.context().draws().len();
    let switches = scoped.context().sub_uploads().len();
    drop(scoped);

    log::info!(
        "{draws} draws, {switches} normal uploads, sim time {:.2}s of {:.2}s, {} buffers left",
        state.sim_time,
        time.elapsed_secs(),
        ctx.live_buffers()
    );
    Ok(())
}
