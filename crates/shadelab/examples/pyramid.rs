//! Pyramid: upload, switch normals, dispose.
//!
//! Prints the flat normal of each face and shows that only the normal
//! section is rewritten when the mode changes.

use shadelab::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let pyramid = Pyramid::build()?;
    for (face, normal) in pyramid.face_normals().chunks(3).enumerate() {
        log::info!("face {face}: normal {:?}", normal[0]);
    }

    let mut ctx = HeadlessContext::new();
    let mut shader = RecordingShader::new();

    let mut gpu = GpuMesh::upload(&mut ctx, pyramid)?;
    let layout = gpu.layout().clone();
    ctx.clear_log();
    log::info!(
        "vertex buffer {} bytes: normals at {:?}",
        layout.total_bytes(),
        layout.normals
    );

    for mode in [NormalMode::Flat, NormalMode::Smooth, NormalMode::Smooth] {
        gpu.set_normal_mode(&mut ctx, mode)?;
        gpu.draw(&mut ctx, &mut shader)?;
    }
    for upload in ctx.sub_uploads() {
        log::info!("sub-upload {} bytes at offset {}", upload.len, upload.offset);
    }

    let mesh = gpu.dispose(&mut ctx);
    log::info!(
        "disposed; {} buffers live, mesh kept with {} triangles",
        ctx.live_buffers(),
        mesh.triangle_count()
    );
    Ok(())
}
