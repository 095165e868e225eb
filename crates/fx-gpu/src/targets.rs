use super::helpers;

pub(crate) const NOISE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Off-screen noise render for the distortion plane.
///
/// Half the physical resolution: the plane samples it with linear filtering,
/// so the lower density never shows.
pub(crate) struct NoiseTarget {
    pub(crate) tex: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl NoiseTarget {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (tex, view) = create(device, width, height);
        Self { tex, view }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.tex.destroy();
        (self.tex, self.view) = create(device, width, height);
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.tex.width(), self.tex.height())
    }
}

fn create(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let w = (width.max(1) / 2).max(1);
    let h = (height.max(1) / 2).max(1);
    helpers::create_color_texture(
        device,
        "noise_target",
        w,
        h,
        NOISE_FORMAT,
        wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
    )
}
