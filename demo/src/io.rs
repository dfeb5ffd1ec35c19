use std::path::Path;

/// Straight-alpha RGBA image with channels scaled to [0, 1].
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<f32>,
}

pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<SourceImage, image::ImageError> {
    let image = image::open(path)?.into_rgba8();
    let (width, height) = image.dimensions();
    let texels = image.as_raw().iter().map(|&c| c as f32 / 255.0).collect();
    Ok(SourceImage { width, height, texels })
}

pub fn save_rgba<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::RgbaImage::from_raw(width, height, pixels).ok_or("pixel buffer does not match the output size")?;
    image.save(path)?;
    Ok(())
}
