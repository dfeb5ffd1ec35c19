use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use texfetch::device::*;
use texfetch::host::{AddressMode, FilterMode, SoftwareTextureUnit, TextureObjectDesc, TextureSource};
use tracing_subscriber::EnvFilter;

mod io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Filter {
    Nearest,
    Linear,
    Cubic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Address {
    Clamp,
    Wrap,
    Mirror,
    Border,
}

impl From<Address> for AddressMode {
    fn from(address: Address) -> Self {
        match address {
            Address::Clamp => AddressMode::Clamp,
            Address::Wrap => AddressMode::Wrap,
            Address::Mirror => AddressMode::Mirror,
            Address::Border => AddressMode::Border,
        }
    }
}

/// Upscales an image by sampling it as a texture.
#[derive(Debug, Parser)]
#[command(name = "demo")]
struct Args {
    /// Image to upscale
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the result (PNG, JPEG, ... by extension)
    #[arg(short, long, default_value = "upscaled.png")]
    output: PathBuf,

    /// Output size relative to the input
    #[arg(short, long, default_value_t = 4.0)]
    scale: f32,

    #[arg(short, long, value_enum, default_value_t = Filter::Cubic)]
    filter: Filter,

    #[arg(long, value_enum, default_value_t = Address::Clamp)]
    address: Address,
}

fn upscale<Sample>(width: u32, height: u32, scale: f32, sample: Sample) -> Vec<u8>
where
    Sample: Fn(f32, f32) -> [f32; 4] + Sync,
{
    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    pixels.par_chunks_mut(width as usize * 4).enumerate().for_each(|(y, row)| {
        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
            // output pixel center in 1-based source texel space
            let u = (x as f32 + 0.5) / scale + 1.0;
            let v = (y as f32 + 0.5) / scale + 1.0;
            for (dst, src) in pixel.iter_mut().zip(sample(u, v)) {
                *dst = (src.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }
    });
    pixels
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if !(args.scale > 0.0) {
        return Err(format!("scale must be positive, got {}", args.scale).into());
    }

    let image = io::load_rgba(&args.input)?;
    let width = ((image.width as f32 * args.scale).round() as u32).max(1);
    let height = ((image.height as f32 * args.scale).round() as u32).max(1);
    tracing::info!(
        input = %args.input.display(),
        source_width = image.width,
        source_height = image.height,
        width,
        height,
        "loaded"
    );

    let mut unit = SoftwareTextureUnit::new();
    let filter_mode = match args.filter {
        Filter::Nearest => FilterMode::Point,
        Filter::Linear | Filter::Cubic => FilterMode::Linear,
    };
    let desc = TextureObjectDesc::default().with_filter_mode(filter_mode).with_address_mode(args.address.into());
    let source = TextureSource {
        texels: &image.texels,
        extent: &[image.width, image.height],
        channels: 4,
        layout: MemoryLayout::Array,
    };
    let handle = unit.create(&source, desc)?;

    let started = Instant::now();
    let pixels = match args.filter {
        Filter::Nearest => {
            let tex = unit.bind::<[f32; 4], 2, ArrayMemory, Unnormalized, Nearest>(handle)?;
            upscale(width, height, args.scale, |x, y| tex.sample([x, y]))
        }
        Filter::Linear => {
            let tex = unit.bind::<[f32; 4], 2, ArrayMemory, Unnormalized, Linear>(handle)?;
            upscale(width, height, args.scale, |x, y| tex.sample([x, y]))
        }
        Filter::Cubic => {
            let tex = unit.bind::<[f32; 4], 2, ArrayMemory, Unnormalized, Cubic>(handle)?;
            upscale(width, height, args.scale, |x, y| tex.sample([x, y]))
        }
    };
    tracing::info!(
        filter = ?args.filter,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "sampled {} pixels",
        width as u64 * height as u64
    );

    unit.destroy(handle)?;
    io::save_rgba(&args.output, width, height, pixels)?;
    tracing::info!(output = %args.output.display(), "saved");
    Ok(())
}
