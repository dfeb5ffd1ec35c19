use super::error::{Result, TextureError};
use crate::device::{MemoryLayout, NumericCategory};
use bytemuck::Pod;
use half::f16;

/// What the hardware does with texel indices outside the extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Repeat the edge texel
    Clamp,
    /// Modulo the extent
    Wrap,
    /// Reflect at the edges
    Mirror,
    /// Read zero
    Border,
}

/// Filter the hardware applies to float-coordinate fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Point,
    Linear,
}

/// Resolution of the linear blend fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPrecision {
    Exact,
    /// 8 fractional bits, as on texture hardware.
    Fixed8,
}

impl FilterPrecision {
    #[inline(always)]
    pub fn quantize(self, fraction: f64) -> f64 {
        match self {
            FilterPrecision::Exact => fraction,
            FilterPrecision::Fixed8 => (fraction * 256.0).round() / 256.0,
        }
    }
}

/// Sampling state of a texture object, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureObjectDesc {
    pub address_mode: AddressMode,
    pub filter_mode: FilterMode,
    pub normalized_coords: bool,
    pub filter_precision: FilterPrecision,
}

impl Default for TextureObjectDesc {
    fn default() -> Self {
        Self {
            address_mode: AddressMode::Clamp,
            filter_mode: FilterMode::Point,
            normalized_coords: false,
            filter_precision: FilterPrecision::Exact,
        }
    }
}

impl TextureObjectDesc {
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    pub fn with_normalized_coords(mut self, normalized: bool) -> Self {
        self.normalized_coords = normalized;
        self
    }

    pub fn with_filter_precision(mut self, precision: FilterPrecision) -> Self {
        self.filter_precision = precision;
        self
    }
}

/// Scalar that can be uploaded into a texture object.
pub trait Channel: Copy {
    const CATEGORY: NumericCategory;

    fn to_f64(self) -> f64;
}

macro_rules! impl_channel {
    ($category:expr => $($t:ty),+) => {
        $(
            impl Channel for $t {
                const CATEGORY: NumericCategory = $category;

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )+
    };
}

impl_channel!(NumericCategory::Signed => i8, i16, i32);
impl_channel!(NumericCategory::Unsigned => u8, u16, u32);
impl_channel!(NumericCategory::Float => f32);

impl Channel for f16 {
    const CATEGORY: NumericCategory = NumericCategory::Float;

    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }
}

/// Texel data to upload, interleaved by channel, x varying fastest.
#[derive(Debug, Clone, Copy)]
pub struct TextureSource<'a, S> {
    pub texels: &'a [S],
    pub extent: &'a [u32],
    pub channels: usize,
    pub layout: MemoryLayout,
}

impl<'a, S: Channel + Pod> TextureSource<'a, S> {
    /// Reinterprets raw bytes as texels of `S`.
    pub fn from_bytes(bytes: &'a [u8], extent: &'a [u32], channels: usize, layout: MemoryLayout) -> Result<Self> {
        let texels = bytemuck::try_cast_slice(bytes).map_err(TextureError::Cast)?;
        Ok(Self { texels, extent, channels, layout })
    }
}

impl<S: Channel> TextureSource<'_, S> {
    /// Checks the source against itself and returns the number of texels.
    pub fn validate(&self) -> Result<usize> {
        if self.extent.is_empty() || self.extent.len() > 3 {
            return Err(TextureError::InvalidDimensionality(self.extent.len()));
        }
        if self.extent.contains(&0) {
            return Err(TextureError::EmptyAxis { extent: self.extent.to_vec() });
        }
        if !(1..=4).contains(&self.channels) {
            return Err(TextureError::InvalidChannelCount(self.channels));
        }
        let too_large = || TextureError::ExtentTooLarge { extent: self.extent.to_vec(), channels: self.channels };
        let count = self.extent.iter().try_fold(1usize, |acc, &e| acc.checked_mul(e as usize)).ok_or_else(too_large)?;
        let expected = count.checked_mul(self.channels).ok_or_else(too_large)?;
        if self.texels.len() != expected {
            return Err(TextureError::TexelCountMismatch {
                extent: self.extent.to_vec(),
                channels: self.channels,
                expected,
                actual: self.texels.len(),
            });
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_desc_is_point_clamped_unnormalized() {
        let desc = TextureObjectDesc::default();
        assert_eq!(desc.address_mode, AddressMode::Clamp);
        assert_eq!(desc.filter_mode, FilterMode::Point);
        assert!(!desc.normalized_coords);
        assert_eq!(desc.filter_precision, FilterPrecision::Exact);
    }

    #[test]
    fn builder_overrides_fields() {
        let desc = TextureObjectDesc::default()
            .with_address_mode(AddressMode::Mirror)
            .with_filter_mode(FilterMode::Linear)
            .with_normalized_coords(true)
            .with_filter_precision(FilterPrecision::Fixed8);
        assert_eq!(desc.address_mode, AddressMode::Mirror);
        assert_eq!(desc.filter_mode, FilterMode::Linear);
        assert!(desc.normalized_coords);
        assert_eq!(desc.filter_precision, FilterPrecision::Fixed8);
    }

    #[test]
    fn fixed8_quantizes_fraction() {
        assert_eq!(FilterPrecision::Fixed8.quantize(0.3), 77.0 / 256.0);
        assert_eq!(FilterPrecision::Exact.quantize(0.3), 0.3);
    }

    #[test]
    fn validate_counts_texels() {
        let texels = [0u8; 2 * 3 * 4];
        let source = TextureSource { texels: &texels, extent: &[2, 3], channels: 4, layout: MemoryLayout::Array };
        assert_eq!(source.validate().unwrap(), 6);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let texels = [0.0f32; 8];
        let four_axes = TextureSource { texels: &texels, extent: &[1, 2, 2, 2], channels: 1, layout: MemoryLayout::Array };
        assert!(matches!(four_axes.validate(), Err(TextureError::InvalidDimensionality(4))));

        let empty = TextureSource { texels: &texels, extent: &[8, 0], channels: 1, layout: MemoryLayout::Array };
        assert!(matches!(empty.validate(), Err(TextureError::EmptyAxis { .. })));

        let five = TextureSource { texels: &texels, extent: &[8], channels: 5, layout: MemoryLayout::Linear };
        assert!(matches!(five.validate(), Err(TextureError::InvalidChannelCount(5))));

        let short = TextureSource { texels: &texels, extent: &[3, 3], channels: 1, layout: MemoryLayout::Array };
        assert!(matches!(short.validate(), Err(TextureError::TexelCountMismatch { expected: 9, actual: 8, .. })));
    }

    #[test]
    fn validate_rejects_oversized_extents() {
        let texels = [0.0f32; 4];
        let huge = TextureSource { texels: &texels, extent: &[u32::MAX; 3], channels: 4, layout: MemoryLayout::Array };
        assert!(matches!(huge.validate(), Err(TextureError::ExtentTooLarge { channels: 4, .. })));
    }

    #[test]
    fn from_bytes_casts_aligned_data() {
        let values = [1.0f32, 2.0, 3.0, 4.0];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        let source = TextureSource::<f32>::from_bytes(bytes, &[4], 1, MemoryLayout::Linear).unwrap();
        assert_eq!(source.texels, &values);
    }

    #[test]
    fn from_bytes_rejects_partial_texels() {
        let bytes = [0u8; 6];
        let result = TextureSource::<u32>::from_bytes(&bytes[..6], &[1], 1, MemoryLayout::Linear);
        assert!(matches!(result, Err(TextureError::Cast(_))));
    }
}
