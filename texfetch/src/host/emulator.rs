use super::error::{Result, TextureError};
use super::object::{AddressMode, Channel, FilterMode, TextureObjectDesc, TextureSource};
use crate::device::*;
use arrayvec::ArrayVec;

struct TextureObject {
    extent: ArrayVec<u32, 3>,
    channels: usize,
    layout: MemoryLayout,
    category: NumericCategory,
    desc: TextureObjectDesc,
    texels: Vec<[f64; 4]>,
}

impl TextureObject {
    #[inline(always)]
    fn address(&self, coord: i64, size: u32) -> Option<usize> {
        let n = size as i64;
        match self.desc.address_mode {
            AddressMode::Clamp => Some(coord.clamp(0, n - 1) as usize),
            AddressMode::Wrap => Some(coord.rem_euclid(n) as usize),
            AddressMode::Mirror => {
                let c = coord.rem_euclid(2 * n);
                let mirrored = if c < n { c } else { 2 * n - 1 - c };
                Some(mirrored as usize)
            }
            AddressMode::Border => (0..n).contains(&coord).then_some(coord as usize),
        }
    }

    #[inline(always)]
    fn texel<const N: usize>(&self, index: [i64; N]) -> [f64; 4] {
        let mut offset = 0;
        let mut stride = 1;
        for axis in 0..N {
            let size = self.extent[axis];
            match self.address(index[axis], size) {
                Some(i) => offset += i * stride,
                None => return [0.0; 4],
            }
            stride *= size as usize;
        }
        self.texels[offset]
    }

    /// Integer fetch: a single texel, the filter mode does not apply.
    fn read<const N: usize>(&self, coords: [i32; N]) -> [f64; 4] {
        self.texel(coords.map(i64::from))
    }

    /// Float fetch through the object's filter.
    fn filter<const N: usize>(&self, coords: [f32; N]) -> [f64; 4] {
        let mut position = [0.0f64; N];
        for axis in 0..N {
            position[axis] = coords[axis] as f64;
            if self.desc.normalized_coords {
                position[axis] *= self.extent[axis] as f64;
            }
        }

        match self.desc.filter_mode {
            FilterMode::Point => self.texel(position.map(|x| x.floor() as i64)),
            FilterMode::Linear => {
                let mut base = [0i64; N];
                let mut fraction = [0.0f64; N];
                for axis in 0..N {
                    let x = position[axis] - 0.5;
                    let i = x.floor();
                    base[axis] = i as i64;
                    fraction[axis] = self.desc.filter_precision.quantize(x - i);
                }

                let mut acc = [0.0f64; 4];
                for corner in 0..(1usize << N) {
                    let mut index = base;
                    let mut weight = 1.0;
                    for axis in 0..N {
                        if (corner >> axis) & 1 == 1 {
                            index[axis] = index[axis].saturating_add(1);
                            weight *= fraction[axis];
                        } else {
                            weight *= 1.0 - fraction[axis];
                        }
                    }
                    if weight == 0.0 {
                        continue;
                    }
                    let texel = self.texel(index);
                    for c in 0..4 {
                        acc[c] += weight * texel[c];
                    }
                }
                acc
            }
        }
    }
}

struct Slot {
    generation: u32,
    object: Option<TextureObject>,
}

/// Reference implementation of the texture-fetch instruction set in software.
///
/// Owns its texture objects. Creating and destroying objects needs exclusive access, so no
/// `DeviceTexture` borrowed from the unit can outlive the object it reads.
#[derive(Default)]
pub struct SoftwareTextureUnit {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl SoftwareTextureUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads `source` into a new texture object.
    pub fn create<S: Channel>(&mut self, source: &TextureSource<S>, desc: TextureObjectDesc) -> Result<TextureHandle> {
        let count = source.validate()?;
        if S::CATEGORY != NumericCategory::Float && desc.filter_mode == FilterMode::Linear {
            return Err(TextureError::IntegerFiltering(S::CATEGORY));
        }

        let texels: Vec<[f64; 4]> = source
            .texels
            .chunks_exact(source.channels)
            .map(|chunk| {
                let mut texel = [0.0; 4];
                for (dst, src) in texel.iter_mut().zip(chunk) {
                    *dst = src.to_f64();
                }
                texel
            })
            .collect();
        debug_assert_eq!(texels.len(), count);

        let object = TextureObject {
            extent: source.extent.iter().copied().collect(),
            channels: source.channels,
            layout: source.layout,
            category: S::CATEGORY,
            desc,
            texels,
        };

        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot { generation: 0, object: None });
                (self.slots.len() - 1) as u32
            }
        };
        let entry = &mut self.slots[slot as usize];
        // generation 0 never names a live object
        entry.generation = entry.generation.wrapping_add(1).max(1);
        entry.object = Some(object);
        let handle = TextureHandle(((entry.generation as u64) << 32) | slot as u64);

        tracing::debug!(
            ?handle,
            extent = ?source.extent,
            channels = source.channels,
            layout = ?source.layout,
            category = ?S::CATEGORY,
            ?desc,
            "created texture object"
        );
        Ok(handle)
    }

    /// Releases the object behind `handle`. The handle and all its copies become stale.
    pub fn destroy(&mut self, handle: TextureHandle) -> Result<()> {
        let (slot, generation) = split_handle(handle);
        match self.slots.get_mut(slot) {
            Some(entry) if entry.generation == generation && entry.object.is_some() => {
                entry.object = None;
                self.free.push(slot as u32);
                tracing::debug!(?handle, "destroyed texture object");
                Ok(())
            }
            _ => Err(TextureError::UnknownHandle(handle)),
        }
    }

    /// Number of live texture objects.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.object.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn extent(&self, handle: TextureHandle) -> Result<&[u32]> {
        self.object(handle).map(|o| o.extent.as_slice()).ok_or(TextureError::UnknownHandle(handle))
    }

    /// Builds a device view after checking the object against every trait of the view.
    pub fn bind<T, const N: usize, M, S, F>(&self, handle: TextureHandle) -> Result<DeviceTexture<'_, Self, T, N, M, S, F>>
    where
        T: Texel,
        M: MemorySource,
        S: CoordSpace,
        F: Interpolation,
    {
        let object = self.object(handle).ok_or(TextureError::UnknownHandle(handle))?;
        let mismatch = |reason: String| {
            tracing::warn!(?handle, %reason, "rejected texture view");
            Err(TextureError::DescriptorMismatch { handle, reason })
        };

        if object.extent.len() != N {
            return mismatch(format!("object has {} axes, view has {N}", object.extent.len()));
        }
        if object.layout != M::LAYOUT {
            return mismatch(format!("object uses {:?} memory, view expects {:?}", object.layout, M::LAYOUT));
        }
        if object.desc.normalized_coords != S::NORMALIZED {
            return mismatch(format!(
                "object normalized_coords={}, view normalized_coords={}",
                object.desc.normalized_coords,
                S::NORMALIZED
            ));
        }
        if object.category != category_of::<T>() {
            return mismatch(format!("object holds {:?} texels, view reads {:?}", object.category, category_of::<T>()));
        }
        if T::CHANNELS > object.channels {
            return mismatch(format!("object has {} channels, view reads {}", object.channels, T::CHANNELS));
        }
        let required = match F::KIND {
            InterpolationKind::Nearest => FilterMode::Point,
            InterpolationKind::Linear | InterpolationKind::Cubic => FilterMode::Linear,
        };
        if object.desc.filter_mode != required {
            return mismatch(format!("{:?} interpolation needs {required:?} filtering", F::KIND));
        }

        let extent = std::array::from_fn(|axis| object.extent[axis]);
        tracing::debug!(?handle, ?extent, interpolation = ?F::KIND, "bound texture view");
        Ok(DeviceTexture::new(self, handle, extent))
    }

    fn object(&self, handle: TextureHandle) -> Option<&TextureObject> {
        let (slot, generation) = split_handle(handle);
        let entry = self.slots.get(slot)?;
        if entry.generation != generation {
            return None;
        }
        entry.object.as_ref()
    }
}

fn split_handle(handle: TextureHandle) -> (usize, u32) {
    ((handle.0 & 0xffff_ffff) as usize, (handle.0 >> 32) as u32)
}

impl TextureUnit for SoftwareTextureUnit {
    fn fetch<C: NativeChannel, K: Coord, const N: usize>(
        &self,
        instruction: Instruction,
        handle: TextureHandle,
        coords: [K; N],
    ) -> [C; 4] {
        // stale handles read zeros, like unbound hardware texture slots
        let Some(object) = self.object(handle) else {
            return [C::default(); 4];
        };
        debug_assert_eq!(instruction.key().dims, object.extent.len());
        debug_assert_eq!(instruction.key().layout, object.layout);

        let texel = match K::operands(coords) {
            CoordOperands::Integer(coords) => object.read(coords),
            CoordOperands::Float(coords) => object.filter(coords),
        };
        texel.map(C::from_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FilterPrecision;
    use rstest::rstest;

    fn ramp_1d(unit: &mut SoftwareTextureUnit, desc: TextureObjectDesc) -> TextureHandle {
        let texels = [0.0f32, 10.0, 20.0, 30.0];
        let source = TextureSource { texels: &texels, extent: &[4], channels: 1, layout: MemoryLayout::Array };
        unit.create(&source, desc).unwrap()
    }

    fn raw_1d(unit: &SoftwareTextureUnit, handle: TextureHandle, x: f32) -> f32 {
        fetch::<f32, ArrayMemory, f32, 1, _>(unit, handle, [x])[0]
    }

    #[test]
    fn point_filter_floors_coordinates() {
        let mut unit = SoftwareTextureUnit::new();
        let handle = ramp_1d(&mut unit, TextureObjectDesc::default());
        assert_eq!(raw_1d(&unit, handle, 0.0), 0.0);
        assert_eq!(raw_1d(&unit, handle, 1.99), 10.0);
        assert_eq!(raw_1d(&unit, handle, 3.5), 30.0);
    }

    #[test]
    fn linear_filter_blends_around_texel_centers() {
        let mut unit = SoftwareTextureUnit::new();
        let handle = ramp_1d(&mut unit, TextureObjectDesc::default().with_filter_mode(FilterMode::Linear));
        assert_eq!(raw_1d(&unit, handle, 0.5), 0.0);
        assert_eq!(raw_1d(&unit, handle, 1.0), 5.0);
        assert_eq!(raw_1d(&unit, handle, 2.5), 20.0);
        assert!((raw_1d(&unit, handle, 1.3) - 8.0).abs() < 1e-5);
    }

    #[test]
    fn fixed8_precision_quantizes_blend() {
        let mut unit = SoftwareTextureUnit::new();
        let desc = TextureObjectDesc::default()
            .with_filter_mode(FilterMode::Linear)
            .with_filter_precision(FilterPrecision::Fixed8);
        let handle = ramp_1d(&mut unit, desc);
        // fraction 0.801 rounds to 205/256
        let expected = 10.0 * 205.0 / 256.0;
        assert!((raw_1d(&unit, handle, 1.301) - expected).abs() < 1e-5);
    }

    #[test]
    fn normalized_coordinates_scale_by_extent() {
        let mut unit = SoftwareTextureUnit::new();
        let handle = ramp_1d(&mut unit, TextureObjectDesc::default().with_normalized_coords(true));
        assert_eq!(raw_1d(&unit, handle, 0.0), 0.0);
        assert_eq!(raw_1d(&unit, handle, 0.5), 20.0);
        assert_eq!(raw_1d(&unit, handle, 0.99), 30.0);
    }

    #[test]
    fn address_modes_resolve_out_of_range_texels() {
        let cases = [
            (AddressMode::Clamp, [0.0, 0.0, 30.0, 30.0]),
            (AddressMode::Wrap, [30.0, 20.0, 0.0, 10.0]),
            (AddressMode::Mirror, [0.0, 10.0, 30.0, 20.0]),
            (AddressMode::Border, [0.0, 0.0, 0.0, 0.0]),
        ];
        for (mode, expected) in cases {
            let mut unit = SoftwareTextureUnit::new();
            let handle = ramp_1d(&mut unit, TextureObjectDesc::default().with_address_mode(mode));
            let actual = [-1, -2, 4, 5].map(|i| fetch::<f32, ArrayMemory, i32, 1, _>(&unit, handle, [i])[0]);
            assert_eq!(actual, expected, "{mode:?}");
        }
    }

    #[rstest]
    #[case(AddressMode::Clamp, 30.0, 0.0)]
    #[case(AddressMode::Wrap, 30.0, 0.0)]
    #[case(AddressMode::Mirror, 0.0, 0.0)]
    #[case(AddressMode::Border, 0.0, 0.0)]
    fn far_coordinates_resolve_by_address_mode(#[case] mode: AddressMode, #[case] high: f32, #[case] low: f32) {
        let mut unit = SoftwareTextureUnit::new();
        let point = ramp_1d(&mut unit, TextureObjectDesc::default().with_address_mode(mode));
        let linear = ramp_1d(&mut unit, TextureObjectDesc::default().with_address_mode(mode).with_filter_mode(FilterMode::Linear));

        let nearest = unit.bind::<f32, 1, ArrayMemory, Unnormalized, Nearest>(point).unwrap();
        assert_eq!(nearest.sample([1.0e30f32]), high);
        assert_eq!(nearest.sample([-1.0e30f32]), low);

        let lerp = unit.bind::<f32, 1, ArrayMemory, Unnormalized, Linear>(linear).unwrap();
        assert_eq!(lerp.sample([1.0e30f32]), high);
        assert_eq!(lerp.sample([-1.0e30f32]), low);
        assert_eq!(lerp.sample([f32::MAX]), high);

        let cubic = unit.bind::<f32, 1, ArrayMemory, Unnormalized, Cubic>(linear).unwrap();
        assert!((cubic.sample([1.0e30]) - high).abs() < 1e-3, "{mode:?}");
        assert!((cubic.sample([-1.0e30]) - low).abs() < 1e-3, "{mode:?}");
    }

    #[test]
    fn integer_fetch_ignores_filter_mode() {
        let mut unit = SoftwareTextureUnit::new();
        let handle = ramp_1d(&mut unit, TextureObjectDesc::default().with_filter_mode(FilterMode::Linear));
        assert_eq!(fetch::<f32, ArrayMemory, i32, 1, _>(&unit, handle, [2])[0], 20.0);
    }

    #[test]
    fn bilinear_blends_four_neighbours() {
        let mut unit = SoftwareTextureUnit::new();
        let texels = [0.0f32, 10.0, 10.0, 20.0];
        let source = TextureSource { texels: &texels, extent: &[2, 2], channels: 1, layout: MemoryLayout::Array };
        let handle = unit.create(&source, TextureObjectDesc::default().with_filter_mode(FilterMode::Linear)).unwrap();
        let center = fetch::<f32, ArrayMemory, f32, 2, _>(&unit, handle, [1.0, 1.0])[0];
        assert!((center - 10.0).abs() < 1e-5);
    }

    #[test]
    fn unused_channels_read_zero() {
        let mut unit = SoftwareTextureUnit::new();
        let texels = [1u8, 2, 3, 4, 5, 6];
        let source = TextureSource { texels: &texels, extent: &[2], channels: 3, layout: MemoryLayout::Linear };
        let handle = unit.create(&source, TextureObjectDesc::default()).unwrap();
        assert_eq!(fetch::<[u8; 3], LinearMemory, i32, 1, _>(&unit, handle, [1]), [4u32, 5, 6, 0]);
    }

    #[test]
    fn integer_texels_refuse_linear_filtering() {
        let mut unit = SoftwareTextureUnit::new();
        let texels = [1i16, 2];
        let source = TextureSource { texels: &texels, extent: &[2], channels: 1, layout: MemoryLayout::Array };
        let result = unit.create(&source, TextureObjectDesc::default().with_filter_mode(FilterMode::Linear));
        assert!(matches!(result, Err(TextureError::IntegerFiltering(NumericCategory::Signed))));
    }

    #[test]
    fn oversized_sources_are_rejected() {
        let mut unit = SoftwareTextureUnit::new();
        let texels = [0.0f32; 4];
        let source = TextureSource { texels: &texels, extent: &[u32::MAX; 3], channels: 4, layout: MemoryLayout::Array };
        let result = unit.create(&source, TextureObjectDesc::default());
        assert!(matches!(result, Err(TextureError::ExtentTooLarge { .. })));
        assert!(unit.is_empty());
    }

    #[test]
    fn destroyed_handles_go_stale() {
        let mut unit = SoftwareTextureUnit::new();
        let first = ramp_1d(&mut unit, TextureObjectDesc::default());
        unit.destroy(first).unwrap();
        assert!(unit.is_empty());
        assert!(matches!(unit.destroy(first), Err(TextureError::UnknownHandle(_))));

        // the slot is reused under a new generation
        let second = ramp_1d(&mut unit, TextureObjectDesc::default());
        assert_ne!(first, second);
        assert_eq!(unit.len(), 1);
        assert!(unit.extent(first).is_err());
        assert_eq!(unit.extent(second).unwrap(), &[4]);
        assert_eq!(raw_1d(&unit, first, 1.0), 0.0);
    }

    #[test]
    fn generation_wraps_past_zero() {
        let mut unit = SoftwareTextureUnit::new();
        let first = ramp_1d(&mut unit, TextureObjectDesc::default());
        unit.destroy(first).unwrap();
        unit.slots[0].generation = u32::MAX;

        let second = ramp_1d(&mut unit, TextureObjectDesc::default());
        assert_eq!(split_handle(second), (0, 1));
        assert_eq!(unit.extent(second).unwrap(), &[4]);
        assert!(unit.extent(TextureHandle(0)).is_err());
    }

    #[test]
    fn bind_checks_every_trait() {
        let mut unit = SoftwareTextureUnit::new();
        let handle = ramp_1d(&mut unit, TextureObjectDesc::default().with_filter_mode(FilterMode::Linear));

        assert!(unit.bind::<f32, 1, ArrayMemory, Unnormalized, Linear>(handle).is_ok());
        assert!(unit.bind::<f32, 1, ArrayMemory, Unnormalized, Cubic>(handle).is_ok());
        assert!(unit.bind::<f32, 2, ArrayMemory, Unnormalized, Linear>(handle).is_err());
        assert!(unit.bind::<f32, 1, LinearMemory, Unnormalized, Linear>(handle).is_err());
        assert!(unit.bind::<f32, 1, ArrayMemory, Normalized, Linear>(handle).is_err());
        assert!(unit.bind::<u8, 1, ArrayMemory, Unnormalized, Linear>(handle).is_err());
        assert!(unit.bind::<[f32; 2], 1, ArrayMemory, Unnormalized, Linear>(handle).is_err());
        assert!(unit.bind::<f32, 1, ArrayMemory, Unnormalized, Nearest>(handle).is_err());
        assert!(matches!(
            unit.bind::<f32, 1, ArrayMemory, Unnormalized, Linear>(TextureHandle(0)),
            Err(TextureError::UnknownHandle(_))
        ));
    }
}
