use super::dispatch::{Coord, MemorySource, TextureHandle, TextureUnit, fetch};
use super::texel::Texel;
use crate::math::AxisPlan;
use std::marker::PhantomData;

/// Coordinate convention of a texture.
pub trait CoordSpace: Copy + 'static {
    const NORMALIZED: bool;
}

/// Every axis spans [0, 1) regardless of the extent.
#[derive(Debug, Clone, Copy)]
pub struct Normalized;

/// Axes are addressed by 1-based texel positions.
#[derive(Debug, Clone, Copy)]
pub struct Unnormalized;

impl CoordSpace for Normalized {
    const NORMALIZED: bool = true;
}

impl CoordSpace for Unnormalized {
    const NORMALIZED: bool = false;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpolationKind {
    Nearest,
    Linear,
    Cubic,
}

pub trait Interpolation: Copy + 'static {
    const KIND: InterpolationKind;
}

/// Interpolation the texture hardware performs on its own.
pub trait HardwareFiltered: Interpolation {}

#[derive(Debug, Clone, Copy)]
pub struct Nearest;

#[derive(Debug, Clone, Copy)]
pub struct Linear;

/// Cubic B-spline filtering composed from hardware linear fetches.
/// The texture object itself must be configured for linear filtering.
#[derive(Debug, Clone, Copy)]
pub struct Cubic;

impl Interpolation for Nearest {
    const KIND: InterpolationKind = InterpolationKind::Nearest;
}

impl Interpolation for Linear {
    const KIND: InterpolationKind = InterpolationKind::Linear;
}

impl Interpolation for Cubic {
    const KIND: InterpolationKind = InterpolationKind::Cubic;
}

impl HardwareFiltered for Nearest {}
impl HardwareFiltered for Linear {}

/// Device-side view of a texture object.
///
/// `T` is the element type, `N` the dimensionality, `M` the memory layout, `S` the coordinate space and
/// `F` the interpolation kind. The view borrows the texture unit but not the object: the host must keep
/// the object alive while any copy of the view is in use.
pub struct DeviceTexture<'u, U, T, const N: usize, M, S, F> {
    unit: &'u U,
    handle: TextureHandle,
    extent: [u32; N],
    _traits: PhantomData<fn() -> (T, M, S, F)>,
}

impl<U, T, const N: usize, M, S, F> Clone for DeviceTexture<'_, U, T, N, M, S, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U, T, const N: usize, M, S, F> Copy for DeviceTexture<'_, U, T, N, M, S, F> {}

impl<U, T, const N: usize, M, S, F> std::fmt::Debug for DeviceTexture<'_, U, T, N, M, S, F>
where
    M: MemorySource,
    S: CoordSpace,
    F: Interpolation,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceTexture")
            .field("handle", &self.handle)
            .field("extent", &self.extent)
            .field("layout", &M::LAYOUT)
            .field("normalized", &S::NORMALIZED)
            .field("interpolation", &F::KIND)
            .finish()
    }
}

impl<'u, U, T, const N: usize, M, S, F> DeviceTexture<'u, U, T, N, M, S, F>
where
    U: TextureUnit,
    T: Texel,
    M: MemorySource,
    S: CoordSpace,
    F: Interpolation,
{
    /// Wraps a handle without any validation. The caller vouches that the object behind `handle`
    /// matches every type parameter.
    pub fn new(unit: &'u U, handle: TextureHandle, extent: [u32; N]) -> Self {
        Self { unit, handle, extent, _traits: PhantomData }
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn extent(&self) -> [u32; N] {
        self.extent
    }

    pub fn interpolation(&self) -> InterpolationKind {
        F::KIND
    }

    pub fn is_normalized(&self) -> bool {
        S::NORMALIZED
    }
}

impl<U, T, const N: usize, M, F> DeviceTexture<'_, U, T, N, M, Normalized, F>
where
    U: TextureUnit,
    T: Texel,
    M: MemorySource,
    F: HardwareFiltered,
{
    /// Samples at normalized coordinates; addressing and filtering are left to the hardware.
    #[inline(always)]
    pub fn sample(&self, coords: [f32; N]) -> T {
        T::unpack(fetch::<T, M, f32, N, U>(self.unit, self.handle, coords))
    }
}

impl<U, T, const N: usize, M, F> DeviceTexture<'_, U, T, N, M, Unnormalized, F>
where
    U: TextureUnit,
    T: Texel,
    M: MemorySource,
    F: HardwareFiltered,
{
    /// Samples at 1-based texel coordinates. Integer coordinates read a single texel, float coordinates
    /// go through the hardware filter.
    #[inline(always)]
    pub fn sample<K: Coord>(&self, coords: [K; N]) -> T {
        let coords = coords.map(|c| c - K::ONE);
        T::unpack(fetch::<T, M, K, N, U>(self.unit, self.handle, coords))
    }
}

impl<U, T, const N: usize, M> DeviceTexture<'_, U, T, N, M, Unnormalized, Cubic>
where
    U: TextureUnit,
    T: Texel<Native = f32>,
    M: MemorySource,
{
    #[inline(always)]
    fn tap(&self, coords: [f32; N]) -> [f32; 4] {
        fetch::<T, M, f32, N, U>(self.unit, self.handle, coords)
    }
}

impl<U, T, M> DeviceTexture<'_, U, T, 1, M, Unnormalized, Cubic>
where
    U: TextureUnit,
    T: Texel<Native = f32>,
    M: MemorySource,
{
    /// Cubic B-spline sample at a 1-based position, built from two linear fetches.
    #[inline(always)]
    pub fn sample(&self, coords: [f32; 1]) -> T {
        let x = AxisPlan::new(coords[0]);
        T::unpack(blend(x.g0, self.tap([x.x0]), x.g1, self.tap([x.x1])))
    }
}

impl<U, T, M> DeviceTexture<'_, U, T, 2, M, Unnormalized, Cubic>
where
    U: TextureUnit,
    T: Texel<Native = f32>,
    M: MemorySource,
{
    /// Bicubic B-spline sample at a 1-based position, built from four bilinear fetches.
    #[inline(always)]
    pub fn sample(&self, coords: [f32; 2]) -> T {
        let x = AxisPlan::new(coords[0]);
        let y = AxisPlan::new(coords[1]);
        let row0 = blend(x.g0, self.tap([x.x0, y.x0]), x.g1, self.tap([x.x1, y.x0]));
        let row1 = blend(x.g0, self.tap([x.x0, y.x1]), x.g1, self.tap([x.x1, y.x1]));
        T::unpack(blend(y.g0, row0, y.g1, row1))
    }
}

#[inline(always)]
fn blend(a: f32, lhs: [f32; 4], b: f32, rhs: [f32; 4]) -> [f32; 4] {
    std::array::from_fn(|i| a * lhs[i] + b * rhs[i])
}
