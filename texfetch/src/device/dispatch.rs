use super::texel::{NativeChannel, NumericCategory, Texel, category_of};
use bytemuck::{Pod, Zeroable};

/// Opaque reference to a texture object owned by the host.
///
/// Copying a handle never extends the life of the object it names.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Zeroable, Pod)]
pub struct TextureHandle(pub u64);

/// Memory backing a texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryLayout {
    Array = 0,
    Linear = 1,
}

pub trait MemorySource: Copy + 'static {
    const LAYOUT: MemoryLayout;
}

/// Texture backed by an opaque hardware array.
#[derive(Debug, Clone, Copy)]
pub struct ArrayMemory;

/// Texture backed by plain (possibly pitched) linear device memory.
#[derive(Debug, Clone, Copy)]
pub struct LinearMemory;

impl MemorySource for ArrayMemory {
    const LAYOUT: MemoryLayout = MemoryLayout::Array;
}

impl MemorySource for LinearMemory {
    const LAYOUT: MemoryLayout = MemoryLayout::Linear;
}

/// How a fetch addresses the texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordKind {
    /// Floating point position, filtered by the hardware.
    Float = 0,
    /// Integer texel index, never filtered.
    Integer = 1,
}

/// Coordinates in the operand type of the native instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordOperands<const N: usize> {
    Float([f32; N]),
    Integer([i32; N]),
}

/// Scalar type of a coordinate passed to the hardware.
pub trait Coord: Copy + std::ops::Sub<Output = Self> + 'static {
    const KIND: CoordKind;
    const ONE: Self;

    /// Widens the coordinate to a float position.
    fn to_f32(self) -> f32;

    fn operands<const N: usize>(coords: [Self; N]) -> CoordOperands<N>;
}

impl Coord for f32 {
    const KIND: CoordKind = CoordKind::Float;
    const ONE: Self = 1.0;

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline(always)]
    fn operands<const N: usize>(coords: [Self; N]) -> CoordOperands<N> {
        CoordOperands::Float(coords)
    }
}

impl Coord for i32 {
    const KIND: CoordKind = CoordKind::Integer;
    const ONE: Self = 1;

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline(always)]
    fn operands<const N: usize>(coords: [Self; N]) -> CoordOperands<N> {
        CoordOperands::Integer(coords)
    }
}

/// Everything that decides which native instruction performs a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub dims: usize,
    pub layout: MemoryLayout,
    pub category: NumericCategory,
    pub coord: CoordKind,
}

impl FetchKey {
    pub const fn new(dims: usize, layout: MemoryLayout, category: NumericCategory, coord: CoordKind) -> Self {
        Self { dims, layout, category, coord }
    }

    /// Position of this key in `INSTRUCTIONS`.
    pub const fn index(self) -> usize {
        assert!(self.dims >= 1 && self.dims <= 3, "textures have 1 to 3 dimensions");
        (((self.dims - 1) * 2 + self.layout as usize) * 3 + self.category as usize) * 2 + self.coord as usize
    }
}

/// A native texture-fetch instruction. Always yields four channels of the category's native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    key: FetchKey,
    mnemonic: &'static str,
}

impl Instruction {
    pub const fn key(&self) -> FetchKey {
        self.key
    }

    pub const fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }
}

const fn op(
    dims: usize,
    layout: MemoryLayout,
    category: NumericCategory,
    coord: CoordKind,
    mnemonic: &'static str,
) -> Instruction {
    Instruction { key: FetchKey::new(dims, layout, category, coord), mnemonic }
}

pub const INSTRUCTION_COUNT: usize = 36;

/// Dispatch table, ordered by `FetchKey::index`.
#[rustfmt::skip]
pub const INSTRUCTIONS: [Instruction; INSTRUCTION_COUNT] = {
    use CoordKind::{Float as F, Integer as I};
    use MemoryLayout::{Array as A, Linear as L};
    use NumericCategory::{Float as Fp, Signed as S, Unsigned as U};
    [
        op(1, A, S, F, "tex.1d.v4.s32.f32"),
        op(1, A, S, I, "tex.1d.v4.s32.s32"),
        op(1, A, U, F, "tex.1d.v4.u32.f32"),
        op(1, A, U, I, "tex.1d.v4.u32.s32"),
        op(1, A, Fp, F, "tex.1d.v4.f32.f32"),
        op(1, A, Fp, I, "tex.1d.v4.f32.s32"),
        op(1, L, S, F, "tex.linear.1d.v4.s32.f32"),
        op(1, L, S, I, "tex.linear.1d.v4.s32.s32"),
        op(1, L, U, F, "tex.linear.1d.v4.u32.f32"),
        op(1, L, U, I, "tex.linear.1d.v4.u32.s32"),
        op(1, L, Fp, F, "tex.linear.1d.v4.f32.f32"),
        op(1, L, Fp, I, "tex.linear.1d.v4.f32.s32"),
        op(2, A, S, F, "tex.2d.v4.s32.f32"),
        op(2, A, S, I, "tex.2d.v4.s32.s32"),
        op(2, A, U, F, "tex.2d.v4.u32.f32"),
        op(2, A, U, I, "tex.2d.v4.u32.s32"),
        op(2, A, Fp, F, "tex.2d.v4.f32.f32"),
        op(2, A, Fp, I, "tex.2d.v4.f32.s32"),
        op(2, L, S, F, "tex.linear.2d.v4.s32.f32"),
        op(2, L, S, I, "tex.linear.2d.v4.s32.s32"),
        op(2, L, U, F, "tex.linear.2d.v4.u32.f32"),
        op(2, L, U, I, "tex.linear.2d.v4.u32.s32"),
        op(2, L, Fp, F, "tex.linear.2d.v4.f32.f32"),
        op(2, L, Fp, I, "tex.linear.2d.v4.f32.s32"),
        op(3, A, S, F, "tex.3d.v4.s32.f32"),
        op(3, A, S, I, "tex.3d.v4.s32.s32"),
        op(3, A, U, F, "tex.3d.v4.u32.f32"),
        op(3, A, U, I, "tex.3d.v4.u32.s32"),
        op(3, A, Fp, F, "tex.3d.v4.f32.f32"),
        op(3, A, Fp, I, "tex.3d.v4.f32.s32"),
        op(3, L, S, F, "tex.linear.3d.v4.s32.f32"),
        op(3, L, S, I, "tex.linear.3d.v4.s32.s32"),
        op(3, L, U, F, "tex.linear.3d.v4.u32.f32"),
        op(3, L, U, I, "tex.linear.3d.v4.u32.s32"),
        op(3, L, Fp, F, "tex.linear.3d.v4.f32.f32"),
        op(3, L, Fp, I, "tex.linear.3d.v4.f32.s32"),
    ]
};

/// Resolves the native instruction for a fetch. Panics at compile time when used in a const context
/// with an unsupported dimensionality.
pub const fn select(key: FetchKey) -> Instruction {
    INSTRUCTIONS[key.index()]
}

/// The native texture-fetch instruction set.
///
/// Implementors execute `instruction` against the texture object named by `handle`. Fetches are pure
/// reads: any number may run concurrently against the same object.
pub trait TextureUnit {
    fn fetch<C: NativeChannel, K: Coord, const N: usize>(
        &self,
        instruction: Instruction,
        handle: TextureHandle,
        coords: [K; N],
    ) -> [C; 4];
}

/// Fetches the raw four channels for a texel of type `T` at hardware coordinates `coords`.
/// The instruction is chosen at compile time.
#[inline(always)]
pub fn fetch<T: Texel, M: MemorySource, K: Coord, const N: usize, U: TextureUnit>(
    unit: &U,
    handle: TextureHandle,
    coords: [K; N],
) -> [T::Native; 4] {
    let instruction = const { select(FetchKey::new(N, M::LAYOUT, category_of::<T>(), K::KIND)) };
    unit.fetch::<T::Native, K, N>(instruction, handle, coords)
}
