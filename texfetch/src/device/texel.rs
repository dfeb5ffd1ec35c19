use half::f16;

/// Numeric category of a texel, selects the family of the native fetch instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericCategory {
    Signed = 0,
    Unsigned = 1,
    Float = 2,
}

/// Channel type the texture hardware returns for one numeric category.
pub trait NativeChannel: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    const CATEGORY: NumericCategory;

    /// Converts a stored channel value into the native type. Used by software texture units.
    fn from_f64(value: f64) -> Self;
}

impl NativeChannel for i32 {
    const CATEGORY: NumericCategory = NumericCategory::Signed;

    fn from_f64(value: f64) -> Self {
        value as i32
    }
}

impl NativeChannel for u32 {
    const CATEGORY: NumericCategory = NumericCategory::Unsigned;

    fn from_f64(value: f64) -> Self {
        value as u32
    }
}

impl NativeChannel for f32 {
    const CATEGORY: NumericCategory = NumericCategory::Float;

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

/// Unchecked narrowing from a raw channel value.
///
/// Integers narrower than the hardware return are truncated to their low bits, floats are truncated
/// toward zero, `f16` is rounded to nearest. Values must already fit the target type; anything else
/// yields an unspecified value.
pub trait Narrow<From>: Sized {
    fn narrow(value: From) -> Self;
}

macro_rules! impl_narrow_as {
    ($from:ty => $($to:ty),+) => {
        $(
            impl Narrow<$from> for $to {
                #[inline(always)]
                fn narrow(value: $from) -> Self {
                    value as $to
                }
            }
        )+
    };
}

impl_narrow_as!(i32 => i8, i16, i32);
impl_narrow_as!(u32 => u8, u16, u32);
impl_narrow_as!(f32 => i8, i16, i32, u8, u16, u32, f32);

impl Narrow<f32> for f16 {
    #[inline(always)]
    fn narrow(value: f32) -> Self {
        f16::from_f32(value)
    }
}

/// Logical element type of a texture: a scalar, or an array of 1 to 4 scalars.
pub trait Texel: Copy {
    type Native: NativeChannel;

    /// Number of hardware channels this element occupies.
    const CHANNELS: usize;

    /// Reshapes the fixed 4-channel hardware result into this element, ignoring extra channels.
    fn unpack(raw: [Self::Native; 4]) -> Self;
}

macro_rules! impl_texel {
    ($native:ty => $($scalar:ty),+) => {
        $(
            impl Texel for $scalar {
                type Native = $native;
                const CHANNELS: usize = 1;

                #[inline(always)]
                fn unpack(raw: [$native; 4]) -> Self {
                    <$scalar as Narrow<$native>>::narrow(raw[0])
                }
            }

            impl<const C: usize> Texel for [$scalar; C] {
                type Native = $native;
                const CHANNELS: usize = C;

                #[inline(always)]
                fn unpack(raw: [$native; 4]) -> Self {
                    const { assert!(C >= 1 && C <= 4, "a texel holds 1 to 4 channels") };
                    std::array::from_fn(|i| <$scalar as Narrow<$native>>::narrow(raw[i]))
                }
            }
        )+
    };
}

impl_texel!(i32 => i8, i16, i32);
impl_texel!(u32 => u8, u16, u32);
impl_texel!(f32 => f32, f16);

/// Numeric category of the native fetch a texel of type `T` needs.
pub const fn category_of<T: Texel>() -> NumericCategory {
    <T::Native as NativeChannel>::CATEGORY
}
