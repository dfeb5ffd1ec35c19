/// Uniform cubic B-spline basis evaluated at the filter parameter `a` in [0, 1).
/// `w[0]` weighs the texel left of the sample, `w[3]` the second texel to the right.
#[inline(always)]
pub fn weights(a: f32) -> [f32; 4] {
    const SIXTH: f32 = 1.0 / 6.0;
    let w0 = SIXTH * (a * (a * (-a + 3.0) - 3.0) + 1.0);
    let w1 = SIXTH * (a * a * (3.0 * a - 6.0) + 4.0);
    let w2 = SIXTH * (a * (a * (-3.0 * a + 3.0) + 3.0) + 1.0);
    let w3 = SIXTH * (a * a * a);
    [w0, w1, w2, w3]
}

/// Two-tap decomposition of the 4-tap cubic filter for a single axis.
///
/// A linear fetch taken at `p + h0` and weighted by `g0` reproduces the contribution of the two left
/// texels, the fetch at `p + h1` weighted by `g1` reproduces the two right ones. The offsets already
/// include the half-texel bias of the hardware linear filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicTaps {
    pub g0: f32,
    pub g1: f32,
    pub h0: f32,
    pub h1: f32,
}

impl CubicTaps {
    #[inline(always)]
    pub fn new(a: f32) -> Self {
        let [w0, w1, w2, w3] = weights(a);
        let g0 = w0 + w1;
        let g1 = w2 + w3;
        // g0 >= 1/6 and g1 >= 1/6 on [0, 1), both divisions are safe
        let h0 = -1.0 + w1 / g0 + 0.5;
        let h1 = 1.0 + w3 / g1 + 0.5;
        Self { g0, g1, h0, h1 }
    }
}

/// Splits a 1-based logical coordinate into the integer support origin and the filter parameter.
#[inline(always)]
pub fn split(x: f32) -> (f32, f32) {
    let biased = x - 1.5;
    let p = biased.floor();
    (p, biased - p)
}

/// Per-axis sampling plan: the two hardware positions and their weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPlan {
    pub g0: f32,
    pub g1: f32,
    pub x0: f32,
    pub x1: f32,
}

impl AxisPlan {
    #[inline(always)]
    pub fn new(x: f32) -> Self {
        let (p, f) = split(x);
        let taps = CubicTaps::new(f);
        Self { g0: taps.g0, g1: taps.g1, x0: p + taps.h0, x1: p + taps.h1 }
    }
}
