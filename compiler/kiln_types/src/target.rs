/// Target-dependent widths, in bits.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TargetInfo {
    /// Width of `int` and `uint`.
    pub int_width: u32,
    /// Width of pointers, `intptr`, `size` and `ptrdiff`.
    pub pointer_width: u32,
    /// Width of `long-double`.
    pub long_double_width: u32,
}

impl Default for TargetInfo {
    fn default() -> Self {
        TargetInfo {
            int_width: 32,
            pointer_width: 64,
            long_double_width: 128,
        }
    }
}
