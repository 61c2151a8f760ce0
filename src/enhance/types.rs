//! Post-processing options

// ============================================================
// Constants
// ============================================================

/// Default CLAHE clip limit
pub const DEFAULT_CLAHE_CLIP_LIMIT: f32 = 2.0;

/// Default CLAHE tile grid (tiles per axis)
pub const DEFAULT_CLAHE_TILES: u32 = 8;

/// Default unsharp-mask Gaussian sigma
pub const DEFAULT_SHARPEN_SIGMA: f32 = 1.0;

/// Default unsharp-mask amount: 1.35 * original - 0.35 * blurred
pub const DEFAULT_SHARPEN_AMOUNT: f32 = 0.35;

const MAX_CLAHE_TILES: u32 = 64;

const MAX_SHARPEN_AMOUNT: f32 = 5.0;

// ============================================================
// Options
// ============================================================

/// Enhancement options
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceOptions {
    /// CLAHE clip limit; 0 disables clipping
    pub clahe_clip_limit: f32,
    /// CLAHE tiles per axis
    pub clahe_tiles: u32,
    /// Unsharp-mask sigma; 0 disables sharpening
    pub sharpen_sigma: f32,
    /// Unsharp-mask amount
    pub sharpen_amount: f32,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            clahe_clip_limit: DEFAULT_CLAHE_CLIP_LIMIT,
            clahe_tiles: DEFAULT_CLAHE_TILES,
            sharpen_sigma: DEFAULT_SHARPEN_SIGMA,
            sharpen_amount: DEFAULT_SHARPEN_AMOUNT,
        }
    }
}

impl EnhanceOptions {
    /// Create a builder
    pub fn builder() -> EnhanceOptionsBuilder {
        EnhanceOptionsBuilder::default()
    }
}

/// Builder for EnhanceOptions
#[derive(Debug, Default)]
pub struct EnhanceOptionsBuilder {
    options: EnhanceOptions,
}

impl EnhanceOptionsBuilder {
    #[must_use]
    pub fn clahe_clip_limit(mut self, limit: f32) -> Self {
        self.options.clahe_clip_limit = limit.max(0.0);
        self
    }

    #[must_use]
    pub fn clahe_tiles(mut self, tiles: u32) -> Self {
        self.options.clahe_tiles = tiles.clamp(1, MAX_CLAHE_TILES);
        self
    }

    #[must_use]
    pub fn sharpen_sigma(mut self, sigma: f32) -> Self {
        self.options.sharpen_sigma = sigma.max(0.0);
        self
    }

    #[must_use]
    pub fn sharpen_amount(mut self, amount: f32) -> Self {
        self.options.sharpen_amount = amount.clamp(0.0, MAX_SHARPEN_AMOUNT);
        self
    }

    #[must_use]
    pub fn build(self) -> EnhanceOptions {
        self.options
    }
}
