//! Surface format descriptors and native pixel format negotiation.

use crate::error::ContextError;
use std::fmt;

/// Buffering of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwapBehavior {
    /// No requirement.
    #[default]
    Default,
    SingleBuffer,
    DoubleBuffer,
    TripleBuffer,
}

impl SwapBehavior {
    fn buffers(self) -> u8 {
        match self {
            SwapBehavior::Default => 0,
            SwapBehavior::SingleBuffer => 1,
            SwapBehavior::DoubleBuffer => 2,
            SwapBehavior::TripleBuffer => 3,
        }
    }
}

/// Attributes of a rendering surface. A bit count of zero means "not required".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    /// Multisample count. Zero disables multisampling.
    pub samples: u8,
    pub swap_behavior: SwapBehavior,
    /// Vertical syncs per swap. Not part of the pixel format, carried over as requested.
    pub swap_interval: u32,
}

impl Default for SurfaceFormat {
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 0,
            depth_bits: 24,
            stencil_bits: 8,
            samples: 0,
            swap_behavior: SwapBehavior::DoubleBuffer,
            swap_interval: 1,
        }
    }
}

impl SurfaceFormat {
    /// An RGBA format with the given channel depth and no depth or stencil buffer.
    pub fn rgba(bits: u8) -> Self {
        Self {
            red_bits: bits,
            green_bits: bits,
            blue_bits: bits,
            alpha_bits: bits,
            depth_bits: 0,
            stencil_bits: 0,
            ..Self::default()
        }
    }

    pub fn with_alpha(mut self, bits: u8) -> Self {
        self.alpha_bits = bits;
        self
    }

    pub fn with_depth(mut self, bits: u8) -> Self {
        self.depth_bits = bits;
        self
    }

    pub fn with_stencil(mut self, bits: u8) -> Self {
        self.stencil_bits = bits;
        self
    }

    pub fn with_samples(mut self, samples: u8) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_swap_behavior(mut self, behavior: SwapBehavior) -> Self {
        self.swap_behavior = behavior;
        self
    }

    pub fn with_swap_interval(mut self, interval: u32) -> Self {
        self.swap_interval = interval;
        self
    }

    fn attributes(&self) -> [u8; 8] {
        [
            self.red_bits,
            self.green_bits,
            self.blue_bits,
            self.alpha_bits,
            self.depth_bits,
            self.stencil_bits,
            self.samples,
            self.swap_behavior.buffers(),
        ]
    }

    /// Whether this format meets or exceeds every attribute of `requested`.
    pub fn satisfies(&self, requested: &SurfaceFormat) -> bool {
        self.attributes()
            .iter()
            .zip(requested.attributes())
            .all(|(have, want)| *have >= want)
    }

    fn excess_over(&self, requested: &SurfaceFormat) -> u32 {
        self.attributes()
            .iter()
            .zip(requested.attributes())
            .map(|(have, want)| u32::from(have.saturating_sub(want)))
            .sum()
    }
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba {}/{}/{}/{} depth {} stencil {} samples {} {:?}",
            self.red_bits,
            self.green_bits,
            self.blue_bits,
            self.alpha_bits,
            self.depth_bits,
            self.stencil_bits,
            self.samples,
            self.swap_behavior
        )
    }
}

/// Pick the closest native format that is a superset of `requested`.
///
/// Attributes are never reduced below the request. Among the candidates the one with the
/// smallest total excess wins; ties keep the earlier candidate.
pub fn select_format(
    requested: &SurfaceFormat,
    available: &[SurfaceFormat],
) -> Result<SurfaceFormat, ContextError> {
    let best = available
        .iter()
        .filter(|candidate| candidate.satisfies(requested))
        .min_by_key(|candidate| candidate.excess_over(requested))
        .ok_or_else(|| ContextError::NoMatchingFormat(requested.to_string()))?;

    let mut format = *best;
    format.swap_interval = requested.swap_interval;
    Ok(format)
}
