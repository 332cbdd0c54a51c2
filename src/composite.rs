//! Premultiplied-alpha source-over for RGBA8 buffers.
//!
//! The overlay surface is always blended fully opaque onto the background, so
//! the blend carries no opacity knob: `out = src + dst * (255 - src.a) / 255`
//! per channel, rounding to nearest on the division.

use crate::foundation::error::{TelopError, TelopResult};

pub type PremulRgba8 = [u8; 4];

/// Source-over blend of one premultiplied pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let inv = u32::from(255 - sa);
            let mut out = [0u8; 4];
            for (o, (&s, &d)) in out.iter_mut().zip(src.iter().zip(dst.iter())) {
                let kept = (u32::from(d) * inv + 127) / 255;
                *o = (u32::from(s) + kept).min(255) as u8;
            }
            out
        }
    }
}

/// Composite `src` over `dst` pixel-by-pixel; both buffers are premultiplied
/// RGBA8 of the same length.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> TelopResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TelopError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}
