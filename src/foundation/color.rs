/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color, forced fully opaque.
    pub const fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    /// Same color with a replacement alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Convert a straight RGBA8 buffer to premultiplied alpha, in place.
pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Convert a premultiplied RGBA8 buffer back to straight alpha, in place.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u32 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u32 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u32 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_zero_alpha_clears_color() {
        let mut buf = [200, 100, 50, 0];
        premultiply_rgba8_in_place(&mut buf);
        assert_eq!(buf, [0, 0, 0, 0]);
    }

    #[test]
    fn premultiply_opaque_is_identity() {
        let mut buf = [200, 100, 50, 255];
        premultiply_rgba8_in_place(&mut buf);
        assert_eq!(buf, [200, 100, 50, 255]);
    }

    #[test]
    fn unpremultiply_inverts_premultiply_for_opaque_and_half_alpha() {
        for a in [255u8, 128] {
            let mut buf = [200, 100, 50, a];
            premultiply_rgba8_in_place(&mut buf);
            unpremultiply_rgba8_in_place(&mut buf);
            // one unit of rounding slack at reduced alpha
            assert!((buf[0] as i16 - 200).abs() <= 1, "r for a={a}: {buf:?}");
            assert!((buf[1] as i16 - 100).abs() <= 1, "g for a={a}: {buf:?}");
            assert!((buf[2] as i16 - 50).abs() <= 1, "b for a={a}: {buf:?}");
            assert_eq!(buf[3], a);
        }
    }

    #[test]
    fn alpha_helpers() {
        let c = Rgba8::new(10, 20, 30, 210);
        assert_eq!(c.opaque().a, 255);
        assert_eq!(c.with_alpha(200).a, 200);
        assert_eq!(c.with_alpha(200).r, 10);
    }
}
