//! Packed-HSL colour palette.
//!
//! Terrain colours are quantized into a 16-bit packed HSL value: 6 bits of
//! hue, 3 bits of saturation and 7 bits of lightness. The palette maps every
//! packed value to an RGB colour, with a gamma-style brightness adjustment.

/// Number of entries in the palette (every 16-bit packed HSL value).
pub const PALETTE_SIZE: usize = 1 << 16;

/// Number of hue/saturation rows; each row has 128 lightness steps.
pub const HUE_SATURATION_ROWS: usize = 512;

/// Lightness factor applied to terrain before palette lookup.
pub const TERRAIN_LIGHTNESS: i32 = 96;

/// Brightness used by the game's map renderer.
pub const DEFAULT_BRIGHTNESS: f64 = 0.9;

/// Lookup table from packed HSL to 0xRRGGBB.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<u32>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(DEFAULT_BRIGHTNESS)
    }
}

impl ColorPalette {
    /// Build the palette with the given brightness exponent.
    pub fn new(brightness: f64) -> Self {
        let mut colors = vec![0u32; PALETTE_SIZE];
        let mut index = 0;

        for row in 0..HUE_SATURATION_ROWS {
            let hue = (row >> 3) as f64 / 64.0 + 0.0078125;
            let saturation = (row & 7) as f64 / 8.0 + 0.0625;

            for step in 0..128 {
                let lightness = step as f64 / 128.0;
                let q = if lightness < 0.5 {
                    lightness * (1.0 + saturation)
                } else {
                    lightness + saturation - lightness * saturation
                };
                let p = 2.0 * lightness - q;

                let r = hue_to_channel(p, q, hue + 1.0 / 3.0);
                let g = hue_to_channel(p, q, hue);
                let b = hue_to_channel(p, q, hue - 1.0 / 3.0);

                let rgb = to_channel(r) << 16 | to_channel(g) << 8 | to_channel(b);
                let rgb = adjust_brightness(rgb, brightness);
                // 0 is reserved for "nothing drawn"
                colors[index] = if rgb == 0 { 1 } else { rgb };
                index += 1;
            }
        }

        Self { colors }
    }

    /// Look up the RGB colour of a packed HSL value.
    pub fn color(&self, hsl: i32) -> u32 {
        self.colors[(hsl as u32 & 0xFFFF) as usize]
    }

    /// Look up a terrain colour: lightness is scaled into the terrain band first.
    pub fn terrain_color(&self, hsl: i32) -> u32 {
        self.color(adjust_lightness(hsl, TERRAIN_LIGHTNESS))
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = if t > 1.0 {
        t - 1.0
    } else if t < 0.0 {
        t + 1.0
    } else {
        t
    };
    if 6.0 * t < 1.0 {
        p + (q - p) * 6.0 * t
    } else if 2.0 * t < 1.0 {
        q
    } else if 3.0 * t < 2.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_channel(v: f64) -> u32 {
    ((v * 256.0) as i32).clamp(0, 255) as u32
}

fn adjust_brightness(rgb: u32, brightness: f64) -> u32 {
    let channel = |shift: u32| {
        let v = ((rgb >> shift) & 0xFF) as f64 / 256.0;
        to_channel(v.powf(brightness))
    };
    channel(16) << 16 | channel(8) << 8 | channel(0)
}

/// Pack hue (0-255), saturation (0-255) and lightness (0-255) into 16 bits.
///
/// Saturation is halved at several lightness thresholds, as the game does.
pub fn pack_hsl(hue: i32, saturation: i32, lightness: i32) -> i32 {
    let mut saturation = saturation;
    for threshold in [179, 192, 217, 243] {
        if lightness > threshold {
            saturation /= 2;
        }
    }
    ((saturation / 32) << 7) + ((hue / 4) << 10) + lightness / 2
}

/// Scale the lightness bits of a packed HSL value by `factor / 128`, clamped to [2, 126].
pub fn adjust_lightness(hsl: i32, factor: i32) -> i32 {
    let lightness = ((hsl & 127) * factor / 128).clamp(2, 126);
    (hsl & 0xFF80) + lightness
}
