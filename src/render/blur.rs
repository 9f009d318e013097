//! Dimmed floor backgrounds for upper planes.
//!
//! The ground floor is blurred with a separable 13-tap Gaussian, converted
//! to greyscale and brightened, so that an upper floor drawn on top of it
//! still shows where it sits in the world.

use super::canvas::Canvas;

/// Half of a normalized 13-tap Gaussian, centre tap last.
const KERNEL_HALF: [f32; 7] = [
    0.018816, 0.034474, 0.056577, 0.083173, 0.109523, 0.129188, 0.136498,
];

const BRIGHTEN: f32 = 1.9;

fn kernel() -> [f32; 13] {
    let mut kernel = [0.0; 13];
    for (i, &w) in KERNEL_HALF.iter().enumerate() {
        kernel[i] = w;
        kernel[12 - i] = w;
    }
    kernel
}

/// Mirror an out-of-range index back into `0..len`.
fn reflect(i: i64, len: i64) -> i64 {
    let i = if i < 0 { -i - 1 } else { i };
    let i = if i >= len { 2 * len - i - 1 } else { i };
    i.clamp(0, len - 1)
}

fn blur_pass(src: &[[f32; 3]], width: usize, height: usize, horizontal: bool, kernel: &[f32; 13]) -> Vec<[f32; 3]> {
    let mut out = vec![[0.0f32; 3]; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 3];
            for (k, &w) in kernel.iter().enumerate() {
                let offset = k as i64 - 6;
                let (sx, sy) = if horizontal {
                    (reflect(x as i64 + offset, width as i64) as usize, y)
                } else {
                    (x, reflect(y as i64 + offset, height as i64) as usize)
                };
                let px = src[sy * width + sx];
                acc[0] += px[0] * w;
                acc[1] += px[1] * w;
                acc[2] += px[2] * w;
            }
            out[y * width + x] = acc;
        }
    }
    out
}

/// Blur, desaturate and brighten a rendered floor into an opaque background.
pub fn floor_blur(floor: &Canvas) -> Canvas {
    let width = floor.width() as usize;
    let height = floor.height() as usize;
    let mut out = Canvas::opaque(floor.width(), floor.height());
    if floor.is_empty() {
        return out;
    }

    let channels: Vec<[f32; 3]> = floor
        .pixels()
        .iter()
        .map(|&p| {
            [
                ((p >> 16) & 0xFF) as f32,
                ((p >> 8) & 0xFF) as f32,
                (p & 0xFF) as f32,
            ]
        })
        .collect();

    let kernel = kernel();
    let horizontal = blur_pass(&channels, width, height, true, &kernel);
    let blurred = blur_pass(&horizontal, width, height, false, &kernel);

    for (i, px) in blurred.iter().enumerate() {
        let grey = 0.299 * px[0] + 0.587 * px[1] + 0.114 * px[2];
        let v = (grey * BRIGHTEN).round().clamp(0.0, 255.0) as u32;
        out.set((i % width) as i64, (i / width) as i64, v << 16 | v << 8 | v);
    }
    out
}

/// Composite a transparent render of an upper floor over its background.
pub fn compose_floor(background: &Canvas, floor: &Canvas) -> Canvas {
    let mut out = background.clone();
    out.draw_canvas(floor, 0, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized() {
        let sum: f32 = kernel().iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(-1, 10), 0);
        assert_eq!(reflect(-3, 10), 2);
        assert_eq!(reflect(10, 10), 9);
        assert_eq!(reflect(12, 10), 7);
        assert_eq!(reflect(-20, 3), 0);
    }

    #[test]
    fn test_uniform_floor_is_grey_and_brightened() {
        let mut floor = Canvas::opaque(16, 16);
        floor.fill_rect(0, 0, 16, 16, 0xFF404040);
        let bg = floor_blur(&floor);
        assert!(bg.is_opaque());
        // 0x40 * 1.9 = 121.6
        let expected = 122u32;
        for &p in bg.pixels() {
            let r = (p >> 16) & 0xFF;
            assert!((r as i32 - expected as i32).abs() <= 1);
            assert_eq!(r, (p >> 8) & 0xFF);
            assert_eq!(r, p & 0xFF);
        }
    }

    #[test]
    fn test_bright_floor_saturates() {
        let mut floor = Canvas::opaque(4, 4);
        floor.fill_rect(0, 0, 4, 4, 0xFFF0F0F0);
        assert!(floor_blur(&floor).pixels().iter().all(|&p| p == 0xFFFFFFFF));
    }

    #[test]
    fn test_compose_floor_keeps_background_under_gaps() {
        let mut background = Canvas::opaque(2, 1);
        background.fill_rect(0, 0, 2, 1, 0xFF777777);
        let mut floor = Canvas::new(2, 1);
        floor.set(0, 0, 0xFFFF0000);

        let composed = compose_floor(&background, &floor);
        assert_eq!(composed.pixels(), &[0xFFFF0000, 0xFF777777]);
    }
}
