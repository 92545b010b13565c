//! Blending of coloured noise layers into an RGB frame.

use serde::Deserialize;

use crate::noise::NoiseField;

/// How a layer's colour is applied to what is below it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Tint towards the layer colour (darkens); starts from white
    #[default]
    Multiply,

    /// Multiply in inverted space (brightens); starts from black
    Light,
}

impl BlendMode {
    /// Colour of an empty frame
    pub fn start_colour(self) -> [u8; 3] {
        match self {
            BlendMode::Multiply => [255, 255, 255],
            BlendMode::Light => [0, 0, 0],
        }
    }

    /// Move `current` towards `target` by `amount` in [0, 1]
    #[inline]
    pub fn combine(self, current: f64, target: f64, amount: f64) -> f64 {
        match self {
            BlendMode::Multiply => multiply(current, target, amount),
            BlendMode::Light => 255.0 - multiply(255.0 - current, 255.0 - target, amount),
        }
    }
}

#[inline]
fn multiply(current: f64, target: f64, amount: f64) -> f64 {
    current * (1.0 + (target - 255.0) / 255.0 * amount)
}

/// One layer's contribution to a frame
#[derive(Debug, Clone, Copy)]
pub struct LayerPaint<'a> {
    pub rgb: [u8; 3],
    pub noise: &'a NoiseField,
}

/// RGB8 raster, row-major, 3 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Fold every layer, in order, over `start` for each pixel and channel
pub fn composite(
    width: usize,
    height: usize,
    layers: &[LayerPaint<'_>],
    mode: BlendMode,
    start: [u8; 3],
) -> Frame {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            for channel in 0..3 {
                let mut value = start[channel] as f64;
                for layer in layers {
                    let amount = layer.noise.get(x, y);
                    value = mode.combine(value, layer.rgb[channel] as f64, amount);
                }
                data.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    Frame {
        width,
        height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_layers_gives_start_colour() {
        for mode in [BlendMode::Multiply, BlendMode::Light] {
            let start = [12, 200, 77];
            let frame = composite(4, 3, &[], mode, start);
            assert_eq!(frame.data.len(), 4 * 3 * 3);
            assert!(frame.data.chunks(3).all(|px| px == start));
        }
    }

    #[test]
    fn test_zero_amount_is_identity() {
        let silent = NoiseField::filled(5, 2, 0.0);
        let layers = [LayerPaint {
            rgb: [255, 0, 0],
            noise: &silent,
        }];
        for mode in [BlendMode::Multiply, BlendMode::Light] {
            let start = mode.start_colour();
            let frame = composite(5, 2, &layers, mode, start);
            assert!(frame.data.chunks(3).all(|px| px == start));
        }
    }

    #[test]
    fn test_full_amount_reaches_target() {
        let full = NoiseField::filled(2, 2, 1.0);
        let layers = [LayerPaint {
            rgb: [255, 64, 0],
            noise: &full,
        }];
        let dark = composite(2, 2, &layers, BlendMode::Multiply, [255, 255, 255]);
        assert_eq!(dark.pixel(1, 1), [255, 64, 0]);

        let light = composite(2, 2, &layers, BlendMode::Light, [0, 0, 0]);
        assert_eq!(light.pixel(0, 0), [255, 64, 0]);
    }

    #[test]
    fn test_layers_fold_in_order() {
        let half = NoiseField::filled(1, 1, 0.5);
        let layers = [
            LayerPaint {
                rgb: [0, 0, 0],
                noise: &half,
            },
            LayerPaint {
                rgb: [0, 0, 0],
                noise: &half,
            },
        ];
        // 255 * 0.5 * 0.5 = 63.75
        let frame = composite(1, 1, &layers, BlendMode::Multiply, [255, 255, 255]);
        assert_eq!(frame.pixel(0, 0), [64, 64, 64]);

        // Light mode mirrors it around 255
        let frame = composite(1, 1, &layers, BlendMode::Light, [0, 0, 0]);
        let expected = (255.0 - 63.75_f64).round() as u8;
        assert_eq!(frame.pixel(0, 0), [expected; 3]);
    }

    #[test]
    fn test_out_of_range_amount_is_clamped() {
        let over = NoiseField::filled(1, 1, 3.0);
        let layers = [LayerPaint {
            rgb: [0, 255, 0],
            noise: &over,
        }];
        let frame = composite(1, 1, &layers, BlendMode::Light, [0, 0, 0]);
        assert_eq!(frame.pixel(0, 0), [0, 255, 0]);
        let frame = composite(1, 1, &layers, BlendMode::Multiply, [255, 255, 255]);
        assert_eq!(frame.pixel(0, 0), [0, 255, 0]);
    }

    #[test]
    fn test_blend_mode_parses_lowercase() {
        let mode: BlendMode = serde_json::from_str(r#""light""#).unwrap();
        assert_eq!(mode, BlendMode::Light);
        assert_eq!(BlendMode::default(), BlendMode::Multiply);
    }
}
