// src/present/colormap.rs
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::processing::{Classifier, Grid};

/// Colour of sentinel pixels: fully transparent.
pub const UNDEFINED_COLOR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Paints each pixel with the colour of its class.
pub fn render_class_map(classes: &Grid<Option<usize>>, classifier: &Classifier) -> RgbaImage {
    let bins = classifier.bins();
    let width = classes.width() as u32;

    ImageBuffer::from_fn(width, classes.height() as u32, |x, y| {
        match classes
            .get(y as usize, x as usize)
            .copied()
            .flatten()
            .and_then(|index| bins.get(index))
        {
            Some(bin) => Rgba([bin.color[0], bin.color[1], bin.color[2], 255]),
            None => UNDEFINED_COLOR,
        }
    })
}

/// Nearest-neighbour downscale so the longer side is at most `max_dim`.
/// Nearest keeps class colours exact; smaller images are returned as is.
pub fn preview(image: &RgbaImage, max_dim: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if max_dim == 0 || longest <= max_dim {
        return image.clone();
    }

    let scale = max_dim as f64 / longest as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    imageops::resize(image, new_width, new_height, FilterType::Nearest)
}

/// Parses `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn to_hex_color(color: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}
