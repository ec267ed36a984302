//! Grayscale conversion and fixed-resolution downsampling.

use crate::util::HomingResult;
use crate::view::{Channels, PanoramicView, RawImage, ViewConfig};

/// Converts a raw image to single-channel intensity.
///
/// RGB input uses the BT.601 luma weights `0.299 R + 0.587 G + 0.114 B`,
/// rounded to the nearest integer. Gray input is copied unchanged.
pub fn to_grayscale(raw: &RawImage) -> Vec<u8> {
    match raw.channels() {
        Channels::Gray => raw.data().to_vec(),
        Channels::Rgb => raw
            .data()
            .chunks_exact(3)
            .map(|px| {
                let luma = 0.299 * f32::from(px[0])
                    + 0.587 * f32::from(px[1])
                    + 0.114 * f32::from(px[2]);
                luma.round().clamp(0.0, 255.0) as u8
            })
            .collect(),
    }
}

/// Converts a raw image to intensity and resizes it to the matching resolution.
///
/// Resizing is bilinear with pixel centres aligned: destination pixel `x`
/// samples source coordinate `(x + 0.5) * src_w / dst_w - 0.5`, clamped to the
/// image. Equal source and destination sizes reproduce the input exactly.
pub fn preprocess(raw: &RawImage, cfg: &ViewConfig) -> HomingResult<PanoramicView> {
    let gray = to_grayscale(raw);
    let resized = resize_bilinear(&gray, raw.width(), raw.height(), cfg.width, cfg.height);
    PanoramicView::new(resized, cfg.width, cfg.height)
}

fn resize_bilinear(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Vec<u8> {
    if src_w == dst_w && src_h == dst_h {
        return src.to_vec();
    }

    let scale_x = src_w as f32 / dst_w.max(1) as f32;
    let scale_y = src_h as f32 / dst_h.max(1) as f32;
    let max_x = src_w.saturating_sub(1);
    let max_y = src_h.saturating_sub(1);

    let taps = |dst: usize, scale: f32, max: usize| -> (usize, usize, f32) {
        let pos = ((dst as f32 + 0.5) * scale - 0.5).clamp(0.0, max as f32);
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(max);
        (i0, i1, pos - i0 as f32)
    };
    let cols: Vec<_> = (0..dst_w).map(|x| taps(x, scale_x, max_x)).collect();

    let mut out = Vec::with_capacity(dst_w * dst_h);
    for y in 0..dst_h {
        let (y0, y1, fy) = taps(y, scale_y, max_y);
        let row0 = &src[y0 * src_w..(y0 + 1) * src_w];
        let row1 = &src[y1 * src_w..(y1 + 1) * src_w];
        for &(x0, x1, fx) in &cols {
            let top = f32::from(row0[x0]) * (1.0 - fx) + f32::from(row0[x1]) * fx;
            let bottom = f32::from(row1[x0]) * (1.0 - fx) + f32::from(row1[x1]) * fx;
            let value = top * (1.0 - fy) + bottom * fy;
            out.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }
    out
}
