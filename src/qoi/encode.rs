//! QOI encoder.
//!
//! Instruction precedence for each pixel is run > index > diff > luma >
//! literal, which reproduces the reference encoder byte for byte.

use alloc::vec::Vec;

use super::{
    ColorCache, QOI_END_MARKER, QOI_HEADER_SIZE, QOI_MAX_RUN, QOI_OP_DIFF, QOI_OP_INDEX,
    QOI_OP_LUMA, QOI_OP_RGB, QOI_OP_RGBA, QOI_OP_RUN, QOI_START_PIXEL, QoiHeader,
};
use crate::arith;
use crate::buffer::PixelBuffer;
use crate::error::ConvertError;

/// Worst-case encoded size: every pixel as a literal.
pub(crate) fn max_encoded_len(buffer: &PixelBuffer) -> Result<usize, ConvertError> {
    let too_large = ConvertError::DimensionsTooLarge {
        width: buffer.width(),
        height: buffer.height(),
    };
    let per_pixel = usize::from(buffer.channels()) + 1;
    arith::checked_mul(buffer.pixel_count(), per_pixel)
        .and_then(|n| arith::checked_add(n, QOI_HEADER_SIZE))
        .and_then(|n| arith::checked_add(n, QOI_END_MARKER.len()))
        .ok_or(too_large)
}

/// Encode a whole buffer: header, instruction stream, end marker.
pub(crate) fn encode_qoi(buffer: &PixelBuffer) -> Result<Vec<u8>, ConvertError> {
    let max_len = max_encoded_len(buffer)?;
    let mut out = Vec::new();
    out.try_reserve_exact(max_len)
        .map_err(|_| ConvertError::AllocationFailed { bytes: max_len })?;

    let header = QoiHeader {
        width: buffer.width(),
        height: buffer.height(),
        layout: buffer.layout(),
        colorspace: QoiHeader::COLORSPACE_SRGB,
    };
    out.extend_from_slice(&header.to_bytes());

    let channels = buffer.layout().bytes_per_pixel();
    let last = buffer.pixel_count().saturating_sub(1);
    let mut state = EncoderState::new();
    for (i, chunk) in buffer.pixels().chunks_exact(channels).enumerate() {
        let alpha = chunk.get(3).copied().unwrap_or(255);
        let px = [chunk[0], chunk[1], chunk[2], alpha];
        state.push(px, i == last, &mut out);
    }

    out.extend_from_slice(&QOI_END_MARKER);
    Ok(out)
}

/// Running state for one encode call.
pub(crate) struct EncoderState {
    pub(crate) cache: ColorCache,
    pub(crate) previous: [u8; 4],
    pub(crate) run: u8,
}

impl EncoderState {
    pub(crate) fn new() -> Self {
        Self {
            cache: ColorCache::new(),
            previous: QOI_START_PIXEL,
            run: 0,
        }
    }

    /// Emit the instruction(s) for one pixel.
    pub(crate) fn push(&mut self, px: [u8; 4], is_last: bool, out: &mut Vec<u8>) {
        if px == self.previous {
            self.run += 1;
            if self.run == QOI_MAX_RUN || is_last {
                self.flush_run(out);
            }
        } else {
            self.flush_run(out);

            let (slot, hit) = self.cache.lookup(px);
            if hit {
                out.push(QOI_OP_INDEX | slot as u8);
            } else {
                self.cache.insert(px);
                if px[3] == self.previous[3] {
                    self.encode_rgb_change(px, out);
                } else {
                    out.extend_from_slice(&[QOI_OP_RGBA, px[0], px[1], px[2], px[3]]);
                }
            }
        }
        self.previous = px;
    }

    fn flush_run(&mut self, out: &mut Vec<u8>) {
        if self.run > 0 {
            out.push(QOI_OP_RUN | (self.run - 1));
            self.run = 0;
        }
    }

    /// Alpha unchanged: diff, then luma, then RGB literal.
    ///
    /// Deltas are plain differences in `-255..=255`; a step across the
    /// 0/255 boundary is out of every delta range and becomes a literal.
    fn encode_rgb_change(&self, px: [u8; 4], out: &mut Vec<u8>) {
        let delta = |c: usize| i16::from(px[c]) - i16::from(self.previous[c]);
        let (vr, vg, vb) = (delta(0), delta(1), delta(2));
        let vg_r = vr - vg;
        let vg_b = vb - vg;

        if (-2..=1).contains(&vr) && (-2..=1).contains(&vg) && (-2..=1).contains(&vb) {
            out.push(
                QOI_OP_DIFF
                    | (((vr + 2) as u8) << 4)
                    | (((vg + 2) as u8) << 2)
                    | ((vb + 2) as u8),
            );
        } else if (-8..=7).contains(&vg_r) && (-32..=31).contains(&vg) && (-8..=7).contains(&vg_b)
        {
            out.push(QOI_OP_LUMA | ((vg + 32) as u8));
            out.push((((vg_r + 8) as u8) << 4) | ((vg_b + 8) as u8));
        } else {
            out.extend_from_slice(&[QOI_OP_RGB, px[0], px[1], px[2]]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelLayout;
    use crate::qoi::qoi_hash;

    fn stream_of(pixels: &[[u8; 4]]) -> Vec<u8> {
        let mut state = EncoderState::new();
        let mut out = Vec::new();
        for (i, &px) in pixels.iter().enumerate() {
            state.push(px, i + 1 == pixels.len(), &mut out);
        }
        out
    }

    #[test]
    fn cache_holds_every_encoded_pixel() {
        let mut state = EncoderState::new();
        let mut out = Vec::new();
        let mut seed: u32 = 0x1234_5678;
        for i in 0..500u32 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            // Small palette so index hits and runs happen too.
            let v = (seed % 6) as u8;
            let px = [v * 40, v * 3, 200 - v, if v == 5 { 128 } else { 255 }];
            state.push(px, i == 499, &mut out);
            assert_eq!(state.cache.lookup(px), (qoi_hash(px), true), "pixel {i}");
            assert_eq!(state.previous, px);
        }
        assert!(out.iter().any(|&b| b & 0xc0 == QOI_OP_RUN && b < QOI_OP_RGB));
    }

    #[test]
    fn index_preferred_over_diff() {
        // Third pixel equals the first and is also within diff range of
        // the second; the cache hit must win.
        let a = [10, 10, 10, 255];
        let b = [11, 10, 10, 255];
        let out = stream_of(&[a, b, a]);
        assert_eq!(out.last(), Some(&(QOI_OP_INDEX | qoi_hash(a) as u8)));
    }

    #[test]
    fn diff_then_luma_then_literal() {
        // dr = -2, dg = +1, db = 0 after a literal.
        let base = [50, 50, 50, 255];
        let diff = [48, 51, 50, 255];
        assert_eq!(
            &stream_of(&[base, diff])[4..],
            &[QOI_OP_DIFF | (0 << 4) | (3 << 2) | 2]
        );

        let luma = [20, 25, 30, 255];
        // vg = 25, vr - vg = -5, vb - vg = 5
        assert_eq!(stream_of(&[luma]), vec![QOI_OP_LUMA | 57, (3 << 4) | 13]);

        let literal = [100, 0, 0, 255];
        assert_eq!(stream_of(&[literal]), vec![QOI_OP_RGB, 100, 0, 0]);
    }

    #[test]
    fn deltas_do_not_wrap() {
        // 0 -> 255 is +255, not -1: a literal, not a diff.
        let out = stream_of(&[[255, 0, 0, 255]]);
        assert_eq!(out, vec![QOI_OP_RGB, 255, 0, 0]);

        // 255 -> 0 likewise, even though -255 wraps to +1 as a byte.
        let out = stream_of(&[[255, 0, 0, 255], [0, 0, 0, 255]]);
        assert_eq!(&out[4..], &[QOI_OP_RGB, 0, 0, 0]);

        // 1 -> 255 on green is +254: out of luma range too.
        let out = stream_of(&[[0, 1, 0, 255], [0, 255, 0, 255]]);
        assert_eq!(&out[out.len() - 4..], &[QOI_OP_RGB, 0, 255, 0]);
    }

    #[test]
    fn runs_split_at_62() {
        let px = QOI_START_PIXEL;
        let out = stream_of(&[px; 130]);
        assert_eq!(out, vec![QOI_OP_RUN | 61, QOI_OP_RUN | 61, QOI_OP_RUN | 5]);
    }

    #[test]
    fn worst_case_capacity() {
        let buffer = PixelBuffer::from_pixels(3, 2, PixelLayout::Rgba8, vec![0; 24]).unwrap();
        assert_eq!(max_encoded_len(&buffer).unwrap(), 14 + 6 * 5 + 8);
    }
}
