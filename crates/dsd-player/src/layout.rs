//! Sample layout conversion from file order to device order.

use crate::config::SampleDepth;

/// Copy `src` into `dst`, reordering bytes for the device encoding.
///
/// Narrow samples pass through unchanged. For the wide encoding every 4-byte group
/// `[L0, R0, L1, R1]` becomes `[L1, L0, R1, R0]`, pairing two consecutive narrow words per
/// channel into one 16-bit word. `src` must be a whole number of frames, and `dst` must be at
/// least as long as `src`.
pub fn transform_into(depth: SampleDepth, src: &[u8], dst: &mut [u8]) {
    let dst = &mut dst[..src.len()];
    match depth {
        SampleDepth::Narrow => dst.copy_from_slice(src),
        SampleDepth::Wide => {
            debug_assert_eq!(src.len() % 4, 0);
            for (out, group) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                out[0] = group[2];
                out[1] = group[0];
                out[2] = group[3];
                out[3] = group[1];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_group_is_reordered() {
        let src = [0x10, 0x20, 0x11, 0x21];
        let mut dst = [0u8; 4];
        transform_into(SampleDepth::Wide, &src, &mut dst);
        assert_eq!(dst, [0x11, 0x10, 0x21, 0x20]);
    }

    #[test]
    fn wide_reorders_each_group_independently() {
        let src: Vec<u8> = (0..12).collect();
        let mut dst = vec![0u8; 12];
        transform_into(SampleDepth::Wide, &src, &mut dst);
        assert_eq!(dst, vec![2, 0, 3, 1, 6, 4, 7, 5, 10, 8, 11, 9]);
    }

    #[test]
    fn wide_is_not_idempotent() {
        let src = [1u8, 2, 3, 4];
        let mut once = [0u8; 4];
        let mut twice = [0u8; 4];
        transform_into(SampleDepth::Wide, &src, &mut once);
        transform_into(SampleDepth::Wide, &once, &mut twice);
        assert_eq!(once, [3, 1, 4, 2]);
        assert_ne!(twice, src);
    }

    #[test]
    fn narrow_is_identity() {
        let src: Vec<u8> = (0..=255).collect();
        let mut dst = vec![0u8; src.len()];
        transform_into(SampleDepth::Narrow, &src, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    fn only_the_source_length_is_written() {
        let src = [9u8, 8, 7, 6];
        let mut dst = [0xAAu8; 8];
        transform_into(SampleDepth::Narrow, &src, &mut dst);
        assert_eq!(dst, [9, 8, 7, 6, 0xAA, 0xAA, 0xAA, 0xAA]);
    }
}
