//! Scenario S6: a solid white 8x1 strip decodes to eight consecutive
//! opaque-white ARGB words.

use z80_core::bus::Bus;
use z80_core::video::{Video, FRAMEBUFFER_BYTES, WIDTH};

#[test]
fn s6_white_ink_on_black_paper_strip() {
    let mut bus = Bus::new();
    bus.load_ram(0x4000, &[0xFF]); // top-left byte: all 8 pixels "ink"
    bus.load_ram(0x5800, &[0x07]); // ink=7 (white), paper=0 (black)

    let video = Video::new();
    let mut out = vec![0u8; FRAMEBUFFER_BYTES];
    video.render(&bus, &mut out);

    for x in 0..8 {
        let offset = x * 4;
        assert_eq!(&out[offset..offset + 4], &[0xFF, 0xD7, 0xD7, 0xD7], "pixel {x}");
    }
    // The ninth pixel on the row belongs to the next attribute cell/bitmap
    // byte (still 0xFF memory default -> white-on-white), not part of this
    // scenario's assertion, but confirms the stride math lines up.
    assert_eq!(WIDTH, 256);
}
