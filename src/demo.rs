/// Built-in program used when no ROM is given.
///
/// Draws the sixteen font glyphs in two rows, then waits for keys and shows
/// the last one pressed under them with a short beep.
#[rustfmt::skip]
pub const DEMO_ROM: [u8; 54] = [
    0x00, 0xE0, // 200: CLS
    0x60, 0x00, // 202: V0 = 0          glyph
    0x61, 0x02, // 204: V1 = 2          x
    0x62, 0x02, // 206: V2 = 2          y
    0xF0, 0x29, // 208: I = glyph(V0)
    0xD1, 0x25, // 20A: draw V1, V2, 5
    0x70, 0x01, // 20C: V0 += 1
    0x71, 0x08, // 20E: V1 += 8
    0x31, 0x42, // 210: skip if V1 == 66
    0x12, 0x18, // 212: jump 218
    0x61, 0x02, // 214: V1 = 2          next row
    0x72, 0x08, // 216: V2 += 8
    0x30, 0x10, // 218: skip if V0 == 16
    0x12, 0x08, // 21A: jump 208
    0x63, 0x1C, // 21C: V3 = 28
    0x64, 0x14, // 21E: V4 = 20
    0x65, 0x00, // 220: V5 = 0
    0xF5, 0x29, // 222: I = glyph(V5)
    0xD3, 0x45, // 224: draw V3, V4, 5
    0xF6, 0x0A, // 226: V6 = key
    0xD3, 0x45, // 228: erase old glyph
    0x85, 0x60, // 22A: V5 = V6
    0xF5, 0x29, // 22C: I = glyph(V5)
    0xD3, 0x45, // 22E: draw V3, V4, 5
    0x67, 0x06, // 230: V7 = 6
    0xF7, 0x18, // 232: ST = V7
    0x12, 0x26, // 234: jump 226
];
