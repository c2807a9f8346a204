use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use crate::display::{Frame, HEIGHT, WIDTH};

const ON: u32 = from_u8_rgb(0, 127, 255);
const OFF: u32 = from_u8_rgb(0, 0, 0);

const fn from_u8_rgb(r: u8, g: u8, b: u8) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

/// minifb window showing the CHIP-8 frame buffer.
pub struct FrameWindow {
    pixel_buffer: Vec<u32>,
    pub window: Window,
}

impl FrameWindow {
    pub fn new(scale: Scale) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "chipvm - ESC to exit, P to pause, I to inspect",
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )?;
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));
        Ok(Self {
            pixel_buffer: vec![OFF; WIDTH * HEIGHT],
            window,
        })
    }

    pub fn render(&mut self, frame: &Frame) {
        for (pixel, &bit) in self.pixel_buffer.iter_mut().zip(frame.iter().flatten()) {
            *pixel = if bit == 1 { ON } else { OFF };
        }
    }

    /// Pushes the last rendered frame and pumps window events.
    pub fn sync(&mut self) -> Result<(), minifb::Error> {
        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
    }

    pub fn is_running(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn keys_pressed(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::No)
    }

    pub fn keys_released(&self) -> Vec<Key> {
        self.window.get_keys_released()
    }
}

/// Left four columns of a QWERTY keyboard onto the hex keypad.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub fn key_to_num(key: Key) -> Option<u8> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}

pub fn scale_for(factor: u8) -> Scale {
    match factor {
        0..=1 => Scale::X1,
        2 => Scale::X2,
        3..=4 => Scale::X4,
        5..=8 => Scale::X8,
        9..=16 => Scale::X16,
        _ => Scale::X32,
    }
}
