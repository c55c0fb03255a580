use crate::foundation::core::Canvas;
use crate::foundation::error::{AdreelError, AdreelResult};

/// A video frame as opaque RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// A frame filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA8 bytes, checking the length.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> AdreelResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(AdreelError::validation(format!(
                "frame data is {} bytes, expected {width}x{height}x4",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Read one pixel. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Drawable buffer of the fixed output size; the only visual source fed to the recorder.
///
/// The buffer keeps whatever was drawn last, so once the clip chain runs dry the recorder keeps
/// receiving the final frame instead of a blank one.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    canvas: Canvas,
    current: FrameRGBA,
    drawn: u64,
}

impl FrameBuffer {
    /// Create an opaque black buffer.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            current: FrameRGBA::solid(canvas.width, canvas.height, [0, 0, 0, 255]),
            drawn: 0,
        }
    }

    /// Copy `frame` into the buffer, fitting it (aspect preserved, centered) when sizes differ.
    pub fn draw(&mut self, frame: &FrameRGBA) -> AdreelResult<()> {
        if frame.width == self.canvas.width && frame.height == self.canvas.height {
            if frame.data.len() != self.current.data.len() {
                return Err(AdreelError::validation(
                    "frame.data size mismatch with width*height*4",
                ));
            }
            self.current.data.copy_from_slice(&frame.data);
        } else {
            self.current = fit_to_canvas(frame, self.canvas)?;
        }
        self.drawn += 1;
        Ok(())
    }

    /// The frame currently held.
    pub fn current(&self) -> &FrameRGBA {
        &self.current
    }

    /// Owned copy of the frame currently shown.
    pub fn snapshot(&self) -> FrameRGBA {
        self.current.clone()
    }

    /// How many frames have been drawn so far.
    pub fn frames_drawn(&self) -> u64 {
        self.drawn
    }
}

fn fit_to_canvas(frame: &FrameRGBA, canvas: Canvas) -> AdreelResult<FrameRGBA> {
    if frame.width == 0 || frame.height == 0 {
        return Err(AdreelError::validation("cannot draw an empty frame"));
    }
    let src = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| AdreelError::validation("frame.data size mismatch with width*height*4"))?;

    let scale = f64::min(
        f64::from(canvas.width) / f64::from(frame.width),
        f64::from(canvas.height) / f64::from(frame.height),
    );
    let w = ((f64::from(frame.width) * scale).round() as u32).clamp(1, canvas.width);
    let h = ((f64::from(frame.height) * scale).round() as u32).clamp(1, canvas.height);
    let scaled = image::imageops::resize(&src, w, h, image::imageops::FilterType::Triangle);

    let mut out = image::RgbaImage::from_pixel(
        canvas.width,
        canvas.height,
        image::Rgba([0, 0, 0, 255]),
    );
    let x = i64::from((canvas.width - w) / 2);
    let y = i64::from((canvas.height - h) / 2);
    image::imageops::overlay(&mut out, &scaled, x, y);

    Ok(FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data: out.into_raw(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/frame.rs"]
mod tests;
