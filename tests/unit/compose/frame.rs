use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn new_buffer_is_opaque_black() {
    let fb = FrameBuffer::new(canvas(4, 4));
    assert_eq!(fb.current().pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(fb.frames_drawn(), 0);
}

#[test]
fn draw_same_size_copies_and_holds_last_frame() {
    let mut fb = FrameBuffer::new(canvas(4, 4));
    fb.draw(&FrameRGBA::solid(4, 4, [200, 10, 10, 255])).unwrap();
    fb.draw(&FrameRGBA::solid(4, 4, [10, 200, 10, 255])).unwrap();
    assert_eq!(fb.current().pixel(3, 3), [10, 200, 10, 255]);
    // Nothing new drawn: the last frame stays.
    assert_eq!(fb.current().pixel(0, 0), [10, 200, 10, 255]);
    assert_eq!(fb.frames_drawn(), 2);
}

#[test]
fn draw_landscape_into_portrait_letterboxes() {
    let mut fb = FrameBuffer::new(canvas(4, 8));
    fb.draw(&FrameRGBA::solid(8, 4, [255, 255, 255, 255]))
        .unwrap();
    let out = fb.current();
    assert_eq!((out.width, out.height), (4, 8));
    // Scaled to 4x2 and centered vertically: rows 3..5 are content, top/bottom are black bars.
    assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(out.pixel(2, 7), [0, 0, 0, 255]);
    assert_eq!(out.pixel(1, 3), [255, 255, 255, 255]);
}

#[test]
fn from_raw_checks_length() {
    assert!(FrameRGBA::from_raw(2, 2, vec![0; 16]).is_ok());
    assert!(FrameRGBA::from_raw(2, 2, vec![0; 15]).is_err());
}

#[test]
fn snapshot_is_independent_of_later_draws() {
    let mut fb = FrameBuffer::new(canvas(2, 2));
    fb.draw(&FrameRGBA::solid(2, 2, [1, 2, 3, 255])).unwrap();
    let snap = fb.snapshot();
    fb.draw(&FrameRGBA::solid(2, 2, [9, 9, 9, 255])).unwrap();
    assert_eq!(snap.pixel(0, 0), [1, 2, 3, 255]);
    assert_eq!(fb.current().pixel(0, 0), [9, 9, 9, 255]);
}
