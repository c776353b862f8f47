//! Built-in commands: the clear seed, the base snapshot and a stamp edit.

use image::imageops;
use tracing::{debug, warn};

use crate::canvas::{Canvas, clear_canvas};

use super::command::Command;

/// Empty canvas. Seeds slot 0 of a fresh or reset history.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClearCommand;

impl Command for ClearCommand {
    fn apply(&self, canvas: &mut Canvas) {
        clear_canvas(canvas);
    }

    fn name(&self) -> &'static str {
        "clear"
    }
}

/// Base snapshot holding the history's private copy of the original bitmap
pub struct BitmapCommand {
    bitmap: Option<Canvas>,
}

impl BitmapCommand {
    pub fn new(bitmap: Canvas) -> Self {
        Self {
            bitmap: Some(bitmap),
        }
    }

    /// The held snapshot, or `None` once released
    pub fn bitmap(&self) -> Option<&Canvas> {
        self.bitmap.as_ref()
    }
}

impl Command for BitmapCommand {
    fn apply(&self, canvas: &mut Canvas) {
        clear_canvas(canvas);
        match &self.bitmap {
            Some(bitmap) => imageops::replace(canvas, bitmap, 0, 0),
            None => warn!("Replaying a released base snapshot, canvas left clear"),
        }
    }

    fn free_resources(&mut self) {
        if let Some(bitmap) = self.bitmap.take() {
            let (width, height) = bitmap.dimensions();
            debug!("Released base snapshot {}x{}", width, height);
        }
    }

    fn name(&self) -> &'static str {
        "bitmap"
    }

    fn snapshot_size(&self) -> Option<(u32, u32)> {
        self.bitmap.as_ref().map(|b| b.dimensions())
    }
}

/// Tool edit that alpha-blends an owned RGBA patch onto the canvas
pub struct StampCommand {
    patch: Option<Canvas>,
    x: i64,
    y: i64,
}

impl StampCommand {
    /// Stamp `patch` with its top-left corner at (`x`, `y`); offsets may be
    /// negative or past the canvas edge, the overlap is clipped.
    pub fn new(patch: Canvas, x: i64, y: i64) -> Self {
        Self {
            patch: Some(patch),
            x,
            y,
        }
    }
}

impl Command for StampCommand {
    fn apply(&self, canvas: &mut Canvas) {
        if let Some(patch) = &self.patch {
            imageops::overlay(canvas, patch, self.x, self.y);
        }
    }

    fn free_resources(&mut self) {
        self.patch = None;
    }

    fn name(&self) -> &'static str {
        "stamp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{TRANSPARENT, blank_canvas};
    use image::{Rgba, RgbaImage};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_clear_command_clears() {
        let mut canvas = RgbaImage::from_pixel(3, 3, RED);
        ClearCommand.apply(&mut canvas);
        assert!(canvas.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_bitmap_command_restores_snapshot() {
        let command = BitmapCommand::new(RgbaImage::from_pixel(2, 2, RED));
        let mut canvas = RgbaImage::from_pixel(2, 2, BLUE);
        command.apply(&mut canvas);
        assert!(canvas.pixels().all(|p| *p == RED));
        assert_eq!(command.snapshot_size(), Some((2, 2)));
    }

    #[test]
    fn test_bitmap_command_clears_outside_smaller_snapshot() {
        let command = BitmapCommand::new(RgbaImage::from_pixel(1, 1, RED));
        let mut canvas = RgbaImage::from_pixel(2, 2, BLUE);
        command.apply(&mut canvas);
        assert_eq!(*canvas.get_pixel(0, 0), RED);
        assert_eq!(*canvas.get_pixel(1, 1), TRANSPARENT);
    }

    #[test]
    fn test_released_bitmap_command_only_clears() {
        let mut command = BitmapCommand::new(RgbaImage::from_pixel(2, 2, RED));
        command.free_resources();
        assert!(command.bitmap().is_none());
        assert!(command.snapshot_size().is_none());

        let mut canvas = RgbaImage::from_pixel(2, 2, BLUE);
        command.apply(&mut canvas);
        assert!(canvas.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_free_resources_tolerates_unapplied_command() {
        let mut command = StampCommand::new(RgbaImage::from_pixel(1, 1, RED), 0, 0);
        command.free_resources();

        let mut canvas = blank_canvas(2, 2);
        command.apply(&mut canvas);
        assert!(canvas.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_stamp_command_overlays_at_offset() {
        let command = StampCommand::new(RgbaImage::from_pixel(1, 1, RED), 1, 0);
        let mut canvas = blank_canvas(2, 2);
        command.apply(&mut canvas);
        assert_eq!(*canvas.get_pixel(1, 0), RED);
        assert_eq!(*canvas.get_pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn test_stamp_command_clips_out_of_bounds() {
        let command = StampCommand::new(RgbaImage::from_pixel(2, 2, RED), -1, -1);
        let mut canvas = blank_canvas(2, 2);
        command.apply(&mut canvas);
        assert_eq!(*canvas.get_pixel(0, 0), RED);
        assert_eq!(*canvas.get_pixel(1, 1), TRANSPARENT);
    }
}
