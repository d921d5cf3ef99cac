use ndarray::ArrayView3;

use crate::shared::rect::Rect;

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// `index` is the capture sequence number assigned by the device reader.
/// Format conversion happens at I/O boundaries only.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn from_rgb_image(image: image::RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    /// Copies the frame into an `image` buffer. `None` for non-RGB frames.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        if self.channels != 3 {
            return None;
        }
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Copies the pixels under `rect` into a new frame.
    ///
    /// Returns `None` if `rect` does not fit inside this frame.
    pub fn crop(&self, rect: &Rect) -> Option<Frame> {
        if !rect.fits_within(self.width, self.height) {
            return None;
        }
        let channels = self.channels as usize;
        let stride = self.width as usize * channels;
        let rw = rect.width() as usize;
        let rh = rect.height() as usize;
        let row_len = rw * channels;

        let mut data = Vec::with_capacity(row_len * rh);
        for row in 0..rh {
            let start = (rect.top as usize + row) * stride + rect.left as usize * channels;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Some(Frame::new(
            data,
            rw as u32,
            rh as u32,
            self.channels,
            self.index,
        ))
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x3 frame where every pixel's R value is `10 * row + col`.
    fn gradient_frame() -> Frame {
        let mut data = Vec::new();
        for row in 0..3u8 {
            for col in 0..4u8 {
                data.extend_from_slice(&[10 * row + col, 0, 0]);
            }
        }
        Frame::new(data, 4, 3, 3, 7)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_crop_copies_region() {
        let frame = gradient_frame();
        let crop = frame.crop(&Rect::new(1, 1, 3, 3)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
        assert_eq!(crop.index(), 7);
        let reds: Vec<u8> = crop.data().chunks(3).map(|px| px[0]).collect();
        assert_eq!(reds, vec![11, 12, 21, 22]);
    }

    #[test]
    fn test_crop_full_frame() {
        let frame = gradient_frame();
        let crop = frame.crop(&Rect::new(0, 0, 4, 3)).unwrap();
        assert_eq!(crop.data(), frame.data());
    }

    #[test]
    fn test_crop_out_of_bounds_returns_none() {
        let frame = gradient_frame();
        assert!(frame.crop(&Rect::new(2, 0, 5, 2)).is_none());
        assert!(frame.crop(&Rect::new(-1, 0, 2, 2)).is_none());
        assert!(frame.crop(&Rect::new(1, 1, 1, 2)).is_none());
    }

    #[test]
    fn test_rgb_image_conversion_preserves_pixels() {
        let frame = gradient_frame();
        let image = frame.to_rgb_image().unwrap();
        assert_eq!(image.get_pixel(2, 1).0, [12, 0, 0]);

        let back = Frame::from_rgb_image(image, 3);
        assert_eq!(back.data(), frame.data());
        assert_eq!(back.index(), 3);
    }

    #[test]
    fn test_to_rgb_image_rejects_non_rgb() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1, 0);
        assert!(frame.to_rgb_image().is_none());
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24]; // 2x4x3
        let frame = Frame::new(data, 4, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]); // (height, width, channels)
    }
}
