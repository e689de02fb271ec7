//! Crop geometry for fitting a recording to a target display size.
//!
//! The horizontal ratio `source_width / target_width` is taken as the scale the
//! player will apply; whatever height exceeds `target_height` at that scale is
//! letterbox margin and gets cropped off the top of the frame.

use super::error::CropError;
use super::model::CropSpec;

pub fn compute(source_width: u32, source_height: u32, target_width: u32, target_height: u32) -> CropSpec {
    let r = f64::from(source_width) / f64::from(target_width);
    let vertical_crop_amount = f64::from(source_height) - f64::from(target_height) * r;

    CropSpec {
        target_width,
        target_height,
        vertical_crop_amount,
        horizontal_offset: 0.0,
        vertical_offset: vertical_crop_amount,
    }
}

impl CropSpec {
    /// Rejects geometry the encoder cannot apply: a negative amount (target is
    /// wider than the source aspect) or one that removes the whole frame.
    pub fn validate(&self, source_height: u32) -> Result<(), CropError> {
        let amount = self.vertical_crop_amount;
        if !amount.is_finite() {
            return Err(CropError::NotFinite);
        }
        if amount < 0.0 {
            return Err(CropError::Negative { amount });
        }
        if amount >= f64::from(source_height) {
            return Err(CropError::ExceedsSource { amount, source_height });
        }
        Ok(())
    }

    /// ffmpeg `crop=w:h:x:y` expression relative to the input size.
    pub fn filter(&self) -> String {
        format!(
            "crop=in_w:in_h-{}:{}:{}",
            self.vertical_crop_amount, self.horizontal_offset, self.vertical_offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_size_target_needs_no_crop() {
        let spec = compute(1920, 1080, 960, 540);
        assert_eq!(spec.vertical_crop_amount, 0.0);
        assert_eq!(spec.vertical_offset, 0.0);
        assert_eq!(spec.horizontal_offset, 0.0);
        assert!(spec.validate(1080).is_ok());
    }

    #[test]
    fn cinema_target_crops_270_rows() {
        let spec = compute(1920, 1080, 1920, 810);
        assert_eq!(spec.vertical_crop_amount, 270.0);
        assert_eq!(spec.vertical_offset, 270.0);
        assert_eq!(spec.filter(), "crop=in_w:in_h-270:0:270");
    }

    #[test]
    fn matches_formula_for_uneven_ratios() {
        let cases = [(1280, 720, 1000, 500), (640, 480, 333, 200), (3840, 2160, 1366, 700)];
        for (sw, sh, tw, th) in cases {
            let spec = compute(sw, sh, tw, th);
            let expected = sh as f64 - th as f64 * (sw as f64 / tw as f64);
            assert!(
                (spec.vertical_crop_amount - expected).abs() < f64::EPSILON * 4096.0,
                "{sw}x{sh} -> {tw}x{th}: got {}, expected {expected}",
                spec.vertical_crop_amount
            );
        }
    }

    #[test]
    fn same_aspect_ratio_yields_zero() {
        for (sw, sh, tw, th) in [(1280, 720, 640, 360), (1920, 1080, 3840, 2160), (800, 600, 400, 300)] {
            assert_eq!(compute(sw, sh, tw, th).vertical_crop_amount, 0.0);
        }
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let a = compute(1366, 768, 1000, 523);
        let b = compute(1366, 768, 1000, 523);
        assert_eq!(a.vertical_crop_amount.to_bits(), b.vertical_crop_amount.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn fractional_amount_is_rendered_exactly() {
        let spec = compute(1000, 600, 400, 239);
        assert_eq!(spec.vertical_crop_amount, 2.5);
        assert_eq!(spec.filter(), "crop=in_w:in_h-2.5:0:2.5");
    }

    #[test]
    fn wider_target_is_rejected() {
        let spec = compute(1920, 1080, 1920, 1200);
        assert_eq!(spec.vertical_crop_amount, -120.0);
        assert_eq!(spec.validate(1080), Err(CropError::Negative { amount: -120.0 }));
    }

    #[test]
    fn crop_consuming_whole_frame_is_rejected() {
        let spec = compute(1920, 1080, 1920, 0);
        assert_eq!(
            spec.validate(1080),
            Err(CropError::ExceedsSource { amount: 1080.0, source_height: 1080 })
        );
    }

    #[test]
    fn zero_target_width_is_not_finite() {
        let spec = compute(1920, 1080, 0, 540);
        assert_eq!(spec.validate(1080), Err(CropError::NotFinite));
    }
}
