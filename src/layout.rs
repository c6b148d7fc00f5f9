//! Page geometry in PDF points

use lopdf::Object;

/// US Letter width in points (8.5")
pub const LETTER_WIDTH: f32 = 612.0;
/// US Letter height in points (11")
pub const LETTER_HEIGHT: f32 = 792.0;

/// A page rectangle `[llx lly urx ury]`, as stored in `/MediaBox` or `/CropBox`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    pub fn new(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// US Letter size (612pt × 792pt) anchored at the origin
    pub fn letter() -> Self {
        Self::new(0.0, 0.0, LETTER_WIDTH, LETTER_HEIGHT)
    }

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Center point of the box
    pub fn center(&self) -> (f32, f32) {
        (self.llx + self.width() / 2.0, self.lly + self.height() / 2.0)
    }

    /// Halve the upper-right corner coordinates, leaving the lower-left corner in place
    pub fn with_halved_upper_right(&self) -> Self {
        Self::new(self.llx, self.lly, self.urx / 2.0, self.ury / 2.0)
    }

    /// Read a box from a 4-element array of numbers
    pub fn from_object(object: &Object) -> Option<Self> {
        let Object::Array(values) = object else {
            return None;
        };
        if values.len() != 4 {
            return None;
        }

        let nums: Vec<f32> = values
            .iter()
            .filter_map(|value| match value {
                Object::Integer(i) => Some(*i as f32),
                Object::Real(r) => Some(*r),
                _ => None,
            })
            .collect();

        match nums.as_slice() {
            [llx, lly, urx, ury] => Some(Self::new(*llx, *lly, *urx, *ury)),
            _ => None,
        }
    }

    pub fn to_object(&self) -> Object {
        Object::Array(vec![
            Object::Real(self.llx),
            Object::Real(self.lly),
            Object::Real(self.urx),
            Object::Real(self.ury),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_dimensions() {
        let letter = PageBox::letter();
        assert_eq!(letter.width(), 612.0);
        assert_eq!(letter.height(), 792.0);
        assert_eq!(letter.center(), (306.0, 396.0));
    }

    #[test]
    fn test_halved_upper_right() {
        let cropped = PageBox::letter().with_halved_upper_right();
        assert_eq!(cropped, PageBox::new(0.0, 0.0, 306.0, 396.0));
    }

    #[test]
    fn test_halved_keeps_lower_left() {
        let cropped = PageBox::new(10.0, 20.0, 200.0, 300.0).with_halved_upper_right();
        assert_eq!(cropped.llx, 10.0);
        assert_eq!(cropped.lly, 20.0);
        assert_eq!(cropped.urx, 100.0);
        assert_eq!(cropped.ury, 150.0);
    }

    #[test]
    fn test_from_object_mixed_numbers() {
        let object = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.5),
            Object::Integer(842),
        ]);
        assert_eq!(
            PageBox::from_object(&object),
            Some(PageBox::new(0.0, 0.0, 595.5, 842.0))
        );
    }

    #[test]
    fn test_from_object_rejects_malformed() {
        assert_eq!(PageBox::from_object(&Object::Integer(3)), None);
        assert_eq!(
            PageBox::from_object(&Object::Array(vec![Object::Integer(0), Object::Integer(0)])),
            None
        );
        let with_name = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Name(b"Wide".to_vec()),
            Object::Integer(842),
        ]);
        assert_eq!(PageBox::from_object(&with_name), None);
    }

    #[test]
    fn test_to_object_round_trip() {
        let page_box = PageBox::new(0.0, 0.0, 306.0, 396.0);
        assert_eq!(PageBox::from_object(&page_box.to_object()), Some(page_box));
    }
}
