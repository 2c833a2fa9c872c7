use crate::coords::PlanarCoordinate;

/// Axis-aligned bounding box in projected-grid meters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        BoundingBox { min, max }
    }

    /// Square box of half-width `buffer_m` around `center`.
    ///
    /// A zero buffer degenerates to a point-sized box; the feature service
    /// accepts that as an exact-point query.
    pub fn from_center_buffer(center: PlanarCoordinate, buffer_m: f64) -> Self {
        BoundingBox {
            min: [center.x - buffer_m, center.y - buffer_m],
            max: [center.x + buffer_m, center.y + buffer_m],
        }
    }

    /// `minx,miny,maxx,maxy` as used in WFS `bbox` query parameters.
    pub fn bbox_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min[0], self.min[1], self.max[0], self.max[1]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;
    use crate::coords::PlanarCoordinate;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_expands_symmetrically() {
        let b = BoundingBox::from_center_buffer(PlanarCoordinate::new(100_000.0, 200_000.0), 500.0);
        assert_eq!(b.min, [99_500.0, 199_500.0]);
        assert_eq!(b.max, [100_500.0, 200_500.0]);
        assert_eq!(b.bbox_param(), "99500,199500,100500,200500");
    }

    #[test]
    fn zero_buffer_degenerates_to_point() {
        let b = BoundingBox::from_center_buffer(PlanarCoordinate::new(1.5, 2.5), 0.0);
        assert_eq!(b.min, b.max);
        assert_eq!(b.bbox_param(), "1.5,2.5,1.5,2.5");
    }
}
