use crate::distance::Point;
use crate::error::{Error, Result};

/// Check that `data` is non-empty, that every point shares the schema of
/// `data[0]`, and that every coordinate is finite.
pub(crate) fn validate_points<P: Point>(data: &[P]) -> Result<()> {
    let first = data.first().ok_or(Error::EmptyInput)?;

    let d = first.dim();
    if d == 0 {
        return Err(Error::InvalidParameter {
            name: "dimension",
            message: "must be at least 1",
        });
    }

    for (index, point) in data.iter().enumerate() {
        if point.dim() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: point.dim(),
            });
        }
        if !point.same_dimensions(first) {
            return Err(Error::SchemaMismatch { index });
        }
        if !point.is_finite() {
            return Err(Error::NonFiniteCoordinate { index });
        }
    }
    Ok(())
}
