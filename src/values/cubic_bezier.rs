use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{CubicBezierIssue, DecodeError, EncodeError};
use serde_json::Value;

/// Timing curve `[x1, y1, x2, y2]`; both x coordinates lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezierValue {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezierValue {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_values(values: &[f64]) -> Result<Self, DecodeError> {
        let invalid = |issue| DecodeError::InvalidCubicBezier {
            values: values.to_vec(),
            issue,
        };

        let &[x1, y1, x2, y2] = values else {
            return Err(invalid(CubicBezierIssue::IncorrectNumberOfValues));
        };
        let x_range = 0.0..=1.0;
        if !x_range.contains(&x1) || !x_range.contains(&x2) {
            return Err(invalid(CubicBezierIssue::XValueOutOfRange));
        }
        Ok(Self::new(x1, y1, x2, y2))
    }
}

impl TokenCodec for CubicBezierValue {
    fn decode(value: &Value, _config: &DecodeConfig) -> Result<Self, DecodeError> {
        let values = codec::expect_array(value, "cubic bezier array")?
            .iter()
            .map(|v| codec::expect_f64(v, "number"))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_values(&values)
    }

    fn encode(&self, _config: &EncodeConfig) -> Result<Value, EncodeError> {
        [self.x1, self.y1, self.x2, self.y2]
            .into_iter()
            .map(codec::number)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_curve() {
        let curve = CubicBezierValue::decode(&json!([0.5, 0, 1, 1.5]), &DecodeConfig::default()).unwrap();
        assert_eq!(curve, CubicBezierValue::new(0.5, 0.0, 1.0, 1.5));
        assert_eq!(
            curve.encode(&EncodeConfig::default()).unwrap(),
            json!([0.5, 0.0, 1.0, 1.5])
        );
    }

    #[test]
    fn test_wrong_arity() {
        assert_eq!(
            CubicBezierValue::from_values(&[0.1, 0.2, 0.3]),
            Err(DecodeError::InvalidCubicBezier {
                values: vec![0.1, 0.2, 0.3],
                issue: CubicBezierIssue::IncorrectNumberOfValues
            })
        );
    }

    #[test]
    fn test_x_out_of_range() {
        let result = CubicBezierValue::from_values(&[0.1, 0.2, 1.3, 0.4]);
        assert!(matches!(
            result,
            Err(DecodeError::InvalidCubicBezier {
                issue: CubicBezierIssue::XValueOutOfRange,
                ..
            })
        ));
        // y values are unconstrained
        assert!(CubicBezierValue::from_values(&[0.1, -2.0, 0.3, 4.0]).is_ok());
    }
}
