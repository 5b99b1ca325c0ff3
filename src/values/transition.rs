use super::composite::{self, CompositeField};
use super::{CubicBezierValue, DurationValue};
use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionValue {
    pub duration: CompositeField<DurationValue>,
    pub delay: CompositeField<DurationValue>,
    pub timing_function: CompositeField<CubicBezierValue>,
}

impl TokenCodec for TransitionValue {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        let map = codec::expect_object(value, "transition object")?;
        Ok(Self {
            duration: composite::field(map, "duration", config)?,
            delay: composite::field(map, "delay", config)?,
            timing_function: composite::field(map, "timingFunction", config)?,
        })
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        let mut map = Map::new();
        composite::put(&mut map, "duration", &self.duration, config)?;
        composite::put(&mut map, "delay", &self.delay, config)?;
        composite::put(&mut map, "timingFunction", &self.timing_function, config)?;
        Ok(Value::Object(map))
    }
}

impl CompositeToken for TransitionValue {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        Ok(Self {
            duration: self.duration.resolve_aliases(resolver, visited)?,
            delay: self.delay.resolve_aliases(resolver, visited)?,
            timing_function: self.timing_function.resolve_aliases(resolver, visited)?,
        })
    }
}
