//! `{type, data}` envelopes for saving and loading effects, media objects
//! and media timelines.
//!
//! Effect data is `{options: {startTick, endTick, ...}, guid}`; media
//! timeline data is `{effects: [Envelope...], mediaObject: Envelope | null}`.
//! Loading dispatches on the type name through an explicit match; there is no
//! runtime type registry.

use animates_property_core::TypeRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::TimelineConfig;
use crate::effect::Effect;
use crate::effects::{MoveEffect, MultiPointRotateEffect};
use crate::error::{Result, TimelineError};
use crate::finite::FiniteEffect;
use crate::ids::Guid;
use crate::media_object::MediaObject;
use crate::timeline::MediaTimeline;

pub const MEDIA_OBJECT: &str = "MediaObject";
pub const MEDIA_TIMELINE: &str = "MediaTimeline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub type_name: String,
    pub data: Value,
}

impl Envelope {
    pub fn new(type_name: impl Into<String>, data: Value) -> Self {
        Self {
            type_name: type_name.into(),
            data,
        }
    }

    fn expect_type(&self, expected: &str) -> Result<()> {
        if self.type_name == expected {
            Ok(())
        } else {
            Err(invalid(expected, format!("found type '{}'", self.type_name)))
        }
    }

    fn field(&self, expected: &str, name: &str) -> Result<&Value> {
        self.data
            .get(name)
            .ok_or_else(|| invalid(expected, format!("missing '{name}'")))
    }
}

fn invalid(expected: &str, reason: String) -> TimelineError {
    TimelineError::InvalidEnvelope {
        expected: expected.to_string(),
        reason,
    }
}

pub fn effect_to_envelope(effect: &dyn Effect) -> Envelope {
    Envelope::new(
        effect.kind(),
        json!({
            "options": effect.options().values_to_json(),
            "guid": effect.guid(),
        }),
    )
}

/// Rebuild an effect, keeping its saved guid.
pub fn effect_from_envelope(
    envelope: &Envelope,
    registry: &TypeRegistry,
    config: &TimelineConfig,
) -> Result<Box<dyn Effect>> {
    let kind = envelope.type_name.as_str();
    let guid = envelope
        .field(kind, "guid")?
        .as_str()
        .map(Guid::from)
        .ok_or_else(|| invalid(kind, "guid is not a string".to_string()))?;
    let options = envelope
        .data
        .get("options")
        .cloned()
        .unwrap_or_else(|| json!({}));

    let effect: Box<dyn Effect> = match kind {
        FiniteEffect::KIND => Box::new(FiniteEffect::with_guid(guid, &options, registry, config)?),
        MoveEffect::KIND => Box::new(MoveEffect::with_guid(guid, &options, registry, config)?),
        MultiPointRotateEffect::KIND => Box::new(MultiPointRotateEffect::with_guid(
            guid, &options, registry, config,
        )?),
        other => {
            return Err(TimelineError::UnknownEffectType {
                type_name: other.to_string(),
            })
        }
    };
    Ok(effect)
}

pub fn media_object_to_envelope(object: &MediaObject) -> Result<Envelope> {
    Ok(Envelope::new(MEDIA_OBJECT, serde_json::to_value(object)?))
}

pub fn media_object_from_envelope(envelope: &Envelope) -> Result<MediaObject> {
    envelope.expect_type(MEDIA_OBJECT)?;
    envelope.field(MEDIA_OBJECT, "guid")?;
    Ok(serde_json::from_value(envelope.data.clone())?)
}

impl MediaTimeline {
    pub fn to_envelope(&self) -> Result<Envelope> {
        let effects: Vec<Envelope> = self.effects().map(effect_to_envelope).collect();
        let media_object = match self.media_object() {
            Some(object) => serde_json::to_value(media_object_to_envelope(&object.borrow())?)?,
            None => Value::Null,
        };
        Ok(Envelope::new(
            MEDIA_TIMELINE,
            json!({
                "effects": effects,
                "mediaObject": media_object,
            }),
        ))
    }

    /// Load a timeline with a fresh media object taken from the envelope.
    /// Effects keep their saved guids and order.
    pub fn from_envelope(
        envelope: &Envelope,
        registry: &TypeRegistry,
        config: &TimelineConfig,
    ) -> Result<MediaTimeline> {
        envelope.expect_type(MEDIA_TIMELINE)?;
        let media_object = match envelope.data.get("mediaObject") {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let object_envelope: Envelope = serde_json::from_value(raw.clone())?;
                Some(media_object_from_envelope(&object_envelope)?.into_shared())
            }
        };
        let effects: Vec<Envelope> =
            serde_json::from_value(envelope.field(MEDIA_TIMELINE, "effects")?.clone())?;

        let mut timeline = MediaTimeline::with_config(media_object, config.clone());
        for effect in &effects {
            timeline.add_effect(effect_from_envelope(effect, registry, config)?);
        }
        Ok(timeline)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_envelope()?)?)
    }

    pub fn from_json(
        json: &str,
        registry: &TypeRegistry,
        config: &TimelineConfig,
    ) -> Result<MediaTimeline> {
        let envelope: Envelope = serde_json::from_str(json)?;
        Self::from_envelope(&envelope, registry, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_effect_envelope_shape() {
        let reg = TypeRegistry::with_builtins();
        let cfg = TimelineConfig::default();
        let fx = FiniteEffect::new(&json!({}), &reg, &cfg).unwrap();
        let env = effect_to_envelope(&fx);
        assert_eq!(env.type_name, "FiniteEffect");
        let data = env.data.as_object().unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["options", "guid"]);
        assert_eq!(env.data["options"], json!({"startTick": 0, "endTick": 100}));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let reg = TypeRegistry::with_builtins();
        let cfg = TimelineConfig::default();
        let env = Envelope::new("GlowEffect", json!({"guid": "g", "options": {}}));
        assert!(matches!(
            effect_from_envelope(&env, &reg, &cfg),
            Err(TimelineError::UnknownEffectType { .. })
        ));
    }

    #[test]
    fn missing_guid_is_rejected() {
        let reg = TypeRegistry::with_builtins();
        let cfg = TimelineConfig::default();
        let env = Envelope::new("FiniteEffect", json!({"options": {}}));
        assert!(matches!(
            effect_from_envelope(&env, &reg, &cfg),
            Err(TimelineError::InvalidEnvelope { .. })
        ));
    }

    #[test]
    fn media_object_envelope_type_is_checked() {
        let env = Envelope::new("Canvas", json!({"guid": "g", "properties": {}}));
        assert!(media_object_from_envelope(&env).is_err());
    }
}
