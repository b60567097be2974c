//! Conversion between a [`LocalUser`] and its remote profile document.
//!
//! The remote profile store keeps a flat JSON object per user. The well
//! known keys are `name`, `email` and `avatar-url`; every other key is a
//! free-form metadata field. Going through a serde struct (rather than
//! poking at the map by hand) means a malformed document, say a numeric
//! `name`, is rejected with a [`ProtocolError::Decode`] instead of being
//! silently dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{LocalUser, ProfileData, ProtocolError};

/// Wire shape of a profile document.
///
/// `#[serde(flatten)]` collects every key that isn't one of the named
/// fields into `meta`, and writes `meta` back out as top-level keys.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(
        rename = "avatar-url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    avatar_url: Option<String>,
    #[serde(flatten)]
    meta: BTreeMap<String, Value>,
}

impl LocalUser {
    /// Encodes this user as the document pushed to the profile store.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails, or
    /// [`ProtocolError::InvalidProfile`] if it doesn't produce an object.
    pub fn to_profile(&self) -> Result<ProfileData, ProtocolError> {
        let doc = ProfileDocument {
            name: self.name.clone(),
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
            meta: self
                .meta
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        };
        match serde_json::to_value(doc).map_err(ProtocolError::Encode)? {
            Value::Object(map) => Ok(map),
            other => Err(ProtocolError::InvalidProfile(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    /// Overlays a remote profile document onto this user.
    ///
    /// Keys present in `data` win; keys absent from `data` keep their
    /// local value. Non-string metadata values are kept as their JSON
    /// text so nothing the remote store holds is lost.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if a well-known key has the
    /// wrong type. The user is left unchanged in that case.
    pub fn merge_profile(&mut self, data: &ProfileData) -> Result<(), ProtocolError> {
        let doc: ProfileDocument = serde_json::from_value(Value::Object(data.clone()))
            .map_err(ProtocolError::Decode)?;

        if doc.name.is_some() {
            self.name = doc.name;
        }
        if doc.email.is_some() {
            self.email = doc.email;
        }
        if doc.avatar_url.is_some() {
            self.avatar_url = doc.avatar_url;
        }
        for (key, value) in doc.meta {
            let text = match value {
                Value::String(s) => s,
                Value::Null => continue,
                other => other.to_string(),
            };
            self.meta.insert(key, text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> ProfileData {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_to_profile_uses_wire_keys_and_flattens_meta() {
        let mut user = LocalUser::new("u1");
        user.name = Some("Ada".into());
        user.avatar_url = Some("https://img/ada.png".into());
        user.meta.insert("status".into(), "online".into());

        let profile = user.to_profile().unwrap();

        assert_eq!(profile["name"], json!("Ada"));
        assert_eq!(profile["avatar-url"], json!("https://img/ada.png"));
        assert_eq!(profile["status"], json!("online"));
        assert!(!profile.contains_key("email"), "unset fields are omitted");
    }

    #[test]
    fn test_merge_profile_overrides_only_present_keys() {
        let mut user = LocalUser::new("u1");
        user.name = Some("Local".into());
        user.email = Some("local@b.com".into());

        user.merge_profile(&object(json!({ "name": "Remote", "locale": "en" })))
            .unwrap();

        assert_eq!(user.name.as_deref(), Some("Remote"));
        assert_eq!(user.email.as_deref(), Some("local@b.com"));
        assert_eq!(user.meta.get("locale").map(String::as_str), Some("en"));
    }

    #[test]
    fn test_merge_profile_keeps_non_string_meta_as_json_text() {
        let mut user = LocalUser::new("u1");

        user.merge_profile(&object(json!({ "age": 36, "gone": null })))
            .unwrap();

        assert_eq!(user.meta.get("age").map(String::as_str), Some("36"));
        assert!(!user.meta.contains_key("gone"));
    }

    #[test]
    fn test_merge_profile_wrong_type_returns_decode_error() {
        let mut user = LocalUser::new("u1");
        user.name = Some("Local".into());

        let result = user.merge_profile(&object(json!({ "name": 42 })));

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
        assert_eq!(user.name.as_deref(), Some("Local"), "user left unchanged");
    }
}
