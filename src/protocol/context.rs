//! Normalization of the `@context` field.
//!
//! Every activity handled by this library mentions the Activitystreams context, the security
//! context and an inline mapping for the `Hashtag` and `sensitive` extension terms.
//!
//! ```
//! # use activitypub_boxes::protocol::context::normalize_context;
//! # use serde_json::json;
//! let context = normalize_context(None);
//! assert_eq!(
//!     serde_json::Value::Array(context),
//!     json!([
//!         "https://www.w3.org/ns/activitystreams",
//!         "https://w3id.org/security/v1",
//!         {"Hashtag": "as:Hashtag", "sensitive": "as:sensitive"}
//!     ])
//! );
//! ```

use serde_json::{Map, Value};

/// Activitystreams base context
pub const CTX_AS: &str = "https://www.w3.org/ns/activitystreams";
/// Security context, needed for public keys
pub const CTX_SECURITY: &str = "https://w3id.org/security/v1";

/// Extension terms injected into the trailing context mapping
fn extension_terms() -> [(&'static str, &'static str); 2] {
    [("Hashtag", "as:Hashtag"), ("sensitive", "as:sensitive")]
}

/// Builds the normalized `@context` from whatever was supplied on the wire.
///
/// A missing context becomes the base context. The base and security contexts are added when
/// absent (security appears exactly once), and the extension terms are merged into the last
/// element when it is a mapping, or appended as a new mapping otherwise.
pub fn normalize_context(context: Option<Value>) -> Vec<Value> {
    let mut context = match context {
        None | Some(Value::Null) => vec![Value::from(CTX_AS)],
        Some(Value::Array(list)) => list,
        Some(other) => vec![other],
    };

    if !context.iter().any(|c| c == CTX_AS) {
        context.insert(0, Value::from(CTX_AS));
    }

    let mut seen_security = false;
    context.retain(|c| {
        if c != CTX_SECURITY {
            return true;
        }
        let keep = !seen_security;
        seen_security = true;
        keep
    });
    if !seen_security {
        context.push(Value::from(CTX_SECURITY));
    }

    match context.last_mut() {
        Some(Value::Object(mapping)) => {
            for (term, iri) in extension_terms() {
                mapping.insert(term.to_string(), Value::from(iri));
            }
        }
        _ => {
            let mapping: Map<String, Value> = extension_terms()
                .into_iter()
                .map(|(term, iri)| (term.to_string(), Value::from(iri)))
                .collect();
            context.push(Value::Object(mapping));
        }
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_normalized(context: &[Value]) {
        assert!(context.iter().any(|c| c == CTX_AS));
        assert_eq!(1, context.iter().filter(|c| *c == CTX_SECURITY).count());
        let last = context.last().and_then(Value::as_object);
        assert_eq!(
            Some(&json!("as:Hashtag")),
            last.and_then(|m| m.get("Hashtag"))
        );
        assert_eq!(
            Some(&json!("as:sensitive")),
            last.and_then(|m| m.get("sensitive"))
        );
    }

    #[test]
    fn test_absent_context() {
        let context = normalize_context(None);
        assert_normalized(&context);
        assert_eq!(3, context.len());
    }

    #[test]
    fn test_single_value_context() {
        let context = normalize_context(Some(json!(CTX_AS)));
        assert_normalized(&context);
        assert_eq!(
            json!([
                CTX_AS,
                CTX_SECURITY,
                {"Hashtag": "as:Hashtag", "sensitive": "as:sensitive"}
            ]),
            Value::Array(context)
        );
    }

    #[test]
    fn test_trailing_mapping_is_extended() {
        let context = normalize_context(Some(json!([
            CTX_AS,
            CTX_SECURITY,
            {"toot": "http://joinmastodon.org/ns#"}
        ])));
        assert_normalized(&context);
        assert_eq!(3, context.len());
        assert_eq!(
            Some(&json!("http://joinmastodon.org/ns#")),
            context[2].get("toot")
        );
    }

    #[test]
    fn test_security_context_deduplicated() {
        let context = normalize_context(Some(json!([
            CTX_SECURITY,
            "https://example.com/ns",
            CTX_SECURITY
        ])));
        assert_normalized(&context);
        assert_eq!(json!(CTX_AS), context[0]);
        assert_eq!(json!("https://example.com/ns"), context[2]);
    }

    #[test]
    fn test_normalization_is_stable() {
        let once = normalize_context(Some(json!("https://example.com/ns")));
        let twice = normalize_context(Some(Value::Array(once.clone())));
        assert_eq!(once, twice);
    }
}
