// crates/playback-decision-core/src/runtime/decode.rs
// ============================================================================
// Module: Playback Decision Wire Decoder
// Description: Strict dual-schema (compact/legacy) request decoding.
// Purpose: Turn untrusted request bytes into a typed input or a 400 problem.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! Requests arrive in either the compact schema (`source`, `caps`, `policy`,
//! `api`, `rid`) or the legacy schema (`Source`, `Capabilities`, `Policy`,
//! `APIVersion`, `RequestID`). The decoder scans raw key presence before any
//! typed decoding and rejects every mixture of the two families, at the root
//! and inside each nested object. Field selection is presence-aware: the key
//! that was actually present is decoded, so `false`, `0` and `""` are never
//! confused with absence.
//!
//! Security posture: request bytes are untrusted and size-bounded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::Capabilities;
use crate::core::DecisionInput;
use crate::core::MaxVideoDimensions;
use crate::core::Policy;
use crate::core::Problem;
use crate::core::Source;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum request body size in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Key Tables
// ============================================================================

/// Compact and legacy spellings of one logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPair {
    /// Compact spelling.
    pub compact: &'static str,
    /// Legacy spelling.
    pub legacy: &'static str,
}

/// Builds a key pair.
const fn pair(compact: &'static str, legacy: &'static str) -> KeyPair {
    KeyPair {
        compact,
        legacy,
    }
}

/// Root keys. Single source of truth for decoding and schema classification.
pub const ROOT_KEYS: [KeyPair; 5] = [
    pair("source", "Source"),
    pair("caps", "Capabilities"),
    pair("policy", "Policy"),
    pair("api", "APIVersion"),
    pair("rid", "RequestID"),
];

/// Separation rules for one nested object.
#[derive(Debug, Clone, Copy)]
pub struct KeyRules {
    /// Root key pair under which the object appears.
    pub root: KeyPair,
    /// Synonym pairs that must never cross schemas.
    pub pairs: &'static [KeyPair],
    /// Keys spelled identically in both schemas.
    pub shared: &'static [&'static str],
}

/// Source object rules.
pub const SOURCE_RULES: KeyRules = KeyRules {
    root: ROOT_KEYS[0],
    pairs: &[
        pair("c", "container"),
        pair("v", "videoCodec"),
        pair("a", "audioCodec"),
        pair("br", "bitrateKbps"),
        pair("w", "width"),
        pair("h", "height"),
    ],
    shared: &["fps"],
};

/// Capabilities object rules.
pub const CAPS_RULES: KeyRules = KeyRules {
    root: ROOT_KEYS[1],
    pairs: &[
        pair("v", "version"),
        pair("c", "containers"),
        pair("vc", "videoCodecs"),
        pair("ac", "audioCodecs"),
        pair("hls", "supportsHls"),
        pair("rng", "supportsRange"),
        pair("dev", "deviceType"),
        pair("mv", "maxVideo"),
    ],
    shared: &[],
};

/// Policy object rules.
pub const POLICY_RULES: KeyRules = KeyRules {
    root: ROOT_KEYS[2],
    pairs: &[pair("tx", "allowTranscode")],
    shared: &[],
};

/// Every nested object rule set, in check order.
pub const NESTED_RULES: [KeyRules; 3] = [SOURCE_RULES, CAPS_RULES, POLICY_RULES];

/// Key table construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyRulesError {
    /// A pair spells both keys identically.
    #[error("invalid key rules: pair has identical keys: {0}")]
    IdenticalPair(&'static str),
    /// A pair key is also marked shared.
    #[error("invalid key rules: key is marked shared: {0}")]
    SharedInPair(&'static str),
}

/// Checks that no rule set lets a shared key drift into its synonym pairs.
///
/// # Errors
///
/// Returns [`KeyRulesError`] for the first malformed pair.
pub fn verify_key_rules(rules: &KeyRules) -> Result<(), KeyRulesError> {
    for entry in rules.pairs {
        if entry.compact == entry.legacy {
            return Err(KeyRulesError::IdenticalPair(entry.compact));
        }
        for key in [entry.compact, entry.legacy] {
            if rules.shared.contains(&key) {
                return Err(KeyRulesError::SharedInPair(key));
            }
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Schema Classification
// ============================================================================

/// Schema family detected at the request root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Compact keys only.
    Compact,
    /// Legacy keys only.
    Legacy,
    /// Both families present.
    Mixed,
    /// No recognized key or not a JSON object.
    Unknown,
}

impl SchemaKind {
    /// Returns a stable label for the schema kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Legacy => "legacy",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }
}

/// Classifies root key families of a parsed object.
fn scan_root(root: &Map<String, Value>) -> SchemaKind {
    let has_compact = ROOT_KEYS.iter().any(|keys| root.contains_key(keys.compact));
    let has_legacy = ROOT_KEYS.iter().any(|keys| root.contains_key(keys.legacy));
    match (has_compact, has_legacy) {
        (true, true) => SchemaKind::Mixed,
        (true, false) => SchemaKind::Compact,
        (false, true) => SchemaKind::Legacy,
        (false, false) => SchemaKind::Unknown,
    }
}

/// Classifies the schema family of raw request bytes.
#[must_use]
pub fn classify_schema(bytes: &[u8]) -> SchemaKind {
    serde_json::from_slice::<Map<String, Value>>(bytes)
        .map_or(SchemaKind::Unknown, |root| scan_root(&root))
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decoded request with the schema family it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRequest {
    /// Typed, not yet normalized input.
    pub input: DecisionInput,
    /// Root schema family.
    pub schema: SchemaKind,
}

/// Decodes a request using the default size limit.
///
/// # Errors
///
/// Returns a 400 [`Problem`] for any malformed, mixed, or unknown schema.
pub fn decode_decision_input(bytes: &[u8]) -> Result<DecisionInput, Problem> {
    decode_request(bytes, DEFAULT_MAX_INPUT_BYTES).map(|decoded| decoded.input)
}

/// Decodes a request, rejecting bodies larger than `max_bytes`.
///
/// # Errors
///
/// Returns a 400 [`Problem`] for any malformed, mixed, or unknown schema.
pub fn decode_request(bytes: &[u8], max_bytes: usize) -> Result<DecodedRequest, Problem> {
    if bytes.len() > max_bytes {
        return Err(Problem::invalid(
            "Payload Too Large",
            format!("Fail-Closed: request body exceeds {max_bytes} bytes"),
        ));
    }
    let root: Map<String, Value> = serde_json::from_slice(bytes)
        .map_err(|err| Problem::invalid("Invalid JSON", err.to_string()))?;
    if root.is_empty() {
        return Err(Problem::invalid(
            "Empty Request",
            "Fail-Closed: Request object cannot be empty",
        ));
    }
    for keys in ROOT_KEYS {
        if root.contains_key(keys.compact) && root.contains_key(keys.legacy) {
            return Err(Problem::mixed_schema(&format!(
                "top-level {} vs {}",
                keys.compact, keys.legacy
            )));
        }
    }
    reject_unknown_root_keys(&root)?;
    let schema = scan_root(&root);
    match schema {
        SchemaKind::Mixed => {
            return Err(Problem::mixed_schema("mixture of legacy and compact root keys"));
        }
        SchemaKind::Unknown => {
            return Err(Problem::invalid(
                "Schema Undetermined",
                "Fail-Closed: Request must use legacy or compact root keys",
            ));
        }
        SchemaKind::Compact | SchemaKind::Legacy => {}
    }
    for rules in &NESTED_RULES {
        require_object(&root, rules.root.compact)?;
        require_object(&root, rules.root.legacy)?;
    }
    for rules in &NESTED_RULES {
        check_nested_overlap(&root, rules)?;
    }

    let input = DecisionInput {
        source: decode_section::<CompactSource, LegacySource, Source>(&root, SOURCE_RULES.root)?,
        capabilities: decode_section::<CompactCaps, LegacyCaps, Capabilities>(
            &root,
            CAPS_RULES.root,
        )?,
        policy: decode_section::<CompactPolicy, LegacyPolicy, Policy>(&root, POLICY_RULES.root)?,
        api_version: decode_string(&root, ROOT_KEYS[3])?,
        request_id: decode_string(&root, ROOT_KEYS[4])?,
    };
    Ok(DecodedRequest {
        input,
        schema,
    })
}

/// Rejects any root key outside [`ROOT_KEYS`].
fn reject_unknown_root_keys(root: &Map<String, Value>) -> Result<(), Problem> {
    let unknown = root.keys().find(|key| {
        !ROOT_KEYS.iter().any(|keys| keys.compact == key.as_str() || keys.legacy == key.as_str())
    });
    match unknown {
        Some(key) => Err(Problem::invalid(
            "Unknown Root Key",
            format!("Fail-Closed: Unknown root key \"{key}\""),
        )),
        None => Ok(()),
    }
}

/// Requires a present nested root to be a JSON object.
fn require_object(root: &Map<String, Value>, key: &str) -> Result<(), Problem> {
    match root.get(key) {
        None | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(Problem::invalid(
            "Invalid Structure",
            format!("Fail-Closed: {key} must be an object"),
        )),
    }
}

/// Rejects nested objects carrying keys from the other schema family.
fn check_nested_overlap(root: &Map<String, Value>, rules: &KeyRules) -> Result<(), Problem> {
    if let Some(Value::Object(object)) = root.get(rules.root.compact) {
        for entry in rules.pairs {
            if !rules.shared.contains(&entry.legacy) && object.contains_key(entry.legacy) {
                return Err(Problem::mixed_schema(&format!(
                    "nested {}: contains legacy key {} ({} vs {})",
                    rules.root.compact, entry.legacy, entry.compact, entry.legacy
                )));
            }
        }
    }
    if let Some(Value::Object(object)) = root.get(rules.root.legacy) {
        for entry in rules.pairs {
            if !rules.shared.contains(&entry.compact) && object.contains_key(entry.compact) {
                return Err(Problem::mixed_schema(&format!(
                    "nested {}: contains compact key {} ({} vs {})",
                    rules.root.legacy, entry.compact, entry.compact, entry.legacy
                )));
            }
        }
    }
    Ok(())
}

/// Decodes one nested section from whichever spelling is present.
fn decode_section<C, L, T>(root: &Map<String, Value>, keys: KeyPair) -> Result<T, Problem>
where
    C: DeserializeOwned + Into<T>,
    L: DeserializeOwned + Into<T>,
    T: Default,
{
    if let Some(value) = root.get(keys.compact) {
        return typed::<C>(value, keys.compact).map(Into::into);
    }
    if let Some(value) = root.get(keys.legacy) {
        return typed::<L>(value, keys.legacy).map(Into::into);
    }
    Ok(T::default())
}

/// Decodes a typed value, mapping type errors to a decode problem.
fn typed<T: DeserializeOwned>(value: &Value, key: &str) -> Result<T, Problem> {
    T::deserialize(value)
        .map_err(|err| Problem::invalid("Decode Failure", format!("{key}: {err}")))
}

/// Decodes a root string field from whichever spelling is present.
fn decode_string(root: &Map<String, Value>, keys: KeyPair) -> Result<String, Problem> {
    let found = root
        .get(keys.compact)
        .map(|value| (keys.compact, value))
        .or_else(|| root.get(keys.legacy).map(|value| (keys.legacy, value)));
    match found {
        None | Some((_, Value::Null)) => Ok(String::new()),
        Some((_, Value::String(text))) => Ok(text.clone()),
        Some((key, _)) => {
            Err(Problem::invalid("Decode Failure", format!("{key}: expected a string")))
        }
    }
}

/// Deserializes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// Compact source object.
#[derive(Deserialize)]
struct CompactSource {
    /// Container.
    #[serde(default, deserialize_with = "null_as_default")]
    c: String,
    /// Video codec.
    #[serde(default, deserialize_with = "null_as_default")]
    v: String,
    /// Audio codec.
    #[serde(default, deserialize_with = "null_as_default")]
    a: String,
    /// Bitrate in kbps.
    #[serde(default, deserialize_with = "null_as_default")]
    br: i64,
    /// Width.
    #[serde(default, deserialize_with = "null_as_default")]
    w: i64,
    /// Height.
    #[serde(default, deserialize_with = "null_as_default")]
    h: i64,
    /// Frames per second.
    #[serde(default, deserialize_with = "null_as_default")]
    fps: f64,
}

impl From<CompactSource> for Source {
    fn from(wire: CompactSource) -> Self {
        Self {
            container: wire.c,
            video_codec: wire.v,
            audio_codec: wire.a,
            bitrate_kbps: wire.br,
            width: wire.w,
            height: wire.h,
            fps: wire.fps,
        }
    }
}

/// Legacy source object.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacySource {
    /// Container.
    #[serde(default, deserialize_with = "null_as_default")]
    container: String,
    /// Video codec.
    #[serde(default, deserialize_with = "null_as_default")]
    video_codec: String,
    /// Audio codec.
    #[serde(default, deserialize_with = "null_as_default")]
    audio_codec: String,
    /// Bitrate in kbps.
    #[serde(default, deserialize_with = "null_as_default")]
    bitrate_kbps: i64,
    /// Width.
    #[serde(default, deserialize_with = "null_as_default")]
    width: i64,
    /// Height.
    #[serde(default, deserialize_with = "null_as_default")]
    height: i64,
    /// Frames per second.
    #[serde(default, deserialize_with = "null_as_default")]
    fps: f64,
}

impl From<LegacySource> for Source {
    fn from(wire: LegacySource) -> Self {
        Self {
            container: wire.container,
            video_codec: wire.video_codec,
            audio_codec: wire.audio_codec,
            bitrate_kbps: wire.bitrate_kbps,
            width: wire.width,
            height: wire.height,
            fps: wire.fps,
        }
    }
}

/// Compact max video dimensions.
#[derive(Deserialize)]
struct CompactMaxVideo {
    /// Width.
    #[serde(default, deserialize_with = "null_as_default")]
    w: i64,
    /// Height.
    #[serde(default, deserialize_with = "null_as_default")]
    h: i64,
}

/// Legacy max video dimensions.
#[derive(Deserialize)]
struct LegacyMaxVideo {
    /// Width.
    #[serde(default, deserialize_with = "null_as_default")]
    width: i64,
    /// Height.
    #[serde(default, deserialize_with = "null_as_default")]
    height: i64,
}

/// Compact capabilities object.
#[derive(Deserialize)]
struct CompactCaps {
    /// Capabilities version.
    #[serde(default)]
    v: Option<i64>,
    /// Containers.
    #[serde(default, deserialize_with = "null_as_default")]
    c: Vec<String>,
    /// Video codecs.
    #[serde(default, deserialize_with = "null_as_default")]
    vc: Vec<String>,
    /// Audio codecs.
    #[serde(default, deserialize_with = "null_as_default")]
    ac: Vec<String>,
    /// Segmented delivery support.
    #[serde(default, deserialize_with = "null_as_default")]
    hls: bool,
    /// Range support.
    #[serde(default)]
    rng: Option<bool>,
    /// Device type.
    #[serde(default, deserialize_with = "null_as_default")]
    dev: String,
    /// Max video dimensions.
    #[serde(default)]
    mv: Option<CompactMaxVideo>,
}

impl From<CompactCaps> for Capabilities {
    fn from(wire: CompactCaps) -> Self {
        Self {
            version: wire.v,
            containers: wire.c,
            video_codecs: wire.vc,
            audio_codecs: wire.ac,
            supports_hls: wire.hls,
            supports_range: wire.rng,
            max_video: wire.mv.map(|dims| MaxVideoDimensions {
                width: dims.w,
                height: dims.h,
            }),
            device_type: wire.dev,
        }
    }
}

/// Legacy capabilities object.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCaps {
    /// Capabilities version.
    #[serde(default)]
    version: Option<i64>,
    /// Containers.
    #[serde(default, deserialize_with = "null_as_default")]
    containers: Vec<String>,
    /// Video codecs.
    #[serde(default, deserialize_with = "null_as_default")]
    video_codecs: Vec<String>,
    /// Audio codecs.
    #[serde(default, deserialize_with = "null_as_default")]
    audio_codecs: Vec<String>,
    /// Segmented delivery support.
    #[serde(default, deserialize_with = "null_as_default")]
    supports_hls: bool,
    /// Range support.
    #[serde(default)]
    supports_range: Option<bool>,
    /// Device type.
    #[serde(default, deserialize_with = "null_as_default")]
    device_type: String,
    /// Max video dimensions.
    #[serde(default)]
    max_video: Option<LegacyMaxVideo>,
}

impl From<LegacyCaps> for Capabilities {
    fn from(wire: LegacyCaps) -> Self {
        Self {
            version: wire.version,
            containers: wire.containers,
            video_codecs: wire.video_codecs,
            audio_codecs: wire.audio_codecs,
            supports_hls: wire.supports_hls,
            supports_range: wire.supports_range,
            max_video: wire.max_video.map(|dims| MaxVideoDimensions {
                width: dims.width,
                height: dims.height,
            }),
            device_type: wire.device_type,
        }
    }
}

/// Compact policy object.
#[derive(Deserialize)]
struct CompactPolicy {
    /// Allow transcode.
    #[serde(default, deserialize_with = "null_as_default")]
    tx: bool,
}

impl From<CompactPolicy> for Policy {
    fn from(wire: CompactPolicy) -> Self {
        Self {
            allow_transcode: wire.tx,
        }
    }
}

/// Legacy policy object.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyPolicy {
    /// Allow transcode.
    #[serde(default, deserialize_with = "null_as_default")]
    allow_transcode: bool,
}

impl From<LegacyPolicy> for Policy {
    fn from(wire: LegacyPolicy) -> Self {
        Self {
            allow_transcode: wire.allow_transcode,
        }
    }
}
