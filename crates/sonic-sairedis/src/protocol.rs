//! Request/response protocol spoken with the switch process.
//!
//! Requests go out on [`ASIC_STATE_CHANNEL`] as a [`ChannelMessage`] whose
//! key is the object key and whose fields carry attribute names and JSON
//! values. Every request is answered on [`GETRESPONSE_CHANNEL`] with op
//! `getresponse`, the status name as key and the result fields.

use sonic_sai::{
    AttrId, AttrValue, Attribute, ChannelMessage, FieldValue, ObjectKey, SaiError, SaiResult,
    SaiStatus, StatId, StatsMode,
};

pub const ASIC_STATE_CHANNEL: &str = "ASIC_STATE";
pub const GETRESPONSE_CHANNEL: &str = "GETRESPONSE";
pub const NOTIFICATIONS_CHANNEL: &str = "NOTIFICATIONS";

/// Counter key virtual ids are drawn from.
pub const VIDCOUNTER: &str = "VIDCOUNTER";

pub const OP_CREATE: &str = "create";
pub const OP_REMOVE: &str = "remove";
pub const OP_SET: &str = "set";
pub const OP_GET: &str = "get";
pub const OP_GET_STATS: &str = "get_stats";
pub const OP_CLEAR_STATS: &str = "clear_stats";
pub const OP_FLUSH_FDB: &str = "flush_fdb";
pub const OP_GETRESPONSE: &str = "getresponse";

/// Field carrying the read mode of a `get_stats` request.
pub const STATS_MODE_FIELD: &str = "STATS_MODE";

pub fn encode_attrs(attrs: &[Attribute]) -> SaiResult<Vec<FieldValue>> {
    attrs
        .iter()
        .map(|a| {
            serde_json::to_string(&a.value)
                .map(|v| (a.id.name().to_string(), v))
                .map_err(|e| SaiError::failure(format!("encoding {}: {}", a.id, e)))
        })
        .collect()
}

pub fn decode_attrs(fvs: &[FieldValue]) -> SaiResult<Vec<Attribute>> {
    fvs.iter()
        .map(|(name, value)| {
            let id = AttrId::from_name(name)
                .ok_or_else(|| SaiError::invalid_parameter(format!("unknown attribute {}", name)))?;
            let value: AttrValue = serde_json::from_str(value)
                .map_err(|e| SaiError::invalid_parameter(format!("{}: {}", name, e)))?;
            Ok(Attribute::new(id, value))
        })
        .collect()
}

pub fn request(op: &str, key: &ObjectKey, fvs: Vec<FieldValue>) -> ChannelMessage {
    ChannelMessage::new(op, key.to_string(), fvs)
}

pub fn stats_request(key: &ObjectKey, ids: &[StatId], mode: StatsMode) -> ChannelMessage {
    let mode = match mode {
        StatsMode::Read => "read",
        StatsMode::ReadAndClear => "read_and_clear",
    };
    let mut fvs = vec![(STATS_MODE_FIELD.to_string(), mode.to_string())];
    fvs.extend(ids.iter().map(|id| (id.name().to_string(), String::new())));
    request(OP_GET_STATS, key, fvs)
}

pub fn parse_stats_mode(value: &str) -> SaiResult<StatsMode> {
    match value {
        "read" => Ok(StatsMode::Read),
        "read_and_clear" => Ok(StatsMode::ReadAndClear),
        other => Err(SaiError::invalid_parameter(format!("unknown stats mode {}", other))),
    }
}

pub fn response(status: SaiStatus, fvs: Vec<FieldValue>) -> ChannelMessage {
    ChannelMessage::new(OP_GETRESPONSE, status.name(), fvs)
}

/// Splits a `getresponse` into its status and fields.
pub fn parse_response(msg: ChannelMessage) -> SaiResult<(SaiStatus, Vec<FieldValue>)> {
    if msg.op != OP_GETRESPONSE {
        return Err(SaiError::failure(format!(
            "expected {}, got {}",
            OP_GETRESPONSE, msg.op
        )));
    }
    let status: SaiStatus = msg.key.parse()?;
    Ok((status, msg.fvs))
}

/// Counter values of a `get_stats` response, in request order.
pub fn decode_counters(ids: &[StatId], fvs: &[FieldValue]) -> SaiResult<Vec<u64>> {
    ids.iter()
        .map(|id| {
            let (_, value) = fvs
                .iter()
                .find(|(name, _)| name == id.name())
                .ok_or_else(|| SaiError::failure(format!("response lacks {}", id)))?;
            value
                .parse()
                .map_err(|e| SaiError::failure(format!("{}={}: {}", id, value, e)))
        })
        .collect()
}
