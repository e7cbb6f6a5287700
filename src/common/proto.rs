//! Wire protocol for the dstripe control plane
//!
//! JSON over UDP, one message per datagram. Request envelopes carry a
//! command name, a sender-chosen transaction id (echoed verbatim in the
//! response), a sender descriptor and a command-specific payload. Response
//! envelopes carry the transaction id, a 0/1 return code, a reason code on
//! failure and structured data on `configure-dss` success.
//!
//! Envelope decoding is lenient: missing envelope fields fall back to
//! defaults so a request with an absent or unknown command still earns an
//! `invalid-params` response with its transaction id echoed. Bytes that are
//! not a well-formed JSON object fail with [`Error::MalformedMessage`] and
//! the datagram is dropped without a response. Per-command payloads are
//! strict records; the dispatcher rejects a payload that does not
//! deserialize before it reaches the registry.

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest message the control plane will send or receive (single datagram)
pub const MAX_DATAGRAM: usize = 65535;

/// Return code for a successful operation
pub const SUCCESS: u8 = 0;
/// Return code for a failed operation
pub const FAILURE: u8 = 1;

pub const CMD_REGISTER_USER: &str = "register-user";
pub const CMD_DEREGISTER_USER: &str = "deregister-user";
pub const CMD_REGISTER_DISK: &str = "register-disk";
pub const CMD_DEREGISTER_DISK: &str = "deregister-disk";
pub const CMD_CONFIGURE_DSS: &str = "configure-dss";

/// Identity and endpoints of the sending agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub name: String,
    pub ip: String,
    pub mport: u16,
    pub cport: u16,
}

/// Request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub cmd: String,

    #[serde(default = "default_txid")]
    pub txid: String,

    #[serde(default)]
    pub from: AgentDescriptor,

    #[serde(default)]
    pub payload: serde_json::Value,
}

fn default_txid() -> String {
    "-".to_string()
}

/// Response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub txid: String,

    pub ret: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DssDescriptor>,
}

impl Response {
    pub fn success(txid: String) -> Self {
        Self {
            txid,
            ret: SUCCESS,
            reason: None,
            data: None,
        }
    }

    pub fn success_with(txid: String, data: DssDescriptor) -> Self {
        Self {
            txid,
            ret: SUCCESS,
            reason: None,
            data: Some(data),
        }
    }

    pub fn failure(txid: String, reason: String) -> Self {
        Self {
            txid,
            ret: FAILURE,
            reason: Some(reason),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.ret == SUCCESS
    }
}

// === Command payloads ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUserPayload {
    pub user_name: String,
    pub ip: String,
    pub mport: u16,
    pub cport: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeregisterUserPayload {
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterDiskPayload {
    pub disk_name: String,
    pub ip: String,
    pub mport: u16,
    pub cport: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeregisterDiskPayload {
    pub disk_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigureDssPayload {
    pub dss_name: String,
    pub n: usize,
    pub striping_unit: u32,
}

// === configure-dss response data ===

/// Endpoint a requester uses to reach one array member directly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskEndpoint {
    pub disk_name: String,
    pub ip: String,
    pub cport: u16,
}

/// A configured storage array with its member endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DssDescriptor {
    pub dss_name: String,
    pub n: usize,
    pub striping_unit: u32,
    pub disks: Vec<DiskEndpoint>,
}

// === Codec ===

pub fn encode_request(req: &Request) -> Result<Vec<u8>> {
    serde_json::to_vec(req).map_err(|e| Error::Internal(format!("encode request: {}", e)))
}

pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    serde_json::from_slice(bytes).map_err(|e| Error::MalformedMessage(e.to_string()))
}

pub fn encode_response(resp: &Response) -> Result<Vec<u8>> {
    serde_json::to_vec(resp).map_err(|e| Error::Internal(format!("encode response: {}", e)))
}

pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    serde_json::from_slice(bytes).map_err(|e| Error::MalformedMessage(e.to_string()))
}
