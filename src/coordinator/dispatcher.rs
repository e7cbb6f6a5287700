//! Command dispatch
//!
//! Maps a decoded request onto the matching registry operation and folds the
//! outcome into a wire response. Every request that reached this point gets
//! exactly one response carrying its txid; failures travel as reason codes,
//! never as dropped datagrams.

use crate::common::proto::{
    AgentDescriptor, ConfigureDssPayload, DeregisterDiskPayload, DeregisterUserPayload,
    DssDescriptor, RegisterDiskPayload, RegisterUserPayload, Request, Response, CMD_CONFIGURE_DSS,
    CMD_DEREGISTER_DISK, CMD_DEREGISTER_USER, CMD_REGISTER_DISK, CMD_REGISTER_USER,
};
use crate::common::{Error, Result};
use crate::coordinator::registry::Registry;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Execute one request against the registry and produce its response.
pub fn dispatch(registry: &mut Registry, request: Request) -> Response {
    let Request {
        cmd,
        txid,
        from,
        payload,
    } = request;
    tracing::debug!("{} from {} (txid {})", cmd, from.name, txid);

    match route(registry, &cmd, payload) {
        Ok(Some(descriptor)) => Response::success_with(txid, descriptor),
        Ok(None) => Response::success(txid),
        Err(err) => {
            tracing::warn!("{} refused: {} (txid {})", cmd, err, txid);
            Response::failure(txid, err.reason_code())
        }
    }
}

fn route(registry: &mut Registry, cmd: &str, payload: Value) -> Result<Option<DssDescriptor>> {
    match cmd {
        CMD_REGISTER_USER => {
            let payload: RegisterUserPayload = parse(payload)?;
            let name = payload.user_name.clone();
            registry.register_user(payload)?;
            tracing::info!("user {} registered", name);
            Ok(None)
        }
        CMD_DEREGISTER_USER => {
            let payload: DeregisterUserPayload = parse(payload)?;
            let name = payload.user_name.clone();
            registry.deregister_user(payload)?;
            tracing::info!("user {} deregistered", name);
            Ok(None)
        }
        CMD_REGISTER_DISK => {
            let payload: RegisterDiskPayload = parse(payload)?;
            let name = payload.disk_name.clone();
            registry.register_disk(payload)?;
            tracing::info!(
                "disk {} registered ({} free)",
                name,
                registry.free_disk_count()
            );
            Ok(None)
        }
        CMD_DEREGISTER_DISK => {
            let payload: DeregisterDiskPayload = parse(payload)?;
            let name = payload.disk_name.clone();
            registry.deregister_disk(payload)?;
            tracing::info!(
                "disk {} deregistered ({} free)",
                name,
                registry.free_disk_count()
            );
            Ok(None)
        }
        CMD_CONFIGURE_DSS => {
            let payload: ConfigureDssPayload = parse(payload)?;
            let descriptor = registry.configure_dss(payload)?;
            tracing::info!(
                "dss {} configured: {} disks, striping unit {}",
                descriptor.dss_name,
                descriptor.n,
                descriptor.striping_unit
            );
            Ok(Some(descriptor))
        }
        other => Err(Error::InvalidParams(format!("unknown command {:?}", other))),
    }
}

/// Deserialize a typed payload; anything missing or mistyped is the caller's
/// parameter error, not a server fault.
fn parse<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| Error::InvalidParams(e.to_string()))
}
