//! JSON-RPC 2.0 control-plane client.
//!
//! Methods are namespaced the way the node exposes them:
//!
//! | Method prefix | Path           |
//! |---------------|----------------|
//! | `platform.`   | `/ext/bc/P`    |
//! | `info.`       | `/ext/info`    |
//! | `control.`    | `/ext/control` |

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use subnetctl_types::{ChainId, Network, NodeId, SemVer, SignedTransaction, SubnetId};
use tracing::{debug, info, warn};

use crate::config::ControlPlaneConfig;
use crate::error::{NodeError, NodeResult};
use crate::traits::{ControlPlane, SubnetStats, TxReceipt, ValidatorInfo};

/// Control plane speaking JSON-RPC over HTTP.
pub struct JsonRpcControlPlane {
    config: ControlPlaneConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueTxResult {
    #[serde(rename = "txID")]
    tx_id: String,
    #[serde(default, rename = "createdID")]
    created_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValidator {
    #[serde(rename = "nodeID")]
    node_id: String,
    #[serde(default)]
    weight: Option<String>,
    #[serde(default)]
    stake_amount: Option<String>,
    start_time: String,
    end_time: String,
    #[serde(default)]
    connected: bool,
    #[serde(default)]
    uptime: Option<String>,
}

fn path_for(method: &str) -> &'static str {
    match method.split('.').next() {
        Some("info") => "/ext/info",
        Some("control") => "/ext/control",
        _ => "/ext/bc/P",
    }
}

/// Turn a JSON-RPC response body into its result.
fn decode_envelope<T: DeserializeOwned>(method: &str, body: &str) -> NodeResult<T> {
    let envelope: RpcEnvelope =
        serde_json::from_str(body).map_err(|e| NodeError::InvalidResponse {
            method: method.to_string(),
            message: format!("{}: {}", e, body),
        })?;

    if let Some(err) = envelope.error {
        return Err(NodeError::Rpc {
            method: method.to_string(),
            code: err.code,
            message: err.message,
            diagnostics: err.data.map(|d| match d {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        });
    }

    let result = envelope.result.ok_or_else(|| NodeError::InvalidResponse {
        method: method.to_string(),
        message: "response has neither result nor error".to_string(),
    })?;
    serde_json::from_value(result).map_err(|e| NodeError::InvalidResponse {
        method: method.to_string(),
        message: e.to_string(),
    })
}

fn parse_u64(method: &str, field: &str, raw: &str) -> NodeResult<u64> {
    raw.parse().map_err(|_| NodeError::InvalidResponse {
        method: method.to_string(),
        message: format!("{} is not a number: {}", field, raw),
    })
}

fn convert_validator(method: &str, raw: RawValidator) -> NodeResult<ValidatorInfo> {
    let stake_amount = raw
        .stake_amount
        .as_deref()
        .map(|s| parse_u64(method, "stakeAmount", s))
        .transpose()?;
    let weight = match raw.weight.as_deref() {
        Some(w) => parse_u64(method, "weight", w)?,
        None => stake_amount.unwrap_or(0),
    };
    Ok(ValidatorInfo {
        node_id: NodeId::new(raw.node_id),
        weight,
        start_time: parse_u64(method, "startTime", &raw.start_time)?,
        end_time: parse_u64(method, "endTime", &raw.end_time)?,
        stake_amount,
        connected: raw.connected,
        uptime: raw.uptime.and_then(|u| u.parse().ok()),
    })
}

impl JsonRpcControlPlane {
    /// Create a client for the given endpoints.
    pub fn new(config: ControlPlaneConfig) -> NodeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| NodeError::config(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        network: Network,
        method: &str,
        params: Value,
    ) -> NodeResult<T> {
        let url = format!("{}{}", self.config.endpoint(network), path_for(method));
        debug!(%network, method, url = %url, "Calling node");

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NodeError::Transport {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| NodeError::Transport {
            method: method.to_string(),
            message: format!("failed to read response: {}", e),
        })?;

        if !status.is_success() {
            warn!(%network, method, status = status.as_u16(), body = %body, "Node call failed");
            return Err(NodeError::Http {
                method: method.to_string(),
                status: status.as_u16(),
                diagnostics: body,
            });
        }

        decode_envelope(method, &body)
    }
}

#[async_trait]
impl ControlPlane for JsonRpcControlPlane {
    async fn ensure_running(&self, network: Network, runtime_version: &SemVer) -> NodeResult<()> {
        if network == Network::Local {
            let _: Value = self
                .call(
                    network,
                    "control.ensureRunning",
                    json!({ "runtimeVersion": runtime_version.to_string() }),
                )
                .await?;
            info!(runtime = %runtime_version, "Local network is running");
            return Ok(());
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Bootstrapped {
            is_bootstrapped: bool,
        }

        let result: Bootstrapped = self
            .call(network, "info.isBootstrapped", json!({ "chain": "P" }))
            .await?;
        if !result.is_bootstrapped {
            return Err(NodeError::NotReady(format!(
                "{} node has not finished bootstrapping",
                network
            )));
        }
        Ok(())
    }

    async fn submit(&self, network: Network, tx: &SignedTransaction) -> NodeResult<TxReceipt> {
        let result: IssueTxResult = self
            .call(network, "platform.issueSignedTx", json!({ "tx": tx }))
            .await?;
        info!(%network, kind = %tx.payload.kind(), tx_id = %result.tx_id, "Transaction accepted");
        Ok(TxReceipt {
            tx_id: result.tx_id,
            created_id: result.created_id,
        })
    }

    async fn validators(
        &self,
        network: Network,
        subnet_id: &SubnetId,
    ) -> NodeResult<Vec<ValidatorInfo>> {
        #[derive(Deserialize)]
        struct Validators {
            validators: Vec<RawValidator>,
        }

        let method = "platform.getCurrentValidators";
        let result: Validators = self
            .call(network, method, json!({ "subnetID": subnet_id }))
            .await?;
        result
            .validators
            .into_iter()
            .map(|raw| convert_validator(method, raw))
            .collect()
    }

    async fn subnet_stats(
        &self,
        network: Network,
        subnet_id: &SubnetId,
        chain_id: Option<&ChainId>,
    ) -> NodeResult<SubnetStats> {
        #[derive(Deserialize)]
        struct Height {
            height: String,
        }

        let validators = self.validators(network, subnet_id).await?;
        let height: Height = self.call(network, "platform.getHeight", json!({})).await?;
        let height = parse_u64("platform.getHeight", "height", &height.height)?;

        Ok(SubnetStats::from_validators(
            subnet_id.clone(),
            chain_id.cloned(),
            &validators,
            Some(height),
        ))
    }
}
