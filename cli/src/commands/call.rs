use anyhow::{Context, bail};
use executor_core::tokio::TokioGlobal;
use serde_json::Value;

use tether::ChannelKind;
use tether::channel;
use tether::ipc::protocol::{decode, encode};
use tether::{SocketTransport, Transport};

use crate::cli::CallArgs;
use crate::config::MergedConfig;
use crate::error::CliResult;

pub async fn execute(args: CallArgs, config: MergedConfig) -> CliResult<()> {
    let kind = channel::lookup(&args.channel)
        .with_context(|| format!("unknown channel: {}", args.channel))?;
    let payload = build_payload(args.args.as_deref())?;

    let transport = SocketTransport::connect(&config.transport, TokioGlobal)
        .await
        .with_context(|| {
            format!(
                "failed to connect to {}",
                config.transport.socket_path().display()
            )
        })?;

    tracing::debug!(channel = %args.channel, ?kind, "calling host");

    let reply = if kind == ChannelKind::Blocking {
        if payload != encode(&())? {
            bail!("{} takes no arguments", args.channel);
        }
        tokio::task::block_in_place(|| transport.blocking_call(&args.channel))?
    } else {
        // One-way channels go out as requests too, so the host's ack
        // arrives before this process exits.
        transport.request(&args.channel, payload).await?
    };

    let value: Value = decode(&reply).context("failed to decode host reply")?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Encode a JSON argument array as the channel's argument tuple
fn build_payload(args: Option<&str>) -> CliResult<Vec<u8>> {
    let Some(raw) = args.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(encode(&())?);
    };

    let value: Value = serde_json::from_str(raw).context("arguments must be valid JSON")?;
    match value {
        Value::Array(items) if items.is_empty() => Ok(encode(&())?),
        Value::Array(items) => Ok(encode(&items)?),
        _ => bail!("arguments must be a JSON array"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_missing_args_encode_unit() {
        let unit = encode(&()).unwrap();
        assert_eq!(build_payload(None).unwrap(), unit);
        assert_eq!(build_payload(Some("  ")).unwrap(), unit);
        assert_eq!(build_payload(Some("[]")).unwrap(), unit);
    }

    #[test]
    fn test_args_decode_as_channel_tuple() {
        let payload = build_payload(Some(r#"["menu-id", false]"#)).unwrap();
        let (id, enabled): (String, bool) = decode(&payload).unwrap();
        assert_eq!(id, "menu-id");
        assert!(!enabled);

        let payload = build_payload(Some(r#"["/tmp/report.txt"]"#)).unwrap();
        let (path,): (PathBuf,) = decode(&payload).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/report.txt"));
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(build_payload(Some(r#"{"url": "x"}"#)).is_err());
        assert!(build_payload(Some("not json")).is_err());
    }
}
