//! Transaction file commands: sign and commit.

use std::path::Path;

use crate::context::SubnetContext;
use crate::error::{CliError, CliResult};
use crate::output::{CommitOutput, OutputFormat, Render, SignOutput};
use crate::progress::with_spinner;

/// Execute the transaction sign command.
pub fn sign(
    ctx: &SubnetContext,
    format: OutputFormat,
    path: &Path,
    key: &str,
) -> CliResult<String> {
    require_file(path)?;
    let artifact = ctx.ops.sign_with_key(path, key)?;
    Ok(SignOutput {
        path: path.to_path_buf(),
        artifact,
    }
    .render(format))
}

/// Execute the transaction commit command.
pub async fn commit(ctx: &SubnetContext, format: OutputFormat, path: &Path) -> CliResult<String> {
    require_file(path)?;
    let outcome = with_spinner("Submitting transaction...", format, ctx.ops.commit(path)).await?;
    Ok(CommitOutput {
        path: path.to_path_buf(),
        tx_id: outcome.tx_id,
        artifact: outcome.artifact,
    }
    .render(format))
}

fn require_file(path: &Path) -> CliResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::deploy::{deploy, DeployArgs};
    use crate::commands::key::key_import;
    use crate::commands::subnet::create;
    use crate::commands::test_support::{mock_context, write_genesis};
    use subnetctl_crypto::{generate_keypair, private_key_to_base58};
    use subnetctl_ops::OpsError;
    use subnetctl_store::Signer;
    use subnetctl_types::{Network, NetworkSelection, TxKind, VersionRequest};
    use tempfile::TempDir;

    fn import(ctx: &SubnetContext, temp_dir: &TempDir, name: &str) {
        let file = temp_dir.path().join(format!("{}.seed", name));
        std::fs::write(&file, private_key_to_base58(&generate_keypair().0)).unwrap();
        key_import(ctx, OutputFormat::Human, name, &file, false).unwrap();
    }

    #[tokio::test]
    async fn test_two_of_two_chain_creation() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, control_plane) = mock_context(&temp_dir);
        create(
            &ctx,
            OutputFormat::Human,
            "sub1",
            &write_genesis(&temp_dir),
            VersionRequest::Latest,
            None,
            None,
            false,
        )
        .await
        .unwrap();
        import(&ctx, &temp_dir, "k1");
        import(&ctx, &temp_dir, "k2");
        let k1 = ctx.ops.state.keys.load("k1").unwrap().address();
        let k2 = ctx.ops.state.keys.load("k2").unwrap().address();

        let chain_tx = temp_dir.path().join("chain.tx");
        let output = deploy(
            &ctx,
            OutputFormat::Json,
            "sub1",
            NetworkSelection::simulated(Network::Testnet, true),
            DeployArgs {
                control_keys: vec![k1, k2],
                threshold: Some(2),
                output_tx_path: Some(chain_tx.clone()),
                ..DeployArgs::default()
            },
        )
        .await
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["chain_creation"]["status"], "pending");
        assert_eq!(control_plane.submitted_kinds(), vec![TxKind::CreateSubnet]);

        let output = sign(&ctx, OutputFormat::Json, &chain_tx, "k1").unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["artifact"]["status"], "partially_signed");

        let err = commit(&ctx, OutputFormat::Human, &chain_tx).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Ops(OpsError::InsufficientSignatures { have: 1, need: 2 })
        ));

        sign(&ctx, OutputFormat::Human, &chain_tx, "k2").unwrap();
        let output = commit(&ctx, OutputFormat::Json, &chain_tx).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["artifact"]["status"], "committed");
        assert_eq!(
            control_plane.submitted_kinds(),
            vec![TxKind::CreateSubnet, TxKind::CreateChain]
        );
    }

    #[test]
    fn test_sign_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, _) = mock_context(&temp_dir);

        let err = sign(
            &ctx,
            OutputFormat::Human,
            &temp_dir.path().join("absent.tx"),
            "k1",
        )
        .unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }
}
