//! Configuration value propagation — variables (plaintext) and secrets
//! (sealed).
//!
//! Shared pattern: attempt the update first; only a `NotFound` failure falls
//! back to create, so no separate existence check is needed. Any other
//! failure propagates unmasked.
//!
//! Independent items carry no mutual ordering and are applied concurrently.

use futures::future::try_join_all;

use overture_client::RepoHost;
use overture_core::{ConfigSecret, ConfigVariable, RepoSlug, SealedSecret};

use crate::error::SyncError;

/// Upsert every variable. Explicit empty values are meaningful and are still
/// applied.
pub async fn propagate_variables(
    host: &RepoHost,
    repo: &RepoSlug,
    variables: &[ConfigVariable],
) -> Result<(), SyncError> {
    try_join_all(
        variables
            .iter()
            .map(|variable| apply_variable(host, repo, variable)),
    )
    .await?;
    Ok(())
}

async fn apply_variable(
    host: &RepoHost,
    repo: &RepoSlug,
    variable: &ConfigVariable,
) -> Result<(), SyncError> {
    let variables = host.variables();
    match variables.update(repo, variable).await {
        Ok(()) => {
            tracing::debug!(name = %variable.name, "updated variable");
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            // Expected absence: the variable does not exist yet.
            variables.create(repo, variable).await?;
            tracing::debug!(name = %variable.name, "created variable");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Seal and upsert every non-empty secret.
///
/// The repository public key is fetched fresh per call — keys rotate and are
/// never cached across attempts. Only ciphertext and the key identifier
/// cross into the upsert; empty plaintexts are skipped entirely (zero seal
/// calls, zero upserts).
pub async fn propagate_secrets(
    host: &RepoHost,
    repo: &RepoSlug,
    secrets: &[ConfigSecret],
) -> Result<(), SyncError> {
    let live: Vec<&ConfigSecret> = secrets.iter().filter(|s| !s.is_empty()).collect();
    for skipped in secrets.iter().filter(|s| s.is_empty()) {
        tracing::warn!(name = %skipped.name, "skipping secret with empty value");
    }
    if live.is_empty() {
        return Ok(());
    }

    let key = host.secrets().public_key(repo).await?;

    let sealed = live
        .iter()
        .map(|secret| {
            Ok(SealedSecret {
                name: secret.name.clone(),
                ciphertext: overture_seal::seal(&key.key, secret.plaintext.as_bytes())?,
                key_id: key.key_id.clone(),
            })
        })
        .collect::<Result<Vec<_>, SyncError>>()?;

    let secrets_api = host.secrets();
    try_join_all(sealed.iter().map(|secret| secrets_api.put(repo, secret))).await?;
    Ok(())
}
