//! Interactive collection of the tenant credential.

use crate::config::ApiVersion;
use crate::error::{ProvisionError, Result};
use crate::models::TenantCredential;
use dialoguer::{Input, Password};
use std::io::IsTerminal;

/// Credential fields as supplied by flags or environment; blanks count as missing.
#[derive(Debug, Default, Clone)]
pub struct CredentialInput {
    pub account_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Fills in missing fields by asking the operator. The secret is read
/// without echo.
pub fn collect_tenant_credential(
    version: ApiVersion,
    input: CredentialInput,
) -> Result<TenantCredential> {
    let interactive = is_interactive_terminal();

    let account_id = match version {
        ApiVersion::V1 => non_blank(input.account_id),
        ApiVersion::V2 => Some(resolve(
            non_blank(input.account_id),
            interactive,
            "LYVE_ACCOUNT_ID",
            || ask("Enter Lyve Cloud account id"),
        )?),
    };
    let client_id = resolve(
        non_blank(input.client_id),
        interactive,
        "LYVE_CLIENT_ID",
        || ask(client_id_prompt(version)),
    )?;
    let client_secret = resolve(
        non_blank(input.client_secret),
        interactive,
        "LYVE_CLIENT_SECRET",
        || {
            Password::new()
                .with_prompt("Enter Lyve Cloud secret")
                .interact()
                .map_err(ProvisionError::from)
        },
    )?;

    let credential = TenantCredential::new(client_id, client_secret);
    Ok(match account_id {
        Some(account_id) => credential.with_account_id(account_id),
        None => credential,
    })
}

fn client_id_prompt(version: ApiVersion) -> &'static str {
    match version {
        ApiVersion::V1 => "Enter Lyve Cloud client id",
        ApiVersion::V2 => "Enter Lyve Cloud access key",
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn resolve<F>(value: Option<String>, interactive: bool, env_var: &str, ask: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    match value {
        Some(value) => Ok(value),
        None if interactive => ask(),
        None => Err(ProvisionError::Prompt(format!(
            "{} is not set and no terminal is available to ask for it",
            env_var
        ))),
    }
}

fn ask(prompt: &str) -> Result<String> {
    let value: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(value.trim().to_string())
}
