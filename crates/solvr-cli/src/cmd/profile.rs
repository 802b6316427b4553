//! Profile field checks: username availability and wallet address format.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use solvr_core::api::TaskApi;
use solvr_core::validate::{ProfileDraft, validate_solana_address};
use std::io::Write;

use super::api_failure;
use crate::output::{CliError, fail, render};
use crate::session::Context;

#[derive(Args, Debug)]
pub struct CheckUsernameArgs {
    /// Desired username (3-24 chars, letters, digits, underscore).
    pub username: String,

    /// Wallet address to check alongside the username.
    #[arg(long)]
    pub wallet: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckAddressArgs {
    /// Solana wallet address (base58).
    pub address: String,
}

#[derive(Debug, Serialize)]
struct UsernameCheck {
    username: String,
    available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddressCheck {
    address: String,
    valid: bool,
}

/// Validate the profile fields locally, then ask the server whether the
/// name is free.
pub fn run_check_username(args: &CheckUsernameArgs, ctx: &Context) -> Result<()> {
    let draft = ProfileDraft {
        username: args.username.clone(),
        wallet_address: args.wallet.clone(),
    };
    let profile = match draft.validate() {
        Ok(profile) => profile,
        Err(err) => return fail(ctx.output, &CliError::from(&err)),
    };
    let api = ctx.api()?;
    let available = match api.username_available(&profile.username) {
        Ok(available) => available,
        Err(err) => return api_failure(ctx, &err),
    };

    render(
        ctx.output,
        &UsernameCheck {
            username: profile.username,
            available,
            wallet_address: profile.wallet_address,
        },
        |check, w| {
            let verdict = if check.available { "available" } else { "taken" };
            writeln!(w, "{}: {verdict}", check.username)?;
            if let Some(wallet) = &check.wallet_address {
                writeln!(w, "wallet {wallet}: valid")?;
            }
            Ok(())
        },
    )
}

/// Format check only; nothing is sent anywhere.
pub fn run_check_address(args: &CheckAddressArgs, ctx: &Context) -> Result<()> {
    let address = match validate_solana_address(&args.address) {
        Ok(address) => address,
        Err(err) => return fail(ctx.output, &CliError::from(&err)),
    };
    render(
        ctx.output,
        &AddressCheck {
            address,
            valid: true,
        },
        |check, w| writeln!(w, "{}: valid", check.address),
    )
}
