use anyhow::Result;
use clap::{Args, Subcommand};
use solvr_core::config::{EffectiveConfig, user_config_path};
use std::io::Write;

use crate::output::{OutputMode, pretty_kv, render};
use crate::session::Context;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show the resolved configuration (token masked)
    Show,
    /// Print where the user config file lives
    Path,
}

pub fn run_config(args: &ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => print_effective(&ctx.config.redacted(), ctx.output),
        ConfigCommand::Path => print_path(ctx.output),
    }
}

fn print_effective(config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    render(output, config, |cfg, w| {
        let unset = || "(unset)".to_string();
        pretty_kv(w, "api_url", cfg.api_url.clone().unwrap_or_else(unset))?;
        pretty_kv(w, "output", &cfg.output)?;
        pretty_kv(w, "page_size", cfg.page_size.to_string())?;
        pretty_kv(w, "timeout_secs", cfg.timeout_secs.to_string())?;
        pretty_kv(w, "token", cfg.token.clone().unwrap_or_else(unset))?;
        pretty_kv(w, "user_id", cfg.user_id.clone().unwrap_or_else(unset))?;
        pretty_kv(
            w,
            "source",
            cfg.source
                .as_ref()
                .map_or_else(|| "(defaults)".to_string(), |p| p.display().to_string()),
        )
    })
}

fn print_path(output: OutputMode) -> Result<()> {
    let path = user_config_path().map(|p| p.display().to_string());
    render(output, &serde_json::json!({ "path": path.clone() }), |_, w| {
        writeln!(w, "{}", path.as_deref().unwrap_or("(no config directory)"))
    })
}
