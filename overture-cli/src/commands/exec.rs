//! `overture exec` — restricted command execution against external tools.
//!
//! A security boundary, not a convenience: the given command runs only when
//! its tokens exactly-prefix-match an allowlist of read-only subcommands per
//! external tool. Anything else is rejected before any process starts. The
//! access token reaches the child only through its environment, never argv.

use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Args;

/// An allowlist entry: tool binary, the exact subcommand prefix that may
/// follow it, and the environment variable the tool reads its token from.
struct AllowRule {
    tool: &'static str,
    prefix: &'static [&'static str],
    token_var: &'static str,
}

/// Read-only subcommands per external tool. Matching is exact per token —
/// `gh run list` allows `gh run list --limit 5` but not `gh runs list` or
/// `gh run cancel`.
const ALLOWLIST: &[AllowRule] = &[
    AllowRule {
        tool: "gh",
        prefix: &["run", "list"],
        token_var: "GH_TOKEN",
    },
    AllowRule {
        tool: "gh",
        prefix: &["run", "view"],
        token_var: "GH_TOKEN",
    },
    AllowRule {
        tool: "gh",
        prefix: &["workflow", "list"],
        token_var: "GH_TOKEN",
    },
    AllowRule {
        tool: "gh",
        prefix: &["workflow", "view"],
        token_var: "GH_TOKEN",
    },
    AllowRule {
        tool: "vercel",
        prefix: &["list"],
        token_var: "VERCEL_TOKEN",
    },
    AllowRule {
        tool: "vercel",
        prefix: &["ls"],
        token_var: "VERCEL_TOKEN",
    },
    AllowRule {
        tool: "vercel",
        prefix: &["inspect"],
        token_var: "VERCEL_TOKEN",
    },
    AllowRule {
        tool: "vercel",
        prefix: &["whoami"],
        token_var: "VERCEL_TOKEN",
    },
];

/// Arguments for `overture exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Command to run, e.g. `overture exec -- gh run list --limit 5`.
    #[arg(trailing_var_arg = true, required = true)]
    pub command: Vec<String>,
}

impl ExecArgs {
    pub fn run(self) -> Result<()> {
        // A single argument may carry a full quoted command line.
        let tokens = if self.command.len() == 1 {
            shell_words::split(&self.command[0]).context("failed to parse command line")?
        } else {
            self.command.clone()
        };

        let Some(rule) = matched_rule(&tokens) else {
            bail!(
                "command '{}' is not on the read-only allowlist",
                tokens.join(" ")
            );
        };

        let token = std::env::var(rule.token_var).unwrap_or_default();
        let mut child = Command::new(rule.tool);
        child.args(&tokens[1..]);
        if !token.is_empty() {
            child.env(rule.token_var, token);
        }

        let status = child
            .status()
            .with_context(|| format!("failed to launch '{}'", rule.tool))?;
        if !status.success() {
            bail!("'{}' exited with {status}", tokens.join(" "));
        }
        Ok(())
    }
}

/// Find the allowlist rule the command exactly-prefix-matches, if any.
fn matched_rule(tokens: &[String]) -> Option<&'static AllowRule> {
    let (tool, rest) = tokens.split_first()?;
    ALLOWLIST.iter().find(|rule| {
        rule.tool == tool
            && rest.len() >= rule.prefix.len()
            && rule.prefix.iter().zip(rest).all(|(want, got)| want == got)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        shell_words::split(line).expect("parse")
    }

    #[test]
    fn read_only_subcommands_match() {
        assert!(matched_rule(&tokens("gh run list")).is_some());
        assert!(matched_rule(&tokens("gh run list --limit 5")).is_some());
        assert!(matched_rule(&tokens("gh run view 42 --log")).is_some());
        assert!(matched_rule(&tokens("vercel ls my-project")).is_some());
        assert!(matched_rule(&tokens("vercel whoami")).is_some());
    }

    #[test]
    fn mutating_subcommands_are_rejected() {
        assert!(matched_rule(&tokens("gh run cancel 42")).is_none());
        assert!(matched_rule(&tokens("gh run rerun 42")).is_none());
        assert!(matched_rule(&tokens("gh repo delete acme/api")).is_none());
        assert!(matched_rule(&tokens("vercel rm my-deployment")).is_none());
        assert!(matched_rule(&tokens("vercel env add SECRET")).is_none());
    }

    #[test]
    fn unknown_tools_are_rejected() {
        assert!(matched_rule(&tokens("rm -rf /")).is_none());
        assert!(matched_rule(&tokens("curl https://example.com")).is_none());
        assert!(matched_rule(&tokens("bash -c 'gh run list'")).is_none());
    }

    #[test]
    fn prefix_matching_is_exact_per_token() {
        // A prefix is not a substring match.
        assert!(matched_rule(&tokens("gh runs list")).is_none());
        assert!(matched_rule(&tokens("gh run listall")).is_none());
        assert!(matched_rule(&tokens("vercel lsx")).is_none());
    }

    #[test]
    fn bare_or_partial_commands_are_rejected() {
        assert!(matched_rule(&tokens("gh")).is_none());
        assert!(matched_rule(&tokens("gh run")).is_none());
        assert!(matched_rule(&[]).is_none());
    }
}
