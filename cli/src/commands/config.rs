//! Config commands

use anyhow::Result;
use bountyhub_core::AppConfig;

use crate::config::Context;
use crate::output::{OutputFormat, Settings};
use crate::ConfigCommands;

fn mask(key: &str, value: Option<String>) -> Option<String> {
    if key != "zora.api_key" {
        return value;
    }
    value.map(|k| {
        let visible: String = k.chars().take(8).collect();
        format!("{}****", visible)
    })
}

pub fn handle(action: ConfigCommands, ctx: &Context, format: OutputFormat) -> Result<()> {
    let profile = ctx.profile.as_deref();

    match action {
        ConfigCommands::Init => {
            let path = AppConfig::default().save(profile)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Set { key, value } => {
            // edit the file, not the merged view
            let mut config = AppConfig::load(profile)?;
            config.set(&key, &value)?;
            config.save(profile)?;
            println!("Set {} successfully", key);
        }
        ConfigCommands::Get { key } => {
            let value = mask(&key, ctx.config.get(&key)?);
            format.print(&Settings(vec![(key, value)]))?;
        }
        ConfigCommands::List => {
            let mut settings = Vec::with_capacity(AppConfig::KEYS.len());
            for key in AppConfig::KEYS {
                settings.push((key.to_string(), mask(key, ctx.config.get(key)?)));
            }
            format.print(&Settings(settings))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key_only() {
        assert_eq!(
            mask("zora.api_key", Some("zk_live_abcdef123".into())).as_deref(),
            Some("zk_live_****")
        );
        assert_eq!(mask("zora.api_key", None), None);
        assert_eq!(
            mask("backend.url", Some("http://localhost:8080".into())).as_deref(),
            Some("http://localhost:8080")
        );
    }
}
