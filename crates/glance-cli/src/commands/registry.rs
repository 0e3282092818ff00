//! Generator registry listing and lookup

use crate::config::GlanceConfig;
use anyhow::Result;
use std::path::PathBuf;

pub struct RegistryArgs {
    pub registry: Option<PathBuf>,
    pub generator: Option<String>,
}

pub fn run(args: RegistryArgs, config: &GlanceConfig) -> Result<()> {
    let registry = config.registry(args.registry.as_deref())?;

    if let Some(generator) = &args.generator {
        match registry.find(generator) {
            Some(found) => {
                println!("{}", found.display_name);
                if let Some(description) = &found.entry.description {
                    println!("  {}", description);
                }
                if let Some(docs) = &found.entry.docs {
                    println!("  docs: {}", docs);
                }
            }
            None => println!("No registry entry matches '{}'", generator),
        }
        return Ok(());
    }

    if registry.is_empty() {
        println!("Registry is empty.");
        return Ok(());
    }

    println!("{} generator(s):", registry.len());
    for entry in registry.all() {
        let pattern = if entry.generator.is_empty() {
            "(no pattern)"
        } else {
            entry.generator.as_str()
        };
        println!("  {:<36} {}", pattern, entry.display_name());
    }

    Ok(())
}
