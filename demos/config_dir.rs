//! A directory of named config files, kept canonical on every load.
//!
//! Run with: RUST_LOG=mcfg=debug cargo run --example config_dir

use mcfg::{Attribute, ConfigStore, Schema};
use std::error::Error;
use std::fs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
struct Audio {
    master: u8,
    music: u8,
    muted: bool,
}

impl Default for Audio {
    fn default() -> Self {
        Audio {
            master: 80,
            music: 60,
            muted: false,
        }
    }
}

impl Schema for Audio {
    fn attributes() -> Vec<Attribute<Self>> {
        vec![
            Attribute::scalar("master", |a: &Self| &a.master, |a: &mut Self| &mut a.master)
                .comment("0-100"),
            Attribute::scalar("music", |a: &Self| &a.music, |a: &mut Self| &mut a.music),
            Attribute::scalar("muted", |a: &Self| &a.muted, |a: &mut Self| &mut a.muted),
        ]
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcfg=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base = std::env::temp_dir().join("mcfg-demo");
    let store = ConfigStore::new(&base);
    let path = store.path_of("audio");

    // First run: the file is created from defaults.
    let audio = store.get_or_create("audio", Audio::default())?;
    println!("Created {}:\n{}", path.display(), fs::read_to_string(&path)?);
    println!("{:?}\n", audio);

    // A user edits the file by hand, dropping one key and adding a stale one.
    fs::write(&path, "master=35\nsurround=true\n")?;

    let audio = store.get_or_create("audio", Audio::default())?;
    println!("After reload:\n{}", fs::read_to_string(&path)?);
    println!("{:?}", audio);

    fs::remove_dir_all(&base)?;
    Ok(())
}
