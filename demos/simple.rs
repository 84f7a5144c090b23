//! Writing a schema instance and reading it back.
//!
//! Run with: cargo run --example simple

use mcfg::{config_enum, from_str_into, to_string, Attribute, Schema};
use std::error::Error;

config_enum! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Theme {
        Light,
        Dark,
    }
}

#[derive(Debug, PartialEq)]
struct Editor {
    font_size: u8,
    theme: Theme,
    word_wrap: bool,
    recent: Vec<String>,
}

impl Schema for Editor {
    fn attributes() -> Vec<Attribute<Self>> {
        vec![
            Attribute::scalar("font_size", |e: &Self| &e.font_size, |e: &mut Self| {
                &mut e.font_size
            })
            .comment("Points"),
            Attribute::scalar("theme", |e: &Self| &e.theme, |e: &mut Self| &mut e.theme),
            Attribute::scalar("word_wrap", |e: &Self| &e.word_wrap, |e: &mut Self| {
                &mut e.word_wrap
            }),
            Attribute::list("recent", |e: &Self| &e.recent, |e: &mut Self| &mut e.recent),
        ]
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let editor = Editor {
        font_size: 14,
        theme: Theme::Dark,
        word_wrap: true,
        recent: vec!["notes.txt".to_string(), "todo.md".to_string()],
    };

    let text = to_string(&editor)?;
    println!("Config text:\n{}", text);

    let mut back = Editor {
        font_size: 10,
        theme: Theme::Light,
        word_wrap: false,
        recent: Vec::new(),
    };
    from_str_into(&text, &mut back)?;
    assert_eq!(editor, back);
    println!("✓ Round-trip successful");

    Ok(())
}
