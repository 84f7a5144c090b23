//! Custom attribute types with registered converters.
//!
//! `DateTime<Utc>` and `BigInt` work out of the box; anything else needs a
//! parse/format pair in the registry.
//!
//! Run with: cargo run --example custom_codecs

use chrono::{DateTime, Utc};
use mcfg::{config_custom, from_str_into_with, to_string_with, Attribute, Schema, TypeRegistry};
use num_bigint::BigInt;
use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
struct Timeout(Duration);

#[derive(Clone, Debug, PartialEq)]
struct Endpoint(SocketAddr);

config_custom!(Timeout, Endpoint);

fn parse_timeout(text: &str) -> Result<Timeout, String> {
    let millis = text
        .strip_suffix("ms")
        .ok_or_else(|| format!("missing `ms` suffix in {:?}", text))?;
    let millis: u64 = millis.parse().map_err(|e| format!("{}", e))?;
    Ok(Timeout(Duration::from_millis(millis)))
}

fn format_timeout(timeout: &Timeout) -> String {
    format!("{}ms", timeout.0.as_millis())
}

fn endpoint(text: &str) -> Result<Endpoint, Box<dyn Error>> {
    Ok(Endpoint(text.parse()?))
}

#[derive(Debug, PartialEq)]
struct Node {
    listen: Endpoint,
    timeout: Timeout,
    started: DateTime<Utc>,
    token_supply: BigInt,
    peers: Vec<Endpoint>,
}

impl Schema for Node {
    fn attributes() -> Vec<Attribute<Self>> {
        vec![
            Attribute::scalar("listen", |n: &Self| &n.listen, |n: &mut Self| &mut n.listen),
            Attribute::scalar("timeout", |n: &Self| &n.timeout, |n: &mut Self| &mut n.timeout)
                .comment("Request timeout, e.g. 2500ms"),
            Attribute::scalar("started", |n: &Self| &n.started, |n: &mut Self| &mut n.started),
            Attribute::scalar("token_supply", |n: &Self| &n.token_supply, |n: &mut Self| {
                &mut n.token_supply
            }),
            Attribute::list("peers", |n: &Self| &n.peers, |n: &mut Self| &mut n.peers),
        ]
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut registry = TypeRegistry::new();
    registry
        .register(parse_timeout, format_timeout)
        .register(
            |text: &str| text.parse::<SocketAddr>().map(Endpoint),
            |endpoint: &Endpoint| endpoint.0.to_string(),
        );

    let node = Node {
        listen: endpoint("127.0.0.1:7000")?,
        timeout: Timeout(Duration::from_millis(2500)),
        started: "2024-03-01T09:00:00Z".parse()?,
        token_supply: "340282366920938463463374607431768211456".parse()?,
        peers: vec![endpoint("10.0.0.2:7000")?, endpoint("10.0.0.3:7000")?],
    };

    let text = to_string_with(&node, &registry)?;
    println!("Config text:\n{}", text);

    let mut back = Node {
        listen: endpoint("0.0.0.0:1")?,
        timeout: Timeout(Duration::ZERO),
        started: DateTime::<Utc>::MIN_UTC,
        token_supply: BigInt::from(0),
        peers: Vec::new(),
    };
    from_str_into_with(&text, &mut back, &registry)?;
    assert_eq!(node, back);
    println!("✓ Round-trip successful");

    let err = to_string_with(&node, &TypeRegistry::new()).unwrap_err();
    println!("Without converters: {}", err);

    Ok(())
}
