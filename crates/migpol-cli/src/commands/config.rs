use super::load_config;
use anyhow::Result;

pub fn check(paths: &[String]) -> Result<()> {
    let cfg = load_config(paths)?;
    println!("{cfg:#?}");
    Ok(())
}
