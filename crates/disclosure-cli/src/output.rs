use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a titled block of text framed by a rule
pub fn print_block(title: &str, text: &str) {
    println!("=== {title}");
    println!("{}", text.trim_end());
    println!();
}
